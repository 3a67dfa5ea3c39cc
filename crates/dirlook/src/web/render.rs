//! HTML rendering of listings.
//!
//! Every listing is an unordered list of links wrapped in a fixed page. Link
//! targets are built from raw segment names, each percent-encoded on its own;
//! the visible text is the raw name, escaped by maud.

use maud::{html, Markup, DOCTYPE};

use super::routes::DOWNLOAD_PREFIX;
use crate::files::{Listing, ResolvedPath, Root};

/// Title of every page.
pub const PAGE_TITLE: &str = "Everything";

/// A rendered anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// Wrap an HTML fragment in the page template.
pub fn page(fragment: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (PAGE_TITLE) }
            }
            body {
                (fragment)
            }
        }
    }
}

/// Render links as an unordered list.
pub fn link_list<I>(links: I) -> Markup
where
    I: IntoIterator<Item = Link>,
{
    html! {
        ul {
            @for link in links {
                li { a href=(link.href) { (link.text) } }
            }
        }
    }
}

/// Build an absolute URL path from raw segments.
pub fn href<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        out.push_str(&urlencoding::encode(segment));
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Links for the root listing: one per root, pointing at `/{root}`.
pub fn root_links(roots: &[Root]) -> Vec<Link> {
    roots
        .iter()
        .map(|root| Link {
            href: href([root.name.as_str()]),
            text: root.name.clone(),
        })
        .collect()
}

/// Links for the top level of a root: directories only.
pub fn root_level_links(resolved: &ResolvedPath, listing: &Listing) -> Vec<Link> {
    listing
        .directories
        .iter()
        .map(|entry| Link {
            href: browse_href(resolved, &entry.name),
            text: entry.name.clone(),
        })
        .collect()
}

/// Links for a nested directory: directories browse further, files download.
pub fn nested_links(resolved: &ResolvedPath, listing: &Listing) -> Vec<Link> {
    let directories = listing.directories.iter().map(|entry| Link {
        href: browse_href(resolved, &entry.name),
        text: entry.name.clone(),
    });
    let files = listing.files.iter().map(|entry| Link {
        href: download_href(resolved, &entry.name),
        text: entry.name.clone(),
    });
    directories.chain(files).collect()
}

/// `/{root}/{segments...}/{child}`
pub fn browse_href(resolved: &ResolvedPath, child: &str) -> String {
    href(
        std::iter::once(resolved.root.name.as_str())
            .chain(resolved.segments.iter().map(String::as_str))
            .chain(std::iter::once(child)),
    )
}

/// `/download/{root}/{segments...}/{file}`
pub fn download_href(resolved: &ResolvedPath, file: &str) -> String {
    let mut link = String::from("/");
    link.push_str(DOWNLOAD_PREFIX);
    link.push_str(&browse_href(resolved, file));
    link
}
