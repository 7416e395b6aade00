//! Sitemap XML parsing
//!
//! Turns a sitemap body into either the list of child sitemaps of an index or the
//! `<url>` entries of a urlset, keeping document order.

use roxmltree::{Document, Node, ParsingOptions};
use thiserror::Error;

/// Namespace of the sitemaps.org protocol
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Namespace carrying `<xhtml:link rel="alternate">` hreflang annotations
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Errors from sitemap XML parsing
#[derive(Debug, Error)]
pub enum SitemapParseError {
    #[error("{0}")]
    Xml(#[from] roxmltree::Error),

    #[error("unexpected root element <{0}>, expected <urlset> or <sitemapindex>")]
    UnexpectedRoot(String),
}

/// Shape of a parsed sitemap document
#[derive(Debug, Clone, PartialEq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: child `<loc>` values, `None` for a `<sitemap>` without one
    Index(Vec<Option<String>>),
    /// `<urlset>`
    UrlSet(Vec<UrlEntry>),
}

/// One `<url>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    pub loc: Option<String>,
    pub alternates: Vec<Alternate>,
}

/// One `<xhtml:link rel="alternate">` under a `<url>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternate {
    pub href: Option<String>,
    pub hreflang: Option<String>,
}

/// Parses sitemap XML content
///
/// # Returns
///
/// * `Ok(SitemapDocument)` - An index or a urlset
/// * `Err(SitemapParseError)` - Malformed XML or an unexpected root element
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, SitemapParseError> {
    let doc = Document::parse_with_options(
        xml,
        ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        },
    )?;
    let root = doc.root_element();

    match root.tag_name().name() {
        "sitemapindex" => Ok(SitemapDocument::Index(
            sitemap_children(root, "sitemap")
                .map(|sitemap| child_text(sitemap, "loc"))
                .collect(),
        )),
        "urlset" => Ok(SitemapDocument::UrlSet(
            sitemap_children(root, "url").map(parse_url_entry).collect(),
        )),
        other => Err(SitemapParseError::UnexpectedRoot(other.to_string())),
    }
}

fn parse_url_entry(url: Node<'_, '_>) -> UrlEntry {
    let alternates = url
        .descendants()
        .filter(|n| {
            n.is_element()
                && n.tag_name().name() == "link"
                && n.tag_name().namespace() == Some(XHTML_NS)
                && n.attribute("rel") == Some("alternate")
        })
        .map(|link| Alternate {
            href: link.attribute("href").map(|s| s.trim().to_string()),
            hreflang: link.attribute("hreflang").map(|s| s.trim().to_string()),
        })
        .collect();

    UrlEntry {
        loc: child_text(url, "loc"),
        alternates,
    }
}

/// Direct element children named `name` in the sitemap namespace
///
/// Documents that omit the namespace declaration are accepted as well.
fn sitemap_children<'a, 'input>(
    parent: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    parent.children().filter(move |n| {
        n.is_element()
            && n.tag_name().name() == name
            && matches!(n.tag_name().namespace(), None | Some(SITEMAP_NS))
    })
}

fn child_text(parent: Node<'_, '_>, name: &'static str) -> Option<String> {
    sitemap_children(parent, name)
        .next()
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
