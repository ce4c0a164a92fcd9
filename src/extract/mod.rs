//! Extraction pipeline for encyclopedia articles
//!
//! Everything here is pure: a page body goes in, owned paragraphs and
//! absolute article links come out. The pipeline is:
//! - locate the main-content region by its `id`
//! - collect paragraph text and raw anchor hrefs from inside that region
//! - drop paragraphs that are too short to be prose
//! - reduce hrefs to absolute article URLs

mod links;
mod paragraphs;

pub use links::{extract_links, filter_links};
pub use paragraphs::{
    extract_paragraphs, filter_paragraphs, MIN_PARAGRAPH_CHARS, MIN_PARAGRAPH_WORDS,
};

use scraper::{ElementRef, Html};
use thiserror::Error;
use url::Url;

/// Errors produced while extracting a page
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("main content region '{region_id}' not found")]
    MissingRegion { region_id: String },
}

/// What one page contributes to the crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Paragraphs that passed the prose filter, in document order
    pub paragraphs: Vec<String>,

    /// Absolute article URLs, in document order, possibly repeated
    pub links: Vec<String>,
}

/// Finds the first element whose `id` attribute equals `region_id`
pub fn locate_region<'a>(document: &'a Html, region_id: &str) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().id() == Some(region_id))
}

/// Runs the whole pipeline over one page body
///
/// # Arguments
///
/// * `body` - The HTML body of the page
/// * `region_id` - `id` of the main-content container
/// * `base_domain` - Base URL relative article links are resolved against
///
/// # Returns
///
/// * `Ok(ExtractedPage)` - Filtered paragraphs and article links
/// * `Err(ExtractError::MissingRegion)` - The page has no main-content region
pub fn extract_page(
    body: &str,
    region_id: &str,
    base_domain: &Url,
) -> Result<ExtractedPage, ExtractError> {
    let document = Html::parse_document(body);

    let region =
        locate_region(&document, region_id).ok_or_else(|| ExtractError::MissingRegion {
            region_id: region_id.to_string(),
        })?;

    let paragraphs = filter_paragraphs(extract_paragraphs(region));
    let links = filter_links(extract_links(region), base_domain);

    Ok(ExtractedPage { paragraphs, links })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGION: &str = "mw-content-text";

    fn base() -> Url {
        Url::parse("https://en.wikipedia.org").unwrap()
    }

    #[test]
    fn test_extract_page_reads_only_main_region() {
        let html = r#"<html><body>
            <div id="mw-navigation"><p>Navigation text that is long enough.</p>
                <a href="/wiki/Main_Page">Main</a></div>
            <div id="mw-content-text">
                <p>Mathematics is an area of knowledge.</p>
                <p>Tiny</p>
                <p>See also the <a href="/wiki/Algebra">algebra</a> article for more.</p>
                <a href="/wiki/File:Euclid.jpg">image</a>
            </div>
        </body></html>"#;

        let page = extract_page(html, REGION, &base()).unwrap();

        assert_eq!(
            page.paragraphs,
            vec![
                "Mathematics is an area of knowledge.".to_string(),
                "See also the algebra article for more.".to_string(),
            ]
        );
        assert_eq!(
            page.links,
            vec!["https://en.wikipedia.org/wiki/Algebra".to_string()]
        );
    }

    #[test]
    fn test_extract_page_missing_region() {
        let html = r#"<html><body><div id="content"><p>Some text here.</p></div></body></html>"#;
        assert_eq!(
            extract_page(html, REGION, &base()),
            Err(ExtractError::MissingRegion {
                region_id: REGION.to_string()
            })
        );
    }

    #[test]
    fn test_locate_region_matches_any_element() {
        let document = Html::parse_document(r#"<main id="mw-content-text"><p>x</p></main>"#);
        let region = locate_region(&document, REGION).unwrap();
        assert_eq!(region.value().name(), "main");
    }

    #[test]
    fn test_extract_page_with_empty_region() {
        let html = r#"<div id="mw-content-text"></div>"#;
        assert_eq!(
            extract_page(html, REGION, &base()).unwrap(),
            ExtractedPage::default()
        );
    }
}
