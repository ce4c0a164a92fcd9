//! Paragraph extraction and quality filtering

use scraper::{ElementRef, Selector};

/// Paragraphs shorter than this many characters are discarded
pub const MIN_PARAGRAPH_CHARS: usize = 10;

/// Paragraphs with fewer whitespace-separated words are discarded
pub const MIN_PARAGRAPH_WORDS: usize = 3;

/// Returns the text of every `<p>` element inside `region`, in document order
///
/// The text of a paragraph is all of its descendant text nodes concatenated,
/// so inline links and emphasis are flattened into the surrounding prose.
pub fn extract_paragraphs(region: ElementRef<'_>) -> Vec<String> {
    let Ok(p_selector) = Selector::parse("p") else {
        return Vec::new();
    };

    region
        .select(&p_selector)
        .map(|p| p.text().collect::<String>())
        .collect()
}

/// Keeps only paragraphs long enough to be prose
///
/// A paragraph survives when it has at least [`MIN_PARAGRAPH_CHARS`]
/// characters and at least [`MIN_PARAGRAPH_WORDS`] words. Order is kept and
/// repeated paragraphs are not collapsed.
pub fn filter_paragraphs(paragraphs: Vec<String>) -> Vec<String> {
    paragraphs.into_iter().filter(|p| is_prose(p)).collect()
}

fn is_prose(paragraph: &str) -> bool {
    paragraph.chars().count() >= MIN_PARAGRAPH_CHARS
        && paragraph.split_whitespace().count() >= MIN_PARAGRAPH_WORDS
}
