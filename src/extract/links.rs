//! Article link extraction and filtering

use scraper::{ElementRef, Selector};
use url::Url;

/// Path marker shared by every article URL
const ARTICLE_MARKER: &str = "wiki/";

/// Returns the raw `href` of every `<a>` inside `region`
///
/// Anchors without an `href` yield `None` so callers see exactly what the
/// page contained.
pub fn extract_links(region: ElementRef<'_>) -> Vec<Option<String>> {
    let Ok(a_selector) = Selector::parse("a") else {
        return Vec::new();
    };

    region
        .select(&a_selector)
        .map(|a| a.value().attr("href").map(str::to_string))
        .collect()
}

/// Reduces raw hrefs to absolute article URLs
///
/// # Filtering Rules
///
/// 1. Missing and empty hrefs are dropped.
/// 2. The href must contain `wiki/`.
/// 3. Nothing after the first `wiki/` may contain a `:`. Namespaced pages
///    such as `Category:`, `File:` or `Help:` are not articles.
/// 4. Survivors are resolved against `base_domain`; query and fragment are
///    kept as written.
///
/// # Example
///
/// ```
/// use url::Url;
/// use wiki_harvest::extract::filter_links;
///
/// let base = Url::parse("https://en.wikipedia.org").unwrap();
/// let links = filter_links(vec![Some("/wiki/Cat"), Some("/wiki/File:Cat.jpg"), None], &base);
/// assert_eq!(links, vec!["https://en.wikipedia.org/wiki/Cat".to_string()]);
/// ```
pub fn filter_links<I, S>(hrefs: I, base_domain: &Url) -> Vec<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    hrefs
        .into_iter()
        .flatten()
        .filter_map(|href| resolve_article(href.as_ref(), base_domain))
        .collect()
}

fn resolve_article(href: &str, base_domain: &Url) -> Option<String> {
    if href.is_empty() {
        return None;
    }

    let (_, title) = href.split_once(ARTICLE_MARKER)?;
    if title.contains(':') {
        return None;
    }

    match base_domain.join(href) {
        Ok(absolute) => Some(absolute.to_string()),
        Err(e) => {
            tracing::debug!("Dropping unresolvable link {}: {}", href, e);
            None
        }
    }
}
