//! HTML parser for extracting anchor hrefs
//!
//! The parser only reports raw `href` values of anchor elements, in document
//! order, without deduplication or validation. Resolving them into absolute
//! URLs is the page's job.

use scraper::{Html, Selector};

/// Extracts raw anchor hrefs from page markup
pub trait LinkParser: Send + Sync {
    /// Returns every anchor `href` value in document order
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - The raw href values
    /// * `Err(String)` - The markup could not be processed at all
    fn extract_hrefs(&self, markup: &str) -> Result<Vec<String>, String>;
}

/// Link parser backed by the `scraper` HTML5 parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkParser;

impl LinkParser for HtmlLinkParser {
    fn extract_hrefs(&self, markup: &str) -> Result<Vec<String>, String> {
        let document = Html::parse_document(markup);
        let selector =
            Selector::parse("a").map_err(|e| format!("Invalid anchor selector: {:?}", e))?;

        Ok(document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect())
    }
}
