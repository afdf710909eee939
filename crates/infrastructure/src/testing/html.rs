//! HTML queries used by the document predicates.

use scraper::{Html, Selector};

/// A selector that does not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CSS selector '{selector}': {message}")]
pub struct SelectorError {
    /// The selector as given.
    pub selector: String,
    /// Parser message.
    pub message: String,
}

/// Trimmed text content of every element matching `selector`, in document
/// order.
///
/// # Errors
///
/// Returns `SelectorError` if `selector` is not valid CSS.
pub fn select_text(html: &str, selector: &str) -> Result<Vec<String>, SelectorError> {
    let parsed = Selector::parse(selector).map_err(|e| SelectorError {
        selector: selector.to_string(),
        message: e.to_string(),
    })?;

    let document = Html::parse_document(html);
    Ok(document
        .select(&parsed)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .collect())
}

/// Every `href` that starts with `http://` or `https://`.
#[must_use]
pub fn absolute_links(html: &str) -> Vec<String> {
    let Ok(anchors) = Selector::parse("[href]") else {
        return Vec::new();
    };

    Html::parse_document(html)
        .select(&anchors)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| href.starts_with("http://") || href.starts_with("https://"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<html><head><link href="https://cdn.example.com/site.css"></head>
        <body>
          <h1> Title </h1>
          <ul><li class="item">one</li><li class="item">two <b>bold</b></li></ul>
          <a href="/relative">rel</a>
          <a href="http://example.com/a">a</a>
          <a href="mailto:someone@example.com">mail</a>
        </body></html>"#;

    #[test]
    fn test_select_text() {
        assert_eq!(select_text(PAGE, "h1").unwrap(), vec!["Title"]);
        assert_eq!(select_text(PAGE, "li.item").unwrap(), vec!["one", "two bold"]);
        assert!(select_text(PAGE, "table").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_selector() {
        let err = select_text(PAGE, "li[").unwrap_err();
        assert_eq!(err.selector, "li[");
    }

    #[test]
    fn test_absolute_links() {
        assert_eq!(
            absolute_links(PAGE),
            vec!["https://cdn.example.com/site.css", "http://example.com/a"]
        );
    }
}
