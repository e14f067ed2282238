// src/fetch/links.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::trace;
use url::Url;

/// Anchor text of the FAO monthly nominal index download.
static MONTHLY_NOMINAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*CSV:.*Nominal indices.*monthly").expect("regex should parse")
});

/// Locate a CSV download on an HTML page.
///
/// Prefers a link labelled `CSV: ... Nominal indices ... monthly`, otherwise
/// takes the first href mentioning `.csv`. Relative hrefs are resolved
/// against `page`.
pub fn find_csv_link(html: &str, page: &Url) -> Option<Url> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse("[href]").expect("selector should parse");

    let mut first_csv = None;
    for el in doc.select(&sel) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if !href.to_lowercase().contains(".csv") {
            continue;
        }
        let Ok(full) = page.join(href) else {
            continue;
        };
        let text: String = el.text().collect();
        if MONTHLY_NOMINAL.is_match(&text) {
            trace!(url = %full, "Found labelled CSV link");
            return Some(full);
        }
        first_csv.get_or_insert(full);
    }
    first_csv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://www.fao.org/worldfoodsituation/foodpricesindex/en/").unwrap()
    }

    #[test]
    fn prefers_labelled_monthly_link() {
        let html = r#"
            <a href="/docs/annual.csv">CSV: Nominal indices (annual)</a>
            <a href="/docs/monthly.csv?download=true">
              CSV: Food price indices, Nominal indices, monthly
            </a>"#;
        let link = find_csv_link(html, &page()).unwrap();
        assert_eq!(
            link.as_str(),
            "https://www.fao.org/docs/monthly.csv?download=true"
        );
    }

    #[test]
    fn falls_back_to_first_csv_href() {
        let html = concat!(
            r#"<a href="report.pdf">PDF</a>"#,
            r#"<a href="data/ffpi.CSV">download</a>"#,
            r#"<a href="other.csv">x</a>"#
        );
        let link = find_csv_link(html, &page()).unwrap();
        assert_eq!(
            link.as_str(),
            "https://www.fao.org/worldfoodsituation/foodpricesindex/en/data/ffpi.CSV"
        );
    }

    #[test]
    fn absolute_href_is_kept() {
        let html = r#"<a href="https://files.example.org/ffpi.csv">CSV</a>"#;
        let link = find_csv_link(html, &page()).unwrap();
        assert_eq!(link.host_str(), Some("files.example.org"));
    }

    #[test]
    fn none_without_csv_links() {
        assert!(find_csv_link("<p>No data today</p><a href='x.xlsx'>x</a>", &page()).is_none());
    }
}
