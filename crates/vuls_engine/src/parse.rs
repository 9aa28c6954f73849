use scraper::{Html, Selector};

use crate::VulnerabilityEntry;

/// Turns listing markup into entries, in document order.
///
/// An empty result means "nothing recognisable", which callers treat as a
/// failed load.
pub trait ListingParser: Send + Sync {
    fn parse(&self, markup: &str, base_origin: &str) -> Vec<VulnerabilityEntry>;
}

/// Matches the listing's title cells: an element carrying both the `title`
/// and `tx-overflow-ellipsis` classes whose direct child is a link.
#[derive(Debug, Default, Clone, Copy)]
pub struct TitleCellParser;

const TITLE_LINK_SELECTOR: &str = ".title.tx-overflow-ellipsis > a[href]";

impl ListingParser for TitleCellParser {
    fn parse(&self, markup: &str, base_origin: &str) -> Vec<VulnerabilityEntry> {
        let Ok(selector) = Selector::parse(TITLE_LINK_SELECTOR) else {
            return Vec::new();
        };
        let doc = Html::parse_document(markup);

        doc.select(&selector)
            .filter_map(|link| {
                let path = link.value().attr("href")?.trim();
                if path.is_empty() {
                    return None;
                }
                let title = link.text().collect::<String>().trim().to_string();
                Some(VulnerabilityEntry::new(base_origin, path, title))
            })
            .collect()
    }
}
