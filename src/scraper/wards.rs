// wards.rs
use scraper::Html;
use url::Url;

use crate::domain::{Prefecture, Ward};
use crate::scraper::extractor::selector;
use crate::scraper::{CancelToken, PageFetcher, TraversalError};

/// The prefecture's area-selection page.
pub fn area_page_url(prefecture: &Prefecture) -> Result<Url, TraversalError> {
    Url::parse(&format!(
        "https://suumo.jp/chintai/{}/city/",
        prefecture.url_path
    ))
    .map_err(|e| TraversalError::InvalidUrl(e.to_string()))
}

/// Every ward offered by the prefecture's area-selection form, in page
/// order. Entries without a code (group headers and the like) are dropped.
pub fn list_wards(
    fetcher: &dyn PageFetcher,
    prefecture: &Prefecture,
    cancel: &CancelToken,
) -> Result<Vec<Ward>, TraversalError> {
    let html = fetcher.fetch(&area_page_url(prefecture)?, cancel)?;
    parse_wards(&html, prefecture)
}

pub fn parse_wards(html: &str, prefecture: &Prefecture) -> Result<Vec<Ward>, TraversalError> {
    let item = selector("#js-areaSelectForm li")?;
    let name = selector("label span:first-of-type")?;
    let checkbox = selector(r#"input[type="checkbox"]"#)?;

    let document = Html::parse_document(html);

    let wards = document
        .select(&item)
        .filter_map(|li| {
            let code = li
                .select(&checkbox)
                .next()
                .and_then(|input| input.value().attr("value"))
                .map(str::trim)
                .unwrap_or_default();
            if code.is_empty() {
                return None;
            }

            let name = li
                .select(&name)
                .next()
                .map(|span| span.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            Some(Ward {
                name,
                code: code.to_string(),
                prefecture: prefecture.clone(),
            })
        })
        .collect();

    Ok(wards)
}
