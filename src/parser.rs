use crate::error::DownloaderError;
use log::debug;
use scraper::{Html, Selector};

/// Extracts the `.zip` file names from a directory-index page.
///
/// Names come from the anchors' `title` attribute inside the first element
/// with `id="list"`. `href` is percent-encoded differently and is ignored.
/// A page without a listing element yields no files.
pub fn parse_listing(html: &str) -> Result<Vec<String>, DownloaderError> {
    let list_selector = selector("#list")?;
    let anchor_selector = selector("a")?;

    let document = Html::parse_document(html);
    let Some(list) = document.select(&list_selector).next() else {
        debug!("No listing element found in page");
        return Ok(Vec::new());
    };

    let files = list
        .select(&anchor_selector)
        .filter_map(|a| a.value().attr("title"))
        .filter(|title| title.ends_with(".zip"))
        .map(str::to_string)
        .collect();
    Ok(files)
}

fn selector(css: &str) -> Result<Selector, DownloaderError> {
    Selector::parse(css).map_err(|e| DownloaderError::Listing(format!("bad selector {}: {}", css, e)))
}
