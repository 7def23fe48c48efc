use url::Url;

/// Builds the URL of one collection page
///
/// Pages are addressed with a 1-based `page` query parameter. Any `page`
/// parameter already present on the source is replaced; other parameters
/// are kept in order.
///
/// # Example
///
/// ```
/// use catalog_harvest::sources::page_url;
///
/// let url = page_url("https://shop.example.com/collections/shoes", 3).unwrap();
/// assert_eq!(url.as_str(), "https://shop.example.com/collections/shoes?page=3");
/// ```
pub fn page_url(source: &str, page: u32) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(source.trim())?;

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("page", &page.to_string());

    Ok(url)
}
