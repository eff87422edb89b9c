//! Upstream request URLs.
//!
//! Collection URLs take the form `{base}/{resource}/?…` and item URLs
//! `{base}/{resource}/{id}/`. Resource keys and ids are pushed as path
//! segments, so unusual keys are percent-encoded rather than spliced.

use catalog_core::SortOrder;
use url::Url;

use super::UpstreamError;

/// What to ask the catalog service for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRequest<'a> {
    /// The whole collection, no pagination constraints.
    Full,

    /// One page, addressed by explicit offset and limit.
    Page { page: u32, items_per_page: u32 },

    /// Upstream's own search over the collection.
    Search { term: &'a str },

    /// Upstream's own ordering over the collection.
    Sorted { attribute: &'a str, order: SortOrder },

    /// A single record.
    Item { id: &'a str },
}

impl CatalogRequest<'_> {
    /// Build the request URL for `resource` under `base`.
    pub fn url(&self, base: &Url, resource: &str) -> Result<Url, UpstreamError> {
        let mut url = base.clone();
        {
            let mut segments =
                url.path_segments_mut().map_err(|_| UpstreamError::InvalidUrl(format!("{base} cannot be a base")))?;
            segments.pop_if_empty().push(resource);
            if let CatalogRequest::Item { id } = self {
                segments.push(id);
            }
            segments.push("");
        }

        match self {
            CatalogRequest::Full => {
                url.query_pairs_mut().append_pair("format", "json");
            }
            CatalogRequest::Page { page, items_per_page } => {
                let offset = u64::from(page.saturating_sub(1)) * u64::from(*items_per_page);
                url.query_pairs_mut()
                    .append_pair("page", &page.to_string())
                    .append_pair("format", "json")
                    .append_pair("offset", &offset.to_string())
                    .append_pair("limit", &items_per_page.to_string());
            }
            CatalogRequest::Search { term } => {
                url.query_pairs_mut().append_pair("search", term);
            }
            CatalogRequest::Sorted { attribute, order } => {
                let ordering = match order {
                    SortOrder::Asc => attribute.to_string(),
                    SortOrder::Desc => format!("-{attribute}"),
                };
                url.query_pairs_mut()
                    .append_pair("format", "json")
                    .append_pair("ordering", &ordering);
            }
            CatalogRequest::Item { .. } => {}
        }

        Ok(url)
    }
}
