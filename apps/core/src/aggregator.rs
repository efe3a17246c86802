use crate::catalog::StaticCatalog;
use crate::dispatcher::DynamicResults;
use crate::model::SearchResult;

/// Concatenates catalog entries and fetched entities into one candidate
/// pool. Nothing is filtered or de-duplicated here.
pub fn merge(catalog: &StaticCatalog, dynamic: &DynamicResults) -> Vec<SearchResult> {
    let mut pool = Vec::with_capacity(catalog.len() + dynamic.len());
    pool.extend(catalog.entries().iter().cloned());
    pool.extend(dynamic.iter().cloned());
    pool
}
