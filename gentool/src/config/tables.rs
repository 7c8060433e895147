//! Table selection

use std::collections::{BTreeSet, HashSet};
use std::future::Future;

/// Trim names, drop blanks and drop exact duplicates, keeping the first
/// occurrence of each name.
pub fn normalize<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|name| name.as_ref().trim())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Split a comma-separated list and normalize it.
pub fn parse_list(list: &str) -> Vec<String> {
    normalize(&list.split(',').collect::<Vec<_>>())
}

/// Tables to generate for.
///
/// A non-empty include list is used in its own order; otherwise the catalog
/// is asked for every table. Excluded names are removed in both cases, and
/// `catalog_tables` is only called when needed.
pub async fn select<F, Fut, E>(
    include: &[String],
    exclude: &[String],
    catalog_tables: F,
) -> Result<Vec<String>, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<String>, E>>,
{
    let include = normalize(include);
    let exclude: HashSet<String> = normalize(exclude).into_iter().collect();

    let candidates = if include.is_empty() {
        normalize(&catalog_tables().await?)
    } else {
        include
    };
    Ok(candidates
        .into_iter()
        .filter(|name| !exclude.contains(name))
        .collect())
}

/// Tables to list: catalog tables allowed by `include` (when non-empty) and
/// not denied by `exclude`, sorted and deduplicated.
pub fn select_for_display(include: &[String], exclude: &[String], catalog: &[String]) -> Vec<String> {
    let include: HashSet<String> = normalize(include).into_iter().collect();
    let exclude: HashSet<String> = normalize(exclude).into_iter().collect();
    catalog
        .iter()
        .map(String::as_str)
        .filter(|name| include.is_empty() || include.contains(*name))
        .filter(|name| !exclude.contains(*name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
