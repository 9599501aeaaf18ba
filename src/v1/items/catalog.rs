#![forbid(unsafe_code)]

use std::collections::HashSet;

use poem_openapi::Object;
use serde::Deserialize;

use crate::utils::errors::Errors;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Built-in catalog, in declaration order.
const DEFAULT_CATALOG: [(i64, &str); 10] = [
    (1, "노트북"),
    (2, "스마트폰"),
    (3, "태블릿"),
    (4, "무선 마우스"),
    (5, "기계식 키보드"),
    (6, "모니터"),
    (7, "외장 하드"),
    (8, "헤드폰"),
    (9, "웹캠"),
    (10, "블루투스 스피커"),
];

// ***************************************************************************
//                               Catalog Types
// ***************************************************************************
/// A listed catalog entry.
#[derive(Object, Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    /// Entry identifier.
    pub id: i64,
    /// Display name, matched by the `q` filter.
    pub name: String,
}

/** Read-only list of entries answered by the items listing endpoint.  The
 * catalog is built once at startup and shared; it is never mutated.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl CatalogEntry {
    pub fn new(id: i64, name: &str) -> Self {
        Self {id, name: name.to_string()}
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            entries: DEFAULT_CATALOG.iter().map(|(id, name)| CatalogEntry::new(*id, name)).collect(),
        }
    }
}

impl Catalog {
    /// Build a catalog from configured entries.  Ids must be unique.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, Errors> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(Errors::InvalidCatalog(format!("duplicate catalog id {}", entry.id)));
            }
        }
        Ok(Self {entries})
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // -----------------------------------------------------------------------
    // search:
    // -----------------------------------------------------------------------
    /** Filter the catalog by a case-insensitive substring of the entry name
     * and return one page of the matches.  An absent or empty `q` matches
     * everything.  The page is the slice `[skip, skip + limit)` of the
     * matches with slice semantics: negative bounds count back from the end
     * and out-of-range bounds are clamped, so no input is an error.
     */
    pub fn search(&self, q: Option<&str>, skip: i64, limit: i64) -> Vec<CatalogEntry> {
        let matches: Vec<&CatalogEntry> = match q {
            Some(q) if !q.is_empty() => {
                let needle = q.to_lowercase();
                self.entries.iter().filter(|e| e.name.to_lowercase().contains(&needle)).collect()
            }
            _ => self.entries.iter().collect(),
        };

        let (start, stop) = page_bounds(matches.len(), skip, limit);
        matches[start..stop].iter().map(|e| (*e).clone()).collect()
    }
}

// ***************************************************************************
//                          Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// page_bounds:
// ---------------------------------------------------------------------------
/** Resolve `[skip, skip + limit)` against a sequence of length `len`.  The
 * returned range always satisfies `start <= stop <= len`.
 */
fn page_bounds(len: usize, skip: i64, limit: i64) -> (usize, usize) {
    let len_i = len as i64;
    let start = clamp_index(len_i, skip);
    let stop = clamp_index(len_i, skip.saturating_add(limit));
    (start, stop.max(start))
}

fn clamp_index(len: i64, index: i64) -> usize {
    let i = if index < 0 { index.saturating_add(len) } else { index };
    i.clamp(0, len) as usize
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    fn ids(entries: &[CatalogEntry]) -> Vec<i64> {
        entries.iter().map(|e| e.id).collect()
    }

    #[test]
    fn default_catalog_has_ten_ordered_entries() {
        let catalog = Catalog::default();
        assert_eq!(catalog.len(), 10);
        assert_eq!(ids(catalog.entries()), (1..=10).collect::<Vec<i64>>());
        assert_eq!(catalog.entries()[0], CatalogEntry::new(1, "노트북"));
    }

    #[test]
    fn no_parameters_returns_first_page() {
        let page = Catalog::default().search(None, 0, 10);
        assert_eq!(ids(&page), (1..=10).collect::<Vec<i64>>());
    }

    #[test]
    fn query_filters_by_substring() {
        let page = Catalog::default().search(Some("노트북"), 0, 10);
        assert_eq!(page, vec![CatalogEntry::new(1, "노트북")]);
    }

    #[test]
    fn query_is_case_insensitive_and_keeps_order() {
        let catalog = Catalog::from_entries(vec![
            CatalogEntry::new(1, "Laptop Stand"),
            CatalogEntry::new(2, "Mouse"),
            CatalogEntry::new(3, "LAPTOP bag"),
        ]).unwrap();
        assert_eq!(ids(&catalog.search(Some("laptop"), 0, 10)), vec![1, 3]);
        assert_eq!(ids(&catalog.search(Some("LaPtOp"), 1, 10)), vec![3]);
    }

    #[test]
    fn empty_query_matches_everything() {
        assert_eq!(Catalog::default().search(Some(""), 0, 100).len(), 10);
    }

    #[test]
    fn skip_near_end_truncates_page() {
        let page = Catalog::default().search(None, 8, 10);
        assert_eq!(ids(&page), vec![9, 10]);
    }

    #[test]
    fn out_of_range_bounds_clamp() {
        let catalog = Catalog::default();
        assert!(catalog.search(None, 50, 10).is_empty());
        assert!(catalog.search(None, 0, 0).is_empty());
        assert_eq!(catalog.search(None, 0, i64::MAX).len(), 10);
        assert!(catalog.search(Some("없는 상품"), 0, 10).is_empty());
    }

    #[test]
    fn negative_bounds_count_from_end() {
        let catalog = Catalog::default();
        // [-3, 7) on ten entries is [7, 7).
        assert!(catalog.search(None, -3, 10).is_empty());
        // [-3, -1) on ten entries is [7, 9).
        assert_eq!(ids(&catalog.search(None, -3, 2)), vec![8, 9]);
        // [0, -1) on ten entries drops the last entry.
        assert_eq!(catalog.search(None, 0, -1).len(), 9);
        assert!(catalog.search(None, i64::MIN, i64::MIN).is_empty());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let result = Catalog::from_entries(vec![CatalogEntry::new(1, "a"), CatalogEntry::new(1, "b")]);
        assert!(matches!(result, Err(Errors::InvalidCatalog(_))));
    }
}
