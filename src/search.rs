//! Keyword filtering shared by every list on screen.

use crate::store::{Entry, Keyed, RecordStore};

/// Records that expose string fields to the search box.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// True when `keyword` is blank or any searchable field contains it,
/// ignoring case.
pub fn matches<T: Searchable>(record: &T, keyword: &str) -> bool {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Re-derive the visible rows from the live store. `None` is the unfiltered
/// view that Reset returns to.
pub fn filter_store<'a, T>(store: &'a RecordStore<T>, keyword: Option<&'a str>) -> Vec<Entry<'a, T>>
where
    T: Keyed + Searchable,
{
    match keyword {
        Some(keyword) => store.find(move |record| matches(record, keyword)).collect(),
        None => store.all().collect(),
    }
}

/// Slice flavor for lists that are not backed by a keyed store (the book
/// catalog).
pub fn filter_slice<'a, T: Searchable>(records: &'a [T], keyword: Option<&str>) -> Vec<&'a T> {
    records
        .iter()
        .filter(|record| keyword.map_or(true, |keyword| matches(*record, keyword)))
        .collect()
}
