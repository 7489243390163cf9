use crate::model::{Post, Task};
use std::num::NonZeroUsize;

/// One page of a filtered collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection<'a, R> {
    pub items: Vec<&'a R>,
    pub total_matched: usize,
    pub total_pages: usize,
    /// Requested page after clamping to `1..=total_pages`.
    pub page: usize,
}

/// Filters `records` with `predicate` and returns the requested page.
///
/// There is always at least one page, even for an empty result, and
/// out-of-range pages are clamped instead of producing an empty slice.
pub fn project<'a, R, P>(
    records: &'a [R],
    predicate: P,
    page: usize,
    page_size: NonZeroUsize,
) -> Projection<'a, R>
where
    P: Fn(&R) -> bool,
{
    let matched: Vec<&R> = records.iter().filter(|record| predicate(*record)).collect();
    let total_matched = matched.len();
    let page_size = page_size.get();
    let total_pages = total_matched.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let items = matched
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    Projection {
        items,
        total_matched,
        total_pages,
        page,
    }
}

/// Case-insensitive substring match against any of `fields`.
///
/// A blank query matches everything.
pub fn matches_query(fields: &[&str], query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    fn matches(&self, query: &str) -> bool {
        matches_query(&self.search_fields(), query)
    }
}

impl Searchable for Post {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.body.as_str()]
    }
}

impl Searchable for Task {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.text.as_str()]
    }
}
