//! Offset paging value objects.
//!
//! # Responsibility
//! - Describe a page request (index, size, ordering) independent of storage.
//! - Turn a valid request into a `(skip, limit)` window.
//! - Derive page metadata from content, request and total count.
//!
//! # Invariants
//! - A request is valid only when `page >= 0` and `size > 0`, and the
//!   resulting offset fits a signed 64-bit SQL bind.
//! - `total_pages == ceil(total_elements / size)`, so an empty result has
//!   zero pages and is still the first page.

use serde::{Deserialize, Serialize};

/// Sort direction for one order clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One `(field, direction)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order<F> {
    pub field: F,
    pub direction: Direction,
}

/// Ordered list of order clauses; empty means storage order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort<F> {
    orders: Vec<Order<F>>,
}

impl<F> Sort<F> {
    pub fn unsorted() -> Self {
        Self { orders: Vec::new() }
    }

    pub fn by(direction: Direction, field: F) -> Self {
        Self {
            orders: vec![Order { field, direction }],
        }
    }

    /// Appends a lower-priority clause.
    pub fn and(mut self, direction: Direction, field: F) -> Self {
        self.orders.push(Order { field, direction });
        self
    }

    pub fn orders(&self) -> &[Order<F>] {
        &self.orders
    }
}

impl<F> Default for Sort<F> {
    fn default() -> Self {
        Self::unsorted()
    }
}

/// Zero-based page request.
///
/// Fields are signed so that a caller-supplied negative index stays
/// representable; repositories reject it instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest<F> {
    pub page: i64,
    pub size: i64,
    pub sort: Sort<F>,
}

/// Row window a valid `PageRequest` maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub skip: u64,
    pub limit: u64,
}

impl<F> PageRequest<F> {
    pub fn of(page: i64, size: i64) -> Self {
        Self::of_sorted(page, size, Sort::unsorted())
    }

    pub fn of_sorted(page: i64, size: i64, sort: Sort<F>) -> Self {
        Self { page, size, sort }
    }

    /// Returns the skip/limit window, or `None` for an invalid request.
    pub fn window(&self) -> Option<PageWindow> {
        if self.page < 0 || self.size <= 0 {
            return None;
        }
        // Both operands are non-negative, so an in-range product is also a
        // valid `i64` bind.
        let skip = self.page.checked_mul(self.size)?;
        Some(PageWindow {
            number: self.page as u64,
            skip: skip as u64,
            limit: self.size as u64,
        })
    }

    /// Request for the following page with the same size and ordering.
    pub fn next(&self) -> Self
    where
        F: Clone,
    {
        Self::of_sorted(self.page.saturating_add(1), self.size, self.sort.clone())
    }
}

/// One page of content plus the total count it was cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u64,
    pub size: u64,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, window: PageWindow, total_elements: u64) -> Self {
        Self {
            content,
            number: window.number,
            size: window.limit,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size)
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn has_next(&self) -> bool {
        self.number
            .checked_add(1)
            .and_then(|next| next.checked_mul(self.size))
            .is_some_and(|seen| seen < self.total_elements)
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// Converts the content while keeping every piece of page metadata.
    pub fn map<U, M>(self, mapper: M) -> Page<U>
    where
        M: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(mapper).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

/// Page without a total: `has_next` comes from reading one extra row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice<T> {
    pub content: Vec<T>,
    pub number: u64,
    pub size: u64,
    pub has_next: bool,
}

impl<T> Slice<T> {
    /// Builds a slice from up to `limit + 1` rows, dropping the probe row.
    pub fn from_probe(mut rows: Vec<T>, window: PageWindow) -> Self {
        let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
        let has_next = rows.len() > limit;
        rows.truncate(limit);
        Self {
            content: rows,
            number: window.number,
            size: window.limit,
            has_next,
        }
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn map<U, M>(self, mapper: M) -> Slice<U>
    where
        M: FnMut(T) -> U,
    {
        Slice {
            content: self.content.into_iter().map(mapper).collect(),
            number: self.number,
            size: self.size,
            has_next: self.has_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, Page, PageRequest, PageWindow, Slice, Sort};

    fn window(number: u64, limit: u64) -> PageWindow {
        PageWindow {
            number,
            skip: number * limit,
            limit,
        }
    }

    #[test]
    fn window_rejects_negative_index_and_non_positive_size() {
        assert!(PageRequest::<()>::of(-1, 3).window().is_none());
        assert!(PageRequest::<()>::of(0, 0).window().is_none());
        assert!(PageRequest::<()>::of(0, -5).window().is_none());
    }

    #[test]
    fn window_rejects_offset_overflow() {
        assert!(PageRequest::<()>::of(i64::MAX, 2).window().is_none());
    }

    #[test]
    fn window_multiplies_index_by_size() {
        let window = PageRequest::<()>::of(2, 3).window().unwrap();
        assert_eq!(window.skip, 6);
        assert_eq!(window.limit, 3);
        assert_eq!(window.number, 2);
    }

    #[test]
    fn first_of_two_pages_has_next() {
        let page = Page::new(vec![1, 2, 3], window(0, 3), 5);
        assert_eq!(page.total_pages(), 2);
        assert!(page.is_first());
        assert!(page.has_next());
        assert!(!page.is_last());
        assert!(!page.has_previous());
    }

    #[test]
    fn last_partial_page_has_no_next() {
        let page = Page::new(vec![4, 5], window(1, 3), 5);
        assert_eq!(page.number_of_elements(), 2);
        assert!(!page.is_first());
        assert!(!page.has_next());
        assert!(page.is_last());
        assert!(page.has_previous());
    }

    #[test]
    fn empty_result_is_first_page_with_zero_pages() {
        let page: Page<i32> = Page::new(Vec::new(), window(0, 3), 0);
        assert_eq!(page.total_pages(), 0);
        assert!(page.is_first());
        assert!(!page.has_next());
        assert!(!page.has_content());
    }

    #[test]
    fn exact_multiple_does_not_report_next() {
        let page = Page::new(vec![4, 5, 6], window(1, 3), 6);
        assert_eq!(page.total_pages(), 2);
        assert!(!page.has_next());
    }

    #[test]
    fn map_keeps_metadata() {
        let page = Page::new(vec![1, 2, 3], window(0, 3), 5).map(|n| n * 10);
        assert_eq!(page.content, vec![10, 20, 30]);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages(), 2);
    }

    #[test]
    fn slice_uses_probe_row_for_has_next() {
        let slice = Slice::from_probe(vec![1, 2, 3, 4], window(0, 3));
        assert_eq!(slice.content, vec![1, 2, 3]);
        assert!(slice.has_next);

        let last = Slice::from_probe(vec![4, 5], window(1, 3)).map(|n| n * 2);
        assert_eq!(last.content, vec![8, 10]);
        assert!(!last.has_next);
        assert!(!last.is_first());
    }

    #[test]
    fn sort_keeps_clause_priority() {
        let sort = Sort::by(Direction::Desc, "username").and(Direction::Asc, "age");
        let fields: Vec<_> = sort.orders().iter().map(|order| order.field).collect();
        assert_eq!(fields, vec!["username", "age"]);
        assert_eq!(sort.orders()[0].direction.as_sql(), "DESC");
    }

    #[test]
    fn next_request_advances_index_only() {
        let request = PageRequest::of_sorted(0, 3, Sort::by(Direction::Asc, "age"));
        let next = request.next();
        assert_eq!(next.page, 1);
        assert_eq!(next.size, 3);
        assert_eq!(next.sort, request.sort);
    }
}
