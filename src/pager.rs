//! Lazy iteration over paged listings.

use log::{trace, warn};

use crate::{
    error::R53Error,
    provider::{Page, ProviderError},
};

/// Iterator over all items of a paged listing.
///
/// Pages are fetched on demand by calling `fetch` with the cursor of the previous page
/// (`None` for the first one). Items are yielded in the order the provider returns them.
/// The first failed page request is yielded as an error and ends the iteration.
/// A pager cannot be restarted, create a new one to list from the beginning again.
pub struct Pager<T, C, F> {
    fetch: F,
    operation: &'static str,
    items: std::vec::IntoIter<T>,
    // None once no further page is to be fetched
    pending: Option<Option<C>>,
    // Reported after the buffered items have been handed out
    failure: Option<R53Error>,
}

impl<T, C, F> Pager<T, C, F>
where
    F: FnMut(Option<C>) -> Result<Page<T, C>, R53Error>,
{
    pub fn new(operation: &'static str, fetch: F) -> Self {
        Pager {
            fetch,
            operation,
            items: Vec::new().into_iter(),
            pending: Some(None),
            failure: None,
        }
    }
}

impl<T, C, F> Iterator for Pager<T, C, F>
where
    F: FnMut(Option<C>) -> Result<Page<T, C>, R53Error>,
{
    type Item = Result<T, R53Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.items.next() {
                return Some(Ok(item));
            }
            let Some(cursor) = self.pending.take() else {
                return self.failure.take().map(Err);
            };

            let page = match (self.fetch)(cursor) {
                Ok(p) => p,
                Err(e) => return Some(Err(e)),
            };
            trace!(
                "{}: fetched page of {} item(s), truncated: {}",
                self.operation,
                page.items.len(),
                page.is_truncated
            );

            self.items = page.items.into_iter();
            if page.is_truncated {
                match page.next {
                    Some(next) => self.pending = Some(Some(next)),
                    None => {
                        warn!(
                            "{}: truncated page came without a continuation cursor",
                            self.operation
                        );
                        self.failure = Some(R53Error::Listing {
                            request: self.operation.to_owned(),
                            source: ProviderError::from(
                                "truncated page without continuation cursor".to_string(),
                            ),
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    // Serves `data` in pages of `page_size`, the cursor is the index of the next item
    fn paged_backend(
        data: Vec<u32>,
        page_size: usize,
        calls: &Cell<usize>,
    ) -> impl FnMut(Option<usize>) -> Result<Page<u32, usize>, R53Error> + '_ {
        move |cursor| {
            calls.set(calls.get() + 1);
            let start = cursor.unwrap_or(0);
            let end = (start + page_size).min(data.len());
            Ok(Page {
                items: data[start..end].to_vec(),
                is_truncated: end < data.len(),
                next: (end < data.len()).then_some(end),
            })
        }
    }

    #[test]
    fn should_yield_full_dataset_for_any_page_size() {
        let data: Vec<u32> = (0..23).collect();
        for page_size in [1, 2, 5, 22, 23, 100] {
            let calls = Cell::new(0);
            let items = Pager::new("test", paged_backend(data.clone(), page_size, &calls))
                .collect::<Result<Vec<_>, _>>()
                .unwrap();
            assert_eq!(items, data, "page size {}", page_size);
            assert_eq!(calls.get(), data.len().div_ceil(page_size));
        }
    }

    #[test]
    fn should_handle_empty_listing() {
        let calls = Cell::new(0);
        let mut pager = Pager::new("test", paged_backend(vec![], 10, &calls));
        assert!(pager.next().is_none());
        assert!(pager.next().is_none());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn should_fetch_lazily() {
        let calls = Cell::new(0);
        let mut pager = Pager::new("test", paged_backend((0..10).collect(), 3, &calls));
        assert_eq!(pager.next(), Some(Ok(0)));
        assert_eq!(calls.get(), 1);
        assert_eq!(pager.nth(2), Some(Ok(3)));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn should_stop_at_failed_page() {
        let mut calls = 0;
        let pager = Pager::new("test", |cursor: Option<u32>| {
            calls += 1;
            match cursor {
                None => Ok(Page {
                    items: vec![1, 2],
                    is_truncated: true,
                    next: Some(2),
                }),
                Some(c) => Err(R53Error::Listing {
                    request: format!("page {}", c),
                    source: ProviderError::from("Throttling".to_string()),
                }),
            }
        });
        let results: Vec<_> = pager.collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], Ok(1));
        assert_eq!(results[1], Ok(2));
        assert!(matches!(&results[2], Err(R53Error::Listing { request, .. }) if request == "page 2"));
        assert_eq!(calls, 2);
    }

    #[test]
    fn should_report_truncation_without_cursor() {
        let pager = Pager::new("test", |_: Option<u32>| {
            Ok(Page {
                items: vec![7],
                is_truncated: true,
                next: None,
            })
        });
        let results: Vec<_> = pager.collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], Ok(7));
        assert!(results[1].is_err());
    }
}
