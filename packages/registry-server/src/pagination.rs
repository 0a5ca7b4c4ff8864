//! Offset/limit and key-cursor pagination over ordered sequences.
//!
//! [`Pagination::resolve`] validates a [`PageRequest`] and fixes its defaults;
//! [`Pagination::paginate`] then slices any ordered, fallible sequence of
//! `(key, item)` pairs. The sequence is consumed only as far as the page needs
//! unless a total count was requested.

use provider_registry_core::PageRequest;

use crate::error::RegistryError;

/// Page size applied when a request asks for `limit == 0` or sends no
/// pagination at all.
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

/// One page of an ordered sequence plus continuation metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Key of the first entry after this page, `None` at end of sequence.
    pub next_key: Option<Vec<u8>>,
    /// Length of the whole sequence, when it was counted.
    pub total: Option<u64>,
}

/// A validated page request with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    start_key: Option<Vec<u8>>,
    offset: u64,
    limit: u64,
    count_total: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            start_key: None,
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
            count_total: true,
        }
    }
}

impl Pagination {
    /// Validates `request` and applies defaults.
    ///
    /// - no request: first [`DEFAULT_PAGE_LIMIT`] entries, with a total
    /// - `limit == 0`: [`DEFAULT_PAGE_LIMIT`], and the total is counted
    /// - a cursor `key` never reports a total, since counting would only cover
    ///   the tail of the sequence
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] if both a cursor key and a
    /// non-zero offset are supplied.
    pub fn resolve(request: Option<&PageRequest>) -> Result<Self, RegistryError> {
        let Some(request) = request else {
            return Ok(Self::default());
        };

        let start_key = request.cursor_key().map(<[u8]>::to_vec);
        if start_key.is_some() && request.offset > 0 {
            return Err(RegistryError::invalid(
                "either offset or key is expected, got both",
            ));
        }

        let (limit, count_total) = if request.limit == 0 {
            (DEFAULT_PAGE_LIMIT, true)
        } else {
            (request.limit, request.count_total)
        };

        Ok(Self {
            count_total: count_total && start_key.is_none(),
            start_key,
            offset: request.offset,
            limit,
        })
    }

    /// Key at which the underlying sequence should start, if any.
    #[must_use]
    pub fn start_key(&self) -> Option<&[u8]> {
        self.start_key.as_deref()
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    #[must_use]
    pub fn counts_total(&self) -> bool {
        self.count_total
    }

    /// Cuts one page out of `entries`, which must already start at
    /// [`start_key`](Self::start_key).
    ///
    /// Returns positions `[offset, offset + limit)` of the sequence, truncated
    /// at its end. An offset past the end yields an empty page.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by `entries`; no partial page is
    /// returned.
    pub fn paginate<T, E, I>(&self, entries: I) -> Result<Page<T>, E>
    where
        I: IntoIterator<Item = Result<(Vec<u8>, T), E>>,
    {
        let end = self.offset.saturating_add(self.limit);
        let mut items = Vec::new();
        let mut next_key = None;
        let mut seen: u64 = 0;

        for entry in entries {
            let (key, item) = entry?;
            let position = seen;
            seen += 1;

            if position < self.offset {
                continue;
            }
            if position < end {
                items.push(item);
                continue;
            }
            if next_key.is_none() {
                next_key = Some(key);
            }
            if !self.count_total {
                break;
            }
        }

        Ok(Page {
            items,
            next_key,
            total: self.count_total.then_some(seen),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use proptest::prelude::*;

    use super::*;
    use crate::error::ErrorCode;

    fn seq(keys: &[&str]) -> Vec<Result<(Vec<u8>, String), Infallible>> {
        keys.iter()
            .map(|k| Ok((k.as_bytes().to_vec(), (*k).to_string())))
            .collect()
    }

    fn page(req: Option<&PageRequest>, keys: &[&str]) -> Page<String> {
        Pagination::resolve(req).unwrap().paginate(seq(keys)).unwrap()
    }

    #[test]
    fn absent_request_uses_default_limit_and_counts() {
        let p = Pagination::resolve(None).unwrap();
        assert_eq!(p.limit(), DEFAULT_PAGE_LIMIT);
        assert!(p.counts_total());

        let result = page(None, &["addr1", "addr2"]);
        assert_eq!(result.items, vec!["addr1", "addr2"]);
        assert_eq!(result.next_key, None);
        assert_eq!(result.total, Some(2));
    }

    #[test]
    fn zero_limit_applies_default() {
        let req = PageRequest::offset(0, 0);
        let p = Pagination::resolve(Some(&req)).unwrap();
        assert_eq!(p.limit(), DEFAULT_PAGE_LIMIT);
        assert!(p.counts_total());

        let keys: Vec<String> = (0..150).map(|i| format!("k{i:03}")).collect();
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let result = page(Some(&req), &refs);
        assert_eq!(result.items.len(), 100);
        assert_eq!(result.next_key.as_deref(), Some(&b"k100"[..]));
        assert_eq!(result.total, Some(150));
    }

    #[test]
    fn offset_and_limit_select_window() {
        let result = page(Some(&PageRequest::offset(1, 1)), &["addr1", "addr2"]);
        assert_eq!(result.items, vec!["addr2"]);
        assert_eq!(result.next_key, None);
        assert_eq!(result.total, None);

        let result = page(Some(&PageRequest::offset(1, 10)), &["a", "b", "c"]);
        assert_eq!(result.items, vec!["b", "c"]);
    }

    #[test]
    fn offset_past_end_is_empty_not_error() {
        let result = page(Some(&PageRequest::offset(5, 1)), &["addr1", "addr2"]);
        assert!(result.items.is_empty());
        assert_eq!(result.next_key, None);
    }

    #[test]
    fn next_key_points_at_following_entry() {
        let result = page(Some(&PageRequest::offset(0, 2)), &["a", "b", "c", "d"]);
        assert_eq!(result.items, vec!["a", "b"]);
        assert_eq!(result.next_key.as_deref(), Some(&b"c"[..]));
    }

    #[test]
    fn count_total_reads_whole_sequence() {
        let req = PageRequest {
            count_total: true,
            ..PageRequest::offset(1, 1)
        };
        let result = page(Some(&req), &["a", "b", "c", "d"]);
        assert_eq!(result.items, vec!["b"]);
        assert_eq!(result.next_key.as_deref(), Some(&b"c"[..]));
        assert_eq!(result.total, Some(4));
    }

    #[test]
    fn stops_early_without_total() {
        let p = Pagination::resolve(Some(&PageRequest::offset(1, 2))).unwrap();
        let mut pulled = 0;
        let entries = (0..1000u32).map(|i| {
            pulled += 1;
            Ok::<_, Infallible>((i.to_be_bytes().to_vec(), i))
        });
        let result = p.paginate(entries).unwrap();
        assert_eq!(result.items, vec![1, 2]);
        assert_eq!(pulled, 4, "offset + limit + 1 entries");
    }

    #[test]
    fn key_and_offset_together_is_invalid() {
        let req = PageRequest {
            offset: 2,
            ..PageRequest::after_key("b", 1)
        };
        let err = Pagination::resolve(Some(&req)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn cursor_requests_never_count() {
        let req = PageRequest {
            count_total: true,
            ..PageRequest::after_key("b", 0)
        };
        let p = Pagination::resolve(Some(&req)).unwrap();
        assert_eq!(p.start_key(), Some(&b"b"[..]));
        assert!(!p.counts_total());
    }

    #[test]
    fn huge_offset_does_not_overflow() {
        let result = page(Some(&PageRequest::offset(u64::MAX, u64::MAX)), &["a"]);
        assert!(result.items.is_empty());
    }

    #[test]
    fn first_error_aborts_page() {
        let p = Pagination::default();
        let entries = vec![
            Ok((b"a".to_vec(), 1)),
            Err("storage offline"),
            Ok((b"c".to_vec(), 3)),
        ];
        assert_eq!(p.paginate(entries), Err("storage offline"));
    }

    proptest! {
        #[test]
        fn page_matches_slice(
            len in 0usize..60,
            offset in 0u64..80,
            limit in 1u64..80,
            count_total in any::<bool>(),
        ) {
            let keys: Vec<String> = (0..len).map(|i| format!("{i:04}")).collect();
            let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
            let req = PageRequest { count_total, ..PageRequest::offset(offset, limit) };

            let result = page(Some(&req), &refs);

            let start = usize::try_from(offset).unwrap().min(len);
            let end = usize::try_from(offset + limit).unwrap().min(len);
            prop_assert_eq!(&result.items[..], &keys[start..end]);

            let expected_next = keys
                .get(usize::try_from(offset + limit).unwrap())
                .map(|k| k.as_bytes().to_vec());
            prop_assert_eq!(result.next_key, expected_next);
            prop_assert_eq!(result.total, count_total.then_some(len as u64));
        }

        #[test]
        fn repeated_requests_are_identical(
            len in 0usize..40,
            offset in 0u64..50,
            limit in 0u64..50,
        ) {
            let keys: Vec<String> = (0..len).map(|i| format!("{i:04}")).collect();
            let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
            let req = PageRequest::offset(offset, limit);
            prop_assert_eq!(page(Some(&req), &refs), page(Some(&req), &refs));
        }
    }
}
