//! Paginated response envelope.

use serde::Serialize;

use crate::pagination::PageRequest;

/// The wire shape of every listing response:
/// `{ docs, total, page, pages, limit }`.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[must_use]
pub struct Page<T> {
    pub docs: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    /// Wrap retrieved documents and the total match count.
    ///
    /// `pages` is `ceil(total / limit)`; an empty result set is a valid
    /// zero-page envelope, not an error.
    pub fn assemble(docs: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            docs,
            total,
            page: request.page,
            pages: total.div_ceil(request.limit),
            limit: request.limit,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SortDir;

    fn request(page: u64, limit: u64) -> PageRequest {
        PageRequest {
            page,
            limit,
            sort_field: "id".to_owned(),
            sort_dir: SortDir::Asc,
        }
    }

    #[test]
    fn pages_round_up() {
        let page = Page::assemble(vec![1, 2, 3], 41, &request(1, 10));
        assert_eq!(page.pages, 5);
        assert_eq!(page.total, 41);
        assert_eq!(page.limit, 10);
    }

    #[test]
    fn exact_division_does_not_round_up() {
        let page = Page::assemble(vec![0; 10], 40, &request(2, 10));
        assert_eq!(page.pages, 4);
        assert_eq!(page.page, 2);
    }

    #[test]
    fn empty_result_is_a_zero_page_envelope() {
        let page: Page<u8> = Page::assemble(Vec::new(), 0, &request(1, 10));
        assert!(page.is_empty());
        assert_eq!(page.pages, 0);
    }

    #[test]
    fn serializes_with_the_documented_keys() {
        let page = Page::assemble(vec![7], 1, &request(1, 10));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["docs"][0], 7);
        assert_eq!(json["total"], 1);
        assert_eq!(json["page"], 1);
        assert_eq!(json["pages"], 1);
        assert_eq!(json["limit"], 10);
    }
}
