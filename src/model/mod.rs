pub mod assessment;
pub mod catalog;
pub mod learner;

/// Position of a list screen inside its result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl Pagination {
    /// Clamps the requested page into `1..=total_pages`.
    pub fn new(requested: Option<i64>, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        let mut pagination = Pagination {
            page: 1,
            per_page,
            total: total.max(0),
        };
        pagination.page = requested.unwrap_or(1).clamp(1, pagination.total_pages());
        pagination
    }

    pub fn total_pages(&self) -> i64 {
        ((self.total + self.per_page - 1) / self.per_page).max(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_is_clamped_to_available_range() {
        let p = Pagination::new(Some(9), 20, 45);
        assert_eq!(p.total_pages(), 3);
        assert_eq!(p.page, 3);
        assert_eq!(p.offset(), 40);
        assert!(p.has_previous());
        assert!(!p.has_next());

        let p = Pagination::new(Some(-4), 20, 45);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn empty_result_still_has_one_page() {
        let p = Pagination::new(None, 20, 0);
        assert_eq!(p.total_pages(), 1);
        assert_eq!(p.page, 1);
        assert!(!p.has_next());
        assert!(!p.has_previous());
    }
}
