use rocket::serde::{Deserialize, Serialize};

/// Page selection for list queries.
///
/// Pages are 1-indexed and have a fixed size. A missing page, or one below 1,
/// selects the first page.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct PageParams {
    pub page: Option<i64>,
}

impl PageParams {
    /// Number of records per page.
    pub const PAGE_SIZE: i64 = 10;

    pub fn new(page: Option<i64>) -> Self {
        Self { page }
    }

    pub fn current_page(&self) -> i64 {
        self.page.filter(|page| *page >= 1).unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        Self::PAGE_SIZE
    }

    /// SQL OFFSET for the selected page.
    pub fn offset(&self) -> i64 {
        (self.current_page() - 1).saturating_mul(Self::PAGE_SIZE)
    }

    /// `ceil(total_items / PAGE_SIZE)`; zero items means zero pages.
    pub fn total_pages(total_items: i64) -> i64 {
        if total_items <= 0 {
            return 0;
        }
        (total_items + Self::PAGE_SIZE - 1) / Self::PAGE_SIZE
    }
}
