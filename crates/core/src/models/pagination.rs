use serde::{Deserialize, Serialize};

use super::lenient;

/// Page size of the equipment list.
pub const EQUIPMENT_PAGE_SIZE: u32 = 15;

/// Page size of the investment list.
pub const INVESTMENT_PAGE_SIZE: u32 = 15;

/// Pagination block as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total: u64,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub size: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub current: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub pages: u32,
}

impl Pagination {
    /// Block used when a list response has no envelope: nothing found, echoing
    /// the requested page and size.
    pub fn empty(current: u32, size: u32) -> Self {
        Self {
            total: 0,
            size,
            current,
            pages: 0,
        }
    }

    /// `ceil(total / size)`; zero when the size is zero.
    pub fn page_count(&self) -> u32 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.size)) as u32
    }

    /// 1-based index of the first and last row shown on the current page.
    /// `(0, 0)` for an empty list.
    pub fn row_range(&self) -> (u64, u64) {
        if self.total == 0 || self.size == 0 {
            return (0, 0);
        }
        let size = u64::from(self.size);
        // A page past the end shows the last page that actually has rows.
        let current = u64::from(self.current.clamp(1, self.page_count()));
        let start = (current - 1) * size + 1;
        let end = (current * size).min(self.total);
        (start, end)
    }

    /// `"16 - 30 of 32"`
    pub fn display_range(&self) -> String {
        let (start, end) = self.row_range();
        format!("{start} - {end} of {}", self.total)
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.last_page()
    }

    /// Last page, preferring the server's count over our own arithmetic.
    pub fn last_page(&self) -> u32 {
        if self.pages > 0 {
            self.pages
        } else {
            self.page_count()
        }
    }
}

/// One page of list rows plus its pagination block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn empty(current: u32, size: u32) -> Self {
        Self {
            data: Vec::new(),
            pagination: Pagination::empty(current, size),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn lenient_u64<'de, D: serde::Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(lenient::integer(d)?.max(0) as u64)
}

fn lenient_u32<'de, D: serde::Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(lenient::integer(d)?.clamp(0, i64::from(u32::MAX)) as u32)
}
