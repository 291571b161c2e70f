use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::client::ApiClient;
use crate::errors::CoreError;
use crate::models::equipment::Equipment;
use crate::models::investment::{displayable_rows, InvestmentRow};
use crate::models::pagination::{Page, Pagination, EQUIPMENT_PAGE_SIZE, INVESTMENT_PAGE_SIZE};

/// Anything that can serve one page of rows.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    async fn fetch_page(&self, page_no: u32, page_size: u32) -> Result<Page<T>, CoreError>;
}

/// Equipment list pages.
pub struct EquipmentPages {
    client: ApiClient,
}

impl EquipmentPages {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource<Equipment> for EquipmentPages {
    fn name(&self) -> &str {
        "equipment"
    }

    async fn fetch_page(&self, page_no: u32, page_size: u32) -> Result<Page<Equipment>, CoreError> {
        self.client.equipment().list(page_no, page_size).await
    }
}

/// Investment list pages.
pub struct InvestmentPages {
    client: ApiClient,
}

impl InvestmentPages {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource<InvestmentRow> for InvestmentPages {
    fn name(&self) -> &str {
        "investments"
    }

    async fn fetch_page(&self, page_no: u32, page_size: u32) -> Result<Page<InvestmentRow>, CoreError> {
        self.client.investments().list(page_no, page_size).await
    }
}

/// A paginated list view: the rows of the current page and its navigation.
///
/// Rows are replaced wholesale on every successful fetch. A failed fetch keeps
/// the previous rows and records the error text until the next attempt.
#[derive(Debug, Clone)]
pub struct PagedList<T> {
    rows: Vec<T>,
    pagination: Pagination,
    current: u32,
    page_size: u32,
    loading: bool,
    error: Option<String>,
}

impl<T> PagedList<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            rows: Vec::new(),
            pagination: Pagination::empty(1, page_size),
            current: 1,
            page_size,
            loading: false,
            error: None,
        }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn current_page(&self) -> u32 {
        self.current
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Last reachable page. Before the first fetch only page 1 is known.
    pub fn last_page(&self) -> u32 {
        self.pagination.last_page().max(1)
    }

    pub fn can_go_prev(&self) -> bool {
        self.current > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.current < self.last_page()
    }

    /// `"16 - 30 of 32"`
    pub fn display_range(&self) -> String {
        self.pagination.display_range()
    }

    /// Move to `page` if it is in range and not already current.
    /// Returns `true` when the caller should refetch.
    pub fn go_to(&mut self, page: u32) -> bool {
        if page < 1 || page > self.last_page() || page == self.current {
            return false;
        }
        self.current = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.go_to(self.current + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        if !self.can_go_prev() {
            return false;
        }
        self.go_to(self.current - 1)
    }

    /// Fetch the current page from `source`.
    pub async fn refresh<S>(&mut self, source: &S) -> Result<(), CoreError>
    where
        S: PageSource<T> + ?Sized,
    {
        self.loading = true;
        debug!(
            source = source.name(),
            page = self.current,
            size = self.page_size,
            "fetching page"
        );
        let result = source.fetch_page(self.current, self.page_size).await;
        self.loading = false;

        match result {
            Ok(page) => {
                let mut pagination = page.pagination;
                if pagination.current == 0 {
                    pagination.current = self.current;
                }
                if pagination.size == 0 {
                    pagination.size = self.page_size;
                }
                self.rows = page.data;
                self.pagination = pagination;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(source = source.name(), page = self.current, "page fetch failed: {e}");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Manual re-attempt after a failure; same as [`PagedList::refresh`].
    pub async fn retry<S>(&mut self, source: &S) -> Result<(), CoreError>
    where
        S: PageSource<T> + ?Sized,
    {
        self.refresh(source).await
    }
}

impl PagedList<Equipment> {
    pub fn equipment() -> Self {
        Self::new(EQUIPMENT_PAGE_SIZE)
    }

    /// Rows of the current page matching the search box.
    pub fn search(&self, term: &str) -> Vec<&Equipment> {
        self.rows.iter().filter(|e| e.matches_search(term)).collect()
    }
}

impl PagedList<InvestmentRow> {
    pub fn investments() -> Self {
        Self::new(INVESTMENT_PAGE_SIZE)
    }

    /// Rows the table shows; rows without an id are hidden.
    pub fn displayable(&self) -> Vec<&InvestmentRow> {
        displayable_rows(&self.rows)
    }
}
