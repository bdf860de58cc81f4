// src/common/pagination.rs

use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    // Valores fora da faixa são corrigidos em vez de rejeitados
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: PageRequest) -> Self {
        let total_pages = if total == 0 { 0 } else { (total + page.per_page - 1) / page.per_page };
        Self {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        let p = PageRequest::new(None, None);
        assert_eq!((p.page, p.per_page, p.offset()), (1, DEFAULT_PER_PAGE, 0));

        let p = PageRequest::new(Some(0), Some(1000));
        assert_eq!((p.page, p.per_page), (1, MAX_PER_PAGE));

        let p = PageRequest::new(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = PageRequest::new(Some(1), Some(10));
        assert_eq!(Paginated::new(Vec::<u8>::new(), 0, page).total_pages, 0);
        assert_eq!(Paginated::new(Vec::<u8>::new(), 10, page).total_pages, 1);
        assert_eq!(Paginated::new(Vec::<u8>::new(), 11, page).total_pages, 2);
    }
}
