//! Data models representing database entities and API payloads.
//!
//! Each submodule holds the row types (`sqlx::FromRow`) for one feature area
//! together with its request and response bodies.

pub mod account;
pub mod budget;
pub mod category;
pub mod investment;
pub mod master;
pub mod notification;
pub mod payment;
pub mod period;
pub mod referral;
pub mod statistic;
pub mod subscription;
pub mod track;
pub mod transaction;
pub mod wallet;

use serde::{Deserialize, Serialize};

pub use period::Period;

const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

/// `?page=&per_page=` query parameters.
///
/// `page` starts at 1; `per_page` is clamped to `1..=100`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl Pagination {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page())
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }
}

/// One page of a listing.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total: i64) -> Self {
        Self {
            items,
            page: pagination.page(),
            per_page: pagination.per_page(),
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}
