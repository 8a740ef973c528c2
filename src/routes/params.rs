use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::{BookingStatus, EventStatus};

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventSortBy {
    EventDate,
    Price,
    Title,
    CreatedAt,
}

// Query structs repeat the paging fields instead of flattening `Pagination`:
// serde_urlencoded cannot parse numbers through `#[serde(flatten)]`.

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EventQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub upcoming: Option<bool>,
    pub status: Option<EventStatus>,
    pub sort_by: Option<EventSortBy>,
    pub sort_order: Option<SortOrder>,
}

impl EventQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BookingListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<BookingStatus>,
    pub sort_order: Option<SortOrder>,
}

impl BookingListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdminEventQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<EventStatus>,
}

impl AdminEventQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}
