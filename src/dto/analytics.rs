use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryCount {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminAnalytics {
    pub total_users: i64,
    pub total_events: i64,
    pub total_bookings: i64,
    pub total_revenue: i64,
    pub pending_approvals: i64,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrganizerAnalytics {
    pub total_events: i64,
    pub total_bookings: i64,
    pub tickets_sold: i64,
    pub total_revenue: i64,
}
