use chrono::Utc;
use planngo_api::{
    error::AppError,
    models::MAX_TICKET_PRICE,
    routes::params::{EventQuery, Pagination},
    services::{booking_service::build_ticket_number, event_service::validate_price},
};
use uuid::Uuid;

#[test]
fn pagination_is_bounded() {
    let defaults = Pagination::default().normalize();
    assert_eq!(defaults, (1, 20, 0));

    let clamped = Pagination {
        page: Some(0),
        per_page: Some(1_000),
    }
    .normalize();
    assert_eq!(clamped, (1, 100, 0));

    let third = Pagination {
        page: Some(3),
        per_page: Some(0),
    }
    .normalize();
    assert_eq!(third, (3, 1, 2));
}

#[test]
fn event_query_carries_paging() {
    let query = EventQuery {
        page: Some(2),
        per_page: Some(10),
        ..EventQuery::default()
    };
    assert_eq!(query.pagination().normalize(), (2, 10, 10));
}

#[test]
fn ticket_number_has_date_and_id_prefix() {
    let id = Uuid::parse_str("1a2b3c4d-5e6f-4a1b-8c9d-0e1f2a3b4c5d").unwrap();
    let ticket = build_ticket_number(id);

    let today = Utc::now().format("%Y%m%d").to_string();
    assert_eq!(ticket, format!("TKT-{today}-1A2B3C4D"));
    assert_eq!(ticket.len(), "TKT-YYYYMMDD-XXXXXXXX".len());
}

#[test]
fn prices_are_bounded_so_totals_fit() {
    assert!(validate_price(0).is_ok());
    assert!(validate_price(MAX_TICKET_PRICE).is_ok());
    assert!(matches!(validate_price(-1), Err(AppError::BadRequest(_))));
    assert!(matches!(
        validate_price(MAX_TICKET_PRICE + 1),
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        validate_price(i64::MAX / 50),
        Err(AppError::BadRequest(_))
    ));

    // Largest order the API can accept, converted to paise.
    let paise = MAX_TICKET_PRICE
        .checked_mul(i64::from(i32::MAX))
        .and_then(|total| total.checked_mul(100));
    assert!(paise.is_some());
}
