//! Fixtures shared by unit and integration tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use crate::domain::{
    compute_total, BuyForMeRequest, CustomerInfo, LineItem, RequestStatus, StatusChange, SubStatus,
};

pub fn customer_info(id: &str) -> CustomerInfo {
    CustomerInfo {
        id: id.to_string(),
        name: format!("Customer {id}"),
        email: format!("{id}@example.com"),
    }
}

pub fn line_item(name: &str, quantity: u32, unit_price: f64) -> LineItem {
    LineItem {
        name: name.to_string(),
        url: format!("https://shop.example.com/{name}"),
        quantity,
        unit_price,
        currency: "USD".to_string(),
        notes: None,
    }
}

/// Sequential ids (`<prefix>_1`, `<prefix>_2`, ...) for deterministic tests.
pub fn counter_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || format!("{prefix}_{}", counter.fetch_add(1, Ordering::SeqCst))
}

/// A stored request as it looked before batch splitting: several items in one document.
pub fn legacy_request(id: &str, request_number: &str, customer_id: &str, items: usize) -> BuyForMeRequest {
    let items: Vec<LineItem> = (0..items)
        .map(|i| line_item(&format!("item{i}"), 1, 10.0 + i as f64))
        .collect();
    let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    BuyForMeRequest {
        id: id.to_string(),
        request_number: request_number.to_string(),
        customer: customer_info(customer_id),
        total_amount: compute_total(&items),
        items,
        status: RequestStatus::Approved,
        sub_status: Some(SubStatus::AwaitingPayment),
        status_history: vec![StatusChange {
            status: RequestStatus::Approved,
            sub_status: Some(SubStatus::AwaitingPayment),
            changed_by: "admin_1".to_string(),
            changed_at: created_at,
            note: None,
        }],
        batch_id: None,
        original_batch_number: None,
        batch_index: None,
        batch_size: None,
        customer_notes: Some("please hurry".to_string()),
        admin_notes: None,
        created_at,
        updated_at: created_at,
    }
}
