use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::customer::CustomerInfo;

/// Primary lifecycle status of a BuyForMe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    InProgress,
    Completed,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 6] = [
        Self::Pending,
        Self::Approved,
        Self::InProgress,
        Self::Completed,
        Self::Rejected,
        Self::Cancelled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// The usual next statuses. Nothing enforces this; other moves are only logged.
    pub const fn conventional_next(self) -> &'static [RequestStatus] {
        match self {
            Self::Pending => &[Self::Approved, Self::Rejected, Self::Cancelled],
            Self::Approved => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Completed, Self::Cancelled],
            Self::Completed | Self::Rejected | Self::Cancelled => &[],
        }
    }

    pub fn is_conventional_transition(self, target: RequestStatus) -> bool {
        self == target || self.conventional_next().contains(&target)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                format!("unknown status '{s}', expected one of: {}", allowed.join(", "))
            })
    }
}

/// Refinement of [`RequestStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubStatus {
    AwaitingReview,
    AwaitingCustomerResponse,
    AwaitingPayment,
    PaymentReceived,
    Purchasing,
    Purchased,
    ShippedToWarehouse,
    ArrivedAtWarehouse,
    OutOfStock,
    PriceChanged,
}

impl SubStatus {
    pub const ALL: [SubStatus; 10] = [
        Self::AwaitingReview,
        Self::AwaitingCustomerResponse,
        Self::AwaitingPayment,
        Self::PaymentReceived,
        Self::Purchasing,
        Self::Purchased,
        Self::ShippedToWarehouse,
        Self::ArrivedAtWarehouse,
        Self::OutOfStock,
        Self::PriceChanged,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingReview => "awaiting_review",
            Self::AwaitingCustomerResponse => "awaiting_customer_response",
            Self::AwaitingPayment => "awaiting_payment",
            Self::PaymentReceived => "payment_received",
            Self::Purchasing => "purchasing",
            Self::Purchased => "purchased",
            Self::ShippedToWarehouse => "shipped_to_warehouse",
            Self::ArrivedAtWarehouse => "arrived_at_warehouse",
            Self::OutOfStock => "out_of_stock",
            Self::PriceChanged => "price_changed",
        }
    }
}

impl fmt::Display for SubStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sub| sub.as_str() == s)
            .ok_or_else(|| format!("unknown sub-status '{s}'"))
    }
}

/// One product the customer wants bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub url: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl LineItem {
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("item name must not be empty".to_string());
        }
        validate_url(&self.url)?;
        if self.quantity == 0 {
            return Err(format!("quantity for '{}' must be at least 1", self.name));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(format!("unit price for '{}' must be a non-negative number", self.name));
        }
        if self.currency.len() != 3 || !self.currency.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(format!("currency '{}' must be a 3-letter uppercase code", self.currency));
        }
        Ok(())
    }
}

/// Absolute `http`/`https` URL with a non-empty host.
pub fn validate_url(url: &str) -> Result<(), String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| format!("item URL must start with http:// or https://: {url}"))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(format!("item URL has no valid host: {url}"));
    }
    Ok(())
}

pub fn compute_total(items: &[LineItem]) -> f64 {
    items.iter().map(LineItem::subtotal).sum()
}

/// Audit trail entry written on every status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_status: Option<SubStatus>,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Links a request to the other requests split from the same submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLink {
    pub batch_id: String,
    pub original_batch_number: Option<String>,
    pub index: u32,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyForMeRequest {
    pub id: String,
    pub request_number: String,
    pub customer: CustomerInfo,
    pub items: Vec<LineItem>,
    pub total_amount: f64,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_status: Option<SubStatus>,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_batch_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BuyForMeRequest {
    pub fn is_multi_item(&self) -> bool {
        self.items.len() > 1
    }
}

/// Payload for creating a request document.
#[derive(Debug, Clone)]
pub struct BuyForMeCreate {
    pub request_number: String,
    pub customer: CustomerInfo,
    pub items: Vec<LineItem>,
    pub status: RequestStatus,
    pub sub_status: Option<SubStatus>,
    pub status_history: Vec<StatusChange>,
    pub batch: Option<BatchLink>,
    pub customer_notes: Option<String>,
    pub admin_notes: Option<String>,
    /// Preserved when re-creating historical records; `now` otherwise.
    pub created_at: Option<DateTime<Utc>>,
}

impl BuyForMeCreate {
    /// A fresh customer submission of a single item.
    pub fn submission(request_number: String, customer: CustomerInfo, item: LineItem, notes: Option<String>) -> Self {
        let history = vec![StatusChange {
            status: RequestStatus::Pending,
            sub_status: Some(SubStatus::AwaitingReview),
            changed_by: customer.id.clone(),
            changed_at: Utc::now(),
            note: Some("Request submitted".to_string()),
        }];
        Self {
            request_number,
            customer,
            items: vec![item],
            status: RequestStatus::Pending,
            sub_status: Some(SubStatus::AwaitingReview),
            status_history: history,
            batch: None,
            customer_notes: notes,
            admin_notes: None,
            created_at: None,
        }
    }

    pub fn in_batch(mut self, batch: BatchLink) -> Self {
        self.batch = Some(batch);
        self
    }
}

/// Notes editable after creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyForMePatch {
    pub admin_notes: Option<String>,
    pub customer_notes: Option<String>,
}

/// Filter for request finders. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct BuyForMeQuery {
    pub status: Option<RequestStatus>,
    pub sub_status: Option<SubStatus>,
    pub customer_id: Option<String>,
    pub request_number: Option<String>,
    pub batch_id: Option<String>,
    pub original_batch_number: Option<String>,
    pub multi_item_only: bool,
}

impl BuyForMeQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_status(status: RequestStatus, sub_status: Option<SubStatus>) -> Self {
        Self {
            status: Some(status),
            sub_status,
            ..Self::default()
        }
    }

    pub fn by_customer(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            ..Self::default()
        }
    }

    pub fn by_request_number(request_number: impl Into<String>) -> Self {
        Self {
            request_number: Some(request_number.into()),
            ..Self::default()
        }
    }

    pub fn split_from(original_batch_number: impl Into<String>) -> Self {
        Self {
            original_batch_number: Some(original_batch_number.into()),
            ..Self::default()
        }
    }

    pub fn multi_item() -> Self {
        Self {
            multi_item_only: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBucket {
    pub count: usize,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatistics {
    pub total_requests: usize,
    pub total_amount: f64,
    pub by_status: BTreeMap<RequestStatus, StatusBucket>,
    pub batches: usize,
}

impl RequestStatistics {
    pub fn from_requests(requests: &[BuyForMeRequest]) -> Self {
        let mut stats = Self::default();
        let mut batches = std::collections::HashSet::new();
        for request in requests {
            stats.total_requests += 1;
            stats.total_amount += request.total_amount;
            let bucket = stats.by_status.entry(request.status).or_default();
            bucket.count += 1;
            bucket.amount += request.total_amount;
            if let Some(batch_id) = &request.batch_id {
                batches.insert(batch_id.as_str());
            }
        }
        stats.batches = batches.len();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: u32, unit_price: f64) -> LineItem {
        LineItem {
            name: name.to_string(),
            url: format!("https://shop.example.com/{name}"),
            quantity,
            unit_price,
            currency: "USD".to_string(),
            notes: None,
        }
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in RequestStatus::ALL {
            assert_eq!(status.as_str().parse::<RequestStatus>(), Ok(status));
        }
        let err = "shipped".parse::<RequestStatus>().unwrap_err();
        assert!(err.contains("in_progress"));
        assert_eq!("price_changed".parse::<SubStatus>(), Ok(SubStatus::PriceChanged));
    }

    #[test]
    fn serde_uses_snake_case_and_camel_case_fields() {
        assert_eq!(serde_json::to_value(RequestStatus::InProgress).unwrap(), "in_progress");
        let json = serde_json::to_value(item("mug", 2, 3.5)).unwrap();
        assert_eq!(json["unitPrice"], 3.5);
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn conventional_transitions() {
        assert!(RequestStatus::Pending.is_conventional_transition(RequestStatus::Approved));
        assert!(RequestStatus::Approved.is_conventional_transition(RequestStatus::Approved));
        assert!(!RequestStatus::Pending.is_conventional_transition(RequestStatus::Completed));
        assert!(!RequestStatus::Cancelled.is_conventional_transition(RequestStatus::Pending));
    }

    #[test]
    fn item_validation() {
        assert!(item("mug", 1, 0.0).validate().is_ok());
        assert!(item("mug", 0, 1.0).validate().is_err());
        assert!(item("mug", 1, -1.0).validate().is_err());
        assert!(item("mug", 1, f64::NAN).validate().is_err());
        assert!(item(" ", 1, 1.0).validate().is_err());

        let mut bad_currency = item("mug", 1, 1.0);
        bad_currency.currency = "usd".into();
        assert!(bad_currency.validate().is_err());
    }

    #[test]
    fn url_validation() {
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("https://example.com/a?b=c").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("https://").is_err());
        assert!(validate_url("https:///path").is_err());
        assert!(validate_url("example.com/item").is_err());
    }

    #[test]
    fn total_is_sum_of_subtotals() {
        let items = vec![item("a", 2, 1.5), item("b", 1, 10.0)];
        assert_eq!(compute_total(&items), 13.0);
    }
}
