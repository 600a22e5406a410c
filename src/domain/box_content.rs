use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a physical item is in the warehouse pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxStatus {
    Arrived,
    Inspected,
    ReadyForPacking,
    Packed,
    Shipped,
    Delivered,
    Returned,
    Disposed,
}

impl BoxStatus {
    pub const ALL: [BoxStatus; 8] = [
        Self::Arrived,
        Self::Inspected,
        Self::ReadyForPacking,
        Self::Packed,
        Self::Shipped,
        Self::Delivered,
        Self::Returned,
        Self::Disposed,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arrived => "arrived",
            Self::Inspected => "inspected",
            Self::ReadyForPacking => "ready_for_packing",
            Self::Packed => "packed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Returned => "returned",
            Self::Disposed => "disposed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Returned | Self::Disposed)
    }

    /// Still physically held at the warehouse.
    pub const fn in_warehouse(self) -> bool {
        matches!(self, Self::Arrived | Self::Inspected | Self::ReadyForPacking | Self::Packed)
    }

    /// Valid transitions:
    /// - `arrived -> inspected -> ready_for_packing -> packed -> shipped -> delivered`
    /// - any non-terminal state `-> returned`
    /// - `arrived | inspected | ready_for_packing -> disposed`
    pub fn can_transition_to(self, target: BoxStatus) -> bool {
        matches!(
            (self, target),
            (Self::Arrived, Self::Inspected)
                | (Self::Inspected, Self::ReadyForPacking)
                | (Self::ReadyForPacking, Self::Packed)
                | (Self::Packed, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (Self::Arrived | Self::Inspected | Self::ReadyForPacking, Self::Disposed)
        ) || (target == Self::Returned && !self.is_terminal())
    }
}

impl fmt::Display for BoxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown box status '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    Good,
    Damaged,
    Defective,
    WrongItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub inspected_by: String,
    pub inspected_at: DateTime<Utc>,
    pub condition: ItemCondition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Packing {
    pub packed_by: String,
    pub packed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipping {
    pub carrier: String,
    pub tracking_number: String,
    pub shipped_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Why an item left the pipeline as returned or disposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disposition {
    pub reason: String,
    pub recorded_by: String,
    pub recorded_at: DateTime<Utc>,
}

/// One physical item received at the warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxContent {
    pub id: String,
    pub customer_id: String,
    pub box_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_number: Option<String>,
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    pub status: BoxStatus,
    pub arrival_date: DateTime<Utc>,
    pub received_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection: Option<Inspection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packing: Option<Packing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Shipping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<Disposition>,
    #[serde(default)]
    pub requested_packing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_packing_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub confirmed_packing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_packing_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_for_packing_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_for_packing_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Arrival record for a new item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxContentCreate {
    pub customer_id: String,
    /// Filled from the customer record when omitted.
    #[serde(default)]
    pub box_number: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub request_number: Option<String>,
    pub product_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// Filled from the acting staff member when omitted.
    #[serde(default)]
    pub received_by: String,
    #[serde(default)]
    pub arrival_date: Option<DateTime<Utc>>,
}

fn default_quantity() -> u32 {
    1
}

/// Descriptive fields staff may correct after arrival.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxContentPatch {
    pub description: Option<String>,
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct BoxContentQuery {
    pub customer_id: Option<String>,
    pub status: Option<BoxStatus>,
    pub request_id: Option<String>,
}

impl BoxContentQuery {
    pub fn for_customer(customer_id: impl Into<String>, status: Option<BoxStatus>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            status,
            request_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxSummary {
    pub customer_id: String,
    pub total_items: usize,
    pub by_status: BTreeMap<BoxStatus, usize>,
    pub warehouse_weight_kg: f64,
    pub awaiting_confirmation: usize,
}

impl BoxSummary {
    pub fn from_contents(customer_id: &str, contents: &[BoxContent]) -> Self {
        let mut summary = Self {
            customer_id: customer_id.to_string(),
            ..Self::default()
        };
        for item in contents {
            summary.total_items += 1;
            *summary.by_status.entry(item.status).or_default() += 1;
            if item.status.in_warehouse() {
                summary.warehouse_weight_kg += item.weight_kg.unwrap_or(0.0);
            }
            if item.status == BoxStatus::Packed && !item.confirmed_packing {
                summary.awaiting_confirmation += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_path_is_linear() {
        use BoxStatus::*;
        let path = [Arrived, Inspected, ReadyForPacking, Packed, Shipped, Delivered];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(!Arrived.can_transition_to(Packed));
        assert!(!Packed.can_transition_to(Inspected));
        assert!(!Delivered.can_transition_to(Returned));
    }

    #[test]
    fn side_branches() {
        use BoxStatus::*;
        assert!(Shipped.can_transition_to(Returned));
        assert!(Arrived.can_transition_to(Disposed));
        assert!(!Packed.can_transition_to(Disposed));
        assert!(!Disposed.can_transition_to(Returned));
        assert!(!Returned.can_transition_to(Returned));
    }

    #[test]
    fn status_parses_snake_case() {
        assert_eq!("ready_for_packing".parse::<BoxStatus>(), Ok(BoxStatus::ReadyForPacking));
        assert!("lost".parse::<BoxStatus>().is_err());
    }
}
