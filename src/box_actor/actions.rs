use crate::domain::{BoxContent, ItemCondition};

/// Warehouse and customer operations on a single box item.
#[derive(Debug, Clone)]
pub enum BoxAction {
    /// `arrived -> inspected`
    Inspect {
        inspected_by: String,
        condition: ItemCondition,
        notes: Option<String>,
        photos: Vec<String>,
    },
    /// `inspected -> ready_for_packing`, once the customer asked for packing.
    MarkReadyForPacking { staff_id: String },
    /// `ready_for_packing -> packed`
    Pack {
        packed_by: String,
        package_reference: Option<String>,
    },
    /// `packed -> shipped`, once the customer confirmed the packing.
    Ship { carrier: String, tracking_number: String },
    /// `shipped -> delivered`
    Deliver,
    Return { reason: String, recorded_by: String },
    Dispose { reason: String, recorded_by: String },
    /// Customer flag, allowed while `arrived` or `inspected`.
    RequestPacking { customer_id: String },
    /// Customer flag, allowed while `packed`.
    ConfirmPacking { customer_id: String },
}

#[derive(Debug, Clone)]
pub enum BoxActionResult {
    /// The item moved to a new status.
    Transitioned(BoxContent),
    /// A customer flag was set; `changed` is false when it was already set.
    CustomerFlag { changed: bool, item: BoxContent },
}

impl BoxActionResult {
    pub fn into_item(self) -> BoxContent {
        match self {
            Self::Transitioned(item) | Self::CustomerFlag { item, .. } => item,
        }
    }
}
