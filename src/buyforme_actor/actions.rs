use crate::domain::{BuyForMeRequest, RequestStatus, SubStatus};

/// Custom actions for BuyForMe requests.
///
/// These actions represent workflow operations beyond plain CRUD. Each one
/// appends an entry to the request's status history.
#[derive(Debug, Clone)]
pub enum BuyForMeAction {
    /// Replaces both status fields.
    ///
    /// Any enumerated status is accepted. Moves outside the conventional
    /// flow are logged, not refused.
    UpdateStatus {
        status: RequestStatus,
        sub_status: Option<SubStatus>,
        actor_id: String,
        note: Option<String>,
    },
    /// Customer withdraws a request.
    ///
    /// # Errors
    /// Fails unless the request is still pending and owned by `customer_id`.
    Cancel {
        customer_id: String,
        reason: Option<String>,
    },
}

/// Results from BuyForMeActions - variants match 1:1 with BuyForMeAction
#[derive(Debug, Clone)]
pub enum BuyForMeActionResult {
    UpdateStatus(BuyForMeRequest),
    Cancel(BuyForMeRequest),
}
