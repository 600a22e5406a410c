use chrono::Utc;
use tracing::warn;

use super::actions::{BuyForMeAction, BuyForMeActionResult};
use crate::actor_framework::Entity;
use crate::domain::identifiers::is_valid_request_number;
use crate::domain::{
    compute_total, BuyForMeCreate, BuyForMePatch, BuyForMeQuery, BuyForMeRequest, RequestStatus, StatusChange,
    SubStatus,
};

impl Entity for BuyForMeRequest {
    type Id = String;
    type CreateParams = BuyForMeCreate;
    type Patch = BuyForMePatch;
    type Query = BuyForMeQuery;
    type Action = BuyForMeAction;
    type ActionResult = BuyForMeActionResult;

    fn id(&self) -> &String {
        &self.id
    }

    /// Builds a request document, validating every line item and the
    /// request number format. `totalAmount` is always recomputed.
    fn from_create_params(id: String, params: BuyForMeCreate) -> Result<Self, String> {
        if !is_valid_request_number(&params.request_number) {
            return Err(format!("malformed request number: {}", params.request_number));
        }
        if params.customer.id.is_empty() {
            return Err("customer id is required".to_string());
        }
        if params.items.is_empty() {
            return Err("a request needs at least one item".to_string());
        }
        for item in &params.items {
            item.validate()?;
        }
        if let Some(batch) = &params.batch {
            if batch.index >= batch.size {
                return Err(format!("batch index {} outside batch of {}", batch.index, batch.size));
            }
        }

        let now = Utc::now();
        let batch = params.batch;
        Ok(Self {
            id,
            request_number: params.request_number,
            customer: params.customer,
            total_amount: compute_total(&params.items),
            items: params.items,
            status: params.status,
            sub_status: params.sub_status,
            status_history: params.status_history,
            batch_id: batch.as_ref().map(|b| b.batch_id.clone()),
            original_batch_number: batch.as_ref().and_then(|b| b.original_batch_number.clone()),
            batch_index: batch.as_ref().map(|b| b.index),
            batch_size: batch.as_ref().map(|b| b.size),
            customer_notes: params.customer_notes,
            admin_notes: params.admin_notes,
            created_at: params.created_at.unwrap_or(now),
            updated_at: now,
        })
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.request_number)
    }

    fn matches(&self, query: &BuyForMeQuery) -> bool {
        fn eq<T: PartialEq>(wanted: &Option<T>, actual: &T) -> bool {
            wanted.as_ref().map_or(true, |w| w == actual)
        }
        fn eq_opt<T: PartialEq>(wanted: &Option<T>, actual: &Option<T>) -> bool {
            wanted.is_none() || wanted == actual
        }

        eq(&query.status, &self.status)
            && eq_opt(&query.sub_status, &self.sub_status)
            && eq(&query.customer_id, &self.customer.id)
            && eq(&query.request_number, &self.request_number)
            && eq_opt(&query.batch_id, &self.batch_id)
            && eq_opt(&query.original_batch_number, &self.original_batch_number)
            && (!query.multi_item_only || self.is_multi_item())
    }

    /// Customer notes are frozen once the request leaves `pending`.
    fn on_update(&mut self, patch: BuyForMePatch) -> Result<(), String> {
        if let Some(notes) = patch.customer_notes {
            if self.status != RequestStatus::Pending {
                return Err(format!("customer notes are locked while {}", self.status));
            }
            self.customer_notes = Some(notes);
        }
        if let Some(notes) = patch.admin_notes {
            self.admin_notes = Some(notes);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Only superseded multi-item originals are ever removed.
    fn on_delete(&self) -> Result<(), String> {
        if self.is_multi_item() {
            Ok(())
        } else {
            Err(format!("{} is a single-item request and cannot be deleted", self.request_number))
        }
    }

    fn handle_action(&mut self, action: BuyForMeAction) -> Result<BuyForMeActionResult, String> {
        match action {
            BuyForMeAction::UpdateStatus {
                status,
                sub_status,
                actor_id,
                note,
            } => {
                if !self.status.is_conventional_transition(status) {
                    warn!(
                        request_number = %self.request_number,
                        from = %self.status,
                        to = %status,
                        actor = %actor_id,
                        "Unconventional status transition"
                    );
                }
                self.record_status(status, sub_status, actor_id, note);
                Ok(BuyForMeActionResult::UpdateStatus(self.clone()))
            }
            BuyForMeAction::Cancel { customer_id, reason } => {
                if self.customer.id != customer_id {
                    return Err(format!("{} is not owned by {customer_id}", self.request_number));
                }
                if self.status != RequestStatus::Pending {
                    return Err(format!("only pending requests can be cancelled, {} is {}", self.request_number, self.status));
                }
                let note = Some(reason.unwrap_or_else(|| "Cancelled by customer".to_string()));
                self.record_status(RequestStatus::Cancelled, None, customer_id, note);
                Ok(BuyForMeActionResult::Cancel(self.clone()))
            }
        }
    }
}

impl BuyForMeRequest {
    fn record_status(
        &mut self,
        status: RequestStatus,
        sub_status: Option<SubStatus>,
        changed_by: String,
        note: Option<String>,
    ) {
        let now = Utc::now();
        self.status = status;
        self.sub_status = sub_status;
        self.status_history.push(StatusChange {
            status,
            sub_status,
            changed_by,
            changed_at: now,
            note,
        });
        self.updated_at = now;
    }
}
