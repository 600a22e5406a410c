use chrono::{DateTime, Utc};

use super::actions::{BoxAction, BoxActionResult};
use crate::actor_framework::Entity;
use crate::domain::{
    BoxContent, BoxContentCreate, BoxContentPatch, BoxContentQuery, BoxStatus, Disposition, Inspection, Packing,
    Shipping,
};

impl Entity for BoxContent {
    type Id = String;
    type CreateParams = BoxContentCreate;
    type Patch = BoxContentPatch;
    type Query = BoxContentQuery;
    type Action = BoxAction;
    type ActionResult = BoxActionResult;

    fn id(&self) -> &String {
        &self.id
    }

    /// Records the physical arrival of an item.
    ///
    /// `arrivalDate` defaults to now and may not lie in the future, so every
    /// later timestamp can be ordered after it.
    fn from_create_params(id: String, params: BoxContentCreate) -> Result<Self, String> {
        let now = Utc::now();
        for (field, value) in [
            ("customerId", &params.customer_id),
            ("boxNumber", &params.box_number),
            ("productName", &params.product_name),
            ("receivedBy", &params.received_by),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} is required"));
            }
        }
        if params.quantity == 0 {
            return Err("quantity must be at least 1".to_string());
        }
        validate_weight(params.weight_kg)?;
        let arrival_date = params.arrival_date.unwrap_or(now);
        if arrival_date > now {
            return Err(format!("arrival date {arrival_date} is in the future"));
        }

        Ok(Self {
            id,
            customer_id: params.customer_id,
            box_number: params.box_number,
            request_id: params.request_id,
            request_number: params.request_number,
            product_name: params.product_name,
            description: params.description,
            quantity: params.quantity,
            weight_kg: params.weight_kg,
            status: BoxStatus::Arrived,
            arrival_date,
            received_by: params.received_by,
            inspection: None,
            packing: None,
            shipping: None,
            disposition: None,
            requested_packing: false,
            requested_packing_at: None,
            confirmed_packing: false,
            confirmed_packing_at: None,
            ready_for_packing_by: None,
            ready_for_packing_at: None,
            updated_at: now,
        })
    }

    fn matches(&self, query: &BoxContentQuery) -> bool {
        query.customer_id.as_ref().map_or(true, |id| &self.customer_id == id)
            && query.status.map_or(true, |status| self.status == status)
            && query
                .request_id
                .as_ref()
                .map_or(true, |id| self.request_id.as_ref() == Some(id))
    }

    fn on_update(&mut self, patch: BoxContentPatch) -> Result<(), String> {
        if let Some(weight) = patch.weight_kg {
            validate_weight(Some(weight))?;
            self.weight_kg = Some(weight);
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        self.updated_at = self.stamp();
        Ok(())
    }

    fn on_delete(&self) -> Result<(), String> {
        Err("box contents are never deleted; return or dispose the item instead".to_string())
    }

    fn handle_action(&mut self, action: BoxAction) -> Result<BoxActionResult, String> {
        match action {
            BoxAction::Inspect {
                inspected_by,
                condition,
                notes,
                photos,
            } => {
                let at = self.advance(BoxStatus::Inspected)?;
                self.inspection = Some(Inspection {
                    inspected_by,
                    inspected_at: at,
                    condition,
                    notes,
                    photos,
                });
            }
            BoxAction::MarkReadyForPacking { staff_id } => {
                if !self.requested_packing {
                    return Err(format!("{} has no packing request from the customer", self.id));
                }
                let at = self.advance(BoxStatus::ReadyForPacking)?;
                self.ready_for_packing_by = Some(staff_id);
                self.ready_for_packing_at = Some(at);
            }
            BoxAction::Pack {
                packed_by,
                package_reference,
            } => {
                let at = self.advance(BoxStatus::Packed)?;
                self.packing = Some(Packing {
                    packed_by,
                    packed_at: at,
                    package_reference,
                });
            }
            BoxAction::Ship {
                carrier,
                tracking_number,
            } => {
                if !self.confirmed_packing {
                    return Err(format!("{} is awaiting customer packing confirmation", self.id));
                }
                if carrier.trim().is_empty() || tracking_number.trim().is_empty() {
                    return Err("carrier and tracking number are required".to_string());
                }
                let at = self.advance(BoxStatus::Shipped)?;
                self.shipping = Some(Shipping {
                    carrier,
                    tracking_number,
                    shipped_at: at,
                    delivered_at: None,
                });
            }
            BoxAction::Deliver => {
                let at = self.advance(BoxStatus::Delivered)?;
                if let Some(shipping) = self.shipping.as_mut() {
                    shipping.delivered_at = Some(at);
                }
            }
            BoxAction::Return { reason, recorded_by } => {
                let at = self.advance(BoxStatus::Returned)?;
                self.disposition = Some(Disposition {
                    reason,
                    recorded_by,
                    recorded_at: at,
                });
            }
            BoxAction::Dispose { reason, recorded_by } => {
                let at = self.advance(BoxStatus::Disposed)?;
                self.disposition = Some(Disposition {
                    reason,
                    recorded_by,
                    recorded_at: at,
                });
            }
            BoxAction::RequestPacking { customer_id } => {
                self.check_owner(&customer_id)?;
                if !matches!(self.status, BoxStatus::Arrived | BoxStatus::Inspected) {
                    return Err(format!("packing cannot be requested while {}", self.status));
                }
                let changed = !self.requested_packing;
                if changed {
                    let at = self.stamp();
                    self.requested_packing = true;
                    self.requested_packing_at = Some(at);
                    self.updated_at = at;
                }
                return Ok(BoxActionResult::CustomerFlag {
                    changed,
                    item: self.clone(),
                });
            }
            BoxAction::ConfirmPacking { customer_id } => {
                self.check_owner(&customer_id)?;
                if self.status != BoxStatus::Packed {
                    return Err(format!("packing can only be confirmed once packed, item is {}", self.status));
                }
                if !self.requested_packing {
                    return Err("packing was never requested".to_string());
                }
                let changed = !self.confirmed_packing;
                if changed {
                    let at = self.stamp();
                    self.confirmed_packing = true;
                    self.confirmed_packing_at = Some(at);
                    self.updated_at = at;
                }
                return Ok(BoxActionResult::CustomerFlag {
                    changed,
                    item: self.clone(),
                });
            }
        }
        Ok(BoxActionResult::Transitioned(self.clone()))
    }
}

impl BoxContent {
    /// Current time, never earlier than the arrival date.
    fn stamp(&self) -> DateTime<Utc> {
        Utc::now().max(self.arrival_date)
    }

    fn advance(&mut self, target: BoxStatus) -> Result<DateTime<Utc>, String> {
        if !self.status.can_transition_to(target) {
            return Err(format!("cannot move {} from {} to {}", self.id, self.status, target));
        }
        let at = self.stamp();
        self.status = target;
        self.updated_at = at;
        Ok(at)
    }

    fn check_owner(&self, customer_id: &str) -> Result<(), String> {
        if self.customer_id == customer_id {
            Ok(())
        } else {
            Err(format!("{} is not in the box of {customer_id}", self.id))
        }
    }
}

fn validate_weight(weight: Option<f64>) -> Result<(), String> {
    match weight {
        Some(w) if !w.is_finite() || w <= 0.0 => Err(format!("weight must be positive, got {w}")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemCondition;
    use chrono::Duration;

    fn arrival() -> BoxContentCreate {
        BoxContentCreate {
            customer_id: "cust_1".into(),
            box_number: "HH000001".into(),
            request_id: Some("req_1".into()),
            request_number: Some("BFM00000001".into()),
            product_name: "Headphones".into(),
            description: None,
            quantity: 1,
            weight_kg: Some(0.4),
            received_by: "staff_1".into(),
            arrival_date: Some(Utc::now() - Duration::hours(2)),
        }
    }

    fn item() -> BoxContent {
        BoxContent::from_create_params("box_1".into(), arrival()).unwrap()
    }

    fn inspect() -> BoxAction {
        BoxAction::Inspect {
            inspected_by: "staff_2".into(),
            condition: ItemCondition::Good,
            notes: None,
            photos: vec!["photo.jpg".into()],
        }
    }

    fn customer(action: fn(String) -> BoxAction) -> BoxAction {
        action("cust_1".into())
    }

    fn request_packing(customer_id: String) -> BoxAction {
        BoxAction::RequestPacking { customer_id }
    }

    fn confirm_packing(customer_id: String) -> BoxAction {
        BoxAction::ConfirmPacking { customer_id }
    }

    #[test]
    fn full_pipeline_records_ordered_timestamps() {
        let mut item = item();
        item.handle_action(inspect()).unwrap();
        item.handle_action(customer(request_packing)).unwrap();
        item.handle_action(BoxAction::MarkReadyForPacking { staff_id: "s".into() }).unwrap();
        item.handle_action(BoxAction::Pack {
            packed_by: "s".into(),
            package_reference: Some("PKG-1".into()),
        })
        .unwrap();
        item.handle_action(customer(confirm_packing)).unwrap();
        item.handle_action(BoxAction::Ship {
            carrier: "DHL".into(),
            tracking_number: "TRK1".into(),
        })
        .unwrap();
        let BoxActionResult::Transitioned(item) = item.handle_action(BoxAction::Deliver).unwrap() else {
            panic!("expected transition");
        };

        assert_eq!(item.status, BoxStatus::Delivered);
        let inspected = item.inspection.as_ref().unwrap().inspected_at;
        let packed = item.packing.as_ref().unwrap().packed_at;
        let shipping = item.shipping.as_ref().unwrap();
        assert!(item.arrival_date <= inspected);
        assert!(inspected <= packed);
        assert!(packed <= shipping.shipped_at);
        assert!(shipping.shipped_at <= shipping.delivered_at.unwrap());
        assert!(item.arrival_date <= item.requested_packing_at.unwrap());
    }

    #[test]
    fn timestamps_never_precede_arrival() {
        let mut item = item();
        item.arrival_date = Utc::now() + Duration::hours(1);
        item.handle_action(inspect()).unwrap();
        assert_eq!(item.inspection.unwrap().inspected_at, item.arrival_date);
    }

    #[test]
    fn skipping_steps_is_rejected() {
        let mut item = item();
        let err = item
            .handle_action(BoxAction::Pack {
                packed_by: "s".into(),
                package_reference: None,
            })
            .unwrap_err();
        assert!(err.contains("arrived"));
        assert!(item.handle_action(BoxAction::Deliver).is_err());
    }

    #[test]
    fn ready_for_packing_needs_customer_request() {
        let mut item = item();
        item.handle_action(inspect()).unwrap();
        assert!(item
            .handle_action(BoxAction::MarkReadyForPacking { staff_id: "s".into() })
            .is_err());
        assert_eq!(item.status, BoxStatus::Inspected);
        assert_eq!(item.ready_for_packing_by, None);

        item.handle_action(customer(request_packing)).unwrap();
        item.handle_action(BoxAction::MarkReadyForPacking {
            staff_id: "staff_7".into(),
        })
        .unwrap();
        assert_eq!(item.status, BoxStatus::ReadyForPacking);
        assert_eq!(item.ready_for_packing_by.as_deref(), Some("staff_7"));
        assert!(item.arrival_date <= item.ready_for_packing_at.unwrap());
    }

    #[test]
    fn request_packing_is_gated_and_idempotent() {
        let mut item = item();
        assert!(item
            .handle_action(BoxAction::RequestPacking {
                customer_id: "cust_2".into()
            })
            .is_err());

        let first = item.handle_action(customer(request_packing)).unwrap();
        assert!(matches!(first, BoxActionResult::CustomerFlag { changed: true, .. }));
        let second = item.handle_action(customer(request_packing)).unwrap();
        assert!(matches!(second, BoxActionResult::CustomerFlag { changed: false, .. }));

        item.status = BoxStatus::Packed;
        assert!(item.handle_action(customer(request_packing)).is_err());
    }

    #[test]
    fn shipping_waits_for_confirmation() {
        let mut item = item();
        item.requested_packing = true;
        item.status = BoxStatus::Packed;
        let ship = BoxAction::Ship {
            carrier: "DHL".into(),
            tracking_number: "T".into(),
        };
        assert!(item.handle_action(ship.clone()).is_err());
        item.handle_action(customer(confirm_packing)).unwrap();
        assert!(item.handle_action(ship).is_ok());
        assert!(item.handle_action(customer(confirm_packing)).is_err());
    }

    #[test]
    fn disposal_and_return_branches() {
        let mut item = item();
        item.handle_action(BoxAction::Dispose {
            reason: "leaking".into(),
            recorded_by: "s".into(),
        })
        .unwrap();
        assert_eq!(item.status, BoxStatus::Disposed);
        assert!(item
            .handle_action(BoxAction::Return {
                reason: "x".into(),
                recorded_by: "s".into()
            })
            .is_err());
        assert_eq!(item.disposition.unwrap().reason, "leaking");
    }

    #[test]
    fn arrival_validation() {
        let mut params = arrival();
        params.arrival_date = Some(Utc::now() + Duration::days(1));
        assert!(BoxContent::from_create_params("b".into(), params).is_err());

        let mut params = arrival();
        params.weight_kg = Some(0.0);
        assert!(BoxContent::from_create_params("b".into(), params).is_err());

        let mut params = arrival();
        params.product_name = " ".into();
        assert!(BoxContent::from_create_params("b".into(), params).is_err());
    }

    #[test]
    fn box_contents_are_never_deleted() {
        assert!(item().on_delete().is_err());
    }
}
