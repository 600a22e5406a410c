//! Splits historical multi-item requests into one request per item.
//!
//! Each original gets a batch id shared by its children. Children record the
//! original's request number and their position, so an interrupted run can be
//! resumed: existing children are reused and only missing ones are created.
//! The original is deleted only once every item has a saved child.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::buyforme_actor::BuyForMeError;
use crate::clients::BuyForMeClient;
use crate::domain::identifiers::new_batch_id;
use crate::domain::{BatchLink, BuyForMeCreate, BuyForMeQuery, BuyForMeRequest, StatusChange};

pub const MIGRATION_ACTOR: &str = "migration";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationFailure {
    pub request_number: String,
    /// `None` when the whole record failed rather than one item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_index: Option<u32>,
    pub error: String,
}

/// What a dry run would do with one original.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedSplit {
    pub request_number: String,
    pub item_count: usize,
    pub existing_children: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub dry_run: bool,
    pub records_found: usize,
    pub records_migrated: usize,
    pub requests_created: usize,
    pub requests_reused: usize,
    pub originals_deleted: usize,
    pub planned: Vec<PlannedSplit>,
    pub failures: Vec<MigrationFailure>,
}

impl MigrationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, request_number: &str, item_index: Option<u32>, error: impl ToString) {
        self.failures.push(MigrationFailure {
            request_number: request_number.to_string(),
            item_index,
            error: error.to_string(),
        });
    }
}

/// Runs the split over every multi-item request in the store.
///
/// Only the initial scan can fail the whole run; everything after it is
/// recorded per record in the report.
#[instrument(skip(client))]
pub async fn migrate_individual_requests(
    client: &BuyForMeClient,
    dry_run: bool,
) -> Result<MigrationReport, BuyForMeError> {
    let mut originals = client.find_requests(BuyForMeQuery::multi_item()).await?;
    originals.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.request_number.cmp(&b.request_number)));

    let mut report = MigrationReport {
        dry_run,
        records_found: originals.len(),
        ..MigrationReport::default()
    };
    info!(records = originals.len(), "Found multi-item requests to migrate");

    for original in &originals {
        split_one(client, original, dry_run, &mut report).await;
    }

    info!(
        migrated = report.records_migrated,
        created = report.requests_created,
        failures = report.failures.len(),
        "Migration finished"
    );
    Ok(report)
}

#[instrument(skip_all, fields(request_number = %original.request_number, items = original.items.len()))]
async fn split_one(client: &BuyForMeClient, original: &BuyForMeRequest, dry_run: bool, report: &mut MigrationReport) {
    let children = match client
        .find_requests(BuyForMeQuery::split_from(original.request_number.clone()))
        .await
    {
        Ok(children) => children,
        Err(e) => {
            error!(error = %e, "Could not look up existing children");
            report.fail(&original.request_number, None, e);
            return;
        }
    };

    let existing: BTreeMap<u32, &BuyForMeRequest> = children
        .iter()
        .filter_map(|child| child.batch_index.map(|index| (index, child)))
        .collect();
    let batch_ids: HashSet<&str> = children.iter().filter_map(|child| child.batch_id.as_deref()).collect();
    if batch_ids.len() > 1 {
        warn!(batches = batch_ids.len(), "Existing children disagree on batch id");
    }

    if dry_run {
        report.planned.push(PlannedSplit {
            request_number: original.request_number.clone(),
            item_count: original.items.len(),
            existing_children: existing.len(),
        });
        return;
    }

    let batch_id = children
        .iter()
        .find_map(|child| child.batch_id.clone())
        .unwrap_or_else(new_batch_id);
    let size = original.items.len() as u32;
    let mut complete = true;

    for (index, item) in original.items.iter().enumerate() {
        let index = index as u32;
        if existing.contains_key(&index) {
            report.requests_reused += 1;
            continue;
        }

        let created = client
            .create_with_unique_number(|number| {
                let mut status_history = original.status_history.clone();
                status_history.push(StatusChange {
                    status: original.status,
                    sub_status: original.sub_status,
                    changed_by: MIGRATION_ACTOR.to_string(),
                    changed_at: Utc::now(),
                    note: Some(format!(
                        "Split from {} (item {} of {size})",
                        original.request_number,
                        index + 1
                    )),
                });
                BuyForMeCreate {
                    request_number: number,
                    customer: original.customer.clone(),
                    items: vec![item.clone()],
                    status: original.status,
                    sub_status: original.sub_status,
                    status_history,
                    batch: Some(BatchLink {
                        batch_id: batch_id.clone(),
                        original_batch_number: Some(original.request_number.clone()),
                        index,
                        size,
                    }),
                    customer_notes: original.customer_notes.clone(),
                    admin_notes: original.admin_notes.clone(),
                    created_at: Some(original.created_at),
                }
            })
            .await;

        match created {
            Ok(child) => {
                info!(index, child = %child.request_number, "Item split into new request");
                report.requests_created += 1;
            }
            Err(e) => {
                error!(index, error = %e, "Failed to split item");
                report.fail(&original.request_number, Some(index), e);
                complete = false;
            }
        }
    }

    if !complete {
        warn!("Original kept until every item has been split");
        return;
    }

    match client.delete_request(original.id.clone()).await {
        Ok(()) => {
            report.originals_deleted += 1;
            report.records_migrated += 1;
            info!(batch_id = %batch_id, "Original replaced by its batch");
        }
        Err(e) => {
            error!(error = %e, "Failed to delete original");
            report.fail(&original.request_number, None, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::{ResourceActor, SnapshotSink};
    use crate::clients::CustomerClient;
    use crate::domain::identifiers::is_valid_request_number;
    use crate::domain::Customer;
    use crate::migration::verify;
    use crate::test_support::{counter_ids, legacy_request};

    fn spawn(documents: Vec<BuyForMeRequest>) -> BuyForMeClient {
        let (customer_actor, customers) = ResourceActor::<Customer>::new(8, counter_ids("cust"));
        tokio::spawn(customer_actor.run());
        let (actor, inner) = ResourceActor::<BuyForMeRequest>::new(8, counter_ids("req"));
        tokio::spawn(actor.with_documents(documents).run());
        BuyForMeClient::new(inner, CustomerClient::new(customers))
    }

    #[tokio::test]
    async fn splits_each_original_into_single_item_batch() {
        let client = spawn(vec![
            legacy_request("old_1", "BFM10000001", "cust_1", 3),
            legacy_request("old_2", "BFM10000002", "cust_2", 2),
        ]);

        let report = migrate_individual_requests(&client, false).await.unwrap();
        assert!(report.is_success(), "{:?}", report.failures);
        assert_eq!(report.records_found, 2);
        assert_eq!(report.records_migrated, 2);
        assert_eq!(report.requests_created, 5);
        assert_eq!(report.originals_deleted, 2);

        let all = client.find_requests(BuyForMeQuery::all()).await.unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.iter().all(|r| r.items.len() == 1 && is_valid_request_number(&r.request_number)));

        let mut children = client.find_requests(BuyForMeQuery::split_from("BFM10000001")).await.unwrap();
        children.sort_by_key(|r| r.batch_index);
        assert_eq!(children.len(), 3);
        let batch_id = children[0].batch_id.clone().unwrap();
        for (index, child) in children.iter().enumerate() {
            assert_eq!(child.batch_id.as_deref(), Some(batch_id.as_str()));
            assert_eq!(child.batch_index, Some(index as u32));
            assert_eq!(child.batch_size, Some(3));
            assert_eq!(child.items[0].name, format!("item{index}"));
            assert_eq!(child.customer_notes.as_deref(), Some("please hurry"));
            let last = child.status_history.last().unwrap();
            assert_eq!(last.changed_by, MIGRATION_ACTOR);
            assert_eq!(child.status_history.len(), 2);
        }
        assert_eq!(children[2].total_amount, 12.0);

        assert!(verify(&all).is_clean());
    }

    #[tokio::test]
    async fn rerun_skips_migrated_and_resumes_partial_batches() {
        let original = legacy_request("old_1", "BFM10000001", "cust_1", 3);
        let mut partial = legacy_request("child_0", "BFM20000000", "cust_1", 1);
        partial.items = vec![original.items[0].clone()];
        partial.batch_id = Some("BATCH-1-resumeabc".into());
        partial.original_batch_number = Some("BFM10000001".into());
        partial.batch_index = Some(0);
        partial.batch_size = Some(3);

        let client = spawn(vec![original, partial]);
        let report = migrate_individual_requests(&client, false).await.unwrap();
        assert_eq!(report.requests_reused, 1);
        assert_eq!(report.requests_created, 2);
        assert_eq!(report.originals_deleted, 1);

        let children = client.find_requests(BuyForMeQuery::split_from("BFM10000001")).await.unwrap();
        assert_eq!(children.len(), 3);
        assert!(children.iter().all(|c| c.batch_id.as_deref() == Some("BATCH-1-resumeabc")));

        let again = migrate_individual_requests(&client, false).await.unwrap();
        assert_eq!(again.records_found, 0);
        assert_eq!(again.requests_created, 0);
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let client = spawn(vec![legacy_request("old_1", "BFM10000001", "cust_1", 2)]);
        let report = migrate_individual_requests(&client, true).await.unwrap();
        assert!(report.dry_run);
        assert_eq!(
            report.planned,
            vec![PlannedSplit {
                request_number: "BFM10000001".into(),
                item_count: 2,
                existing_children: 0,
            }]
        );
        assert_eq!(report.requests_created, 0);
        assert_eq!(client.find_requests(BuyForMeQuery::all()).await.unwrap().len(), 1);
    }

    struct RejectAfter {
        writes: std::sync::atomic::AtomicUsize,
        limit: usize,
    }

    impl SnapshotSink<BuyForMeRequest> for RejectAfter {
        fn persist(&self, _: &[&BuyForMeRequest]) -> Result<(), String> {
            let n = self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n >= self.limit {
                Err("disk full".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn original_survives_when_an_item_fails() {
        let (customer_actor, customers) = ResourceActor::<Customer>::new(8, counter_ids("cust"));
        tokio::spawn(customer_actor.run());
        let (actor, inner) = ResourceActor::<BuyForMeRequest>::new(8, counter_ids("req"));
        let actor = actor
            .with_documents(vec![legacy_request("old_1", "BFM10000001", "cust_1", 3)])
            .with_sink(RejectAfter {
                writes: Default::default(),
                limit: 1,
            });
        tokio::spawn(actor.run());
        let client = BuyForMeClient::new(inner, CustomerClient::new(customers));

        let report = migrate_individual_requests(&client, false).await.unwrap();
        assert_eq!(report.requests_created, 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].item_index, Some(1));
        assert!(report.failures[0].error.contains("disk full"));
        assert_eq!(report.originals_deleted, 0);

        let original = client.find_requests(BuyForMeQuery::by_request_number("BFM10000001")).await.unwrap();
        assert_eq!(original.len(), 1);
        assert_eq!(original[0].items.len(), 3);
    }
}
