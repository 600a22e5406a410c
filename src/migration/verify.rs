//! Post-migration consistency checks over the whole request store.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::domain::identifiers::is_valid_request_number;
use crate::domain::BuyForMeRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerifyIssue {
    ItemCount {
        request_number: String,
        items: usize,
    },
    MalformedNumber {
        request_number: String,
    },
    DuplicateNumber {
        request_number: String,
        count: usize,
    },
    MixedOrigins {
        batch_id: String,
        origins: Vec<String>,
    },
    OriginInMultipleBatches {
        original_batch_number: String,
        batch_ids: Vec<String>,
    },
    BatchSizeMismatch {
        batch_id: String,
        expected: u32,
        actual: usize,
    },
    OriginalStillPresent {
        request_number: String,
        children: usize,
    },
}

impl fmt::Display for VerifyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ItemCount { request_number, items } => {
                write!(f, "{request_number} has {items} items, expected exactly one")
            }
            Self::MalformedNumber { request_number } => write!(f, "{request_number} does not match BFM + 8 digits"),
            Self::DuplicateNumber { request_number, count } => {
                write!(f, "{request_number} is used by {count} requests")
            }
            Self::MixedOrigins { batch_id, origins } => {
                write!(f, "batch {batch_id} mixes origins: {}", origins.join(", "))
            }
            Self::OriginInMultipleBatches {
                original_batch_number,
                batch_ids,
            } => write!(
                f,
                "{original_batch_number} was split into several batches: {}",
                batch_ids.join(", ")
            ),
            Self::BatchSizeMismatch {
                batch_id,
                expected,
                actual,
            } => write!(f, "batch {batch_id} declares {expected} members but has {actual}"),
            Self::OriginalStillPresent {
                request_number,
                children,
            } => write!(f, "{request_number} still exists alongside {children} split requests"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReport {
    pub total_requests: usize,
    pub batches: usize,
    pub split_requests: usize,
    pub issues: Vec<VerifyIssue>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

const NO_ORIGIN: &str = "<none>";

pub fn verify(requests: &[BuyForMeRequest]) -> VerifyReport {
    let mut report = VerifyReport {
        total_requests: requests.len(),
        ..VerifyReport::default()
    };

    let mut numbers: BTreeMap<&str, usize> = BTreeMap::new();
    let mut batches: BTreeMap<&str, Vec<&BuyForMeRequest>> = BTreeMap::new();
    let mut origins: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut children_of: BTreeMap<&str, usize> = BTreeMap::new();

    for request in requests {
        if request.items.len() != 1 {
            report.issues.push(VerifyIssue::ItemCount {
                request_number: request.request_number.clone(),
                items: request.items.len(),
            });
        }
        if !is_valid_request_number(&request.request_number) {
            report.issues.push(VerifyIssue::MalformedNumber {
                request_number: request.request_number.clone(),
            });
        }
        *numbers.entry(&request.request_number).or_default() += 1;

        if let Some(batch_id) = request.batch_id.as_deref() {
            batches.entry(batch_id).or_default().push(request);
        }
        if let Some(origin) = request.original_batch_number.as_deref() {
            report.split_requests += 1;
            *children_of.entry(origin).or_default() += 1;
            if let Some(batch_id) = request.batch_id.as_deref() {
                origins.entry(origin).or_default().insert(batch_id);
            }
        }
    }
    report.batches = batches.len();

    for (number, count) in numbers.iter().filter(|(_, count)| **count > 1) {
        report.issues.push(VerifyIssue::DuplicateNumber {
            request_number: number.to_string(),
            count: *count,
        });
    }

    for (batch_id, members) in &batches {
        let batch_origins: BTreeSet<&str> = members
            .iter()
            .map(|m| m.original_batch_number.as_deref().unwrap_or(NO_ORIGIN))
            .collect();
        if batch_origins.len() > 1 {
            report.issues.push(VerifyIssue::MixedOrigins {
                batch_id: batch_id.to_string(),
                origins: batch_origins.into_iter().map(str::to_string).collect(),
            });
        }
        if let Some(expected) = members
            .iter()
            .filter_map(|m| m.batch_size)
            .find(|size| *size as usize != members.len())
        {
            report.issues.push(VerifyIssue::BatchSizeMismatch {
                batch_id: batch_id.to_string(),
                expected,
                actual: members.len(),
            });
        }
    }

    for (origin, batch_ids) in origins.iter().filter(|(_, ids)| ids.len() > 1) {
        report.issues.push(VerifyIssue::OriginInMultipleBatches {
            original_batch_number: origin.to_string(),
            batch_ids: batch_ids.iter().map(|id| id.to_string()).collect(),
        });
    }

    for request in requests {
        if let Some(children) = children_of.get(request.request_number.as_str()) {
            report.issues.push(VerifyIssue::OriginalStillPresent {
                request_number: request.request_number.clone(),
                children: *children,
            });
        }
    }

    report
}
