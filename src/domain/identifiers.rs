//! Human-readable identifiers: request numbers, batch ids and box numbers.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

pub const REQUEST_NUMBER_PREFIX: &str = "BFM";
const REQUEST_NUMBER_DIGITS: usize = 8;
const BATCH_SUFFIX_LEN: usize = 9;

/// `BFM` followed by eight random digits.
pub fn request_number_from(rng: &mut impl Rng) -> String {
    let digits: u32 = rng.gen_range(0..100_000_000);
    format!("{REQUEST_NUMBER_PREFIX}{digits:08}")
}

pub fn new_request_number() -> String {
    request_number_from(&mut rand::thread_rng())
}

/// Matches `^BFM\d{8}$`.
pub fn is_valid_request_number(candidate: &str) -> bool {
    candidate
        .strip_prefix(REQUEST_NUMBER_PREFIX)
        .is_some_and(|digits| digits.len() == REQUEST_NUMBER_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// `BATCH-<unix millis>-<9 lowercase alphanumerics>`.
pub fn batch_id_from(now: DateTime<Utc>, rng: &mut impl Rng) -> String {
    let suffix: String = rng
        .sample_iter(&Alphanumeric)
        .take(BATCH_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("BATCH-{}-{suffix}", now.timestamp_millis())
}

pub fn new_batch_id() -> String {
    batch_id_from(Utc::now(), &mut rand::thread_rng())
}

/// `HH` followed by six random digits.
pub fn new_box_number() -> String {
    let digits: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("HH{digits:06}")
}
