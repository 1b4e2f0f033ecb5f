//! Hash-based change event ID generation.
//!
//! Event IDs have the form `evt-{hash}` where `hash` is 8 base36 characters
//! derived from a SHA256 over the event's kind, service, description, the
//! generation timestamp and a nonce. Events created in the same second with
//! the same content still get distinct IDs: the generator remembers what it
//! issued and retries with the next nonce on collision.
//!
//! # Example
//!
//! ```
//! use lineage::domain::ChangeKind;
//! use lineage::id_generation::EventIdGenerator;
//!
//! let mut generator = EventIdGenerator::new();
//! let id = generator
//!     .generate(ChangeKind::Deployment, "ad-service", "Fix click tracking")
//!     .unwrap();
//!
//! assert!(id.as_str().starts_with("evt-"));
//! ```

use crate::domain::{ChangeKind, EventId};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;

/// Prefix shared by all generated event IDs
pub const EVENT_ID_PREFIX: &str = "evt";

/// Number of base36 characters after the prefix
pub const EVENT_ID_HASH_LENGTH: usize = 8;

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Unable to generate a unique ID after exhausting all nonces
    #[error("Unable to generate unique event ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of nonces tried
        attempts: u32,
    },
}

/// Event ID generator with collision detection.
///
/// Only IDs issued within the current timestamp tick are remembered. The
/// timestamp is part of the hashed content, so IDs from different ticks
/// cannot collide through the nonce sequence, and the set is dropped as soon
/// as the clock moves on. A long-lived generator therefore holds at most the
/// IDs issued within one microsecond.
#[derive(Debug, Default)]
pub struct EventIdGenerator {
    window: i64,
    issued: HashSet<String>,
}

impl EventIdGenerator {
    /// Create a generator with no issued IDs
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of IDs remembered for collision checks
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.issued.len()
    }

    /// Generate a new unique event ID.
    ///
    /// # Errors
    ///
    /// Returns an error if every nonce produced an already-issued ID.
    pub fn generate(
        &mut self,
        kind: ChangeKind,
        service: &str,
        description: &str,
    ) -> Result<EventId, IdGenerationError> {
        self.generate_at(kind, service, description, Utc::now().timestamp_micros())
    }

    fn generate_at(
        &mut self,
        kind: ChangeKind,
        service: &str,
        description: &str,
        timestamp: i64,
    ) -> Result<EventId, IdGenerationError> {
        if timestamp != self.window {
            self.window = timestamp;
            self.issued.clear();
        }

        for nonce in 0..MAX_NONCE {
            let id = hash_id(kind, service, description, timestamp, nonce);

            if self.issued.insert(id.clone()) {
                if nonce > 0 {
                    debug!(nonce, "Generated unique event ID after collision retries");
                }
                return Ok(EventId::new(id));
            }
        }

        Err(IdGenerationError::CollisionExhausted {
            attempts: MAX_NONCE,
        })
    }
}

fn hash_id(kind: ChangeKind, service: &str, description: &str, timestamp: i64, nonce: u32) -> String {
    let content = format!("{kind}|{service}|{description}|{timestamp}|{nonce}");

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash_bytes = hasher.finalize();

    format!(
        "{EVENT_ID_PREFIX}-{}",
        encode_base36(&hash_bytes[..8], EVENT_ID_HASH_LENGTH)
    )
}

/// Encode up to 8 bytes as a fixed-length base36 string.
///
/// Bytes are folded into a `u64` with wrapping shifts; the caller passes at
/// most 8 bytes so nothing is lost.
fn encode_base36(bytes: &[u8], length: usize) -> String {
    let mut n: u64 = 0;
    for &byte in bytes {
        n = n.wrapping_shl(8).wrapping_add(u64::from(byte));
    }

    let mut result = Vec::with_capacity(length);
    while result.len() < length {
        #[allow(clippy::cast_possible_truncation)]
        let remainder = (n % 36) as usize;
        result.push(char::from(BASE36_CHARS[remainder]));
        n /= 36;
    }

    result.into_iter().rev().collect()
}

/// Returns `true` if `id` looks like a generated event ID
#[must_use]
pub fn is_generated_id(id: &str) -> bool {
    id.strip_prefix(EVENT_ID_PREFIX)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hash| {
            hash.len() == EVENT_ID_HASH_LENGTH
                && hash.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_encoding_has_requested_length() {
        let result = encode_base36(&[0x12, 0x34, 0x56, 0x78], 8);
        assert_eq!(result.len(), 8);
        assert!(result.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn base36_encoding_of_zero_pads_with_zeros() {
        assert_eq!(encode_base36(&[0, 0], 4), "0000");
        assert_eq!(encode_base36(&[35], 2), "0z");
    }

    #[test]
    fn generated_ids_have_expected_format() {
        let mut generator = EventIdGenerator::new();
        let id = generator
            .generate(ChangeKind::ConfigUpdate, "billing", "raise limits")
            .unwrap();

        assert!(is_generated_id(id.as_str()), "unexpected id {id}");
    }

    #[test]
    fn identical_events_get_distinct_ids() {
        let mut generator = EventIdGenerator::new();
        let ids: HashSet<EventId> = (0..50)
            .map(|_| {
                generator
                    .generate(ChangeKind::Deployment, "svc", "same")
                    .unwrap()
            })
            .collect();

        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn same_tick_retries_with_next_nonce() {
        let mut generator = EventIdGenerator::new();
        let first = generator
            .generate_at(ChangeKind::Deployment, "svc", "same", 1_000)
            .unwrap();
        let second = generator
            .generate_at(ChangeKind::Deployment, "svc", "same", 1_000)
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(generator.tracked(), 2);
    }

    #[test]
    fn state_is_dropped_when_the_clock_moves() {
        let mut generator = EventIdGenerator::new();
        for tick in 0..1_000 {
            for _ in 0..3 {
                generator
                    .generate_at(ChangeKind::Deployment, "svc", "same", tick)
                    .unwrap();
            }
        }

        assert_eq!(generator.tracked(), 3);
    }

    #[test]
    fn id_validation() {
        assert!(is_generated_id("evt-0a1b2c3d"));
        assert!(!is_generated_id("evt-0A1B2C3D"));
        assert!(!is_generated_id("evt-abc"));
        assert!(!is_generated_id("deploy-001"));
        assert!(!is_generated_id("evt0a1b2c3d"));
    }
}
