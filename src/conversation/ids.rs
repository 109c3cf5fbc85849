//! Message and session identifiers
//!
//! Ids are opaque strings. Message ids only key UI entries, so a rare
//! collision is harmless; the transcript order is what matters. Session ids
//! pair a millisecond timestamp with a random suffix and never repeat within
//! one generator.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random base-36 token
pub const TOKEN_LEN: usize = 9;

/// Prefix carried by every session id
pub const SESSION_PREFIX: &str = "session";

/// Generates message and session identifiers from an injectable randomness source
pub struct IdGenerator {
    rng: Box<dyn RngCore + Send>,
    last_millis: i64,
}

impl IdGenerator {
    /// Generator backed by an entropy-seeded `StdRng`
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Generator backed by the given randomness source
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Box::new(rng),
            last_millis: i64::MIN,
        }
    }

    /// A short random base-36 token
    pub fn new_message_id(&mut self) -> String {
        (0..TOKEN_LEN)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }

    /// `session_{millis}_{token}`, with the timestamp strictly increasing per generator
    pub fn new_session_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        let millis = if now > self.last_millis {
            now
        } else {
            self.last_millis + 1
        };
        self.last_millis = millis;

        format!("{}_{}_{}", SESSION_PREFIX, millis, self.new_message_id())
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
