/*
    Copyright 2025 MydriaTech AB

    Licensed under the Apache License 2.0 with Free world makers exception
    1.0.0 (the "License"); you may not use this file except in compliance with
    the License. You should have obtained a copy of the License with the source
    or binary distribution in file named

        LICENSE-Apache-2.0-with-FWM-Exception-1.0.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.
*/

//! Window-bounded Randflake ID generator.

mod feistel;

use self::feistel::FeistelCipher;
use std::sync::Mutex;
use tally_dbp::time::get_timestamp_secs;
use tally_dbp::tm::NodeLease;
use tally_dbp::tm::RandflakeId;
use tally_dbp::tm::TelemetryError;
use tally_dbp::tm::TelemetryErrorKind;

/// Mutable generator state. Window endpoints share the mutex with the
/// sequence so that an in-place lease update publishes both together.
struct GeneratorState {
    window_start_sec: i64,
    window_end_sec: i64,
    last_sec: i64,
    sequence: u64,
}

/** Window-bounded Randflake ID generator.

Mints 63-bit identifiers from the (node id, time window) slice granted by a
node lease. Every issuance consumes a unique (window offset, node id,
sequence) tuple, which a keyed permutation whitens into the externally
visible identifier. IDs are only minted while the wall clock is strictly
inside the window, so a holder that lost contact with the lease store goes
quiet before its reservation can be handed to anyone else.

A single process-wide instance is shared by all request handlers; the state
mutex serializes issuance.
*/
pub struct RandflakeGenerator {
    node_id: i64,
    cipher: FeistelCipher,
    state: Mutex<GeneratorState>,
}

impl RandflakeGenerator {
    /// Return a new instance bound to a lease slice.
    ///
    /// `window_start_sec` and `window_end_sec` are whole seconds since the
    /// epoch, with the end already pulled in by the lease safety padding.
    pub fn new(
        node_id: i64,
        window_start_sec: i64,
        window_end_sec: i64,
        secret_key: &[u8; 16],
    ) -> Result<Self, TelemetryError> {
        if !(0..=NodeLease::MAX_NODE_ID).contains(&node_id) {
            return Err(TelemetryErrorKind::Unspecified
                .error_with_msg(format!("Node id {node_id} is out of range.")));
        }
        if window_start_sec >= window_end_sec {
            return Err(TelemetryErrorKind::WindowExpired.error_with_msg(format!(
                "Window [{window_start_sec}, {window_end_sec}) is empty."
            )));
        }
        Ok(Self {
            node_id,
            cipher: FeistelCipher::new(secret_key),
            state: Mutex::new(GeneratorState {
                window_start_sec,
                window_end_sec,
                last_sec: 0,
                sequence: 0,
            }),
        })
    }

    /// The node id this generator mints under.
    pub fn node_id(&self) -> i64 {
        self.node_id
    }

    /// Mint the next identifier.
    ///
    /// Fails with [TelemetryErrorKind::WindowExpired] when the wall clock is
    /// outside the active window. When the per-second sequence saturates the
    /// call spins until the clock reaches the next second, so it can block
    /// for up to a second under extreme load.
    pub fn generate(&self) -> Result<i64, TelemetryError> {
        let mut state = self.state.lock().unwrap();
        // Never step back behind an already stamped second.
        let mut now_sec = get_timestamp_secs().max(state.last_sec);
        if now_sec == state.last_sec {
            if state.sequence >= RandflakeId::MAX_SEQUENCE {
                while now_sec <= state.last_sec {
                    std::hint::spin_loop();
                    now_sec = get_timestamp_secs();
                }
                state.last_sec = now_sec;
                state.sequence = 0;
            } else {
                state.sequence += 1;
            }
        } else {
            state.last_sec = now_sec;
            state.sequence = 0;
        }
        if now_sec < state.window_start_sec || now_sec >= state.window_end_sec {
            return Err(TelemetryErrorKind::WindowExpired.error_with_msg(format!(
                "Second {now_sec} is outside the window [{}, {}).",
                state.window_start_sec, state.window_end_sec
            )));
        }
        let raw = RandflakeId::from_parts(
            u64::try_from(now_sec - state.window_start_sec).unwrap_or(0),
            u64::try_from(self.node_id).unwrap_or(0),
            state.sequence,
        );
        Ok(RandflakeId::from(self.cipher.encrypt(raw.as_encoded())).as_encoded_i64())
    }

    /// Mint the next identifier in its textual form.
    pub fn generate_string(&self) -> Result<String, TelemetryError> {
        self.generate().map(|id| RandflakeId::from(id).as_string())
    }

    /// Install the window of an extended lease.
    ///
    /// Both endpoints are published together under the state mutex. The
    /// sequence state is deliberately retained: an extension does not change
    /// the node id or the window start, so already stamped tuples stay
    /// unique.
    pub fn update_lease(&self, window_start_sec: i64, window_end_sec: i64) {
        let mut state = self.state.lock().unwrap();
        state.window_start_sec = window_start_sec;
        state.window_end_sec = window_end_sec;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    const KEY: [u8; 16] = *b"0123456789abcdef";

    fn open_generator(node_id: i64) -> RandflakeGenerator {
        let now = get_timestamp_secs();
        RandflakeGenerator::new(node_id, now - 60, now + 600, &KEY).unwrap()
    }

    #[test]
    fn rejects_an_empty_window() {
        let now = get_timestamp_secs();
        assert!(RandflakeGenerator::new(0, now, now, &KEY).is_err());
        assert!(RandflakeGenerator::new(0, now + 10, now, &KEY).is_err());
    }

    #[test]
    fn rejects_an_out_of_range_node_id() {
        let now = get_timestamp_secs();
        assert!(RandflakeGenerator::new(-1, now, now + 60, &KEY).is_err());
        assert!(
            RandflakeGenerator::new(NodeLease::MAX_NODE_ID + 1, now, now + 60, &KEY).is_err()
        );
    }

    #[test]
    fn refuses_to_mint_outside_the_window() {
        let now = get_timestamp_secs();
        // Window fully in the past.
        let lapsed = RandflakeGenerator::new(7, now - 600, now - 300, &KEY).unwrap();
        let e = lapsed.generate().unwrap_err();
        assert_eq!(e.kind(), &TelemetryErrorKind::WindowExpired);
        // Window that has not opened yet.
        let early = RandflakeGenerator::new(7, now + 300, now + 600, &KEY).unwrap();
        let e = early.generate().unwrap_err();
        assert_eq!(e.kind(), &TelemetryErrorKind::WindowExpired);
        // A window that is still open for a moment mints.
        let closing = RandflakeGenerator::new(7, now - 600, now + 2, &KEY).unwrap();
        assert!(closing.generate().is_ok());
    }

    #[test]
    fn concurrent_generation_yields_distinct_ids() {
        let generator = Arc::new(open_generator(42));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let generator = Arc::clone(&generator);
            handles.push(std::thread::spawn(move || {
                (0..5_000)
                    .map(|_| generator.generate().unwrap())
                    .collect::<Vec<_>>()
            }));
        }
        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
                assert!(id >= 0);
            }
        }
        assert_eq!(seen.len(), 8 * 5_000);
    }

    #[test]
    fn update_lease_reopens_a_closing_window() {
        let now = get_timestamp_secs();
        let generator = RandflakeGenerator::new(9, now - 60, now + 2, &KEY).unwrap();
        let before = generator.generate().unwrap();
        generator.update_lease(now - 60, now + 600);
        let after = generator.generate().unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn generated_strings_decode_to_the_same_id() {
        let generator = open_generator(3);
        let encoded = generator.generate_string().unwrap();
        assert_eq!(encoded.len(), RandflakeId::ENCODED_WIDTH);
        assert!(RandflakeId::from_string(&encoded).is_ok());
    }
}
