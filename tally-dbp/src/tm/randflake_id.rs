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

//! Opaque cluster-wide unique identifiers.

use super::TelemetryError;
use super::TelemetryErrorKind;

/// Crockford base32 alphabet (no I, L, O or U).
const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: usize = 5;

/// Lookup table for Crockford base32 decoding.
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    // Main alphabet, allow lower-case
    while i < 32 {
        let c = ALPHABET[i as usize];
        lut[c as usize] = i;
        if c.is_ascii_uppercase() {
            lut[(c + 32) as usize] = i;
        }
        i += 1;
    }
    // Crockford-specific aliases
    lut[b'O' as usize] = 0;
    lut[b'o' as usize] = 0;
    lut[b'I' as usize] = 1;
    lut[b'i' as usize] = 1;
    lut[b'L' as usize] = 1;
    lut[b'l' as usize] = 1;
    lut
};

/**
   Opaque 63-bit identifier minted by a leased Randflake generator.

   The value is the image of a keyed permutation over the packed
   (window offset, node id, sequence) tuple, so consecutive allocations
   appear uncorrelated while uniqueness of the pre-image carries over.

   Pre-image packing (never observable in the encoded value):

   ```text
   MSB
   63  Reserved/unused to allow for conversion to positive i64
   62
   ... 30 bits: Seconds elapsed since the lease window opened
   33
   32
   ... 17 bits: Node id granted by the lease
   16
   15
   ... 16 bits: Per-second sequence
   0
   LSB
   ```

   The textual form is fixed-width Crockford base32 (13 characters covering
   65 bits, of which the top two are always zero).
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RandflakeId(u64);

impl From<i64> for RandflakeId {
    fn from(value: i64) -> Self {
        Self(u64::try_from(value).unwrap_or(0))
    }
}

impl From<u64> for RandflakeId {
    fn from(value: u64) -> Self {
        Self(value & Self::BITMASK_63_BITS)
    }
}

impl From<RandflakeId> for i64 {
    fn from(value: RandflakeId) -> i64 {
        i64::try_from(value.0).unwrap_or(i64::MAX)
    }
}

impl From<RandflakeId> for u64 {
    fn from(value: RandflakeId) -> u64 {
        value.0
    }
}

impl RandflakeId {
    const BITMASK_63_BITS: u64 = 0x7fff_ffff_ffff_ffff;
    const BITMASK_30_BITS: u64 = 0x0000_0000_3fff_ffff;
    const BITMASK_17_BITS: u64 = 0x0000_0000_0001_ffff;
    const BITMASK_16_BITS: u64 = 0x0000_0000_0000_ffff;

    /// Bits reserved for the lease window offset in seconds.
    pub const TIMESTAMP_BITS: u32 = 30;
    /// Bits reserved for the leased node id.
    pub const NODE_BITS: u32 = 17;
    /// Bits reserved for the per-second sequence.
    pub const SEQUENCE_BITS: u32 = 16;

    /// The highest allowed per-second sequence value.
    pub const MAX_SEQUENCE: u64 = Self::BITMASK_16_BITS;
    /// The highest allowed window offset in seconds.
    pub const MAX_TIMESTAMP: u64 = Self::BITMASK_30_BITS;

    /// Number of characters in the encoded textual form.
    pub const ENCODED_WIDTH: usize = 13;

    /// Pack a pre-image tuple. The caller is responsible for running the
    /// result through the keyed permutation before handing it out.
    pub fn from_parts(window_offset_secs: u64, node_id: u64, sequence: u64) -> Self {
        Self(
            ((window_offset_secs & Self::BITMASK_30_BITS) << 33)
                | ((node_id & Self::BITMASK_17_BITS) << 16)
                | (sequence & Self::BITMASK_16_BITS),
        )
    }

    /// Return `Self` in `i64` encoded form.
    pub fn as_encoded_i64(&self) -> i64 {
        i64::from(*self)
    }

    /// Return `Self` in `u64` encoded form.
    pub fn as_encoded(&self) -> u64 {
        u64::from(*self)
    }

    /// Return the fixed-width Crockford base32 textual form.
    pub fn as_string(&self) -> String {
        let mut out = [0u8; Self::ENCODED_WIDTH];
        for (i, c) in out.iter_mut().enumerate() {
            let shift = BITS_PER_CHAR * (Self::ENCODED_WIDTH - 1 - i);
            *c = ALPHABET[((self.0 >> shift) & 0x1f) as usize];
        }
        // All bytes come straight out of the ASCII alphabet.
        String::from_utf8(out.to_vec()).unwrap()
    }

    /// Parse the fixed-width Crockford base32 textual form.
    ///
    /// Lower-case input and the Crockford aliases (`O`→`0`, `I`/`L`→`1`) are
    /// accepted. Anything that is not exactly [Self::ENCODED_WIDTH] valid
    /// characters, or that overflows the 63-bit domain, is rejected.
    pub fn from_string(encoded: &str) -> Result<Self, TelemetryError> {
        if encoded.len() != Self::ENCODED_WIDTH {
            return Err(TelemetryErrorKind::InvalidInput.error_with_msg(format!(
                "Identifier '{encoded}' is not {} characters wide.",
                Self::ENCODED_WIDTH
            )));
        }
        let mut acc = 0u64;
        for (i, b) in encoded.bytes().enumerate() {
            let val = LOOKUP[b as usize];
            if val == NO_VALUE {
                return Err(TelemetryErrorKind::InvalidInput
                    .error_with_msg(format!("Invalid character at position {i}.")));
            }
            if i == 0 && val > 7 {
                // The top character only carries 3 bits of a 63-bit value.
                return Err(TelemetryErrorKind::InvalidInput
                    .error_with_msg("Identifier overflows the 63-bit domain."));
            }
            acc = (acc << BITS_PER_CHAR) | u64::from(val);
        }
        Ok(Self(acc))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encode_is_fixed_width_and_round_trips() {
        for value in [
            0u64,
            1,
            42,
            0x1234_5678_90ab_cdef & RandflakeId::BITMASK_63_BITS,
            RandflakeId::BITMASK_63_BITS,
        ] {
            let id = RandflakeId::from(value);
            let encoded = id.as_string();
            assert_eq!(encoded.len(), RandflakeId::ENCODED_WIDTH);
            assert_eq!(RandflakeId::from_string(&encoded).unwrap(), id);
        }
    }

    #[test]
    fn decode_accepts_lowercase_and_aliases() {
        let id = RandflakeId::from(0x0123_4567_89ab_cdefu64);
        let encoded = id.as_string();
        assert_eq!(
            RandflakeId::from_string(&encoded.to_lowercase()).unwrap(),
            id
        );
        assert_eq!(
            RandflakeId::from_string("0000000000O1L").unwrap(),
            RandflakeId::from_string("0000000000011").unwrap()
        );
    }

    #[test]
    fn decode_rejects_bad_input() {
        assert!(RandflakeId::from_string("").is_err());
        assert!(RandflakeId::from_string("TOOSHORT").is_err());
        assert!(RandflakeId::from_string("0000000000!00").is_err());
        // Value 2^63 needs a top character of '8'.
        assert!(RandflakeId::from_string("8000000000000").is_err());
        assert!(RandflakeId::from_string("7ZZZZZZZZZZZZ").is_ok());
    }

    #[test]
    fn from_parts_packs_fields_without_overlap() {
        let id = RandflakeId::from_parts(
            RandflakeId::MAX_TIMESTAMP,
            (1 << RandflakeId::NODE_BITS) - 1,
            RandflakeId::MAX_SEQUENCE,
        );
        assert_eq!(id.as_encoded(), RandflakeId::BITMASK_63_BITS);
        assert!(id.as_encoded_i64() > 0);
        let lone_node = RandflakeId::from_parts(0, 1, 0);
        assert_eq!(lone_node.as_encoded(), 1 << 16);
    }
}
