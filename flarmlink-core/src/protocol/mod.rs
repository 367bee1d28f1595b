//! Radio protocol implementations.
//!
//! All functions are pure (no I/O): frames go in as byte arrays, contacts
//! come out, and the transmit side fills a byte array for the radio.
//!
//! # Example
//!
//! ```rust,no_run
//! use flarmlink_core::protocol::legacy;
//! use flarmlink_core::{Ownship, VelocityProjection};
//!
//! let own = Ownship::default();
//! let frame = legacy::encode(&own, &VelocityProjection::from_ownship(&own));
//!
//! match legacy::decode(frame, &own, None) {
//!     Ok(contact) => println!("{:06X} at {:.0} m", contact.address, contact.distance),
//!     Err(e) => println!("dropped: {}", e),
//! }
//! ```

pub mod legacy;

/// Sum of the per-byte bit parities of a word sequence, little-endian
/// byte order. Even totals mean the sequence has even population parity.
pub fn parity_sum(words: &[u32]) -> u32 {
    words
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .map(|b| b.count_ones() & 1)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parity_sum() {
        assert_eq!(parity_sum(&[0]), 0);
        assert_eq!(parity_sum(&[0x0000_0001]), 1);
        assert_eq!(parity_sum(&[0x0000_0003]), 0);
        assert_eq!(parity_sum(&[0x0101_0101]), 4);
        assert_eq!(parity_sum(&[0x8000_0000, 0x0000_0001]), 2);
    }
}
