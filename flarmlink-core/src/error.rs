//! Error types for radio packet decoding

use thiserror::Error;

/// Reasons a received radio packet does not produce a contact.
///
/// None of these are faults: the caller drops the frame, optionally reports
/// the reason to a diagnostic sink, and carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame is too short to contain a complete packet
    #[error("Packet too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// Population parity of the decrypted packet is odd
    #[error("Bad parity of decoded packet from {address:06X}")]
    Parity { address: u32 },

    /// Address is configured to be ignored
    #[error("Ignored address {0:06X}")]
    IgnoredAddress(u32),

    /// Packet carries our own address
    #[error("Packet carries own address {0:06X}")]
    OwnAddress(u32),
}

impl DecodeError {
    /// True when the sender uses our own address, in which case ownship
    /// should switch to a freshly generated random identifier.
    pub fn is_own_address(&self) -> bool {
        matches!(self, DecodeError::OwnAddress(_))
    }
}
