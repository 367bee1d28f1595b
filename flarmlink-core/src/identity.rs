//! Random aircraft identifiers

use crate::address::AddressType;
use crate::aircraft::Ownship;

const RANDOM_BITS: u32 = 0x000F_FFFF;
const RANDOM_PREFIX: u32 = 0x00E0_0000;
const ANONYMOUS_PREFIX: u32 = 0x00F0_0000;

/// Derive a 24-bit address from a random seed.
///
/// The low 20 bits come from the seed; the high nibble is 0xE for random
/// addresses and 0xF for anything else, keeping both out of the ICAO
/// blocks that are in practical use.
pub fn random_address(seed: u32, address_type: AddressType) -> u32 {
    let id = (seed ^ (seed << 5) ^ (seed >> 5)) & RANDOM_BITS;
    match address_type {
        AddressType::Random => id | RANDOM_PREFIX,
        _ => id | ANONYMOUS_PREFIX,
    }
}

impl Ownship {
    /// Switch to a fresh anonymous address after hearing our own address
    /// from another transmitter. Returns the new address.
    pub fn regenerate_address(&mut self, seed: u32) -> u32 {
        self.address_type = AddressType::Anonymous;
        self.address = random_address(seed, AddressType::Anonymous);
        log::info!("Switched to random address {:06X}", self.address);
        self.address
    }
}
