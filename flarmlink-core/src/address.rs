//! Aircraft address types and protocol tags

use serde::{Deserialize, Serialize};

/// Mask for the 24-bit aircraft address
pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;

/// How an aircraft address was assigned (3-bit field on the wire)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    /// Randomly generated, changes between flights
    Random,
    /// Fixed ICAO 24-bit address
    #[default]
    Icao,
    /// Fixed address assigned by the device vendor
    Flarm,
    /// Random address with stealth-style anonymity
    Anonymous,
    /// Address from the OGN device database
    Ogn,
    /// Any other value seen on the wire
    Unknown(u8),
}

impl AddressType {
    pub fn from_value(v: u8) -> Self {
        match v {
            0 => AddressType::Random,
            1 => AddressType::Icao,
            2 => AddressType::Flarm,
            3 => AddressType::Anonymous,
            4 => AddressType::Ogn,
            _ => AddressType::Unknown(v),
        }
    }

    pub fn value(self) -> u8 {
        match self {
            AddressType::Random => 0,
            AddressType::Icao => 1,
            AddressType::Flarm => 2,
            AddressType::Anonymous => 3,
            AddressType::Ogn => 4,
            AddressType::Unknown(v) => v,
        }
    }

    /// Get the address type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Random => "random",
            AddressType::Icao => "icao",
            AddressType::Flarm => "flarm",
            AddressType::Anonymous => "anonymous",
            AddressType::Ogn => "ogn",
            AddressType::Unknown(_) => "unknown",
        }
    }
}

impl std::fmt::Display for AddressType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a contact's data came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Legacy radio packet decoded locally
    #[default]
    Legacy,
    /// Traffic sentence relayed by an external FLARM unit
    Nmea,
    /// Traffic report relayed by a GDL90 source
    Gdl90,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Legacy => "Legacy",
            Protocol::Nmea => "NMEA",
            Protocol::Gdl90 => "GDL90",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Protocol {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(Protocol::Legacy),
            "nmea" => Ok(Protocol::Nmea),
            "gdl90" => Ok(Protocol::Gdl90),
            _ => Err(format!("Unknown protocol: {}", s)),
        }
    }
}
