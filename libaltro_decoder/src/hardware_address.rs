use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::constants::*;

/// HardwareAddress is the decomposed 12 bit ALTRO hardware address of a readout channel.
///
/// Translating it into detector coordinates is left to the per-detector mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HardwareAddress {
    pub branch: u8,
    pub fec: u8,
    pub chip: u8,
    pub channel: u8,
}

impl HardwareAddress {
    /// Construct a new hardware address from its parts
    pub fn new(branch: u8, fec: u8, chip: u8, channel: u8) -> Self {
        HardwareAddress {
            branch,
            fec,
            chip,
            channel,
        }
    }

    /// Decompose a raw hardware address. Bits above the 12 bit field are ignored.
    pub fn from_raw(hadd: u16) -> Self {
        let hadd = hadd & HADD_MASK;
        HardwareAddress {
            branch: ((hadd >> HADD_BRANCH_SHIFT) & HADD_BRANCH_MASK) as u8,
            fec: ((hadd >> HADD_FEC_SHIFT) & HADD_FEC_MASK) as u8,
            chip: ((hadd >> HADD_CHIP_SHIFT) & HADD_CHIP_MASK) as u8,
            channel: (hadd & HADD_CHANNEL_MASK) as u8,
        }
    }

    /// Pack back into the raw 12 bit form. Out of range parts are masked.
    pub fn to_raw(&self) -> u16 {
        ((self.branch as u16 & HADD_BRANCH_MASK) << HADD_BRANCH_SHIFT)
            | ((self.fec as u16 & HADD_FEC_MASK) << HADD_FEC_SHIFT)
            | ((self.chip as u16 & HADD_CHIP_MASK) << HADD_CHIP_SHIFT)
            | (self.channel as u16 & HADD_CHANNEL_MASK)
    }
}

impl From<u16> for HardwareAddress {
    fn from(value: u16) -> Self {
        Self::from_raw(value)
    }
}

impl Display for HardwareAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Branch: {} FEC: {} Chip: {} Channel: {}",
            self.branch, self.fec, self.chip, self.channel
        )
    }
}

//Unit tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose() {
        let address = HardwareAddress::from_raw(0b1_0101_011_1001);
        assert_eq!(address, HardwareAddress::new(1, 5, 3, 9));
        assert_eq!(address.to_raw(), 0b1_0101_011_1001);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(HardwareAddress::from_raw(0), HardwareAddress::new(0, 0, 0, 0));
        assert_eq!(
            HardwareAddress::from_raw(0xfff),
            HardwareAddress::new(1, 15, 7, 15)
        );
        // Only the low 12 bits take part
        assert_eq!(HardwareAddress::from(0xf123), HardwareAddress::from_raw(0x123));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            HardwareAddress::new(0, 2, 4, 6).to_string(),
            "Branch: 0 FEC: 2 Chip: 4 Channel: 6"
        );
    }
}
