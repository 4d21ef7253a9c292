// sprox-rs/sprox/src/reader/capabilities.rs

use crate::constants;
use crate::types::Version;

/// Optional reader features, resolved once from the firmware version when a
/// session opens. Layers dispatch on these flags instead of comparing raw
/// version numbers inline.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u16);

impl Capabilities {
    /// Whole request+anticollision+select runs device-side in one call.
    pub const EMBEDDED_SELECT: Self = Self(0x0001);
    /// The EEPROM key store is populated and usable for authentication.
    pub const EEPROM_KEYSTORE: Self = Self(0x0002);
    /// Native Mifare increment/decrement/restore commands.
    pub const NATIVE_VALUE_OPS: Self = Self(0x0004);
    /// Device-side ISO 14443-B select calls.
    pub const B_SELECT: Self = Self(0x0008);
    /// Device-side whole-sector read/write for the large sectors.
    pub const SECTOR_RW: Self = Self(0x0010);
    /// Explicit-slot ISO 14443-B anticollision.
    pub const SLOT_ANTICOLL: Self = Self(0x0020);
    /// Large exchange buffers.
    pub const XXL_BUFFERS: Self = Self(0x0040);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn has(&self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn insert(&mut self, flag: Self) {
        self.0 |= flag.0;
    }

    /// Resolve the capability set for a firmware version.
    pub fn from_version(version: Version) -> Self {
        let v = version.as_u32();
        let mut caps = Self::empty();
        for (threshold, flag) in [
            (constants::FW_EMBEDDED_SELECT, Self::EMBEDDED_SELECT),
            (constants::FW_EEPROM_KEYSTORE, Self::EEPROM_KEYSTORE),
            (constants::FW_NATIVE_VALUE_OPS, Self::NATIVE_VALUE_OPS),
            (constants::FW_B_SELECT, Self::B_SELECT),
            (constants::FW_SECTOR_RW, Self::SECTOR_RW),
            (constants::FW_SLOT_ANTICOLL, Self::SLOT_ANTICOLL),
            (constants::FW_XXL_BUFFERS, Self::XXL_BUFFERS),
        ] {
            if v >= threshold {
                caps.insert(flag);
            }
        }
        caps
    }
}

impl std::ops::BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut set = f.debug_set();
        for (flag, name) in [
            (Self::EMBEDDED_SELECT, "EMBEDDED_SELECT"),
            (Self::EEPROM_KEYSTORE, "EEPROM_KEYSTORE"),
            (Self::NATIVE_VALUE_OPS, "NATIVE_VALUE_OPS"),
            (Self::B_SELECT, "B_SELECT"),
            (Self::SECTOR_RW, "SECTOR_RW"),
            (Self::SLOT_ANTICOLL, "SLOT_ANTICOLL"),
            (Self::XXL_BUFFERS, "XXL_BUFFERS"),
        ] {
            if self.has(flag) {
                set.entry(&name);
            }
        }
        set.finish()
    }
}
