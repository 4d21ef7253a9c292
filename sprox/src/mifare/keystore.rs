// sprox-rs/sprox/src/mifare/keystore.rs

//! Mifare Classic key handling. The reader holds two write-only key
//! stores: a small RAM table and a larger EEPROM table, each split into A
//! and B typed entries. Keys are loaded explicitly and consumed by the
//! authentication engine; the hardware offers no way to read them back.

use crate::reader::{Capabilities, Connected, Reader};
use crate::{Error, Result, constants};

/// The factory-default transport key.
pub const TRANSPORT_KEY: [u8; 6] = [0xFF; 6];

/// Mifare key type: A or B. Which one grants which operation depends on
/// the sector's access conditions; by convention B is the write key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    A,
    B,
}

impl KeyType {
    /// The authentication command byte for this key type.
    pub fn command_code(&self) -> u8 {
        match self {
            Self::A => constants::MIF_CMD_AUTH_A,
            Self::B => constants::MIF_CMD_AUTH_B,
        }
    }
}

/// Which of the reader's key stores a slot lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStore {
    Ram,
    Eeprom,
}

impl KeyStore {
    pub fn capacity(&self) -> u8 {
        match self {
            Self::Ram => constants::MIF_RAM_KEYS,
            Self::Eeprom => constants::MIF_EEPROM_KEYS,
        }
    }

    pub(crate) fn wire_code(&self) -> u8 {
        match self {
            Self::Ram => 0x01,
            Self::Eeprom => 0x02,
        }
    }
}

/// A key for an authentication attempt: an explicit 6-byte value, or a
/// slot in one of the reader's stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MifareKey {
    Value([u8; 6]),
    Ram(u8),
    Eeprom(u8),
}

impl From<[u8; 6]> for MifareKey {
    fn from(key: [u8; 6]) -> Self {
        Self::Value(key)
    }
}

impl Reader<Connected> {
    /// Load a key into a store slot. EEPROM slots only exist on firmware
    /// carrying the persistent store.
    pub fn mif_load_key(
        &mut self,
        store: KeyStore,
        key_type: KeyType,
        slot: u8,
        key: &[u8; 6],
    ) -> Result<()> {
        if slot >= store.capacity() {
            return Err(Error::InvalidParameter(format!(
                "slot {} out of range for {:?} store of {}",
                slot,
                store,
                store.capacity()
            )));
        }
        if store == KeyStore::Eeprom {
            self.require(Capabilities::EEPROM_KEYSTORE)?;
        }

        let mut params = Vec::with_capacity(9);
        params.push(store.wire_code());
        params.push(key_type.command_code());
        params.push(slot);
        params.extend_from_slice(key);
        self.function(
            constants::MIF_LOAD_KEY,
            &params,
            0,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        Ok(())
    }
}
