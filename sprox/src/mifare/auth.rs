// sprox-rs/sprox/src/mifare/auth.rs

//! The bounded multi-key authentication search. One generic
//! try-auth-then-op loop serves reads, writes and trailer updates; the
//! differences between them are the key-type order policy and the
//! operation closure.

use crate::reader::{Capabilities, Connected, Reader};
use crate::types::Uid;
use crate::{Error, Result, constants};

use super::keystore::{KeyStore, KeyType, MifareKey};

/// Key-type order policy for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyOrder {
    /// A before B within each slot. Reads default to this: A is the
    /// conventional read key.
    AThenB,
    /// B before A within each slot. Writes default to this: B is the
    /// conventional write key.
    BThenA,
    /// Every A slot before any B slot. Trailer updates use this to bias
    /// toward transport-condition cards, which only accept key A.
    AFullyFirst,
}

impl KeyOrder {
    fn pair(&self) -> [KeyType; 2] {
        match self {
            Self::AThenB | Self::AFullyFirst => [KeyType::A, KeyType::B],
            Self::BThenA => [KeyType::B, KeyType::A],
        }
    }
}

/// The ordered `(store, type, slot)` tuples one search walks through.
/// RAM slots come before EEPROM slots; the EEPROM store is skipped
/// entirely on firmware without it.
pub(crate) fn search_plan(
    order: KeyOrder,
    caps: crate::reader::Capabilities,
) -> Vec<(KeyStore, KeyType, u8)> {
    let mut stores = vec![KeyStore::Ram];
    if caps.has(Capabilities::EEPROM_KEYSTORE) {
        stores.push(KeyStore::Eeprom);
    }

    let mut plan = Vec::new();
    match order {
        KeyOrder::AThenB | KeyOrder::BThenA => {
            for store in &stores {
                for slot in 0..store.capacity() {
                    for kt in order.pair() {
                        plan.push((*store, kt, slot));
                    }
                }
            }
        }
        KeyOrder::AFullyFirst => {
            for kt in order.pair() {
                for store in &stores {
                    for slot in 0..store.capacity() {
                        plan.push((*store, kt, slot));
                    }
                }
            }
        }
    }
    plan
}

/// "Wrong key, keep trying" class: anything else aborts a search.
fn auth_retryable(e: &Error) -> bool {
    matches!(e, Error::Auth | Error::NotAuth | Error::NoTag)
}

impl Reader<Connected> {
    /// Authenticate `block` with a stored key.
    fn mif_auth_stored(
        &mut self,
        key_type: KeyType,
        store: KeyStore,
        slot: u8,
        block: u8,
    ) -> Result<()> {
        self.function(
            constants::MIF_AUTH,
            &[key_type.command_code(), store.wire_code(), slot, block],
            0,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        Ok(())
    }

    /// Authenticate `block` with an explicit key value.
    fn mif_auth_value(&mut self, key_type: KeyType, key: &[u8; 6], block: u8) -> Result<()> {
        let mut params = Vec::with_capacity(10);
        params.push(key_type.command_code());
        params.push(0x00);
        params.push(0x00);
        params.push(block);
        params.extend_from_slice(key);
        self.function(
            constants::MIF_AUTH,
            &params,
            0,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        Ok(())
    }

    fn mif_auth_key(&mut self, key_type: KeyType, key: &MifareKey, block: u8) -> Result<()> {
        match key {
            MifareKey::Value(k) => self.mif_auth_value(key_type, k, block),
            MifareKey::Ram(slot) => self.mif_auth_stored(key_type, KeyStore::Ram, *slot, block),
            MifareKey::Eeprom(slot) => {
                self.require(Capabilities::EEPROM_KEYSTORE)?;
                self.mif_auth_stored(key_type, KeyStore::Eeprom, *slot, block)
            }
        }
    }

    /// The generic authenticate-then-operate loop.
    ///
    /// With a cached successful authentication and no explicit key the
    /// operation is attempted directly first, trading one potential extra
    /// round trip against the cost of re-authenticating every call. After
    /// that: reselect, authenticate, operate, for each candidate key until
    /// one succeeds. Only authentication-class failures move to the next
    /// candidate; any other error aborts the search immediately.
    pub(crate) fn mif_auth_then_op<T>(
        &mut self,
        uid: Option<&Uid>,
        block: u8,
        key: Option<&MifareKey>,
        order: KeyOrder,
        mut op: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if key.is_none() && self.mif_auth_ok {
            match op(self) {
                Ok(v) => return Ok(v),
                Err(e) if auth_retryable(&e) => {
                    self.mif_auth_ok = false;
                }
                Err(e) => return Err(e),
            }
        }
        self.mif_auth_ok = false;

        let uid = uid.copied();
        match key {
            Some(key) => {
                // Explicit key: try it under both key types in policy
                // order, nothing else.
                let key = *key;
                for key_type in order.pair() {
                    match self.mif_auth_attempt(uid.as_ref(), block, key_type, &key, &mut op) {
                        Ok(v) => return Ok(v),
                        Err(e) if auth_retryable(&e) => continue,
                        Err(e) => return Err(e),
                    }
                }
            }
            None => {
                for (store, key_type, slot) in search_plan(order, self.capabilities()) {
                    let key = match store {
                        KeyStore::Ram => MifareKey::Ram(slot),
                        KeyStore::Eeprom => MifareKey::Eeprom(slot),
                    };
                    match self.mif_auth_attempt(uid.as_ref(), block, key_type, &key, &mut op) {
                        Ok(v) => return Ok(v),
                        Err(e) if auth_retryable(&e) => continue,
                        Err(e) => return Err(e),
                    }
                }
            }
        }
        Err(Error::Auth)
    }

    /// One candidate: reselect (mandatory, the card drops its crypto state
    /// on a failed authentication), authenticate, run the operation. A
    /// silent field during the reselect counts as a retryable miss like a
    /// denied authentication does; the card may answer the next round.
    fn mif_auth_attempt<T>(
        &mut self,
        uid: Option<&Uid>,
        block: u8,
        key_type: KeyType,
        key: &MifareKey,
        op: &mut impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.a_select_again(uid)?;
        self.mif_auth_key(key_type, key, block)?;
        let v = op(self)?;
        self.mif_auth_ok = true;
        Ok(v)
    }
}
