// sprox-rs/sprox/src/mifare/access.rs

//! Sector trailer construction: the interleaved access-condition nibbles
//! and the trailer update operation on top of the auth search.

use crate::reader::{Connected, Reader};
use crate::types::{BlockData, Uid};
use crate::{Error, Result};

use super::auth::KeyOrder;
use super::keystore::MifareKey;
use super::{data_block_count, trailer_block};

/// Access condition codes for the four logical blocks of a sector: three
/// data groups plus the trailer itself. Each code is 3 bits (C1, C2, C3,
/// most significant first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessConditions(pub [u8; 4]);

impl AccessConditions {
    /// The factory transport configuration: data free for key A, trailer
    /// writable with key A.
    pub const TRANSPORT: Self = Self([0b000, 0b000, 0b000, 0b001]);

    /// A common secured configuration: data read A|B / write B, trailer
    /// locked to key B.
    pub const SECURED: Self = Self([0b100, 0b100, 0b100, 0b011]);

    /// Pack the four 3-bit codes into the interleaved wire bytes 6..9 of
    /// the trailer. Each condition bit is stored once plain and once
    /// complemented, spread over the three bytes.
    pub fn pack(&self) -> [u8; 3] {
        let mut c1 = 0u8;
        let mut c2 = 0u8;
        let mut c3 = 0u8;
        for (i, code) in self.0.iter().enumerate() {
            c1 |= ((code >> 2) & 1) << i;
            c2 |= ((code >> 1) & 1) << i;
            c3 |= (code & 1) << i;
        }
        [
            (!c2 & 0x0F) << 4 | (!c1 & 0x0F),
            (c1 & 0x0F) << 4 | (!c3 & 0x0F),
            (c3 & 0x0F) << 4 | (c2 & 0x0F),
        ]
    }

    /// Unpack wire bytes, verifying the complemented copies.
    pub fn unpack(raw: &[u8; 3]) -> Result<Self> {
        let c1 = (raw[1] >> 4) & 0x0F;
        let c2 = raw[2] & 0x0F;
        let c3 = (raw[2] >> 4) & 0x0F;
        if (!c2 & 0x0F) != (raw[0] >> 4) & 0x0F
            || (!c1 & 0x0F) != raw[0] & 0x0F
            || (!c3 & 0x0F) != raw[1] & 0x0F
        {
            return Err(Error::ResponseInvalid(
                "access bits fail complement check".into(),
            ));
        }

        let mut codes = [0u8; 4];
        for (i, code) in codes.iter_mut().enumerate() {
            *code = ((c1 >> i) & 1) << 2 | ((c2 >> i) & 1) << 1 | ((c3 >> i) & 1);
        }
        Ok(Self(codes))
    }
}

impl Reader<Connected> {
    /// Rewrite a sector trailer: both keys, the packed access conditions
    /// and the general-purpose byte.
    ///
    /// With no `old_key` the search tries every key-A slot before any
    /// key-B slot: freshly personalized cards sit in the transport
    /// configuration, which only accepts key A on the trailer.
    pub fn mif_update_access_block(
        &mut self,
        uid: Option<&Uid>,
        sector: u8,
        old_key: Option<&MifareKey>,
        key_a: &[u8; 6],
        key_b: &[u8; 6],
        access: AccessConditions,
        gpb: u8,
    ) -> Result<()> {
        // checks the sector number as a side effect
        let _ = data_block_count(sector)?;
        let block = trailer_block(sector);

        let mut trailer = [0u8; 16];
        trailer[0..6].copy_from_slice(key_a);
        trailer[6..9].copy_from_slice(&access.pack());
        trailer[9] = gpb;
        trailer[10..16].copy_from_slice(key_b);
        let trailer = BlockData::from_bytes(trailer);

        let order = match old_key {
            Some(_) => KeyOrder::BThenA,
            None => KeyOrder::AFullyFirst,
        };
        self.mif_auth_then_op(uid, block, old_key, order, |s| {
            s.mif_write_block_raw(block, &trailer)
        })
    }
}
