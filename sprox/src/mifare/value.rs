// sprox-rs/sprox/src/mifare/value.rs

//! Mifare Classic value blocks: the triple-redundant signed counter
//! encoding, and increment/decrement/restore on top of it.

use crate::reader::{Capabilities, Connected, Reader};
use crate::types::{BlockData, Uid};
use crate::{Error, Result, constants};

use super::auth::KeyOrder;
use super::keystore::MifareKey;

/// A decoded value block: a signed 32-bit counter plus the one-byte
/// address tag applications use to chain backup blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueBlock {
    pub value: i32,
    pub address: u8,
}

impl ValueBlock {
    pub fn new(value: i32, address: u8) -> Self {
        Self { value, address }
    }

    /// Encode into the 16-byte block format: value, complemented value,
    /// value again, then the address with its complement twice over.
    pub fn encode(&self) -> BlockData {
        let v = self.value.to_le_bytes();
        let nv = (!self.value).to_le_bytes();
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&v);
        out[4..8].copy_from_slice(&nv);
        out[8..12].copy_from_slice(&v);
        out[12] = self.address;
        out[13] = !self.address;
        out[14] = self.address;
        out[15] = !self.address;
        BlockData::from_bytes(out)
    }

    /// Decode and verify a value block. All three value copies and all
    /// four address bytes must agree, otherwise the block does not hold a
    /// valid counter.
    pub fn decode(block: &BlockData) -> Result<Self> {
        let b = block.as_bytes();
        let v = i32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        let nv = i32::from_le_bytes([b[4], b[5], b[6], b[7]]);
        let v2 = i32::from_le_bytes([b[8], b[9], b[10], b[11]]);
        if nv != !v || v2 != v {
            return Err(Error::ValueFormat);
        }
        let addr = b[12];
        if b[13] != !addr || b[14] != addr || b[15] != !addr {
            return Err(Error::ValueFormat);
        }
        Ok(Self {
            value: v,
            address: addr,
        })
    }
}

impl Reader<Connected> {
    /// Read and decode a value block.
    pub fn mif_read_value(
        &mut self,
        uid: Option<&Uid>,
        block: u8,
        key: Option<&MifareKey>,
    ) -> Result<ValueBlock> {
        let data = self.mif_read_block(uid, block, key)?;
        ValueBlock::decode(&data)
    }

    /// Format a block as a value block.
    pub fn mif_write_value(
        &mut self,
        uid: Option<&Uid>,
        block: u8,
        value: ValueBlock,
        key: Option<&MifareKey>,
    ) -> Result<()> {
        self.mif_write_block(uid, block, &value.encode(), key)
    }

    /// Add `delta` to the counter in `block`.
    ///
    /// On firmware with native value commands this runs the card's own
    /// increment+transfer, which is atomic on the card side. Older
    /// firmware falls back to read-modify-write emulation, which is NOT
    /// atomic with respect to card power loss.
    pub fn mif_increment(
        &mut self,
        uid: Option<&Uid>,
        block: u8,
        delta: i32,
        key: Option<&MifareKey>,
    ) -> Result<()> {
        self.mif_value_op(uid, block, constants::MIF_CMD_INCREMENT, delta, key)
    }

    /// Subtract `delta` from the counter in `block`. Same atomicity notes
    /// as [`mif_increment`](Self::mif_increment).
    pub fn mif_decrement(
        &mut self,
        uid: Option<&Uid>,
        block: u8,
        delta: i32,
        key: Option<&MifareKey>,
    ) -> Result<()> {
        self.mif_value_op(uid, block, constants::MIF_CMD_DECREMENT, delta, key)
    }

    /// Copy the counter in `src_block` to `dst_block` (restore+transfer).
    pub fn mif_restore(
        &mut self,
        uid: Option<&Uid>,
        src_block: u8,
        dst_block: u8,
        key: Option<&MifareKey>,
    ) -> Result<()> {
        if self.capabilities().has(Capabilities::NATIVE_VALUE_OPS) {
            return self.mif_auth_then_op(uid, src_block, key, KeyOrder::BThenA, |s| {
                s.mif_value_raw(constants::MIF_CMD_RESTORE, src_block, 0, dst_block)
            });
        }

        self.mif_auth_then_op(uid, src_block, key, KeyOrder::BThenA, |s| {
            let data = s.mif_read_block_raw(src_block)?;
            let value = ValueBlock::decode(&data)?;
            s.mif_write_block_raw(dst_block, &value.encode())
        })
    }

    fn mif_value_op(
        &mut self,
        uid: Option<&Uid>,
        block: u8,
        op_code: u8,
        delta: i32,
        key: Option<&MifareKey>,
    ) -> Result<()> {
        if delta < 0 {
            return Err(Error::InvalidParameter(
                "value deltas are unsigned; use the opposite operation".into(),
            ));
        }

        if self.capabilities().has(Capabilities::NATIVE_VALUE_OPS) {
            return self.mif_auth_then_op(uid, block, key, KeyOrder::BThenA, |s| {
                s.mif_value_raw(op_code, block, delta, block)
            });
        }

        // Read-modify-write emulation for firmware without the native
        // command; not atomic with respect to card power loss.
        self.mif_auth_then_op(uid, block, key, KeyOrder::BThenA, |s| {
            let data = s.mif_read_block_raw(block)?;
            let mut value = ValueBlock::decode(&data)?;
            value.value = if op_code == constants::MIF_CMD_INCREMENT {
                value.value.wrapping_add(delta)
            } else {
                value.value.wrapping_sub(delta)
            };
            s.mif_write_block_raw(block, &value.encode())
        })
    }

    /// The native value command: operation, source block, operand,
    /// transfer target.
    fn mif_value_raw(&mut self, op_code: u8, block: u8, delta: i32, transfer_block: u8) -> Result<()> {
        let mut params = Vec::with_capacity(7);
        params.push(op_code);
        params.push(block);
        params.extend_from_slice(&delta.to_le_bytes());
        params.push(transfer_block);
        self.function(
            constants::MIF_VALUE,
            &params,
            0,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        Ok(())
    }
}
