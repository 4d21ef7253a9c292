// sprox-rs/sprox/src/types.rs

use crate::Error;
use std::convert::TryFrom;

/// ISO 14443-A UID - Newtype Pattern (4, 7 or 10 バイト)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uid {
    bytes: [u8; 10],
    len: u8,
}

impl Uid {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(self.as_bytes())
    }
}

impl TryFrom<&[u8]> for Uid {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        match bytes.len() {
            4 | 7 | 10 => {
                let mut arr = [0u8; 10];
                arr[..bytes.len()].copy_from_slice(bytes);
                Ok(Self {
                    bytes: arr,
                    len: bytes.len() as u8,
                })
            }
            n => Err(Error::InvalidParameter(format!(
                "uid must be 4, 7 or 10 bytes, got {}",
                n
            ))),
        }
    }
}

/// PUPI - the ISO 14443-B addressing token (4 バイト)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pupi([u8; 4]);

impl Pupi {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Pupi {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 4 {
            return Err(Error::ResponseInvalid(format!(
                "pupi must be 4 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 4];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }
}

/// ATQ - ISO 14443-A answer to request (2 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Atq([u8; 2]);

impl Atq {
    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }

    /// UID size announced in the ATQ: bits 7-6 of the first byte encode
    /// single (4), double (7) or triple (10) size.
    pub fn uid_size(&self) -> crate::Result<usize> {
        match self.0[0] & 0xC0 {
            0x00 => Ok(4),
            0x40 => Ok(7),
            0x80 => Ok(10),
            _ => Err(Error::ResponseInvalid("reserved uid size in atq".into())),
        }
    }
}

/// SAK - select acknowledge (ISO 14443-A)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sak(u8);

impl Sak {
    pub fn new(value: u8) -> Self {
        Self(value)
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Cascade bit: the UID is not complete at this cascade level.
    pub fn cascade(&self) -> bool {
        self.0 & 0x04 != 0
    }

    /// The card offers ISO 14443-4 (T=CL) on top of layer 3.
    pub fn supports_iso14443_4(&self) -> bool {
        self.0 & 0x20 != 0
    }

    /// Heuristic for NXP Mifare Classic family cards (1K/4K/Mini).
    pub fn is_mifare_classic(&self) -> bool {
        self.0 & 0x08 != 0
    }
}

/// ATQB - the 11 information bytes following the 0x50 answer byte:
/// PUPI(4) + application data(4) + protocol info(3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Atqb([u8; 11]);

impl Atqb {
    pub fn from_bytes(bytes: [u8; 11]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 11] {
        &self.0
    }

    pub fn pupi(&self) -> Pupi {
        let mut arr = [0u8; 4];
        arr.copy_from_slice(&self.0[..4]);
        Pupi::from_bytes(arr)
    }

    pub fn application_data(&self) -> &[u8] {
        &self.0[4..8]
    }

    pub fn protocol_info(&self) -> &[u8] {
        &self.0[8..11]
    }
}

impl TryFrom<&[u8]> for Atqb {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 11 {
            return Err(Error::ResponseInvalid(format!(
                "atqb must be 11 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 11];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }
}

/// Parsed ATS (answer to select) as returned by a T=CL card.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ats {
    /// FSCI nibble from the format byte (max frame size index)
    pub fsci: u8,
    /// Bit-rate capability byte, when present
    pub ta1: Option<u8>,
    /// Frame waiting / startup time byte, when present
    pub tb1: Option<u8>,
    /// Protocol options byte, when present
    pub tc1: Option<u8>,
    /// Historical bytes
    pub historical: Vec<u8>,
}

impl Ats {
    /// Parse raw ATS bytes: TL, T0, optional TA1/TB1/TC1 gated by the T0
    /// presence bits, then historical bytes up to TL.
    pub fn parse(raw: &[u8]) -> crate::Result<Self> {
        if raw.is_empty() {
            return Err(Error::ResponseInvalid("empty ats".into()));
        }
        let tl = raw[0] as usize;
        if tl != raw.len() {
            return Err(Error::ResponseInvalid(format!(
                "ats length byte {} does not match {} received",
                tl,
                raw.len()
            )));
        }
        if raw.len() < 2 {
            // TL alone: a degenerate but legal ATS
            return Ok(Self {
                fsci: 0,
                ta1: None,
                tb1: None,
                tc1: None,
                historical: Vec::new(),
            });
        }

        let t0 = raw[1];
        let fsci = t0 & 0x0F;
        let mut idx = 2usize;
        let ta1 = take_interface_byte(raw, &mut idx, t0 & 0x10 != 0)?;
        let tb1 = take_interface_byte(raw, &mut idx, t0 & 0x20 != 0)?;
        let tc1 = take_interface_byte(raw, &mut idx, t0 & 0x40 != 0)?;
        let historical = raw[idx..].to_vec();

        Ok(Self {
            fsci,
            ta1,
            tb1,
            tc1,
            historical,
        })
    }

    /// Whether the card accepts a CID byte in T=CL blocks (TC1 bit 1).
    /// Absent TC1 means CID supported, per the ISO default.
    pub fn supports_cid(&self) -> bool {
        self.tc1.map_or(true, |tc1| tc1 & 0x02 != 0)
    }

    /// Check a DSI/DRI pair against the advertised bit-rate capability.
    /// DSI covers the card->reader direction (TA1 bits 4-6), DRI the
    /// reader->card direction (TA1 bits 0-2); divisor index 0 (106 kbps)
    /// is always supported.
    pub fn supports_rates(&self, dsi: u8, dri: u8) -> bool {
        if dsi > 3 || dri > 3 {
            return false;
        }
        let ta1 = self.ta1.unwrap_or(0);
        let ds_ok = dsi == 0 || ta1 & (0x10 << (dsi - 1)) != 0;
        let dr_ok = dri == 0 || ta1 & (0x01 << (dri - 1)) != 0;
        ds_ok && dr_ok
    }
}

fn take_interface_byte(raw: &[u8], idx: &mut usize, present: bool) -> crate::Result<Option<u8>> {
    if !present {
        return Ok(None);
    }
    let b = raw
        .get(*idx)
        .copied()
        .ok_or_else(|| Error::ResponseInvalid("ats interface byte missing".into()))?;
    *idx += 1;
    Ok(Some(b))
}

/// ISO 15693 UID - Newtype Pattern (8 バイト)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uid15693([u8; 8]);

impl Uid15693 {
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(self.as_bytes())
    }
}

impl TryFrom<&[u8]> for Uid15693 {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 8 {
            return Err(Error::ResponseInvalid(format!(
                "iso15693 uid must be 8 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }
}

/// BlockData (16 バイト) - one Mifare Classic block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockData([u8; 16]);

impl BlockData {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex_spaced(self.as_bytes())
    }
}

/// Reader firmware version, packed big-endian from the 4 version bytes.
/// Comparisons against the `FW_*` thresholds gate optional features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
#[display(fmt = "{:#010x}", _0)]
pub struct Version(u32);

impl Version {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    pub const fn from_u32(v: u32) -> Self {
        Self(v)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}
