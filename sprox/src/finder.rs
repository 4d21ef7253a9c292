// sprox-rs/sprox/src/finder.rs

//! Generic tag finder: protocol arbitration across the incompatible RF
//! families. `find` tries the requested families once in a fixed priority
//! order; `find_wait` adds a bounded poll loop with cooperative
//! cancellation on top.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::reader::{Connected, Reader};
use crate::types::{Atq, Atqb, Sak};
use crate::{Error, Result};

/// Bitmask of protocol families a find call should try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protocols(u8);

impl Protocols {
    pub const TYPE_A: Self = Self(0x01);
    pub const TYPE_B: Self = Self(0x02);
    pub const BPRIME: Self = Self(0x04);
    pub const ISO15693: Self = Self(0x08);
    pub const ICODE1: Self = Self(0x10);
    pub const ANY: Self = Self(0x1F);

    pub fn has(&self, flag: Self) -> bool {
        self.0 & flag.0 != 0
    }
}

impl std::ops::BitOr for Protocols {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The protocol family a tag was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    TypeA,
    TypeB,
    BPrime,
    Iso15693,
    Icode1,
}

/// Protocol-specific activation data for a found tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagInfo {
    TypeA { atq: Atq, sak: Sak },
    TypeB { atqb: Atqb },
    BPrime { atr: Vec<u8> },
    Iso15693,
    Icode1,
}

/// One found tag: the family it answered on, its UID (or PUPI) and the
/// family-specific activation info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundTag {
    pub protocol: Protocol,
    pub uid: Vec<u8>,
    pub info: TagInfo,
}

/// Handle for cancelling a `find_wait` loop from elsewhere. The flag is
/// checked between poll iterations; an in-flight transport round trip is
/// never interrupted.
#[derive(Clone)]
pub struct FindCanceller(Arc<AtomicBool>);

impl FindCanceller {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Fixed arbitration order.
const PRIORITY: [(Protocols, Protocol); 5] = [
    (Protocols::TYPE_A, Protocol::TypeA),
    (Protocols::TYPE_B, Protocol::TypeB),
    (Protocols::BPRIME, Protocol::BPrime),
    (Protocols::ISO15693, Protocol::Iso15693),
    (Protocols::ICODE1, Protocol::Icode1),
];

impl Reader<Connected> {
    /// Obtain a cancellation handle for `find_wait` before starting it.
    pub fn find_canceller(&self) -> FindCanceller {
        FindCanceller(self.cancel.clone())
    }

    /// Try each requested protocol family once, in priority order. The
    /// first family that answers wins. Only "nothing there" class results
    /// move on to the next family; any other error aborts the arbitration
    /// and propagates.
    pub fn find(&mut self, want: Protocols) -> Result<FoundTag> {
        for (flag, protocol) in PRIORITY {
            if !want.has(flag) {
                continue;
            }
            match self.find_one(protocol) {
                Ok(tag) => {
                    log::debug!("found {:?} tag {}", tag.protocol, crate::utils::bytes_to_hex(&tag.uid));
                    return Ok(tag);
                }
                Err(Error::NoTag) | Err(Error::Auth) | Err(Error::NotAuth) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(Error::NoTag)
    }

    fn find_one(&mut self, protocol: Protocol) -> Result<FoundTag> {
        match protocol {
            Protocol::TypeA => {
                let (uid, atq, sak) = self.a_select_any()?;
                Ok(FoundTag {
                    protocol,
                    uid: uid.as_bytes().to_vec(),
                    info: TagInfo::TypeA { atq, sak },
                })
            }
            Protocol::TypeB => {
                let atqb = self.b_select_any(0)?;
                Ok(FoundTag {
                    protocol,
                    uid: atqb.pupi().as_bytes().to_vec(),
                    info: TagInfo::TypeB { atqb },
                })
            }
            Protocol::BPrime => {
                let (uid, atr) = self.bi_apgen()?;
                Ok(FoundTag {
                    protocol,
                    uid: uid.to_vec(),
                    info: TagInfo::BPrime { atr },
                })
            }
            Protocol::Iso15693 => {
                let uid = self.iso15693_select_any(0)?;
                Ok(FoundTag {
                    protocol,
                    uid: uid.as_bytes().to_vec(),
                    info: TagInfo::Iso15693,
                })
            }
            Protocol::Icode1 => {
                let uid = self.i1_select_any()?;
                Ok(FoundTag {
                    protocol,
                    uid: uid.as_bytes().to_vec(),
                    info: TagInfo::Icode1,
                })
            }
        }
    }

    /// Poll for a tag until one arrives, the deadline passes (`NoTag`) or
    /// the loop is cancelled through a [`FindCanceller`] (`Quit`). The
    /// model is strictly synchronous: between attempts the calling thread
    /// sleeps for `interval_ms`.
    pub fn find_wait(
        &mut self,
        want: Protocols,
        interval_ms: u64,
        timeout_ms: u64,
    ) -> Result<FoundTag> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if self.cancel.swap(false, Ordering::Relaxed) {
                return Err(Error::Quit);
            }
            match self.find(want) {
                Ok(tag) => return Ok(tag),
                Err(Error::NoTag) => {}
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                return Err(Error::NoTag);
            }
            std::thread::sleep(Duration::from_millis(interval_ms));
        }
    }
}
