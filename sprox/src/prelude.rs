// sprox-rs/sprox/src/prelude.rs

pub use crate::finder::{FindCanceller, FoundTag, Protocol, Protocols, TagInfo};
pub use crate::iso15693::SystemInfo;
pub use crate::mifare::{
    AccessConditions, KeyStore, KeyType, MifareKey, TRANSPORT_KEY, ValueBlock,
};
pub use crate::reader::{
    Capabilities, CommSettings, Connected, Reader, ReaderSession, Uninitialized,
};
pub use crate::tcl::CID_NONE;
pub use crate::{
    Atq, Atqb, Ats, BlockData, Error, Pupi, Result, Sak, Uid, Uid15693, Version,
};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, default_read_timeout, ms, parse_hex};
