// sprox-rs/sprox/src/protocol/mod.rs

pub mod checksum;
pub mod crc;
pub mod frame;
pub mod parser;

pub use checksum::lrc;
pub use crc::{crc_a, crc_b, crc_iso15693};
pub use frame::{Frame, ResponseFrame};
