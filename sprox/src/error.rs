// sprox-rs/sprox/src/error.rs

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("reader not found")]
    ReaderNotFound,

    // USB 実装を後から有効化できるように optional dependency にしている
    #[cfg(feature = "usb")]
    #[error("usb error: {0}")]
    Usb(#[from] rusb::Error),

    #[error("no tag in field")]
    NoTag,
    #[error("card crc error")]
    Crc,
    #[error("authentication denied by card")]
    Auth,
    #[error("card parity error")]
    Parity,
    #[error("card rejected the command")]
    CodeError,
    #[error("serial number check failed")]
    SerNr,
    #[error("key load rejected")]
    KeyLoad,
    #[error("not authenticated")]
    NotAuth,
    #[error("wrong bit count in card response")]
    BitCount,
    #[error("wrong byte count in card response")]
    ByteCount,
    #[error("value block format error")]
    ValueFormat,
    #[error("card write failed")]
    Write,
    #[error("card framing error")]
    Framing,
    #[error("collision between cards")]
    Collision,
    #[error("card protocol error")]
    ProtocolError,
    /// Card-origin status the library has no dedicated variant for.
    #[error("card error (status {code})")]
    Card { code: i16 },

    #[error("wait loop cancelled")]
    Quit,
    #[error("malformed response: {0}")]
    ResponseInvalid(String),
    #[error("response larger than caller buffer: expected at most {expected}, got {actual}")]
    ResponseOverflow { expected: usize, actual: usize },
    #[error("command too long for reader frame: limit {limit}, got {actual}")]
    CommandOverflow { limit: usize, actual: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("function not available on this reader")]
    UnknownFunction,
    #[error("reader answered nak")]
    ReceiveNak,
    #[error("frame checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },
    #[error("communication timed out")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Map this error to the vendor's signed 16-bit status code. `0` is
    /// success (never an `Error`); `-1..=-128` are card-origin codes and
    /// `-129..=-255` are library-origin codes.
    pub fn legacy_code(&self) -> i16 {
        match self {
            Self::NoTag => -1,
            Self::Crc => -2,
            Self::Auth => -4,
            Self::Parity => -5,
            Self::CodeError => -6,
            Self::SerNr => -8,
            Self::KeyLoad => -9,
            Self::NotAuth => -10,
            Self::BitCount => -11,
            Self::ByteCount => -12,
            Self::ValueFormat => -15,
            Self::Write => -17,
            Self::Framing => -23,
            Self::Collision => -24,
            Self::ProtocolError => -28,
            Self::Card { code } => *code,

            Self::ReaderNotFound => -129,
            Self::Quit => -130,
            Self::ResponseInvalid(_) => -131,
            Self::ResponseOverflow { .. } => -132,
            Self::CommandOverflow { .. } => -133,
            Self::InvalidParameter(_) => -134,
            Self::UnknownFunction => -240,
            Self::ReceiveNak => -242,
            Self::ChecksumMismatch { .. } => -243,
            #[cfg(feature = "usb")]
            Self::Usb(_) => -245,
            Self::Timeout => -246,
        }
    }

    /// True for errors that originate on the card side of the RF link, i.e.
    /// the recoverable class a caller may retry or reselect after.
    pub fn is_card_error(&self) -> bool {
        let code = self.legacy_code();
        (-128..=-1).contains(&code)
    }

    /// Decode a reader status byte into a typed error. The byte carries the
    /// negated card status (`0x01` = no tag, `0x02` = crc, ...). `0xFF` is
    /// the historical CSB-3 response for an empty field and is remapped to
    /// `NoTag` so callers see one uniform "no card" condition.
    pub fn from_card_status(status: u8) -> Self {
        match status {
            0x01 | 0xFF => Self::NoTag,
            0x02 => Self::Crc,
            0x04 => Self::Auth,
            0x05 => Self::Parity,
            0x06 => Self::CodeError,
            0x08 => Self::SerNr,
            0x09 => Self::KeyLoad,
            0x0A => Self::NotAuth,
            0x0B => Self::BitCount,
            0x0C => Self::ByteCount,
            0x0F => Self::ValueFormat,
            0x11 => Self::Write,
            0x17 => Self::Framing,
            0x18 => Self::Collision,
            0x1C => Self::ProtocolError,
            other => Self::Card {
                code: -(other as i16),
            },
        }
    }
}
