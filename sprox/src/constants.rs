// sprox-rs/sprox/src/constants.rs
//! Common protocol constants used across the crate

/// Start-of-frame byte for the host<->reader wire protocol (binary mode)
pub const FRAME_STX: u8 = 0x02;

/// Negative acknowledge byte the reader may answer instead of a frame
pub const FRAME_NAK: u8 = 0x15;

/// Maximum payload length accepted inside one wire frame
pub const FRAME_CONTENT_SIZE: usize = 1024;

/// Minimal request frame length: stx(1) + opcode(1) + len(2) + lrc(1)
pub const FRAME_MIN_REQUEST_LEN: usize = 5;

/// Minimal response frame length: stx(1) + status(1) + opcode(1) + len(2) + lrc(1)
pub const FRAME_MIN_RESPONSE_LEN: usize = 6;

/// Reader function opcodes. The reader firmware exposes one entry point per
/// opcode; parameters travel in the frame payload.
pub const FCT_GET_FIRMWARE: u8 = 0x01;
pub const FCT_SET_CONFIG: u8 = 0x02;
pub const FCT_GET_CONFIG: u8 = 0x03;

pub const CSB_A_REQUEST: u8 = 0x20;
pub const CSB_A_ANTICOLL: u8 = 0x21;
pub const CSB_A_SELECT: u8 = 0x22;
pub const CSB_A_HALT: u8 = 0x23;
pub const CSB_A_EXCHANGE: u8 = 0x24;
pub const CSB_A_EXCHANGE_BITS: u8 = 0x25;
pub const CSB_SELECT_ANY: u8 = 0x26;
pub const CSB_SELECT_IDLE: u8 = 0x27;

pub const CSB_B_EXCHANGE: u8 = 0x30;
pub const CSB_B_SELECT_ANY: u8 = 0x31;
pub const CSB_B_SELECT_IDLE: u8 = 0x32;
pub const CSB_B_ANTICOLL: u8 = 0x33;

pub const TCL_GET_ATS: u8 = 0x40;
pub const TCL_PPS: u8 = 0x41;
pub const TCL_EXCHANGE: u8 = 0x42;
pub const TCL_DESELECT: u8 = 0x43;
pub const TCL_ATTRIB: u8 = 0x44;

pub const BI_APGEN: u8 = 0x48;
pub const BI_ATTRIB: u8 = 0x49;

pub const V3_SELECT_ANY: u8 = 0x50;
pub const V3_EXCHANGE: u8 = 0x51;
pub const V3_HALT: u8 = 0x52;

pub const I1_SELECT_ANY: u8 = 0x58;
pub const I1_READ: u8 = 0x59;
pub const I1_WRITE: u8 = 0x5A;

pub const MIF_LOAD_KEY: u8 = 0x60;
pub const MIF_AUTH: u8 = 0x61;
pub const MIF_READ: u8 = 0x62;
pub const MIF_WRITE: u8 = 0x63;
pub const MIF_VALUE: u8 = 0x64;
pub const MIF_READ_SECTOR: u8 = 0x65;
pub const MIF_WRITE_SECTOR: u8 = 0x66;

/// ISO 14443-A frame command bytes used on the host-driven paths
pub const PICC_REQA: u8 = 0x26;
pub const PICC_WUPA: u8 = 0x52;
pub const PICC_CASCADE_TAG: u8 = 0x88;
pub const PICC_SEL_CL1: u8 = 0x93;
pub const PICC_SEL_CL2: u8 = 0x95;
pub const PICC_SEL_CL3: u8 = 0x97;
pub const PICC_HLTA: u8 = 0x50;

/// ISO 14443-B frame bytes
pub const PICC_APF: u8 = 0x05;
pub const PICC_ATQB: u8 = 0x50;
pub const PICC_HLTB: u8 = 0x50;

/// Mifare Classic command bytes (sent by the reader on our behalf)
pub const MIF_CMD_AUTH_A: u8 = 0x60;
pub const MIF_CMD_AUTH_B: u8 = 0x61;
pub const MIF_CMD_DECREMENT: u8 = 0xC0;
pub const MIF_CMD_INCREMENT: u8 = 0xC1;
pub const MIF_CMD_RESTORE: u8 = 0xC2;
pub const MIF_CMD_TRANSFER: u8 = 0xB0;

/// ISO 15693 command codes (standard and extended address/length forms)
pub const V3_CMD_READ_SINGLE: u8 = 0x20;
pub const V3_CMD_WRITE_SINGLE: u8 = 0x21;
pub const V3_CMD_LOCK: u8 = 0x22;
pub const V3_CMD_READ_MULTIPLE: u8 = 0x23;
pub const V3_CMD_WRITE_MULTIPLE: u8 = 0x24;
pub const V3_CMD_SELECT: u8 = 0x25;
pub const V3_CMD_GET_SYSTEM_INFO: u8 = 0x2B;
pub const V3_CMD_EXT_READ_SINGLE: u8 = 0x30;
pub const V3_CMD_EXT_WRITE_SINGLE: u8 = 0x31;
pub const V3_CMD_EXT_LOCK: u8 = 0x32;
pub const V3_CMD_EXT_READ_MULTIPLE: u8 = 0x33;
pub const V3_CMD_EXT_WRITE_MULTIPLE: u8 = 0x34;
pub const V3_CMD_EXT_GET_SYSTEM_INFO: u8 = 0x3B;

/// ISO 15693 request flag bits
pub const V3_FLAG_HIGH_RATE: u8 = 0x02;
pub const V3_FLAG_PROT_EXT: u8 = 0x08;
pub const V3_FLAG_ADDRESS: u8 = 0x20;

/// Firmware version thresholds gating optional reader features
pub const FW_EMBEDDED_SELECT: u32 = 0x0001_2000;
pub const FW_EEPROM_KEYSTORE: u32 = 0x0001_2500;
pub const FW_NATIVE_VALUE_OPS: u32 = 0x0001_3000;
pub const FW_B_SELECT: u32 = 0x0001_3500;
pub const FW_SECTOR_RW: u32 = 0x0001_3800;
pub const FW_SLOT_ANTICOLL: u32 = 0x0001_4102;
pub const FW_XXL_BUFFERS: u32 = 0x0001_5000;

/// Mifare key store geometry: the reader keeps 4 A + 4 B keys in RAM and
/// 16 A + 16 B keys in EEPROM. Stores are write-only by hardware design.
pub const MIF_RAM_KEYS: u8 = 4;
pub const MIF_EEPROM_KEYS: u8 = 16;

/// Default exchange timeout, expressed in ETU (one ETU is ~9.44 us at 106 kbps)
pub const DEFAULT_EXCHANGE_TIMEOUT_ETU: u16 = 4096;
