// sprox-rs/sprox/src/reader/session.rs

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::protocol::parser;
use crate::transport::Transport;
use crate::types::{Ats, Pupi, Uid, Uid15693, Version};
use crate::{Result, constants};

use super::capabilities::Capabilities;

/// Type-state markers
pub struct Uninitialized;
pub struct Connected;

/// Communication settings negotiated with the reader: framing mode and the
/// RS-485 bus address (0 for point-to-point links).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommSettings {
    pub binary: bool,
    pub bus_address: u8,
}

impl Default for CommSettings {
    fn default() -> Self {
        Self {
            binary: true,
            bus_address: 0,
        }
    }
}

impl CommSettings {
    pub(crate) fn encode(&self) -> [u8; 2] {
        [if self.binary { 0x01 } else { 0x00 }, self.bus_address]
    }

    pub(crate) fn decode(raw: &[u8]) -> Result<Self> {
        parser::expect_len(raw, 2)?;
        Ok(Self {
            binary: raw[0] & 0x01 != 0,
            bus_address: raw[1],
        })
    }
}

/// Reader handle that enforces the open handshake at compile time. One
/// value per physical reader; sessions are fully independent of each other
/// and there is no process-global state.
///
/// The remembered-card fields are the only mutable protocol state: they
/// are written exclusively by the top-level select/activate operations and
/// only after the reader reported success, so a failed operation never
/// corrupts the UID used for implicit reselection.
pub struct Reader<State = Uninitialized> {
    pub(crate) transport: Box<dyn Transport>,
    pub(crate) version: Version,
    pub(crate) caps: Capabilities,
    pub(crate) comm: CommSettings,
    pub(crate) last_a_uid: Option<Uid>,
    pub(crate) last_b_pupi: Option<Pupi>,
    pub(crate) last_15693_uid: Option<Uid15693>,
    pub(crate) last_i1_uid: Option<Uid15693>,
    pub(crate) last_ats: Option<Ats>,
    pub(crate) mif_auth_ok: bool,
    pub(crate) cancel: Arc<AtomicBool>,
    _state: PhantomData<State>,
}

/// An open, firmware-resolved reader session.
pub type ReaderSession = Reader<Connected>;

impl Reader<Uninitialized> {
    /// Create a Reader from an existing Transport instance. This is also
    /// the entry point for tests where a MockTransport is provided.
    pub fn new_with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            version: Version::from_u32(0),
            caps: Capabilities::empty(),
            comm: CommSettings::default(),
            last_a_uid: None,
            last_b_pupi: None,
            last_15693_uid: None,
            last_i1_uid: None,
            last_ats: None,
            mif_auth_ok: false,
            cancel: Arc::new(AtomicBool::new(false)),
            _state: PhantomData,
        }
    }

    /// Open the session: transport-level reset, firmware query, capability
    /// resolution. Returns the connected session on success.
    pub fn open(self) -> Result<Reader<Connected>> {
        let mut this = self;
        this.transport.reset()?;

        let resp = super::dispatch::roundtrip(
            &mut *this.transport,
            constants::FCT_GET_FIRMWARE,
            &[],
            16,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        parser::ensure_len(&resp, 4)?;
        let version = Version::from_bytes([resp[0], resp[1], resp[2], resp[3]]);
        let caps = Capabilities::from_version(version);
        log::debug!(
            "reader on {} reports firmware {}, capabilities {:?}",
            this.transport.describe(),
            version,
            caps
        );

        Ok(Reader {
            transport: this.transport,
            version,
            caps,
            comm: this.comm,
            last_a_uid: None,
            last_b_pupi: None,
            last_15693_uid: None,
            last_i1_uid: None,
            last_ats: None,
            mif_auth_ok: false,
            cancel: this.cancel,
            _state: PhantomData,
        })
    }
}

impl Reader<Connected> {
    /// Firmware version reported at open time.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Capability set resolved from the firmware version.
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Fail with `UnknownFunction` when the firmware lacks a capability.
    pub(crate) fn require(&self, cap: Capabilities) -> Result<()> {
        if self.caps.has(cap) {
            Ok(())
        } else {
            Err(crate::Error::UnknownFunction)
        }
    }

    /// Largest card frame one exchange may carry: the full host frame
    /// capacity on firmware with large buffers, 256 bytes otherwise.
    pub(crate) fn exchange_limit(&self) -> usize {
        if self.caps.has(Capabilities::XXL_BUFFERS) {
            crate::constants::FRAME_CONTENT_SIZE
        } else {
            256
        }
    }

    /// Check an outgoing card frame against the exchange buffer limit.
    pub(crate) fn check_exchange_len(&self, len: usize) -> Result<()> {
        let limit = self.exchange_limit();
        if len > limit {
            return Err(crate::Error::CommandOverflow { limit, actual: len });
        }
        Ok(())
    }

    /// Query the reader's current communication settings.
    pub fn comm_settings(&mut self) -> Result<CommSettings> {
        let resp = self.function(
            constants::FCT_GET_CONFIG,
            &[],
            4,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        let comm = CommSettings::decode(&resp)?;
        self.comm = comm;
        Ok(comm)
    }

    /// Push new communication settings to the reader.
    pub fn set_comm_settings(&mut self, comm: CommSettings) -> Result<()> {
        self.function(
            constants::FCT_SET_CONFIG,
            &comm.encode(),
            0,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        self.comm = comm;
        Ok(())
    }

    /// UID of the last successfully selected ISO 14443-A card, if any.
    pub fn selected_a_uid(&self) -> Option<&Uid> {
        self.last_a_uid.as_ref()
    }

    /// PUPI of the last successfully selected ISO 14443-B card, if any.
    pub fn selected_b_pupi(&self) -> Option<&Pupi> {
        self.last_b_pupi.as_ref()
    }

    /// UID of the last successfully selected ISO 15693 tag, if any.
    pub fn selected_15693_uid(&self) -> Option<&Uid15693> {
        self.last_15693_uid.as_ref()
    }

    /// UID of the last successfully selected ICODE1 tag, if any.
    pub fn selected_i1_uid(&self) -> Option<&Uid15693> {
        self.last_i1_uid.as_ref()
    }
}
