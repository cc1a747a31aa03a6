//! Trusted Peripheral handle.
//!
//! One [`Tper`] owns one drive-side endpoint: the transport, the ComID the
//! channel runs on, the negotiated size limits, the live session ids, and
//! the scratch block every transmission passes through. A handle is used by
//! one caller at a time; every I/O operation takes `&mut self`, and response
//! views borrow the handle, so the compiler rules out overlapping requests.

use std::time::Duration;

use crate::transport::Transport;

/// Size of the reusable I/O block, and the ceiling on every negotiated
/// packet size.
pub const MAX_IO_BLOCK: usize = 64 * 1024;

/// `MaxComPacketSize` assumed for the drive until Properties negotiation.
pub const DEFAULT_DRIVE_MAX_PACKET: usize = 1024;

/// `MaxIndTokenSize` assumed for the drive until Properties negotiation.
pub const DEFAULT_DRIVE_MAX_TOKEN: usize = 968;

/// How often the transceiver re-polls a TPer that has no data ready.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// How long the transceiver polls before giving up on a response.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(10);

/// Security Subsystem Class families with distinct messaging behavior.
///
/// Opal covers the whole Opal-derived family (Opal 1/2, Opalite, Pyrite);
/// Enterprise differs in session-manager argument conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SscKind {
    /// Discovery could not classify the drive
    Unknown,
    /// Enterprise SSC
    Enterprise,
    /// Opal SSC and its derivatives
    Opal,
}

/// Whether a session is live on the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session: both session ids are zero
    Closed,
    /// A session is established with some SP
    Open,
}

/// Transceiver timing configuration.
///
/// The receive path is a blocking poll: the drive answers IF-RECV with a
/// zero-length ComPacket until the response is computed.
#[derive(Debug, Clone)]
pub struct CommsConfig {
    /// Sleep between receive polls
    pub poll_interval: Duration,
    /// Overall receive deadline
    pub recv_timeout: Duration,
}

impl Default for CommsConfig {
    fn default() -> Self {
        Self { poll_interval: DEFAULT_POLL_INTERVAL, recv_timeout: DEFAULT_RECV_TIMEOUT }
    }
}

/// Handle to one Trusted Peripheral.
pub struct Tper<T: Transport> {
    pub(crate) transport: T,
    pub(crate) ssc: SscKind,
    pub(crate) com_id: u16,
    pub(crate) has_reset: bool,
    pub(crate) host_session_id: u32,
    pub(crate) tper_session_id: u32,
    pub(crate) max_com_packet_size: usize,
    pub(crate) max_token_size: usize,
    /// Reusable transmission block; aliased by response views
    pub(crate) io_block: Box<[u8]>,
    pub(crate) config: CommsConfig,
}

impl<T: Transport> Tper<T> {
    /// Create a handle on an opened transport.
    ///
    /// `ssc` and `com_id` come from Level-0 Discovery, which runs before
    /// this layer. Size limits start at the drive defaults; call
    /// [`Self::negotiate_properties`] to raise them.
    pub fn new(transport: T, ssc: SscKind, com_id: u16) -> Self {
        Self::with_config(transport, ssc, com_id, CommsConfig::default())
    }

    /// Create a handle with explicit transceiver timing.
    pub fn with_config(transport: T, ssc: SscKind, com_id: u16, config: CommsConfig) -> Self {
        Self {
            transport,
            ssc,
            com_id,
            has_reset: false,
            host_session_id: 0,
            tper_session_id: 0,
            max_com_packet_size: DEFAULT_DRIVE_MAX_PACKET,
            max_token_size: DEFAULT_DRIVE_MAX_TOKEN,
            io_block: vec![0; MAX_IO_BLOCK].into_boxed_slice(),
            config,
        }
    }

    /// Security Subsystem Class family of the drive.
    #[must_use]
    pub fn ssc(&self) -> SscKind {
        self.ssc
    }

    /// ComID this handle communicates on.
    #[must_use]
    pub fn com_id(&self) -> u16 {
        self.com_id
    }

    /// Whether the drive advertises the stack-reset protocol.
    #[must_use]
    pub fn has_reset(&self) -> bool {
        self.has_reset
    }

    /// Largest ComPacket either side will accept.
    #[must_use]
    pub fn max_com_packet_size(&self) -> usize {
        self.max_com_packet_size
    }

    /// Largest single token either side will accept.
    #[must_use]
    pub fn max_token_size(&self) -> usize {
        self.max_token_size
    }

    /// Host half of the session id pair. Zero when closed.
    #[must_use]
    pub fn host_session_id(&self) -> u32 {
        self.host_session_id
    }

    /// TPer half of the session id pair. Zero when closed.
    #[must_use]
    pub fn tper_session_id(&self) -> u32 {
        self.tper_session_id
    }

    /// Session state, derived from the id pair.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        if self.host_session_id == 0 && self.tper_session_id == 0 {
            SessionState::Closed
        } else {
            SessionState::Open
        }
    }

    /// Drop the session ids without any wire traffic.
    ///
    /// Used after a completed EndSession handshake and for error recovery
    /// when the drive's session state is unknown.
    pub fn forget_session(&mut self) {
        self.host_session_id = 0;
        self.tper_session_id = 0;
    }

    /// Borrow the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    ///
    /// For transport-level maintenance only; driving IF-SEND / IF-RECV
    /// directly underneath an open session will desynchronize it.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the handle and return the transport for closing.
    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }
}
