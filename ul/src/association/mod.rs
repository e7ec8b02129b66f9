//! DICOM association module
//!
//! This module contains utilities for establishing associations
//! between DICOM nodes via TCP/IP.
//!
//! As an association requester, often as a service class user (SCU),
//! a new association can be started
//! via the [`ClientAssociationOptions`][1] type.
//! The minimum required properties are the proposed presentation contexts
//! and the TCP socket address to the target node.
//!
//! As an association acceptor,
//! usually taking the role of a service class provider (SCP),
//! a newly accepted [TCP stream][2] can be passed to
//! a previously prepared [`ServerAssociationOptions`][3].
//!
//! Both sides go through the states of [`AssociationState`].
//! Every read from the socket is bounded by the configured read timeout:
//! when it expires the association is aborted
//! and the pending operation fails with [`Error::Timeout`].
//!
//! [1]: crate::association::client::ClientAssociationOptions
//! [2]: std::net::TcpStream
//! [3]: crate::association::server::ServerAssociationOptions
pub mod client;
pub mod server;

pub(crate) mod pdata;
mod uid;

pub use client::{ClientAssociation, ClientAssociationOptions};
pub use pdata::{PDataReader, PDataWriter};
pub use server::{
    AcceptAny, AcceptCalledAeTitle, AccessControl, RolePolicy, ServerAssociation,
    ServerAssociationOptions,
};

use crate::pdu::{
    read_pdu, write_pdu, AbortRQSource, AssociationRJ, PDataValue, PDataValueType, Pdu,
    DEFAULT_MAX_PDU, MAXIMUM_PDU_SIZE, MINIMUM_PDU_SIZE, PDU_HEADER_SIZE,
};
use dcm_encoding::{Endianness, Stream};
use snafu::{ensure, Backtrace, ResultExt, Snafu};
use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;
use tracing::{debug, warn};

/// The DICOM application context name.
pub const APPLICATION_CONTEXT_NAME: &str = "1.2.840.10008.3.1.1.1";

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// missing at least one abstract syntax to negotiate
    MissingAbstractSyntax { backtrace: Backtrace },

    #[snafu(display("Could not resolve address `{}`", address))]
    ResolveAddress {
        address: String,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not connect to `{}`", address))]
    Connect {
        address: String,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not set socket options"))]
    SetSocketOptions {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not encode PDU"))]
    SendPdu {
        #[snafu(backtrace)]
        source: crate::pdu::writer::Error,
    },

    #[snafu(display("Could not send PDU to the peer"))]
    WireSend {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not decode incoming PDU"))]
    ReceivePdu {
        #[snafu(backtrace)]
        source: crate::pdu::reader::Error,
    },

    #[snafu(display("Could not read from the peer"))]
    WireRead {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Connection closed by the peer"))]
    ConnectionClosed { backtrace: Backtrace },

    /// The peer did not answer within the read timeout.
    /// The association was aborted.
    #[snafu(display("Timed out waiting for the peer"))]
    Timeout { backtrace: Backtrace },

    #[snafu(display("Unexpected PDU `{}`", pdu.short_description()))]
    #[non_exhaustive]
    UnexpectedPdu { pdu: Box<Pdu> },

    #[snafu(display("Unknown PDU `{}`", pdu.short_description()))]
    #[non_exhaustive]
    UnknownPdu { pdu: Box<Pdu> },

    #[snafu(display("Protocol version mismatch: expected {}, got {}", expected, got))]
    ProtocolVersionMismatch {
        expected: u16,
        got: u16,
        backtrace: Backtrace,
    },

    #[snafu(display("Association rejected: {}", association_rj.source))]
    Rejected {
        association_rj: AssociationRJ,
        backtrace: Backtrace,
    },

    #[snafu(display("Association aborted by the peer"))]
    Aborted { backtrace: Backtrace },

    #[snafu(display("No presentation context was accepted"))]
    NoAcceptedPresentationContexts { backtrace: Backtrace },

    #[snafu(display(
        "PDU is too large ({} bytes) to be sent to the remote application entity",
        length
    ))]
    #[non_exhaustive]
    SendTooLongPdu { length: usize, backtrace: Backtrace },

    #[snafu(display("Cannot {} while the association is {}", operation, state))]
    InvalidState {
        state: AssociationState,
        operation: &'static str,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The life cycle of an association, on either side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AssociationState {
    /// Nothing was exchanged yet.
    Idle,
    /// An association request was sent or received,
    /// waiting for the negotiation to end.
    AssociationRequested,
    /// The association was accepted and no message is in flight.
    Established,
    /// A DIMSE message exchange is in progress.
    MessageExchange,
    /// A release was requested, waiting for the reply.
    ReleaseRequested,
    /// The association was released in an orderly fashion.
    Closed,
    /// The association was aborted by either side,
    /// on a protocol violation, a network failure or a timeout.
    Aborted,
}

impl AssociationState {
    /// Whether PDUs may still be exchanged.
    pub fn is_open(self) -> bool {
        !matches!(self, AssociationState::Closed | AssociationState::Aborted)
    }
}

impl std::fmt::Display for AssociationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AssociationState::Idle => "idle",
            AssociationState::AssociationRequested => "requested",
            AssociationState::Established => "established",
            AssociationState::MessageExchange => "exchanging messages",
            AssociationState::ReleaseRequested => "releasing",
            AssociationState::Closed => "closed",
            AssociationState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// How long an association waits for each incoming PDU
/// unless configured otherwise.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Socket level options of an association.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct SocketOptions {
    pub(crate) read_timeout: Option<Duration>,
    pub(crate) write_timeout: Option<Duration>,
    pub(crate) connection_timeout: Option<Duration>,
}

impl Default for SocketOptions {
    fn default() -> Self {
        SocketOptions {
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            write_timeout: None,
            connection_timeout: None,
        }
    }
}

impl SocketOptions {
    pub(crate) fn apply(&self, socket: &TcpStream) -> Result<()> {
        socket
            .set_read_timeout(self.read_timeout)
            .context(SetSocketOptionsSnafu)?;
        socket
            .set_write_timeout(self.write_timeout)
            .context(SetSocketOptionsSnafu)
    }
}

/// Clamp a maximum PDU length option to the range the standard allows.
pub(crate) fn clamp_max_pdu_length(value: u32) -> u32 {
    value.clamp(MINIMUM_PDU_SIZE, MAXIMUM_PDU_SIZE)
}

/// Interpret the maximum length announced by the peer,
/// where zero stands for no limit.
pub(crate) fn peer_max_pdu_length(announced: Option<u32>) -> u32 {
    match announced {
        Some(0) => MAXIMUM_PDU_SIZE,
        Some(len) => len,
        None => DEFAULT_MAX_PDU,
    }
}

fn is_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

/// The transport of an established association:
/// the socket, its buffers and the association state.
#[derive(Debug)]
pub(crate) struct Channel {
    socket: TcpStream,
    read_buffer: Stream,
    write_buffer: Vec<u8>,
    state: AssociationState,
    /// maximum length of incoming P-DATA PDUs
    max_pdu_length: u32,
    /// maximum length of outgoing P-DATA PDUs
    peer_max_pdu_length: u32,
    strict: bool,
    /// values received after the end of the last message
    pending_values: VecDeque<PDataValue>,
}

impl Channel {
    pub(crate) fn new(socket: TcpStream, max_pdu_length: u32, strict: bool) -> Self {
        Channel {
            socket,
            read_buffer: Stream::new(Endianness::Big),
            write_buffer: Vec::with_capacity(max_pdu_length as usize),
            state: AssociationState::Idle,
            max_pdu_length,
            peer_max_pdu_length: DEFAULT_MAX_PDU,
            strict,
            pending_values: VecDeque::new(),
        }
    }

    pub(crate) fn state(&self) -> AssociationState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: AssociationState) {
        if self.state != state {
            debug!("Association {} -> {}", self.state, state);
        }
        self.state = state;
    }

    pub(crate) fn max_pdu_length(&self) -> u32 {
        self.max_pdu_length
    }

    pub(crate) fn peer_max_pdu_length(&self) -> u32 {
        self.peer_max_pdu_length
    }

    pub(crate) fn set_peer_max_pdu_length(&mut self, len: u32) {
        self.peer_max_pdu_length = len;
    }

    pub(crate) fn socket(&mut self) -> &mut TcpStream {
        &mut self.socket
    }

    /// Encode and send a PDU.
    pub(crate) fn send(&mut self, pdu: &Pdu) -> Result<()> {
        ensure!(
            self.state.is_open(),
            InvalidStateSnafu {
                state: self.state,
                operation: "send",
            }
        );
        self.write_buffer.clear();
        write_pdu(&mut self.write_buffer, pdu).context(SendPduSnafu)?;
        if let Pdu::PData { .. } = pdu {
            let length = self.write_buffer.len();
            ensure!(
                length - PDU_HEADER_SIZE as usize <= self.peer_max_pdu_length as usize,
                SendTooLongPduSnafu { length }
            );
        }
        debug!("Sending {}", pdu.short_description());
        match self.socket.write_all(&self.write_buffer) {
            Ok(()) => Ok(()),
            Err(e) if is_timeout(&e) => {
                self.abort_on_failure();
                TimeoutSnafu.fail()
            }
            Err(e) => {
                self.abort_on_failure();
                Err(e).context(WireSendSnafu)
            }
        }
    }

    /// Send the bytes of a command or data set
    /// as P-DATA fragments no longer than the peer accepts.
    pub(crate) fn send_fragments(
        &mut self,
        presentation_context_id: u8,
        value_type: PDataValueType,
        bytes: &[u8],
    ) -> Result<()> {
        ensure!(
            self.state.is_open(),
            InvalidStateSnafu {
                state: self.state,
                operation: "send",
            }
        );
        debug!(
            "Sending {} bytes of {:?} fragments on context {}",
            bytes.len(),
            value_type,
            presentation_context_id
        );
        let sent = {
            let mut writer = PDataWriter::with_value_type(
                &mut self.socket,
                presentation_context_id,
                value_type,
                self.peer_max_pdu_length,
            );
            match writer.write_all(bytes) {
                Ok(()) => writer.finish(),
                Err(e) => Err(e),
            }
        };
        match sent {
            Ok(()) => Ok(()),
            Err(e) if is_timeout(&e) => {
                self.abort_on_failure();
                TimeoutSnafu.fail()
            }
            Err(e) => {
                self.abort_on_failure();
                Err(e).context(WireSendSnafu)
            }
        }
    }

    /// Take the P-DATA values left over from the previous message.
    pub(crate) fn take_pending_values(&mut self) -> VecDeque<PDataValue> {
        std::mem::take(&mut self.pending_values)
    }

    /// Keep P-DATA values which belong to the next message.
    pub(crate) fn keep_pending_values(&mut self, values: VecDeque<PDataValue>) {
        self.pending_values = values;
    }

    pub(crate) fn has_pending_values(&self) -> bool {
        !self.pending_values.is_empty()
    }

    /// Take the next PDU out of the read buffer, if whole.
    fn next_buffered(&mut self) -> Result<Option<Pdu>> {
        let pdu = read_pdu(&mut self.read_buffer, self.max_pdu_length, self.strict)
            .context(ReceivePduSnafu)?;
        if let Some(pdu) = &pdu {
            self.read_buffer.compact();
            debug!("Received {}", pdu.short_description());
            if let Pdu::AbortRQ { source } = pdu {
                warn!("Association aborted by the peer ({:?})", source);
                self.set_state(AssociationState::Aborted);
                let _ = self.socket.shutdown(Shutdown::Both);
            }
        }
        Ok(pdu)
    }

    /// Wait for the next PDU, within the socket's read timeout.
    ///
    /// An expired timeout aborts the association.
    pub(crate) fn receive(&mut self) -> Result<Pdu> {
        ensure!(
            self.state.is_open(),
            InvalidStateSnafu {
                state: self.state,
                operation: "receive",
            }
        );
        let mut chunk = vec![0; 16_384];
        loop {
            if let Some(pdu) = self.next_buffered()? {
                return Ok(pdu);
            }
            match self.socket.read(&mut chunk) {
                Ok(0) => {
                    self.set_state(AssociationState::Aborted);
                    return ConnectionClosedSnafu.fail();
                }
                Ok(n) => self.read_buffer.extend(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if is_timeout(&e) => {
                    warn!("Timed out waiting for the peer, aborting association");
                    self.abort_on_failure();
                    return TimeoutSnafu.fail();
                }
                Err(e) => {
                    self.set_state(AssociationState::Aborted);
                    return Err(e).context(WireReadSnafu);
                }
            }
        }
    }

    /// Check for a PDU without waiting for one.
    pub(crate) fn try_receive(&mut self) -> Result<Option<Pdu>> {
        if let Some(pdu) = self.next_buffered()? {
            return Ok(Some(pdu));
        }
        self.socket
            .set_nonblocking(true)
            .context(SetSocketOptionsSnafu)?;
        let mut chunk = vec![0; 16_384];
        let read = self.socket.read(&mut chunk);
        self.socket
            .set_nonblocking(false)
            .context(SetSocketOptionsSnafu)?;
        match read {
            Ok(0) => {
                self.set_state(AssociationState::Aborted);
                ConnectionClosedSnafu.fail()
            }
            Ok(n) => {
                self.read_buffer.extend(&chunk[..n]);
                self.next_buffered()
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::Interrupted => {
                Ok(None)
            }
            Err(e) => {
                self.set_state(AssociationState::Aborted);
                Err(e).context(WireReadSnafu)
            }
        }
    }

    /// Send an A-ABORT and close the connection.
    pub(crate) fn abort(&mut self, source: AbortRQSource) -> Result<()> {
        let out = if self.state.is_open() {
            self.send(&Pdu::AbortRQ { source })
        } else {
            Ok(())
        };
        self.set_state(AssociationState::Aborted);
        let _ = self.socket.shutdown(Shutdown::Both);
        out
    }

    /// Abort after a local failure, ignoring any further error.
    pub(crate) fn abort_on_failure(&mut self) {
        if self.state.is_open() {
            self.write_buffer.clear();
            let abort = Pdu::AbortRQ {
                source: AbortRQSource::ServiceUser,
            };
            if write_pdu(&mut self.write_buffer, &abort).is_ok() {
                let _ = self.socket.write_all(&self.write_buffer);
            }
        }
        self.set_state(AssociationState::Aborted);
        let _ = self.socket.shutdown(Shutdown::Both);
    }

    /// Close the connection after an orderly release.
    pub(crate) fn close(&mut self) {
        self.set_state(AssociationState::Closed);
        let _ = self.socket.shutdown(Shutdown::Both);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_pdu_length_bounds() {
        assert_eq!(clamp_max_pdu_length(0), MINIMUM_PDU_SIZE);
        assert_eq!(clamp_max_pdu_length(DEFAULT_MAX_PDU), DEFAULT_MAX_PDU);
        assert_eq!(clamp_max_pdu_length(u32::MAX), MAXIMUM_PDU_SIZE);
        assert_eq!(peer_max_pdu_length(Some(0)), MAXIMUM_PDU_SIZE);
        assert_eq!(peer_max_pdu_length(None), DEFAULT_MAX_PDU);
        assert_eq!(peer_max_pdu_length(Some(32_768)), 32_768);
    }

    #[test]
    fn reads_time_out_by_default() {
        let options = SocketOptions::default();
        assert_eq!(options.read_timeout, Some(Duration::from_secs(30)));
        assert_eq!(options.write_timeout, None);
    }

    #[test]
    fn open_states() {
        assert!(AssociationState::Established.is_open());
        assert!(AssociationState::MessageExchange.is_open());
        assert!(!AssociationState::Closed.is_open());
        assert!(!AssociationState::Aborted.is_open());
    }
}
