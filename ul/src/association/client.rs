//! Association requester module
//!
//! The module provides an abstraction for a DICOM association
//! in which this application entity is the one requesting the association.
//! See [`ClientAssociationOptions`](self::ClientAssociationOptions)
//! for details and examples on how to create an association.
use std::{
    borrow::Cow,
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use crate::{
    address::AeAddr,
    pdu::{
        max_length_of, role_selections_of, AbortRQSource, AssociationAC, AssociationRQ, Pdu,
        PresentationContextNegotiated, PresentationContextProposed,
        RoleSelection, UserVariableItem, DEFAULT_MAX_PDU,
    },
    IMPLEMENTATION_CLASS_UID, IMPLEMENTATION_VERSION_NAME,
};
use snafu::{ensure, ResultExt};
use tracing::{info, warn};

use super::{
    clamp_max_pdu_length,
    pdata::{PDataReader, PDataWriter},
    peer_max_pdu_length,
    uid::trim_uid,
    AbortedSnafu, AssociationState, Channel, ConnectSnafu, ConnectionClosedSnafu,
    MissingAbstractSyntaxSnafu, NoAcceptedPresentationContextsSnafu,
    ProtocolVersionMismatchSnafu, RejectedSnafu, ResolveAddressSnafu, Result, SocketOptions,
    UnexpectedPduSnafu, UnknownPduSnafu, APPLICATION_CONTEXT_NAME,
};

/// A DICOM association builder for a client node.
/// The final outcome is a [`ClientAssociation`].
///
/// This is the standard way of requesting and establishing
/// an association with another DICOM node,
/// that one usually taking the role of a service class provider (SCP).
///
/// # Example
///
/// ```no_run
/// # use dcm_ul::association::client::ClientAssociationOptions;
/// # use std::time::Duration;
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let association = ClientAssociationOptions::new()
///    .with_presentation_context("1.2.840.10008.1.1", vec!["1.2.840.10008.1.2.1", "1.2.840.10008.1.2"])
///    .read_timeout(Duration::from_secs(30))
///    .establish("129.168.0.5:104")?;
/// # Ok(())
/// # }
/// ```
///
/// At least one presentation context must be specified,
/// using the method [`with_presentation_context`](Self::with_presentation_context)
/// and supplying both an abstract syntax and list of transfer syntaxes.
/// Presentation contexts are numbered 1, 3, 5 and so on,
/// in the order in which they were added.
///
/// A helper method [`with_abstract_syntax`](Self::with_abstract_syntax) will
/// include by default the transfer syntaxes
/// _Explicit VR Little Endian_ and _Implicit VR Little Endian_
/// in the resulting presentation context.
#[derive(Debug, Clone)]
pub struct ClientAssociationOptions<'a> {
    /// the calling AE title
    calling_ae_title: Cow<'a, str>,
    /// the called AE title
    called_ae_title: Option<Cow<'a, str>>,
    /// the requested application context name
    application_context_name: Cow<'a, str>,
    /// the list of requested presentation contexts
    presentation_contexts: Vec<(Cow<'a, str>, Vec<Cow<'a, str>>)>,
    /// the SCP/SCU role selections to propose
    role_selections: Vec<RoleSelection>,
    /// the expected protocol version
    protocol_version: u16,
    /// the maximum PDU length requested for receiving PDUs
    max_pdu_length: u32,
    /// whether to receive PDUs in strict mode
    strict: bool,
    socket_options: SocketOptions,
}

impl Default for ClientAssociationOptions<'_> {
    fn default() -> Self {
        ClientAssociationOptions {
            calling_ae_title: "THIS-SCU".into(),
            called_ae_title: None,
            application_context_name: APPLICATION_CONTEXT_NAME.into(),
            presentation_contexts: Vec::new(),
            role_selections: Vec::new(),
            protocol_version: 1,
            max_pdu_length: DEFAULT_MAX_PDU,
            strict: true,
            socket_options: SocketOptions::default(),
        }
    }
}

impl<'a> ClientAssociationOptions<'a> {
    /// Create a new set of options for establishing an association.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define the calling application entity title for the association,
    /// which refers to this DICOM node.
    ///
    /// The default is `THIS-SCU`.
    pub fn calling_ae_title<T>(mut self, calling_ae_title: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        self.calling_ae_title = calling_ae_title.into();
        self
    }

    /// Define the called application entity title for the association,
    /// which refers to the target DICOM node.
    ///
    /// The default is `ANY-SCP`.
    /// Passing an empty string resets the AE title to the default
    /// (or to the one passed via [`establish_with`](ClientAssociationOptions::establish_with)).
    pub fn called_ae_title<T>(mut self, called_ae_title: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        let cae = called_ae_title.into();
        if cae.is_empty() {
            self.called_ae_title = None;
        } else {
            self.called_ae_title = Some(cae);
        }
        self
    }

    /// Include this presentation context
    /// in the list of proposed presentation contexts.
    pub fn with_presentation_context<T>(
        mut self,
        abstract_syntax_uid: T,
        transfer_syntax_uids: Vec<T>,
    ) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        let transfer_syntaxes: Vec<Cow<'a, str>> = transfer_syntax_uids
            .into_iter()
            .map(|t| trim_uid(t.into()))
            .collect();
        self.presentation_contexts
            .push((trim_uid(abstract_syntax_uid.into()), transfer_syntaxes));
        self
    }

    /// Helper to add this abstract syntax
    /// with the default transfer syntaxes
    /// to the list of proposed presentation contexts.
    pub fn with_abstract_syntax<T>(self, abstract_syntax_uid: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        let default_transfer_syntaxes: Vec<Cow<'a, str>> =
            vec!["1.2.840.10008.1.2.1".into(), "1.2.840.10008.1.2".into()];
        self.with_presentation_context(abstract_syntax_uid.into(), default_transfer_syntaxes)
    }

    /// Propose the roles this node wishes to take for a SOP class.
    pub fn with_role_selection(
        mut self,
        sop_class_uid: impl Into<String>,
        scu_role: bool,
        scp_role: bool,
    ) -> Self {
        self.role_selections
            .push(RoleSelection::new(sop_class_uid, scu_role, scp_role));
        self
    }

    /// Override the maximum PDU length
    /// that this application entity will admit.
    ///
    /// The value is kept within the range admitted by the standard.
    pub fn max_pdu_length(mut self, value: u32) -> Self {
        self.max_pdu_length = clamp_max_pdu_length(value);
        self
    }

    /// Override strict mode:
    /// whether receiving PDUs must not
    /// surpass the negotiated maximum PDU length.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set how long to wait for each incoming PDU.
    ///
    /// When the time is up, the association is aborted.
    /// Defaults to [`DEFAULT_READ_TIMEOUT`](crate::association::DEFAULT_READ_TIMEOUT).
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.socket_options.read_timeout = Some(timeout);
        self
    }

    /// Set how long to wait for each outgoing PDU to be written.
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.socket_options.write_timeout = Some(timeout);
        self
    }

    /// Set how long to wait for the TCP connection to be established.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.socket_options.connection_timeout = Some(timeout);
        self
    }

    /// Initiate the TCP connection to the given address
    /// and request a new DICOM association,
    /// negotiating the presentation contexts in the process.
    pub fn establish<A>(self, address: A) -> Result<ClientAssociation>
    where
        A: ToSocketAddrs + std::fmt::Debug,
    {
        let description = format!("{:?}", address);
        self.establish_impl(address, description, None)
    }

    /// Initiate the TCP connection to the given address
    /// and request a new DICOM association,
    /// negotiating the presentation contexts in the process.
    ///
    /// The address may carry the called AE title
    /// with the syntax `«ae_title»@«address»:«port»`
    /// (see [`AeAddr`]).
    /// The AE title in this parameter is overridden
    /// by any `called_ae_title` option previously received.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use dcm_ul::association::client::ClientAssociationOptions;
    /// # fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let association = ClientAssociationOptions::new()
    ///     .with_abstract_syntax("1.2.840.10008.1.1")
    ///     // called AE title in address
    ///     .establish_with("MY-STORAGE@10.0.0.100:104")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn establish_with(self, ae_address: &str) -> Result<ClientAssociation> {
        match ae_address.parse::<AeAddr>() {
            Ok(addr) => {
                let (ae_title, socket_addr) = addr.into_parts();
                self.establish_impl(socket_addr.as_str(), socket_addr.clone(), ae_title)
            }
            Err(_) => self.establish_impl(ae_address, ae_address.to_string(), None),
        }
    }

    fn connect<A: ToSocketAddrs>(&self, address: A, description: &str) -> Result<TcpStream> {
        match self.socket_options.connection_timeout {
            None => TcpStream::connect(address).context(ConnectSnafu {
                address: description,
            }),
            Some(timeout) => {
                let addresses = address
                    .to_socket_addrs()
                    .context(ResolveAddressSnafu {
                        address: description,
                    })?;
                let mut last_error =
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no address resolved");
                for addr in addresses {
                    match TcpStream::connect_timeout(&addr, timeout) {
                        Ok(socket) => return Ok(socket),
                        Err(e) => last_error = e,
                    }
                }
                Err(last_error).context(ConnectSnafu {
                    address: description,
                })
            }
        }
    }

    fn establish_impl<A>(
        self,
        address: A,
        description: String,
        address_ae_title: Option<String>,
    ) -> Result<ClientAssociation>
    where
        A: ToSocketAddrs,
    {
        // fail if no presentation contexts were provided: they represent intent,
        // should not be omitted by the user
        ensure!(
            !self.presentation_contexts.is_empty(),
            MissingAbstractSyntaxSnafu
        );

        // choose called AE title
        let called_ae_title: String = match (&self.called_ae_title, address_ae_title) {
            (Some(aec), Some(_)) => {
                warn!(
                    "Option `called_ae_title` overrides the AE title to `{}`",
                    aec
                );
                aec.to_string()
            }
            (Some(aec), None) => aec.to_string(),
            (None, Some(aec)) => aec,
            (None, None) => "ANY-SCP".to_string(),
        };

        let presentation_contexts: Vec<_> = self
            .presentation_contexts
            .iter()
            .enumerate()
            .map(|(i, (abstract_syntax, transfer_syntaxes))| PresentationContextProposed {
                id: (2 * i + 1) as u8,
                abstract_syntax: abstract_syntax.to_string(),
                transfer_syntaxes: transfer_syntaxes.iter().map(|uid| uid.to_string()).collect(),
            })
            .collect();

        let mut user_variables = vec![
            UserVariableItem::MaxLength(self.max_pdu_length),
            UserVariableItem::ImplementationClassUid(IMPLEMENTATION_CLASS_UID.to_string()),
        ];
        user_variables.extend(
            self.role_selections
                .iter()
                .cloned()
                .map(UserVariableItem::RoleSelection),
        );
        user_variables.push(UserVariableItem::ImplementationVersionName(
            IMPLEMENTATION_VERSION_NAME.to_string(),
        ));

        let request = Pdu::AssociationRQ(AssociationRQ {
            protocol_version: self.protocol_version,
            calling_ae_title: self.calling_ae_title.to_string(),
            called_ae_title: called_ae_title.clone(),
            application_context_name: self.application_context_name.to_string(),
            presentation_contexts: presentation_contexts.clone(),
            user_variables,
        });

        let socket = self.connect(address, &description)?;
        self.socket_options.apply(&socket)?;
        let mut channel = Channel::new(socket, self.max_pdu_length, self.strict);

        channel.send(&request)?;
        channel.set_state(AssociationState::AssociationRequested);

        match channel.receive()? {
            Pdu::AssociationAC(AssociationAC {
                protocol_version: protocol_version_scp,
                presentation_contexts: presentation_contexts_scp,
                user_variables,
                ..
            }) => {
                if self.protocol_version != protocol_version_scp {
                    channel.abort_on_failure();
                    return ProtocolVersionMismatchSnafu {
                        expected: self.protocol_version,
                        got: protocol_version_scp,
                    }
                    .fail();
                }

                let acceptor_max_pdu_length = peer_max_pdu_length(max_length_of(&user_variables));
                channel.set_peer_max_pdu_length(acceptor_max_pdu_length);

                let presentation_contexts: Vec<_> = presentation_contexts_scp
                    .into_iter()
                    .filter_map(|result| {
                        let proposed = presentation_contexts.iter().find(|pc| pc.id == result.id);
                        if proposed.is_none() {
                            warn!(
                                "Ignoring result for presentation context {} which was never proposed",
                                result.id
                            );
                        }
                        proposed.map(|pc| PresentationContextNegotiated {
                            id: result.id,
                            reason: result.reason,
                            abstract_syntax: pc.abstract_syntax.clone(),
                            transfer_syntax: result.transfer_syntax,
                        })
                    })
                    .collect();

                if !presentation_contexts.iter().any(|pc| pc.is_accepted()) {
                    let _ = channel.abort(AbortRQSource::ServiceUser);
                    return NoAcceptedPresentationContextsSnafu.fail();
                }

                let role_selections = role_selections_of(&user_variables);
                channel.set_state(AssociationState::Established);
                info!(
                    "Association established with {} ({} presentation contexts accepted)",
                    called_ae_title,
                    presentation_contexts.iter().filter(|pc| pc.is_accepted()).count()
                );

                Ok(ClientAssociation {
                    channel,
                    presentation_contexts,
                    role_selections,
                    calling_ae_title: self.calling_ae_title.to_string(),
                    called_ae_title,
                    requestor_max_pdu_length: self.max_pdu_length,
                    acceptor_max_pdu_length,
                    next_message_id: 1,
                })
            }
            Pdu::AssociationRJ(association_rj) => {
                info!("Association rejected: {}", association_rj.source);
                channel.close();
                RejectedSnafu { association_rj }.fail()
            }
            Pdu::AbortRQ { .. } => AbortedSnafu.fail(),
            pdu @ Pdu::Unknown { .. } => {
                channel.abort_on_failure();
                UnknownPduSnafu { pdu: Box::new(pdu) }.fail()
            }
            pdu => {
                channel.abort_on_failure();
                UnexpectedPduSnafu { pdu: Box::new(pdu) }.fail()
            }
        }
    }
}

/// A DICOM upper level association from the perspective
/// of a requesting application entity.
///
/// The most common operations of an established association are
/// [`send`](Self::send)
/// and [`receive`](Self::receive),
/// as well as the DIMSE services
/// [`c_echo`](Self::c_echo), [`c_store`](Self::c_store),
/// [`c_find`](Self::c_find) and [`c_move`](Self::c_move).
/// Sending large P-Data fragments may be easier through the P-Data sender
/// abstraction (see [`send_pdata`](Self::send_pdata)).
///
/// When the value falls out of scope,
/// the program will automatically try to gracefully release the association
/// through a standard A-RELEASE message exchange,
/// then shut down the underlying TCP connection.
#[derive(Debug)]
pub struct ClientAssociation {
    pub(crate) channel: Channel,
    /// The presentation contexts as answered by the acceptor,
    /// including the rejected ones.
    presentation_contexts: Vec<PresentationContextNegotiated>,
    /// The role selections answered by the acceptor
    role_selections: Vec<RoleSelection>,
    calling_ae_title: String,
    called_ae_title: String,
    /// The maximum PDU length that this application entity is expecting to receive
    requestor_max_pdu_length: u32,
    /// The maximum PDU length that the remote application entity accepts
    acceptor_max_pdu_length: u32,
    next_message_id: u16,
}

impl ClientAssociation {
    /// Retrieve the list of negotiated presentation contexts,
    /// both accepted and rejected.
    pub fn presentation_contexts(&self) -> &[PresentationContextNegotiated] {
        &self.presentation_contexts
    }

    /// Iterate over the presentation contexts which may be used.
    pub fn accepted_presentation_contexts(
        &self,
    ) -> impl Iterator<Item = &PresentationContextNegotiated> {
        self.presentation_contexts.iter().filter(|pc| pc.is_accepted())
    }

    /// Retrieve the SCP/SCU role selections granted by the acceptor.
    pub fn role_selections(&self) -> &[RoleSelection] {
        &self.role_selections
    }

    /// The current state of the association.
    pub fn state(&self) -> AssociationState {
        self.channel.state()
    }

    pub fn calling_ae_title(&self) -> &str {
        &self.calling_ae_title
    }

    pub fn called_ae_title(&self) -> &str {
        &self.called_ae_title
    }

    /// Retrieve the maximum PDU length
    /// admitted by the association acceptor.
    pub fn acceptor_max_pdu_length(&self) -> u32 {
        self.acceptor_max_pdu_length
    }

    /// Retrieve the maximum PDU length
    /// that this application entity is expecting to receive.
    pub fn requestor_max_pdu_length(&self) -> u32 {
        self.requestor_max_pdu_length
    }

    /// Obtain a new message ID for a request.
    pub(crate) fn next_message_id(&mut self) -> u16 {
        let id = self.next_message_id;
        self.next_message_id = self.next_message_id.wrapping_add(1).max(1);
        id
    }

    /// Send a PDU message to the other intervenient.
    pub fn send(&mut self, msg: &Pdu) -> Result<()> {
        self.channel.send(msg)
    }

    /// Read a PDU message from the other intervenient,
    /// waiting at most for the configured read timeout.
    pub fn receive(&mut self) -> Result<Pdu> {
        self.channel.receive()
    }

    /// Gracefully terminate the association by exchanging release messages
    /// and then shutting down the TCP connection.
    pub fn release(mut self) -> Result<()> {
        self.release_impl()
    }

    /// Send an abort message and shut down the TCP connection,
    /// terminating the association.
    pub fn abort(mut self) -> Result<()> {
        self.channel.abort(AbortRQSource::ServiceUser)
    }

    /// Prepare a P-Data writer for sending
    /// one or more data set fragments.
    ///
    /// Returns a writer which automatically
    /// splits the inner data into separate PDUs if necessary.
    pub fn send_pdata(&mut self, presentation_context_id: u8) -> PDataWriter<&mut TcpStream> {
        let max_pdu_length = self.acceptor_max_pdu_length;
        PDataWriter::new(self.channel.socket(), presentation_context_id, max_pdu_length)
    }

    /// Prepare a P-Data reader for receiving
    /// one or more data set fragments.
    ///
    /// Returns a reader which automatically
    /// receives more data PDUs once the bytes collected are consumed.
    pub fn receive_pdata(&mut self) -> PDataReader<'_> {
        PDataReader::new(&mut self.channel)
    }

    /// Release implementation function,
    /// which tries to send a release request and receive a release response.
    fn release_impl(&mut self) -> Result<()> {
        if !self.channel.state().is_open() {
            return Ok(());
        }
        self.channel.send(&Pdu::ReleaseRQ)?;
        self.channel.set_state(AssociationState::ReleaseRequested);
        loop {
            match self.channel.receive() {
                Ok(Pdu::ReleaseRP) => break,
                // a release collision, answer in kind
                Ok(Pdu::ReleaseRQ) => self.channel.send(&Pdu::ReleaseRP)?,
                // late responses are discarded
                Ok(Pdu::PData { .. }) => {}
                Ok(Pdu::AbortRQ { .. }) => return AbortedSnafu.fail(),
                Ok(pdu) => {
                    self.channel.abort_on_failure();
                    return UnexpectedPduSnafu { pdu: Box::new(pdu) }.fail();
                }
                Err(super::Error::ConnectionClosed { .. }) => {
                    // some peers close the connection right away
                    self.channel.close();
                    return ConnectionClosedSnafu.fail();
                }
                Err(e) => return Err(e),
            }
        }
        info!("Association with {} released", self.called_ae_title);
        self.channel.close();
        Ok(())
    }
}

/// Automatically release the association and shut down the connection.
impl Drop for ClientAssociation {
    fn drop(&mut self) {
        if self.channel.state().is_open() {
            let _ = self.release_impl();
        }
    }
}
