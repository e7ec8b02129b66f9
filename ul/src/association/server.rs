//! Association acceptor module
//!
//! The module provides an abstraction for a DICOM association
//! in which this application entity listens to incoming association requests.
//! See [`ServerAssociationOptions`]
//! for details and examples on how to create an association.
use std::borrow::Cow;
use std::net::TcpStream;
use std::time::Duration;

use snafu::ensure;
use tracing::{info, warn};

use crate::pdu::{
    max_length_of, role_selections_of, AbortRQServiceProviderReason, AbortRQSource,
    AssociationAC, AssociationRJ, AssociationRJResult, AssociationRJServiceProviderAcseReason,
    AssociationRJServiceUserReason, AssociationRJSource, AssociationRQ, Pdu,
    PresentationContextNegotiated, PresentationContextResult, PresentationContextResultReason,
    RoleSelection, UserVariableItem, DEFAULT_MAX_PDU,
};
use crate::{IMPLEMENTATION_CLASS_UID, IMPLEMENTATION_VERSION_NAME};

use super::{
    clamp_max_pdu_length,
    pdata::{PDataReader, PDataWriter},
    peer_max_pdu_length,
    uid::trim_uid,
    AbortedSnafu, AssociationState, Channel, MissingAbstractSyntaxSnafu, RejectedSnafu, Result,
    SocketOptions, UnexpectedPduSnafu, UnknownPduSnafu, APPLICATION_CONTEXT_NAME,
};

/// Common interface for application entity access control policies.
///
/// Existing implementations include [`AcceptAny`] and [`AcceptCalledAeTitle`],
/// but users are free to implement their own.
pub trait AccessControl {
    /// Obtain the decision of whether to accept an incoming association request
    /// based on the recorded application entity titles.
    ///
    /// Returns Ok(()) if the requester node should be given clearance.
    /// Otherwise, a concrete association RJ service user reason is given.
    fn check_access(
        &self,
        this_ae_title: &str,
        calling_ae_title: &str,
        called_ae_title: &str,
    ) -> Result<(), AssociationRJServiceUserReason>;
}

/// An access control rule that accepts any incoming association request.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct AcceptAny;

impl AccessControl for AcceptAny {
    fn check_access(
        &self,
        _this_ae_title: &str,
        _calling_ae_title: &str,
        _called_ae_title: &str,
    ) -> Result<(), AssociationRJServiceUserReason> {
        Ok(())
    }
}

/// An access control rule that accepts association requests
/// that match the called AE title with the node's AE title.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct AcceptCalledAeTitle;

impl AccessControl for AcceptCalledAeTitle {
    fn check_access(
        &self,
        this_ae_title: &str,
        _calling_ae_title: &str,
        called_ae_title: &str,
    ) -> Result<(), AssociationRJServiceUserReason> {
        if this_ae_title == called_ae_title {
            Ok(())
        } else {
            Err(AssociationRJServiceUserReason::CalledAeTitleNotRecognized)
        }
    }
}

/// Which roles a requesting node may take
/// when it proposes SCP/SCU role selections.
///
/// Both roles are allowed by default.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct RolePolicy {
    /// whether the requester may act as a service class user
    pub scu: bool,
    /// whether the requester may act as a service class provider
    pub scp: bool,
}

impl Default for RolePolicy {
    fn default() -> Self {
        RolePolicy {
            scu: true,
            scp: true,
        }
    }
}

impl RolePolicy {
    /// Answer a proposed role selection.
    ///
    /// A role is granted only if proposed and allowed.
    /// SOP classes which are not known are answered with both roles cleared.
    pub fn answer(&self, proposed: &RoleSelection, known_sop_class: bool) -> RoleSelection {
        RoleSelection {
            sop_class_uid: proposed.sop_class_uid.clone(),
            scu_role: known_sop_class && proposed.scu_role && self.scu,
            scp_role: known_sop_class && proposed.scp_role && self.scp,
        }
    }
}

/// The outcome of a successful negotiation, before it is sent.
#[derive(Debug, Clone, PartialEq)]
struct Negotiated {
    presentation_contexts: Vec<PresentationContextNegotiated>,
    role_selections: Vec<RoleSelection>,
    requestor_max_pdu_length: u32,
    calling_ae_title: String,
    user_variables: Vec<UserVariableItem>,
}

/// A DICOM association builder for an acceptor DICOM node,
/// often taking the role of a service class provider (SCP).
///
/// This is the standard way of negotiating and establishing
/// an association with a requesting node.
/// The outcome is a [`ServerAssociation`].
/// Unlike the [`ClientAssociationOptions`],
/// a value of this type can be reused for multiple connections.
///
/// [`ClientAssociationOptions`]: crate::association::ClientAssociationOptions
///
/// The SCP will by default accept all transfer syntaxes
/// supported by the main [transfer syntax registry][1],
/// unless one or more transfer syntaxes are explicitly indicated
/// through calls to [`with_transfer_syntax`][2].
/// For each presentation context,
/// the first proposed transfer syntax which is accepted is chosen.
///
/// Access control logic is also available,
/// enabling application entities to decide on
/// whether to accept or reject the association request
/// based on the _called_ and _calling_ AE titles.
///
/// - By default, the application will accept requests from anyone
///   ([`AcceptAny`])
/// - To only accept requests with a matching _called_ AE title,
///   add a call to [`accept_called_ae_title`]
///   ([`AcceptCalledAeTitle`]).
/// - Any other policy can be implemented through the [`AccessControl`] trait.
///
/// [`accept_called_ae_title`]: Self::accept_called_ae_title
///
/// [1]: dcm_transfer_syntax_registry
/// [2]: ServerAssociationOptions::with_transfer_syntax
///
/// # Example
///
/// ```no_run
/// # use std::net::TcpListener;
/// # use dcm_ul::association::server::ServerAssociationOptions;
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// # let tcp_listener: TcpListener = unimplemented!();
/// let scp_options = ServerAssociationOptions::new()
///    .with_abstract_syntax("1.2.840.10008.1.1")
///    .with_transfer_syntax("1.2.840.10008.1.2.1");
///
/// let (stream, _address) = tcp_listener.accept()?;
/// scp_options.establish(stream)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ServerAssociationOptions<'a, A> {
    /// the application entity access control policy
    ae_access_control: A,
    /// the AE title of this DICOM node
    ae_title: Cow<'a, str>,
    /// the requested application context name
    application_context_name: Cow<'a, str>,
    /// the list of accepted abstract syntaxes
    abstract_syntax_uids: Vec<Cow<'a, str>>,
    /// the list of accepted transfer syntaxes
    transfer_syntax_uids: Vec<Cow<'a, str>>,
    /// the expected protocol version
    protocol_version: u16,
    /// the maximum PDU length
    max_pdu_length: u32,
    /// whether to receive PDUs in strict mode
    strict: bool,
    /// whether to accept unknown abstract syntaxes
    promiscuous: bool,
    role_policy: RolePolicy,
    socket_options: SocketOptions,
}

impl Default for ServerAssociationOptions<'_, AcceptAny> {
    fn default() -> Self {
        ServerAssociationOptions {
            ae_access_control: AcceptAny,
            ae_title: "THIS-SCP".into(),
            application_context_name: APPLICATION_CONTEXT_NAME.into(),
            abstract_syntax_uids: Vec::new(),
            transfer_syntax_uids: Vec::new(),
            protocol_version: 1,
            max_pdu_length: DEFAULT_MAX_PDU,
            strict: true,
            promiscuous: false,
            role_policy: RolePolicy::default(),
            socket_options: SocketOptions::default(),
        }
    }
}

impl ServerAssociationOptions<'_, AcceptAny> {
    /// Create a new set of options for establishing an association.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a, A> ServerAssociationOptions<'a, A>
where
    A: AccessControl,
{
    /// Change the access control policy to accept any association
    /// regardless of the specified AE titles.
    ///
    /// This is the default behavior when the options are first created.
    pub fn accept_any(self) -> ServerAssociationOptions<'a, AcceptAny> {
        self.ae_access_control(AcceptAny)
    }

    /// Change the access control policy to accept an association
    /// if the called AE title matches this node's AE title.
    pub fn accept_called_ae_title(self) -> ServerAssociationOptions<'a, AcceptCalledAeTitle> {
        self.ae_access_control(AcceptCalledAeTitle)
    }

    /// Change the access control policy.
    pub fn ae_access_control<P>(self, access_control: P) -> ServerAssociationOptions<'a, P>
    where
        P: AccessControl,
    {
        let ServerAssociationOptions {
            ae_title,
            application_context_name,
            abstract_syntax_uids,
            transfer_syntax_uids,
            protocol_version,
            max_pdu_length,
            strict,
            promiscuous,
            role_policy,
            ae_access_control: _,
            socket_options,
        } = self;

        ServerAssociationOptions {
            ae_access_control: access_control,
            ae_title,
            application_context_name,
            abstract_syntax_uids,
            transfer_syntax_uids,
            protocol_version,
            max_pdu_length,
            strict,
            promiscuous,
            role_policy,
            socket_options,
        }
    }

    /// Define the application entity title referring to this DICOM node.
    ///
    /// The default is `THIS-SCP`.
    pub fn ae_title<T>(mut self, ae_title: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        self.ae_title = ae_title.into();
        self
    }

    /// Include this abstract syntax
    /// in the list of accepted abstract syntaxes.
    pub fn with_abstract_syntax<T>(mut self, abstract_syntax_uid: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        self.abstract_syntax_uids
            .push(trim_uid(abstract_syntax_uid.into()));
        self
    }

    /// Include this transfer syntax in the list of accepted transfer syntaxes.
    pub fn with_transfer_syntax<T>(mut self, transfer_syntax_uid: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        self.transfer_syntax_uids
            .push(trim_uid(transfer_syntax_uid.into()));
        self
    }

    /// Override the maximum expected PDU length.
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

    /// Override promiscuous mode:
    /// whether to accept unknown abstract syntaxes.
    pub fn promiscuous(mut self, promiscuous: bool) -> Self {
        self.promiscuous = promiscuous;
        self
    }

    /// Override the roles which requesters may take.
    pub fn role_policy(mut self, role_policy: RolePolicy) -> Self {
        self.role_policy = role_policy;
        self
    }

    /// Set how long to wait for each incoming PDU,
    /// including the association request.
    /// Defaults to [`DEFAULT_READ_TIMEOUT`](crate::association::DEFAULT_READ_TIMEOUT).
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.socket_options.read_timeout = Some(timeout);
        self
    }

    /// Set the write timeout for the underlying TCP socket.
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.socket_options.write_timeout = Some(timeout);
        self
    }

    /// The AE title of this node.
    pub fn get_ae_title(&self) -> &str {
        &self.ae_title
    }

    /// Decide on an association request.
    fn negotiate(&self, rq: AssociationRQ) -> std::result::Result<(AssociationAC, Negotiated), AssociationRJ> {
        let AssociationRQ {
            protocol_version,
            calling_ae_title,
            called_ae_title,
            application_context_name,
            presentation_contexts,
            user_variables,
        } = rq;

        if protocol_version & self.protocol_version == 0 {
            return Err(AssociationRJ {
                result: AssociationRJResult::Permanent,
                source: AssociationRJSource::ServiceProviderAcse(
                    AssociationRJServiceProviderAcseReason::ProtocolVersionNotSupported,
                ),
            });
        }

        if trim_uid(Cow::from(application_context_name.as_str())) != self.application_context_name
        {
            return Err(AssociationRJ {
                result: AssociationRJResult::Permanent,
                source: AssociationRJSource::ServiceUser(
                    AssociationRJServiceUserReason::ApplicationContextNameNotSupported,
                ),
            });
        }

        self.ae_access_control
            .check_access(&self.ae_title, &calling_ae_title, &called_ae_title)
            .map_err(|reason| AssociationRJ {
                result: AssociationRJResult::Permanent,
                source: AssociationRJSource::ServiceUser(reason),
            })?;

        let requestor_max_pdu_length = peer_max_pdu_length(max_length_of(&user_variables));

        let presentation_contexts: Vec<_> = presentation_contexts
            .into_iter()
            .map(|pc| {
                let abstract_syntax = trim_uid(Cow::from(pc.abstract_syntax)).into_owned();
                if !self.promiscuous
                    && !self
                        .abstract_syntax_uids
                        .iter()
                        .any(|uid| uid == &abstract_syntax)
                {
                    return PresentationContextNegotiated {
                        id: pc.id,
                        reason: PresentationContextResultReason::AbstractSyntaxNotSupported,
                        transfer_syntax: "1.2.840.10008.1.2".to_string(),
                        abstract_syntax,
                    };
                }

                let (transfer_syntax, reason) = self
                    .choose_ts(&pc.transfer_syntaxes)
                    .map(|ts| (ts, PresentationContextResultReason::Acceptance))
                    .unwrap_or_else(|| {
                        (
                            "1.2.840.10008.1.2".to_string(),
                            PresentationContextResultReason::TransferSyntaxesNotSupported,
                        )
                    });

                PresentationContextNegotiated {
                    id: pc.id,
                    reason,
                    transfer_syntax,
                    abstract_syntax,
                }
            })
            .collect();

        let role_selections: Vec<_> = role_selections_of(&user_variables)
            .iter()
            .map(|proposed| {
                let known = presentation_contexts
                    .iter()
                    .any(|pc| pc.is_accepted() && pc.abstract_syntax == proposed.sop_class_uid);
                self.role_policy.answer(proposed, known)
            })
            .collect();

        let mut ac_user_variables = vec![
            UserVariableItem::MaxLength(self.max_pdu_length),
            UserVariableItem::ImplementationClassUid(IMPLEMENTATION_CLASS_UID.to_string()),
        ];
        ac_user_variables.extend(
            role_selections
                .iter()
                .cloned()
                .map(UserVariableItem::RoleSelection),
        );
        ac_user_variables.push(UserVariableItem::ImplementationVersionName(
            IMPLEMENTATION_VERSION_NAME.to_string(),
        ));

        let ac = AssociationAC {
            protocol_version: self.protocol_version,
            application_context_name,
            presentation_contexts: presentation_contexts
                .iter()
                .map(|pc| PresentationContextResult {
                    id: pc.id,
                    reason: pc.reason,
                    transfer_syntax: pc.transfer_syntax.clone(),
                })
                .collect(),
            calling_ae_title: calling_ae_title.clone(),
            called_ae_title,
            user_variables: ac_user_variables,
        };

        Ok((
            ac,
            Negotiated {
                presentation_contexts,
                role_selections,
                requestor_max_pdu_length,
                calling_ae_title,
                user_variables,
            },
        ))
    }

    /// Negotiate an association with the given TCP stream.
    pub fn establish(&self, socket: TcpStream) -> Result<ServerAssociation> {
        ensure!(
            !self.abstract_syntax_uids.is_empty() || self.promiscuous,
            MissingAbstractSyntaxSnafu
        );

        self.socket_options.apply(&socket)?;
        let mut channel = Channel::new(socket, self.max_pdu_length, self.strict);

        match channel.receive()? {
            Pdu::AssociationRQ(rq) => {
                channel.set_state(AssociationState::AssociationRequested);
                match self.negotiate(rq) {
                    Ok((ac, negotiated)) => {
                        channel.set_peer_max_pdu_length(negotiated.requestor_max_pdu_length);
                        channel.send(&Pdu::AssociationAC(ac))?;
                        channel.set_state(AssociationState::Established);
                        info!(
                            "Association with {} established",
                            negotiated.calling_ae_title
                        );
                        Ok(ServerAssociation {
                            channel,
                            presentation_contexts: negotiated.presentation_contexts,
                            role_selections: negotiated.role_selections,
                            requestor_max_pdu_length: negotiated.requestor_max_pdu_length,
                            acceptor_max_pdu_length: self.max_pdu_length,
                            client_ae_title: negotiated.calling_ae_title,
                            user_variables: negotiated.user_variables,
                        })
                    }
                    Err(association_rj) => {
                        info!("Rejecting association: {}", association_rj.source);
                        channel.send(&Pdu::AssociationRJ(association_rj.clone()))?;
                        channel.close();
                        RejectedSnafu { association_rj }.fail()
                    }
                }
            }
            Pdu::AbortRQ { .. } => AbortedSnafu.fail(),
            pdu @ Pdu::Unknown { .. } => {
                let _ = channel.abort(AbortRQSource::ServiceProvider(
                    AbortRQServiceProviderReason::UnrecognizedPdu,
                ));
                UnknownPduSnafu { pdu: Box::new(pdu) }.fail()
            }
            pdu => {
                let _ = channel.abort(AbortRQSource::ServiceProvider(
                    AbortRQServiceProviderReason::UnexpectedPdu,
                ));
                UnexpectedPduSnafu { pdu: Box::new(pdu) }.fail()
            }
        }
    }

    /// Choose the first transfer syntax to
    /// - be on the options' list of transfer syntaxes, and
    /// - be supported by the main transfer syntax registry.
    ///
    /// If the options' list is empty,
    /// accept the first transfer syntax supported.
    fn choose_ts(&self, proposed: &[String]) -> Option<String> {
        proposed
            .iter()
            .map(|ts| trim_uid(Cow::from(ts.as_str())))
            .find(|ts| {
                (self.transfer_syntax_uids.is_empty()
                    || self.transfer_syntax_uids.iter().any(|uid| uid == ts))
                    && is_supported(ts)
            })
            .map(Cow::into_owned)
    }
}

/// Check that the main transfer syntax registry
/// supports the given transfer syntax,
/// meaning that data sets in it can be read and written.
///
/// ```
/// # use dcm_ul::association::server::is_supported;
/// // Implicit VR Little Endian is guaranteed to be supported
/// assert!(is_supported("1.2.840.10008.1.2"));
/// ```
pub fn is_supported(ts_uid: &str) -> bool {
    dcm_transfer_syntax_registry::get(ts_uid)
        .filter(|ts| ts.is_supported())
        .is_some()
}

/// A DICOM upper level association from the perspective
/// of an accepting application entity.
///
/// The most common operations of an established association are
/// [`send`](Self::send)
/// and [`receive`](Self::receive).
/// Sending large P-Data fragments may be easier through the P-Data sender
/// abstraction (see [`send_pdata`](Self::send_pdata)).
///
/// When the value falls out of scope,
/// the underlying TCP connection is closed.
#[derive(Debug)]
pub struct ServerAssociation {
    pub(crate) channel: Channel,
    /// The accorded presentation contexts
    presentation_contexts: Vec<PresentationContextNegotiated>,
    /// The role selections as answered to the requester
    role_selections: Vec<RoleSelection>,
    /// The maximum PDU length that the remote application entity accepts
    requestor_max_pdu_length: u32,
    /// The maximum PDU length that this application entity is expecting to receive
    acceptor_max_pdu_length: u32,
    /// The application entity title of the other DICOM node
    client_ae_title: String,
    /// User variables received from the peer
    user_variables: Vec<UserVariableItem>,
}

impl ServerAssociation {
    /// Obtain a view of the negotiated presentation contexts.
    pub fn presentation_contexts(&self) -> &[PresentationContextNegotiated] {
        &self.presentation_contexts
    }

    /// Look up an accepted presentation context by its identifier.
    pub fn presentation_context(&self, id: u8) -> Option<&PresentationContextNegotiated> {
        self.presentation_contexts
            .iter()
            .find(|pc| pc.id == id && pc.is_accepted())
    }

    /// Obtain the role selections granted to the requester.
    pub fn role_selections(&self) -> &[RoleSelection] {
        &self.role_selections
    }

    /// Retrieve the maximum PDU length
    /// admitted by this application entity.
    pub fn acceptor_max_pdu_length(&self) -> u32 {
        self.acceptor_max_pdu_length
    }

    /// Retrieve the maximum PDU length
    /// that the requestor is expecting to receive.
    pub fn requestor_max_pdu_length(&self) -> u32 {
        self.requestor_max_pdu_length
    }

    /// Obtain the remote DICOM node's application entity title.
    pub fn client_ae_title(&self) -> &str {
        &self.client_ae_title
    }

    pub fn user_variables(&self) -> &[UserVariableItem] {
        &self.user_variables
    }

    /// The current state of the association.
    pub fn state(&self) -> AssociationState {
        self.channel.state()
    }

    /// Send a PDU message to the other intervenient.
    pub fn send(&mut self, msg: &Pdu) -> Result<()> {
        self.channel.send(msg)
    }

    /// Read a PDU message from the other intervenient,
    /// waiting at most for the configured read timeout.
    ///
    /// A release request is answered right away,
    /// closing the association,
    /// and then handed to the caller.
    pub fn receive(&mut self) -> Result<Pdu> {
        let pdu = self.channel.receive()?;
        if pdu == Pdu::ReleaseRQ {
            self.release_reply()?;
        }
        Ok(pdu)
    }

    pub(crate) fn release_reply(&mut self) -> Result<()> {
        self.channel.send(&Pdu::ReleaseRP)?;
        info!("Association with {} released", self.client_ae_title);
        self.channel.close();
        Ok(())
    }

    /// Send an abort message and shut down the TCP connection,
    /// terminating the association.
    pub fn abort(mut self) -> Result<()> {
        self.channel.abort(AbortRQSource::ServiceProvider(
            AbortRQServiceProviderReason::ReasonNotSpecified,
        ))
    }

    /// Prepare a P-Data writer for sending
    /// one or more data set fragments.
    pub fn send_pdata(&mut self, presentation_context_id: u8) -> PDataWriter<&mut TcpStream> {
        let max_pdu_length = self.requestor_max_pdu_length;
        PDataWriter::new(self.channel.socket(), presentation_context_id, max_pdu_length)
    }

    /// Prepare a P-Data reader for receiving
    /// one or more data set fragments.
    pub fn receive_pdata(&mut self) -> PDataReader<'_> {
        PDataReader::new(&mut self.channel)
    }
}

impl Drop for ServerAssociation {
    fn drop(&mut self) {
        if self.channel.state().is_open() {
            warn!(
                "Closing association with {} without release",
                self.client_ae_title
            );
            self.channel.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::PresentationContextProposed;

    fn request(called_ae_title: &str) -> AssociationRQ {
        AssociationRQ {
            protocol_version: 1,
            calling_ae_title: "STORE-SCU".to_string(),
            called_ae_title: called_ae_title.to_string(),
            application_context_name: APPLICATION_CONTEXT_NAME.to_string(),
            presentation_contexts: vec![
                PresentationContextProposed {
                    id: 1,
                    abstract_syntax: "1.2.840.10008.1.1".to_string(),
                    transfer_syntaxes: vec!["1.2.840.10008.1.2".to_string()],
                },
                PresentationContextProposed {
                    id: 3,
                    abstract_syntax: "1.2.840.10008.5.1.4.1.1.7".to_string(),
                    transfer_syntaxes: vec![
                        "1.2.840.10008.1.2.4.50".to_string(),
                        "1.2.840.10008.1.2.1\0".to_string(),
                    ],
                },
                PresentationContextProposed {
                    id: 5,
                    abstract_syntax: "1.2.3.4".to_string(),
                    transfer_syntaxes: vec!["1.2.840.10008.1.2".to_string()],
                },
            ],
            user_variables: vec![UserVariableItem::MaxLength(0)],
        }
    }

    fn options() -> ServerAssociationOptions<'static, AcceptAny> {
        ServerAssociationOptions::new()
            .with_abstract_syntax("1.2.840.10008.1.1")
            .with_abstract_syntax("1.2.840.10008.5.1.4.1.1.7")
            .with_transfer_syntax("1.2.840.10008.1.2")
            .with_transfer_syntax("1.2.840.10008.1.2.1")
    }

    #[test]
    fn negotiate_presentation_contexts() {
        let (ac, negotiated) = options().negotiate(request("ANY-SCP")).unwrap();
        let reasons: Vec<_> = ac.presentation_contexts.iter().map(|pc| pc.reason).collect();
        assert_eq!(
            reasons,
            vec![
                PresentationContextResultReason::Acceptance,
                PresentationContextResultReason::Acceptance,
                PresentationContextResultReason::AbstractSyntaxNotSupported,
            ]
        );
        assert_eq!(
            negotiated.presentation_contexts[1].transfer_syntax,
            "1.2.840.10008.1.2.1"
        );
        assert_eq!(
            negotiated.requestor_max_pdu_length,
            crate::pdu::MAXIMUM_PDU_SIZE
        );
    }

    #[test]
    fn transfer_syntaxes_not_supported() {
        let options = ServerAssociationOptions::new()
            .with_abstract_syntax("1.2.840.10008.5.1.4.1.1.7")
            .with_transfer_syntax("1.2.840.10008.1.2.2");
        let (ac, _) = options.negotiate(request("ANY-SCP")).unwrap();
        assert_eq!(
            ac.presentation_contexts[1].reason,
            PresentationContextResultReason::TransferSyntaxesNotSupported
        );
    }

    #[test]
    fn promiscuous_accepts_any_abstract_syntax() {
        let (ac, _) = options()
            .promiscuous(true)
            .negotiate(request("ANY-SCP"))
            .unwrap();
        assert!(ac
            .presentation_contexts
            .iter()
            .all(|pc| pc.reason == PresentationContextResultReason::Acceptance));
    }

    #[test]
    fn reject_unknown_called_ae_title() {
        let options = options().ae_title("STORE-SCP").accept_called_ae_title();
        let rj = options.negotiate(request("OTHER-SCP")).unwrap_err();
        assert_eq!(rj.result, AssociationRJResult::Permanent);
        assert_eq!(
            rj.source,
            AssociationRJSource::ServiceUser(
                AssociationRJServiceUserReason::CalledAeTitleNotRecognized
            )
        );
        assert!(options.negotiate(request("STORE-SCP")).is_ok());
    }

    #[test]
    fn reject_unknown_application_context() {
        let mut rq = request("ANY-SCP");
        rq.application_context_name = "1.2.3".to_string();
        let rj = options().negotiate(rq).unwrap_err();
        assert_eq!(
            rj.source,
            AssociationRJSource::ServiceUser(
                AssociationRJServiceUserReason::ApplicationContextNameNotSupported
            )
        );
    }

    #[test]
    fn answer_role_selections() {
        let mut rq = request("ANY-SCP");
        rq.user_variables.extend([
            UserVariableItem::RoleSelection(RoleSelection::new("1.2.840.10008.5.1.4.1.1.7", true, true)),
            UserVariableItem::RoleSelection(RoleSelection::new("1.2.3.4", true, true)),
        ]);
        let options = options().role_policy(RolePolicy {
            scu: true,
            scp: false,
        });
        let (ac, negotiated) = options.negotiate(rq).unwrap();
        assert_eq!(
            negotiated.role_selections,
            vec![
                RoleSelection::new("1.2.840.10008.5.1.4.1.1.7", true, false),
                RoleSelection::new("1.2.3.4", false, false),
            ]
        );
        assert_eq!(role_selections_of(&ac.user_variables), negotiated.role_selections);
    }
}
