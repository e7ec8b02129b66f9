//! A DIMSE-C service class provider.
//!
//! [`ServiceProvider`] accepts associations on a TCP listener,
//! serving each one on its own thread.
//! C-ECHO is always answered,
//! while storage, query and retrieval are delegated to handlers.
use std::{
    collections::BTreeMap,
    net::{TcpListener, TcpStream},
    ops::ControlFlow,
    sync::Arc,
    thread,
};

use dcm_object::DefaultDicomObject;
use snafu::{ResultExt, Snafu};
use tracing::{debug, error, info, warn};

use crate::{
    association::{self, AcceptAny, AccessControl},
    dimse::{
        self, begin_exchange, end_exchange, poll_incoming, receive_incoming, send_message,
        status, transfer_syntax, Command, CommandField, Incoming, Message, SubOperations,
    },
    ClientAssociationOptions, ServerAssociation, ServerAssociationOptions,
};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not accept connection"))]
    Accept {
        source: std::io::Error,
        backtrace: snafu::Backtrace,
    },

    #[snafu(display("Could not establish association"))]
    Establish {
        #[snafu(backtrace)]
        source: association::Error,
    },

    #[snafu(display("Could not release association"))]
    Release {
        #[snafu(backtrace)]
        source: association::Error,
    },

    #[snafu(display("Message exchange failed"))]
    Exchange {
        #[snafu(backtrace)]
        source: dimse::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Receives the objects of C-STORE requests.
pub trait StoreHandler: Send + Sync {
    /// Keep an object sent by the given application entity,
    /// returning the status of the response.
    fn store(&self, calling_ae_title: &str, obj: DefaultDicomObject) -> u16;
}

impl<F> StoreHandler for F
where
    F: Fn(&str, DefaultDicomObject) -> u16 + Send + Sync,
{
    fn store(&self, calling_ae_title: &str, obj: DefaultDicomObject) -> u16 {
        self(calling_ae_title, obj)
    }
}

/// Answers C-FIND requests.
pub trait FindHandler: Send + Sync {
    /// Produce the identifiers matching a query
    /// in the given information model.
    fn find<'a>(
        &'a self,
        information_model: &str,
        identifier: &DefaultDicomObject,
    ) -> Box<dyn Iterator<Item = DefaultDicomObject> + 'a>;
}

/// Answers C-MOVE requests.
pub trait MoveHandler: Send + Sync {
    /// Produce the instances to send for a query.
    fn instances(
        &self,
        information_model: &str,
        identifier: &DefaultDicomObject,
    ) -> Vec<DefaultDicomObject>;

    /// Resolve the network address of a move destination.
    fn destination(&self, ae_title: &str) -> Option<String>;
}

/// A move handler over a fixed set of instances
/// and a table of known destinations.
///
/// Instances match when every non-empty text attribute of the identifier,
/// other than the query/retrieve level, is equal in the instance.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    instances: Vec<DefaultDicomObject>,
    destinations: BTreeMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(mut self, obj: DefaultDicomObject) -> Self {
        self.instances.push(obj);
        self
    }

    /// Register the address of a move destination.
    pub fn with_destination(
        mut self,
        ae_title: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        self.destinations.insert(ae_title.into(), address.into());
        self
    }

    fn matches(&self, identifier: &DefaultDicomObject) -> Vec<DefaultDicomObject> {
        let keys: Vec<_> = identifier
            .children(dcm_object::Parent::Root)
            .filter_map(|id| identifier.element_at(id))
            .filter(|e| e.tag() != dcm_dictionary_std::tags::QUERY_RETRIEVE_LEVEL)
            .filter_map(|e| Some((e.tag(), trimmed(&e.to_str().ok()?))))
            .filter(|(_, v)| !v.is_empty())
            .collect();
        self.instances
            .iter()
            .filter(|obj| {
                keys.iter().all(|(tag, expected)| {
                    obj.element(*tag)
                        .ok()
                        .and_then(|e| e.to_str().ok())
                        .map(|v| trimmed(&v) == *expected)
                        .unwrap_or(false)
                })
            })
            .cloned()
            .collect()
    }
}

fn trimmed(s: &str) -> String {
    s.trim_end_matches(|c: char| c == '\0' || c == ' ')
        .trim_start()
        .to_string()
}

impl FindHandler for InMemoryStore {
    fn find<'a>(
        &'a self,
        _information_model: &str,
        identifier: &DefaultDicomObject,
    ) -> Box<dyn Iterator<Item = DefaultDicomObject> + 'a> {
        Box::new(self.matches(identifier).into_iter())
    }
}

impl MoveHandler for InMemoryStore {
    fn instances(
        &self,
        _information_model: &str,
        identifier: &DefaultDicomObject,
    ) -> Vec<DefaultDicomObject> {
        self.matches(identifier)
    }

    fn destination(&self, ae_title: &str) -> Option<String> {
        self.destinations.get(ae_title).cloned()
    }
}

/// A service class provider for verification, storage,
/// query and retrieval.
///
/// Configuration and handlers are shared read-only
/// among the threads serving each association.
pub struct ServiceProvider<A = AcceptAny> {
    options: Arc<ServerAssociationOptions<'static, A>>,
    store_handler: Option<Arc<dyn StoreHandler>>,
    find_handler: Option<Arc<dyn FindHandler>>,
    move_handler: Option<Arc<dyn MoveHandler>>,
}

impl<A> Clone for ServiceProvider<A> {
    fn clone(&self) -> Self {
        ServiceProvider {
            options: Arc::clone(&self.options),
            store_handler: self.store_handler.clone(),
            find_handler: self.find_handler.clone(),
            move_handler: self.move_handler.clone(),
        }
    }
}

impl<A> std::fmt::Debug for ServiceProvider<A>
where
    A: AccessControl,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("ae_title", &self.options.get_ae_title())
            .field("store", &self.store_handler.is_some())
            .field("find", &self.find_handler.is_some())
            .field("move", &self.move_handler.is_some())
            .finish()
    }
}

impl<A> ServiceProvider<A>
where
    A: AccessControl + Send + Sync + 'static,
{
    pub fn new(options: ServerAssociationOptions<'static, A>) -> Self {
        ServiceProvider {
            options: Arc::new(options),
            store_handler: None,
            find_handler: None,
            move_handler: None,
        }
    }

    pub fn with_store_handler(mut self, handler: impl StoreHandler + 'static) -> Self {
        self.store_handler = Some(Arc::new(handler));
        self
    }

    pub fn with_find_handler(mut self, handler: impl FindHandler + 'static) -> Self {
        self.find_handler = Some(Arc::new(handler));
        self
    }

    pub fn with_move_handler(mut self, handler: impl MoveHandler + 'static) -> Self {
        self.move_handler = Some(Arc::new(handler));
        self
    }

    /// Accept connections until the listener fails,
    /// serving each association on its own thread.
    pub fn run(&self, listener: TcpListener) -> Result<()> {
        for stream in listener.incoming() {
            let socket = stream.context(AcceptSnafu)?;
            let provider = self.clone();
            thread::spawn(move || {
                let peer = socket.peer_addr().ok();
                if let Err(e) = provider.serve(socket) {
                    error!("Association with {:?} failed: {}", peer, snafu::Report::from_error(e));
                }
            });
        }
        Ok(())
    }

    /// Establish an association over the socket
    /// and serve its requests until it is released or aborted.
    pub fn serve(&self, socket: TcpStream) -> Result<()> {
        let mut association = self.options.establish(socket).context(EstablishSnafu)?;
        info!(
            "Association established with {}",
            association.client_ae_title()
        );
        loop {
            match receive_incoming(&mut association.channel) {
                Ok(Incoming::Release) => {
                    return association.release_reply().context(ReleaseSnafu);
                }
                Ok(Incoming::Message(message)) => {
                    begin_exchange(&mut association.channel);
                    let out = self.dispatch(&mut association, message);
                    end_exchange(&mut association.channel);
                    out.context(ExchangeSnafu)?;
                }
                Err(dimse::Error::Aborted { .. }) => {
                    info!("Association aborted by {}", association.client_ae_title());
                    return Ok(());
                }
                Err(dimse::Error::Association {
                    source: association::Error::ConnectionClosed { .. },
                }) => {
                    warn!(
                        "Connection with {} closed without release",
                        association.client_ae_title()
                    );
                    return Ok(());
                }
                Err(e) => return Err(e).context(ExchangeSnafu),
            }
        }
    }

    fn dispatch(&self, association: &mut ServerAssociation, message: Message) -> dimse::Result<()> {
        match message.command.command_field() {
            Some(CommandField::C_ECHO_RQ) => {
                debug!("C-ECHO from {}", association.client_ae_title());
                respond(association, &message, status::SUCCESS, None)
            }
            Some(CommandField::C_STORE_RQ) => self.handle_store(association, message),
            Some(CommandField::C_FIND_RQ) => self.handle_find(association, message),
            Some(CommandField::C_MOVE_RQ) => self.handle_move(association, message),
            Some(CommandField::C_CANCEL_RQ) => {
                debug!("Ignoring C-CANCEL without a pending operation");
                Ok(())
            }
            _ => {
                let code = message
                    .command
                    .get_u16(dcm_dictionary_std::tags::COMMAND_FIELD)
                    .unwrap_or_default();
                if code & 0x8000 != 0 {
                    warn!("Ignoring unsolicited response {:#06x}", code);
                    return Ok(());
                }
                warn!("Unsupported command {:#06x}", code);
                respond(association, &message, status::UNRECOGNIZED_OPERATION, None)
            }
        }
    }

    fn handle_store(&self, association: &mut ServerAssociation, message: Message) -> dimse::Result<()> {
        let status = match (&self.store_handler, data_set_of(association, &message)) {
            (Some(handler), Some(obj)) => handler.store(association.client_ae_title(), obj),
            (None, _) => status::SOP_CLASS_NOT_SUPPORTED,
            (_, None) => status::PROCESSING_FAILURE,
        };
        respond(association, &message, status, None)
    }

    fn handle_find(&self, association: &mut ServerAssociation, message: Message) -> dimse::Result<()> {
        let (Some(handler), Some(identifier)) =
            (&self.find_handler, data_set_of(association, &message))
        else {
            return respond(association, &message, status::SOP_CLASS_NOT_SUPPORTED, None);
        };
        let model = message.command.affected_sop_class_uid().unwrap_or_default();
        let mut matches = handler.find(&model, &identifier);
        loop {
            if cancel_requested(association, &message)? {
                return respond(association, &message, status::CANCEL, None);
            }
            match matches.next() {
                Some(obj) => respond(association, &message, status::PENDING, Some(&obj))?,
                None => return respond(association, &message, status::SUCCESS, None),
            }
        }
    }

    fn handle_move(&self, association: &mut ServerAssociation, message: Message) -> dimse::Result<()> {
        let (Some(handler), Some(identifier)) =
            (&self.move_handler, data_set_of(association, &message))
        else {
            return respond(association, &message, status::SOP_CLASS_NOT_SUPPORTED, None);
        };
        let destination = message.command.move_destination().unwrap_or_default();
        let Some(address) = handler.destination(&destination) else {
            warn!("Unknown move destination `{}`", destination);
            return respond(association, &message, status::MOVE_DESTINATION_UNKNOWN, None);
        };
        let model = message.command.affected_sop_class_uid().unwrap_or_default();
        let instances = handler.instances(&model, &identifier);
        let Ok(total) = u16::try_from(instances.len()) else {
            warn!("Too many instances to move ({})", instances.len());
            let counters = SubOperations::default();
            return respond_move(
                association,
                &message,
                status::UNABLE_TO_PERFORM_SUB_OPERATIONS,
                counters,
            );
        };
        let mut counters = SubOperations {
            remaining: Some(total),
            ..Default::default()
        };
        if instances.is_empty() {
            return respond_move(association, &message, status::SUCCESS, counters);
        }

        let mut options = ClientAssociationOptions::new()
            .calling_ae_title(self.options.get_ae_title().to_string())
            .called_ae_title(destination.clone());
        let mut sop_classes: Vec<(String, String)> = Vec::new();
        for obj in &instances {
            let sop_class = obj
                .value(dcm_dictionary_std::tags::SOP_CLASS_UID)
                .map(|v| trimmed(&v.to_str()))
                .unwrap_or_default();
            let ts = obj.transfer_syntax().to_string();
            if !sop_classes.contains(&(sop_class.clone(), ts.clone())) {
                sop_classes.push((sop_class, ts));
            }
        }
        for (sop_class, ts) in sop_classes {
            let mut transfer_syntaxes = vec![ts];
            for native in [
                dcm_dictionary_std::uids::EXPLICIT_VR_LITTLE_ENDIAN,
                dcm_dictionary_std::uids::IMPLICIT_VR_LITTLE_ENDIAN,
            ] {
                if !transfer_syntaxes.iter().any(|t| t == native) {
                    transfer_syntaxes.push(native.to_string());
                }
            }
            options = options.with_presentation_context(sop_class, transfer_syntaxes);
        }
        let mut store = match options.establish_with(&address) {
            Ok(store) => store,
            Err(e) => {
                warn!(
                    "Could not reach move destination {}: {}",
                    destination,
                    snafu::Report::from_error(e)
                );
                counters.remaining = None;
                counters.failed = total;
                return respond_move(
                    association,
                    &message,
                    status::UNABLE_TO_PERFORM_SUB_OPERATIONS,
                    counters,
                );
            }
        };

        let mut cancelled = false;
        for obj in &instances {
            if cancel_requested(association, &message)? {
                cancelled = true;
                break;
            }
            match store.c_store(obj) {
                Ok(outcome) if status::is_warning(outcome.status) => counters.warning += 1,
                Ok(outcome) if outcome.success => counters.completed += 1,
                Ok(outcome) => {
                    warn!("C-STORE sub-operation failed: {}", outcome);
                    counters.failed += 1;
                }
                Err(e) => {
                    warn!("C-STORE sub-operation failed: {}", snafu::Report::from_error(e));
                    counters.failed += 1;
                }
            }
            let done = counters.completed + counters.failed + counters.warning;
            counters.remaining = Some(total.saturating_sub(done));
            if counters.remaining != Some(0) {
                respond_move(association, &message, status::PENDING, counters)?;
            }
        }
        if let Err(e) = store.release() {
            debug!("Sub-association release failed: {}", snafu::Report::from_error(e));
        }

        if cancelled {
            return respond_move(association, &message, status::CANCEL, counters);
        }
        counters.remaining = None;
        let final_status = if counters.failed > 0 || counters.warning > 0 {
            status::SUB_OPERATIONS_WARNING
        } else {
            status::SUCCESS
        };
        respond_move(association, &message, final_status, counters)
    }
}

/// Decode the data set of a request
/// in the transfer syntax of its presentation context.
fn data_set_of(association: &ServerAssociation, message: &Message) -> Option<DefaultDicomObject> {
    let pc = association.presentation_context(message.presentation_context_id)?;
    message.data_set(&pc.transfer_syntax)
}

fn respond(
    association: &mut ServerAssociation,
    request: &Message,
    status: u16,
    data: Option<&DefaultDicomObject>,
) -> dimse::Result<()> {
    let response = Command::response_to(&request.command, status)?;
    send_response(association, request, &response, data)
}

fn respond_move(
    association: &mut ServerAssociation,
    request: &Message,
    status: u16,
    counters: SubOperations,
) -> dimse::Result<()> {
    let response = Command::response_to(&request.command, status)?.with_sub_operations(counters)?;
    send_response(association, request, &response, None)
}

fn send_response(
    association: &mut ServerAssociation,
    request: &Message,
    response: &Command,
    data: Option<&DefaultDicomObject>,
) -> dimse::Result<()> {
    let pc_id = request.presentation_context_id;
    let data = match data {
        Some(obj) => {
            let uid = association
                .presentation_context(pc_id)
                .map(|pc| pc.transfer_syntax.clone())
                .unwrap_or_default();
            Some((obj, transfer_syntax(&uid)?))
        }
        None => None,
    };
    send_message(&mut association.channel, pc_id, response, data)
}

/// Check whether the requester cancelled the pending operation.
fn cancel_requested(association: &mut ServerAssociation, request: &Message) -> dimse::Result<bool> {
    let flow = match poll_incoming(&mut association.channel)? {
        None => ControlFlow::Continue(()),
        Some(Incoming::Message(message)) => {
            let cancels = message.command.command_field() == Some(CommandField::C_CANCEL_RQ)
                && message.command.message_id_being_responded_to() == request.command.message_id();
            if cancels {
                info!("Operation {:?} cancelled", request.command.message_id());
                ControlFlow::Break(())
            } else {
                warn!(
                    "Ignoring {:?} during a pending operation",
                    message.command.command_field()
                );
                ControlFlow::Continue(())
            }
        }
        Some(Incoming::Release) => {
            warn!("Release requested during a pending operation");
            association.channel.abort_on_failure();
            return dimse::UnexpectedMessagePduSnafu {
                pdu: Box::new(crate::pdu::Pdu::ReleaseRQ),
            }
            .fail();
        }
    };
    Ok(flow.is_break())
}
