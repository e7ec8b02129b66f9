//! DIMSE messages: commands, statuses and their exchange
//! over an established association.
//!
//! A message is a command set, always encoded in _Implicit VR Little Endian_,
//! optionally followed by a data set
//! in the transfer syntax of its presentation context.
//! Both are sent as P-DATA fragments.
//!
//! The service class user side of the DIMSE-C services
//! lives in [`ClientAssociation`](crate::ClientAssociation)
//! (see the [`scu`] module).
use dcm_core::Tag;
use dcm_dictionary_std::tags;
use dcm_object::{
    DefaultDicomObject, ModifyError, OpenFileOptions, ReadPreamble, WriteError,
};
use dcm_transfer_syntax_registry::entries::IMPLICIT_VR_LITTLE_ENDIAN;
use dcm_encoding::TransferSyntax;
use snafu::{Backtrace, OptionExt, ResultExt, Snafu};
use std::collections::VecDeque;
use tracing::warn;

use crate::association::{AssociationState, Channel};
use crate::pdu::{PDataValue, PDataValueType, Pdu};

pub mod scu;

pub use scu::{FindResponse, MoveResponse};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Association failure"))]
    Association {
        #[snafu(backtrace)]
        source: crate::association::Error,
    },

    #[snafu(display("Could not set command attribute {}", tag))]
    SetCommandAttribute {
        tag: Tag,
        #[snafu(backtrace)]
        source: ModifyError,
    },

    #[snafu(display("Could not encode command"))]
    EncodeCommand {
        #[snafu(backtrace)]
        source: WriteError,
    },

    #[snafu(display("Could not encode data set"))]
    EncodeData {
        #[snafu(backtrace)]
        source: WriteError,
    },

    #[snafu(display("Could not decode command: {}", message))]
    DecodeCommand { message: String, backtrace: Backtrace },

    #[snafu(display("Missing command attribute {}", tag))]
    MissingCommandAttribute { tag: Tag, backtrace: Backtrace },

    #[snafu(display("Unexpected command field {:#06x}, expected {}", got, expected))]
    UnexpectedCommand {
        expected: &'static str,
        got: u16,
        backtrace: Backtrace,
    },

    #[snafu(display("Association aborted by the peer"))]
    Aborted { backtrace: Backtrace },

    #[snafu(
        display("Unexpected PDU `{}` in message exchange", pdu.short_description()),
        visibility(pub(crate))
    )]
    UnexpectedMessagePdu { pdu: Box<Pdu>, backtrace: Backtrace },

    #[snafu(display("Fragment of presentation context {} while expecting {}", got, expected))]
    MixedPresentationContexts {
        expected: u8,
        got: u8,
        backtrace: Backtrace,
    },

    #[snafu(display("No accepted presentation context for `{}`", abstract_syntax))]
    NoPresentationContext {
        abstract_syntax: String,
        backtrace: Backtrace,
    },

    #[snafu(display("Unsupported transfer syntax `{}`", uid))]
    UnsupportedTransferSyntax { uid: String, backtrace: Backtrace },

    #[snafu(display("Missing {} in data set", name))]
    MissingDataAttribute {
        name: &'static str,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[repr(u16)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Priority {
    Low = 0x0002,
    Medium = 0x0000,
    High = 0x0001,
}

#[repr(u16)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CommandDatasetType {
    Present = 0x0001,
    Absent = 0x0101,
}

/// The DIMSE-C command fields.
#[allow(non_camel_case_types)]
#[repr(u16)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CommandField {
    C_STORE_RQ = 0x0001,
    C_STORE_RSP = 0x8001,
    C_FIND_RQ = 0x0020,
    C_FIND_RSP = 0x8020,
    C_MOVE_RQ = 0x0021,
    C_MOVE_RSP = 0x8021,
    C_ECHO_RQ = 0x0030,
    C_ECHO_RSP = 0x8030,
    C_CANCEL_RQ = 0x0FFF,
}

impl CommandField {
    pub fn from_code(code: u16) -> Option<Self> {
        use CommandField::*;
        Some(match code {
            0x0001 => C_STORE_RQ,
            0x8001 => C_STORE_RSP,
            0x0020 => C_FIND_RQ,
            0x8020 => C_FIND_RSP,
            0x0021 => C_MOVE_RQ,
            0x8021 => C_MOVE_RSP,
            0x0030 => C_ECHO_RQ,
            0x8030 => C_ECHO_RSP,
            0x0FFF => C_CANCEL_RQ,
            _ => return None,
        })
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    /// The response command field to this request.
    pub fn response(self) -> Option<Self> {
        CommandField::from_code(self.code() | 0x8000).filter(|_| !self.is_response())
    }

    pub fn is_response(self) -> bool {
        self.code() & 0x8000 != 0
    }
}

/// Status codes of DIMSE responses.
pub mod status {
    pub const SUCCESS: u16 = 0x0000;
    pub const PENDING: u16 = 0xFF00;
    /// pending, with optional keys not supported
    pub const PENDING_WARNING: u16 = 0xFF01;
    pub const CANCEL: u16 = 0xFE00;
    pub const SUB_OPERATIONS_WARNING: u16 = 0xB000;
    pub const MOVE_DESTINATION_UNKNOWN: u16 = 0xA801;
    pub const OUT_OF_RESOURCES: u16 = 0xA700;
    pub const UNABLE_TO_PERFORM_SUB_OPERATIONS: u16 = 0xA702;
    pub const IDENTIFIER_DOES_NOT_MATCH: u16 = 0xA900;
    pub const UNABLE_TO_PROCESS: u16 = 0xC000;
    pub const SOP_CLASS_NOT_SUPPORTED: u16 = 0x0122;
    pub const PROCESSING_FAILURE: u16 = 0x0110;
    pub const DUPLICATE_SOP_INSTANCE: u16 = 0x0111;
    pub const UNRECOGNIZED_OPERATION: u16 = 0x0211;

    pub fn is_pending(status: u16) -> bool {
        matches!(status, PENDING | PENDING_WARNING)
    }

    pub fn is_success(status: u16) -> bool {
        status == SUCCESS
    }

    pub fn is_warning(status: u16) -> bool {
        status == 0x0001 || (0xB000..=0xBFFF).contains(&status)
    }

    /// A human readable description of the status.
    pub fn describe(status: u16) -> &'static str {
        match status {
            SUCCESS => "success",
            PENDING => "pending",
            PENDING_WARNING => "pending, optional keys not supported",
            CANCEL => "cancelled",
            SUB_OPERATIONS_WARNING => "sub-operations complete, one or more failures",
            MOVE_DESTINATION_UNKNOWN => "refused: move destination unknown",
            OUT_OF_RESOURCES => "refused: out of resources",
            UNABLE_TO_PERFORM_SUB_OPERATIONS => "refused: unable to perform sub-operations",
            IDENTIFIER_DOES_NOT_MATCH => "identifier does not match SOP class",
            SOP_CLASS_NOT_SUPPORTED => "refused: SOP class not supported",
            PROCESSING_FAILURE => "processing failure",
            DUPLICATE_SOP_INSTANCE => "duplicate SOP instance",
            UNRECOGNIZED_OPERATION => "unrecognized operation",
            s if is_warning(s) => "warning",
            0xC000..=0xCFFF => "unable to process",
            0xA700..=0xA7FF => "refused: out of resources",
            _ => "failure",
        }
    }
}

/// The outcome of a DIMSE operation:
/// whether it succeeded, its final status and a message for humans.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DimseOutcome {
    pub success: bool,
    pub status: u16,
    pub message: String,
}

impl DimseOutcome {
    /// Build the outcome of a final response status,
    /// with the error comment of the response if any.
    pub fn from_status(status: u16, comment: Option<String>) -> Self {
        let success = status::is_success(status) || status::is_warning(status);
        let mut message = format!("{} ({:#06X})", status::describe(status), status);
        if let Some(comment) = comment.filter(|c| !c.is_empty()) {
            message.push_str(": ");
            message.push_str(&comment);
        }
        DimseOutcome {
            success,
            status,
            message,
        }
    }
}

impl std::fmt::Display for DimseOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// The sub-operation counters of a C-MOVE response.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubOperations {
    pub remaining: Option<u16>,
    pub completed: u16,
    pub failed: u16,
    pub warning: u16,
}

/// A DIMSE command set.
#[derive(Debug, Clone)]
pub struct Command {
    obj: DefaultDicomObject,
}

impl Command {
    /// Start a command with the given command field.
    pub fn new(field: CommandField) -> Result<Self> {
        Command::with_field_code(field.code())
    }

    fn with_field_code(code: u16) -> Result<Self> {
        Command {
            obj: DefaultDicomObject::new(),
        }
        .with(tags::COMMAND_GROUP_LENGTH, 0_u32)?
        .with(tags::COMMAND_FIELD, code)
    }

    /// Set an attribute of the command.
    pub fn with(mut self, tag: Tag, value: impl Into<dcm_core::Value>) -> Result<Self> {
        self.obj
            .set_value(tag, value)
            .context(SetCommandAttributeSnafu { tag })?;
        Ok(self)
    }

    /// Build a request to the given SOP class.
    pub fn request(field: CommandField, sop_class_uid: &str, message_id: u16) -> Result<Self> {
        Command::new(field)?
            .with(tags::AFFECTED_SOP_CLASS_UID, sop_class_uid)?
            .with(tags::MESSAGE_ID, message_id)
    }

    /// Build the response to a request.
    ///
    /// Requests outside of the DIMSE-C services known here
    /// are answered with their response command field all the same.
    pub fn response_to(request: &Command, status: u16) -> Result<Self> {
        let code = request
            .get_u16(tags::COMMAND_FIELD)
            .filter(|&code| code & 0x8000 == 0 && code != CommandField::C_CANCEL_RQ.code())
            .context(MissingCommandAttributeSnafu {
                tag: tags::COMMAND_FIELD,
            })?;
        let message_id = request.message_id().context(MissingCommandAttributeSnafu {
            tag: tags::MESSAGE_ID,
        })?;
        let mut response = Command::with_field_code(code | 0x8000)?
            .with(tags::MESSAGE_ID_BEING_RESPONDED_TO, message_id)?
            .with(tags::STATUS, status)?;
        if let Some(uid) = request.affected_sop_class_uid() {
            response = response.with(tags::AFFECTED_SOP_CLASS_UID, uid)?;
        }
        if let Some(uid) = request.affected_sop_instance_uid() {
            response = response.with(tags::AFFECTED_SOP_INSTANCE_UID, uid)?;
        }
        Ok(response)
    }

    /// Decode a command set.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let obj = OpenFileOptions::new()
            .read_preamble(ReadPreamble::Never)
            .transfer_syntax(IMPLICIT_VR_LITTLE_ENDIAN.uid())
            .from_bytes(bytes);
        if !obj.read_success() {
            return DecodeCommandSnafu {
                message: obj.messages().join("; "),
            }
            .fail();
        }
        let command = Command { obj };
        command.command_field().context(MissingCommandAttributeSnafu {
            tag: tags::COMMAND_FIELD,
        })?;
        Ok(command)
    }

    /// Encode the command set,
    /// declaring whether a data set follows.
    pub fn encode(&self, has_data_set: bool) -> Result<Vec<u8>> {
        let data_set_type = if has_data_set {
            CommandDatasetType::Present
        } else {
            CommandDatasetType::Absent
        };
        let command = self
            .clone()
            .with(tags::COMMAND_DATA_SET_TYPE, data_set_type as u16)?;
        command
            .obj
            .encode_dataset(&IMPLICIT_VR_LITTLE_ENDIAN)
            .context(EncodeCommandSnafu)
    }

    /// The underlying object.
    pub fn object(&self) -> &DefaultDicomObject {
        &self.obj
    }

    /// Retrieve an unsigned 16-bit attribute.
    pub fn get_u16(&self, tag: Tag) -> Option<u16> {
        self.obj.value(tag).ok()?.to_int::<u16>().ok()
    }

    /// Retrieve a text attribute, without padding.
    pub fn get_str(&self, tag: Tag) -> Option<String> {
        let value = self.obj.value(tag).ok()?;
        let text = value
            .to_str()
            .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
            .trim_start()
            .to_string();
        Some(text)
    }

    pub fn command_field(&self) -> Option<CommandField> {
        self.get_u16(tags::COMMAND_FIELD)
            .and_then(CommandField::from_code)
    }

    pub fn message_id(&self) -> Option<u16> {
        self.get_u16(tags::MESSAGE_ID)
    }

    pub fn message_id_being_responded_to(&self) -> Option<u16> {
        self.get_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO)
    }

    pub fn status(&self) -> Option<u16> {
        self.get_u16(tags::STATUS)
    }

    pub fn affected_sop_class_uid(&self) -> Option<String> {
        self.get_str(tags::AFFECTED_SOP_CLASS_UID)
    }

    pub fn affected_sop_instance_uid(&self) -> Option<String> {
        self.get_str(tags::AFFECTED_SOP_INSTANCE_UID)
    }

    pub fn move_destination(&self) -> Option<String> {
        self.get_str(tags::MOVE_DESTINATION)
    }

    pub fn error_comment(&self) -> Option<String> {
        self.get_str(tags::ERROR_COMMENT)
    }

    /// Whether a data set follows this command.
    pub fn has_data_set(&self) -> bool {
        self.get_u16(tags::COMMAND_DATA_SET_TYPE)
            .map(|t| t != CommandDatasetType::Absent as u16)
            .unwrap_or(false)
    }

    pub fn sub_operations(&self) -> SubOperations {
        SubOperations {
            remaining: self.get_u16(tags::NUMBER_OF_REMAINING_SUBOPERATIONS),
            completed: self
                .get_u16(tags::NUMBER_OF_COMPLETED_SUBOPERATIONS)
                .unwrap_or(0),
            failed: self.get_u16(tags::NUMBER_OF_FAILED_SUBOPERATIONS).unwrap_or(0),
            warning: self.get_u16(tags::NUMBER_OF_WARNING_SUBOPERATIONS).unwrap_or(0),
        }
    }

    /// Record sub-operation counters.
    pub fn with_sub_operations(self, counters: SubOperations) -> Result<Self> {
        let command = match counters.remaining {
            Some(remaining) => self.with(tags::NUMBER_OF_REMAINING_SUBOPERATIONS, remaining)?,
            None => self,
        };
        command
            .with(tags::NUMBER_OF_COMPLETED_SUBOPERATIONS, counters.completed)?
            .with(tags::NUMBER_OF_FAILED_SUBOPERATIONS, counters.failed)?
            .with(tags::NUMBER_OF_WARNING_SUBOPERATIONS, counters.warning)
    }
}

/// A whole DIMSE message as received.
#[derive(Debug, Clone)]
pub struct Message {
    pub presentation_context_id: u8,
    pub command: Command,
    /// the encoded data set, if any
    pub data: Option<Vec<u8>>,
}

impl Message {
    /// Decode the data set in the given transfer syntax.
    pub fn data_set(&self, ts_uid: &str) -> Option<DefaultDicomObject> {
        let data = self.data.as_ref()?;
        let obj = OpenFileOptions::new()
            .read_preamble(ReadPreamble::Never)
            .transfer_syntax(ts_uid)
            .from_bytes(data);
        if !obj.read_success() {
            warn!("Partially read data set: {}", obj.messages().join("; "));
        }
        Some(obj)
    }
}

/// What arrived on an association while waiting for a message.
#[derive(Debug)]
pub(crate) enum Incoming {
    Message(Message),
    /// The peer requested a release, not answered yet.
    Release,
}

/// Puts a message together out of P-DATA fragments.
#[derive(Debug, Default)]
struct MessageAssembler {
    presentation_context_id: Option<u8>,
    command_bytes: Vec<u8>,
    command: Option<Command>,
    data: Vec<u8>,
}

impl MessageAssembler {
    fn is_empty(&self) -> bool {
        self.presentation_context_id.is_none()
    }

    /// Take in received P-DATA values,
    /// returning the message once complete.
    ///
    /// Values after the end of the message are left in the queue.
    fn push(&mut self, values: &mut VecDeque<PDataValue>) -> Result<Option<Message>> {
        while let Some(value) = values.pop_front() {
            let mut complete = None;
            match self.presentation_context_id {
                None => self.presentation_context_id = Some(value.presentation_context_id),
                Some(expected) if expected != value.presentation_context_id => {
                    return MixedPresentationContextsSnafu {
                        expected,
                        got: value.presentation_context_id,
                    }
                    .fail();
                }
                Some(_) => {}
            }
            match (value.value_type, &self.command) {
                (PDataValueType::Command, None) => {
                    self.command_bytes.extend(value.data);
                    if value.is_last {
                        let command = Command::decode(&self.command_bytes)?;
                        if command.has_data_set() {
                            self.command = Some(command);
                        } else {
                            complete = Some(self.finish(command, None));
                        }
                    }
                }
                (PDataValueType::Data, Some(_)) => {
                    self.data.extend(value.data);
                    if value.is_last {
                        if let Some(command) = self.command.take() {
                            let data = std::mem::take(&mut self.data);
                            complete = Some(self.finish(command, Some(data)));
                        }
                    }
                }
                (PDataValueType::Command, Some(_)) => {
                    warn!("Ignoring command fragment while expecting a data set");
                }
                (PDataValueType::Data, None) => {
                    warn!("Ignoring data fragment before the end of the command");
                }
            }
            if complete.is_some() {
                return Ok(complete);
            }
        }
        Ok(None)
    }

    fn finish(&mut self, command: Command, data: Option<Vec<u8>>) -> Message {
        let presentation_context_id = self.presentation_context_id.take().unwrap_or_default();
        self.command_bytes.clear();
        Message {
            presentation_context_id,
            command,
            data,
        }
    }
}

/// Send a command and its data set, if any.
pub(crate) fn send_message(
    channel: &mut Channel,
    presentation_context_id: u8,
    command: &Command,
    data: Option<(&DefaultDicomObject, &TransferSyntax)>,
) -> Result<()> {
    let command_bytes = command.encode(data.is_some())?;
    channel
        .send_fragments(presentation_context_id, PDataValueType::Command, &command_bytes)
        .context(AssociationSnafu)?;

    if let Some((obj, ts)) = data {
        let bytes = obj.encode_dataset(ts).context(EncodeDataSnafu)?;
        channel
            .send_fragments(presentation_context_id, PDataValueType::Data, &bytes)
            .context(AssociationSnafu)?;
    }
    Ok(())
}

/// Wait for the next message or release request.
pub(crate) fn receive_incoming(channel: &mut Channel) -> Result<Incoming> {
    complete_incoming(channel, None)
}

/// Check for a message without waiting,
/// completing it with blocking reads once it has started.
pub(crate) fn poll_incoming(channel: &mut Channel) -> Result<Option<Incoming>> {
    if channel.has_pending_values() {
        return complete_incoming(channel, None).map(Some);
    }
    let Some(pdu) = channel.try_receive().context(AssociationSnafu)? else {
        return Ok(None);
    };
    complete_incoming(channel, Some(pdu)).map(Some)
}

/// Assemble the next message,
/// starting from the values left over by the previous one.
fn complete_incoming(channel: &mut Channel, mut pdu: Option<Pdu>) -> Result<Incoming> {
    let mut assembler = MessageAssembler::default();
    let mut values = channel.take_pending_values();
    loop {
        let incoming = match pdu.take() {
            Some(pdu) => handle_pdu(channel, &mut assembler, &mut values, pdu)?,
            None => assembler.push(&mut values)?.map(Incoming::Message),
        };
        if let Some(incoming) = incoming {
            channel.keep_pending_values(values);
            return Ok(incoming);
        }
        pdu = Some(channel.receive().context(AssociationSnafu)?);
    }
}

fn handle_pdu(
    channel: &mut Channel,
    assembler: &mut MessageAssembler,
    values: &mut VecDeque<PDataValue>,
    pdu: Pdu,
) -> Result<Option<Incoming>> {
    match pdu {
        Pdu::PData { data } => {
            values.extend(data);
            Ok(assembler.push(values)?.map(Incoming::Message))
        }
        Pdu::ReleaseRQ if assembler.is_empty() => Ok(Some(Incoming::Release)),
        Pdu::AbortRQ { .. } => AbortedSnafu.fail(),
        pdu => {
            channel.abort_on_failure();
            UnexpectedMessagePduSnafu { pdu: Box::new(pdu) }.fail()
        }
    }
}

/// Wait for the next message.
pub(crate) fn receive_message(channel: &mut Channel) -> Result<Message> {
    match receive_incoming(channel)? {
        Incoming::Message(message) => Ok(message),
        Incoming::Release => {
            channel.abort_on_failure();
            UnexpectedMessagePduSnafu {
                pdu: Box::new(Pdu::ReleaseRQ),
            }
            .fail()
        }
    }
}

/// Mark the association as busy with a message exchange.
pub(crate) fn begin_exchange(channel: &mut Channel) {
    if channel.state() == AssociationState::Established {
        channel.set_state(AssociationState::MessageExchange);
    }
}

/// Mark the end of a message exchange.
pub(crate) fn end_exchange(channel: &mut Channel) {
    if channel.state() == AssociationState::MessageExchange {
        channel.set_state(AssociationState::Established);
    }
}

/// Look up a transfer syntax of a negotiated presentation context.
pub(crate) fn transfer_syntax(uid: &str) -> Result<&'static TransferSyntax> {
    dcm_transfer_syntax_registry::get(uid)
        .filter(|ts| ts.is_supported())
        .context(UnsupportedTransferSyntaxSnafu { uid })
}

#[cfg(test)]
mod tests {
    use super::*;
    use matches::assert_matches;

    #[test]
    fn command_round_trip() {
        let command = Command::request(CommandField::C_ECHO_RQ, "1.2.840.10008.1.1", 7)
            .unwrap();
        let bytes = command.encode(false).unwrap();
        // group length comes first, implicit VR little endian
        assert_eq!(&bytes[..8], &[0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00]);
        let group_length = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        assert_eq!(group_length as usize, bytes.len() - 12);

        let decoded = Command::decode(&bytes).unwrap();
        assert_eq!(decoded.command_field(), Some(CommandField::C_ECHO_RQ));
        assert_eq!(decoded.message_id(), Some(7));
        assert_eq!(
            decoded.affected_sop_class_uid().as_deref(),
            Some("1.2.840.10008.1.1")
        );
        assert!(!decoded.has_data_set());
    }

    #[test]
    fn response_mirrors_request() {
        let request = Command::request(CommandField::C_STORE_RQ, "1.2.840.10008.5.1.4.1.1.7", 3)
            .unwrap()
            .with(tags::AFFECTED_SOP_INSTANCE_UID, "1.2.3.4")
            .unwrap();
        let response = Command::response_to(&request, status::SUCCESS).unwrap();
        assert_eq!(response.command_field(), Some(CommandField::C_STORE_RSP));
        assert_eq!(response.message_id_being_responded_to(), Some(3));
        assert_eq!(response.status(), Some(0));
        assert_eq!(response.affected_sop_instance_uid().as_deref(), Some("1.2.3.4"));

        let bytes = response.encode(false).unwrap();
        let decoded = Command::decode(&bytes).unwrap();
        assert_eq!(decoded.status(), Some(0));
    }

    #[test]
    fn responses_to_other_requests() {
        // C-GET-RQ
        let request = Command::new(CommandField::C_ECHO_RQ)
            .unwrap()
            .with(tags::COMMAND_FIELD, 0x0010_u16)
            .unwrap()
            .with(tags::MESSAGE_ID, 9_u16)
            .unwrap();
        let response = Command::response_to(&request, status::UNRECOGNIZED_OPERATION).unwrap();
        assert_eq!(response.get_u16(tags::COMMAND_FIELD), Some(0x8010));
        assert_eq!(response.message_id_being_responded_to(), Some(9));

        let cancel = Command::new(CommandField::C_CANCEL_RQ)
            .unwrap()
            .with(tags::MESSAGE_ID, 10_u16)
            .unwrap();
        assert_matches!(
            Command::response_to(&cancel, status::SUCCESS),
            Err(Error::MissingCommandAttribute { .. })
        );
    }

    #[test]
    fn sub_operation_counters() {
        let command = Command::new(CommandField::C_MOVE_RSP)
            .unwrap()
            .with_sub_operations(SubOperations {
                remaining: Some(2),
                completed: 3,
                failed: 1,
                warning: 0,
            })
            .unwrap();
        let decoded = Command::decode(&command.encode(false).unwrap()).unwrap();
        assert_eq!(
            decoded.sub_operations(),
            SubOperations {
                remaining: Some(2),
                completed: 3,
                failed: 1,
                warning: 0,
            }
        );
    }

    #[test]
    fn outcome_of_statuses() {
        let outcome = DimseOutcome::from_status(status::SUCCESS, None);
        assert!(outcome.success);
        let outcome = DimseOutcome::from_status(
            status::MOVE_DESTINATION_UNKNOWN,
            Some("no such node".to_string()),
        );
        assert!(!outcome.success);
        assert_eq!(
            outcome.message,
            "refused: move destination unknown (0xA801): no such node"
        );
        assert!(DimseOutcome::from_status(status::SUB_OPERATIONS_WARNING, None).success);
        assert!(!DimseOutcome::from_status(status::CANCEL, None).success);
    }

    fn fragment(
        presentation_context_id: u8,
        value_type: PDataValueType,
        is_last: bool,
        data: &[u8],
    ) -> PDataValue {
        PDataValue {
            presentation_context_id,
            value_type,
            is_last,
            data: data.to_vec(),
        }
    }

    #[test]
    fn assemble_fragmented_message() {
        let command = Command::request(CommandField::C_STORE_RQ, "1.2.3", 1).unwrap();
        let bytes = command.encode(true).unwrap();
        let (head, tail) = bytes.split_at(10);

        let mut assembler = MessageAssembler::default();
        let mut values = VecDeque::from(vec![fragment(3, PDataValueType::Command, false, head)]);
        assert_matches!(assembler.push(&mut values), Ok(None));
        let mut values = VecDeque::from(vec![
            fragment(3, PDataValueType::Command, true, tail),
            fragment(3, PDataValueType::Data, false, &[1, 2]),
        ]);
        assert_matches!(assembler.push(&mut values), Ok(None));
        assert!(values.is_empty());
        let mut values = VecDeque::from(vec![fragment(3, PDataValueType::Data, true, &[3, 4])]);
        let message = assembler.push(&mut values).unwrap().unwrap();
        assert_eq!(message.presentation_context_id, 3);
        assert_eq!(message.data, Some(vec![1, 2, 3, 4]));
        assert!(assembler.is_empty());

        let mut values = VecDeque::from(vec![
            fragment(3, PDataValueType::Command, false, head),
            fragment(5, PDataValueType::Command, true, tail),
        ]);
        assert_matches!(
            assembler.push(&mut values),
            Err(Error::MixedPresentationContexts { expected: 3, got: 5, .. })
        );
    }

    #[test]
    fn consecutive_messages_in_one_pdu() {
        let find = Command::request(CommandField::C_FIND_RQ, "1.2.3", 4)
            .unwrap()
            .encode(false)
            .unwrap();
        let cancel = Command::new(CommandField::C_CANCEL_RQ)
            .unwrap()
            .with(tags::MESSAGE_ID_BEING_RESPONDED_TO, 4_u16)
            .unwrap()
            .encode(false)
            .unwrap();

        let mut assembler = MessageAssembler::default();
        let mut values = VecDeque::from(vec![
            fragment(1, PDataValueType::Command, true, &find),
            fragment(1, PDataValueType::Command, true, &cancel),
        ]);
        let first = assembler.push(&mut values).unwrap().unwrap();
        assert_eq!(first.command.command_field(), Some(CommandField::C_FIND_RQ));
        assert_eq!(values.len(), 1);

        let second = assembler.push(&mut values).unwrap().unwrap();
        assert_eq!(second.command.command_field(), Some(CommandField::C_CANCEL_RQ));
        assert_eq!(second.command.message_id_being_responded_to(), Some(4));
        assert!(values.is_empty());
        assert!(assembler.is_empty());
    }

    #[test]
    fn command_field_responses() {
        assert_eq!(
            CommandField::C_FIND_RQ.response(),
            Some(CommandField::C_FIND_RSP)
        );
        assert_eq!(CommandField::C_FIND_RSP.response(), None);
        assert_eq!(CommandField::C_CANCEL_RQ.response(), None);
        assert_eq!(CommandField::from_code(0x8021), Some(CommandField::C_MOVE_RSP));
    }
}
