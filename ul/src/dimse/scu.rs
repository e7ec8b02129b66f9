//! DIMSE-C operations on the requesting side of an association.
use std::ops::ControlFlow;

use dcm_dictionary_std::{tags, uids};
use dcm_object::DefaultDicomObject;
use snafu::{ensure, OptionExt};
use tracing::{debug, info, warn};

use super::{
    begin_exchange, end_exchange, receive_message, send_message, status, transfer_syntax,
    Command, CommandField, DimseOutcome, Message, MissingDataAttributeSnafu,
    NoPresentationContextSnafu, Priority, Result, SubOperations, UnexpectedCommandSnafu,
    UnsupportedTransferSyntaxSnafu,
};
use crate::{pdu::PresentationContextNegotiated, ClientAssociation};

/// The outcome of a C-FIND operation.
#[derive(Debug, Clone)]
pub struct FindResponse {
    /// the identifiers of all pending responses
    pub matches: Vec<DefaultDicomObject>,
    pub outcome: DimseOutcome,
}

/// The outcome of a C-MOVE operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResponse {
    pub outcome: DimseOutcome,
    /// counters of the final response
    pub sub_operations: SubOperations,
}

impl ClientAssociation {
    fn presentation_context_for(
        &self,
        abstract_syntax: &str,
    ) -> Result<&PresentationContextNegotiated> {
        self.accepted_presentation_contexts()
            .find(|pc| pc.abstract_syntax == abstract_syntax)
            .context(NoPresentationContextSnafu { abstract_syntax })
    }

    /// Send a DIMSE message on the given presentation context.
    ///
    /// The data set, if any,
    /// is encoded in the transfer syntax of the presentation context
    /// and split into as many P-DATA PDUs as the acceptor requires.
    pub fn send_message(
        &mut self,
        presentation_context_id: u8,
        command: &Command,
        data: Option<&DefaultDicomObject>,
    ) -> Result<()> {
        let data = match data {
            Some(obj) => {
                let pc = self
                    .accepted_presentation_contexts()
                    .find(|pc| pc.id == presentation_context_id)
                    .context(NoPresentationContextSnafu {
                        abstract_syntax: format!("presentation context {}", presentation_context_id),
                    })?;
                Some((obj, transfer_syntax(&pc.transfer_syntax)?))
            }
            None => None,
        };
        send_message(&mut self.channel, presentation_context_id, command, data)
    }

    /// Wait for the next DIMSE message.
    pub fn receive_message(&mut self) -> Result<Message> {
        receive_message(&mut self.channel)
    }

    fn receive_response(&mut self, expected: CommandField, message_id: u16) -> Result<Message> {
        let message = receive_message(&mut self.channel)?;
        let field = message.command.command_field();
        ensure!(
            field == Some(expected),
            UnexpectedCommandSnafu {
                expected: response_name(expected),
                got: field.map(CommandField::code).unwrap_or_default(),
            }
        );
        if message.command.message_id_being_responded_to() != Some(message_id) {
            warn!(
                "Response to message {:?}, expected {}",
                message.command.message_id_being_responded_to(),
                message_id
            );
        }
        Ok(message)
    }

    fn exchange<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        begin_exchange(&mut self.channel);
        let out = f(self);
        end_exchange(&mut self.channel);
        out
    }

    /// Verify the connection with the peer through a C-ECHO.
    pub fn c_echo(&mut self) -> Result<DimseOutcome> {
        let pc_id = self.presentation_context_for(uids::VERIFICATION)?.id;
        let message_id = self.next_message_id();
        let command = Command::request(CommandField::C_ECHO_RQ, uids::VERIFICATION, message_id)?;
        self.exchange(|this| {
            this.send_message(pc_id, &command, None)?;
            let response = this.receive_response(CommandField::C_ECHO_RSP, message_id)?;
            Ok(outcome_of(&response.command))
        })
    }

    /// Store a DICOM object in the peer through a C-STORE.
    ///
    /// The presentation context is chosen by the SOP class of the object,
    /// preferring one in the object's own transfer syntax.
    /// Objects in a native transfer syntax are converted
    /// to the one of the context if needed.
    pub fn c_store(&mut self, obj: &DefaultDicomObject) -> Result<DimseOutcome> {
        let sop_class_uid = data_str(obj, tags::SOP_CLASS_UID)
            .context(MissingDataAttributeSnafu { name: "SOP Class UID" })?;
        let sop_instance_uid = data_str(obj, tags::SOP_INSTANCE_UID).context(
            MissingDataAttributeSnafu {
                name: "SOP Instance UID",
            },
        )?;

        let (pc_id, ts_uid) = {
            let mut candidates = self
                .accepted_presentation_contexts()
                .filter(|pc| pc.abstract_syntax == sop_class_uid)
                .peekable();
            ensure!(
                candidates.peek().is_some(),
                NoPresentationContextSnafu {
                    abstract_syntax: sop_class_uid.as_str(),
                }
            );
            let candidates: Vec<_> = candidates.collect();
            let source_ts = obj.transfer_syntax();
            let encapsulated = dcm_transfer_syntax_registry::get(source_ts)
                .map(|ts| ts.is_encapsulated_pixel_data())
                .unwrap_or(false);
            let pc = candidates
                .iter()
                .find(|pc| pc.transfer_syntax == source_ts)
                .or_else(|| {
                    if encapsulated {
                        None
                    } else {
                        candidates.iter().find(|pc| {
                            dcm_transfer_syntax_registry::get(&pc.transfer_syntax)
                                .map(|ts| ts.is_supported() && !ts.is_encapsulated_pixel_data())
                                .unwrap_or(false)
                        })
                    }
                })
                .context(UnsupportedTransferSyntaxSnafu { uid: source_ts })?;
            (pc.id, pc.transfer_syntax.clone())
        };
        debug!(
            "Storing {} over presentation context {} ({})",
            sop_instance_uid, pc_id, ts_uid
        );

        let message_id = self.next_message_id();
        let command = Command::request(CommandField::C_STORE_RQ, &sop_class_uid, message_id)?
            .with(tags::PRIORITY, Priority::Medium as u16)?
            .with(tags::AFFECTED_SOP_INSTANCE_UID, sop_instance_uid.as_str())?;
        self.exchange(|this| {
            this.send_message(pc_id, &command, Some(obj))?;
            let response = this.receive_response(CommandField::C_STORE_RSP, message_id)?;
            Ok(outcome_of(&response.command))
        })
    }

    /// Query the peer through a C-FIND,
    /// collecting all matches.
    pub fn c_find(
        &mut self,
        information_model: &str,
        identifier: &DefaultDicomObject,
    ) -> Result<FindResponse> {
        let mut matches = Vec::new();
        let outcome = self.c_find_with(information_model, identifier, |obj| {
            matches.push(obj);
            ControlFlow::Continue(())
        })?;
        Ok(FindResponse { matches, outcome })
    }

    /// Query the peer through a C-FIND,
    /// handing each match to a callback.
    ///
    /// When the callback breaks,
    /// a C-CANCEL is sent and the remaining responses are discarded.
    pub fn c_find_with(
        &mut self,
        information_model: &str,
        identifier: &DefaultDicomObject,
        mut on_match: impl FnMut(DefaultDicomObject) -> ControlFlow<()>,
    ) -> Result<DimseOutcome> {
        let pc = self.presentation_context_for(information_model)?;
        let (pc_id, ts_uid) = (pc.id, pc.transfer_syntax.clone());
        let message_id = self.next_message_id();
        let command = Command::request(CommandField::C_FIND_RQ, information_model, message_id)?
            .with(tags::PRIORITY, Priority::Medium as u16)?;
        self.exchange(|this| {
            this.send_message(pc_id, &command, Some(identifier))?;
            let mut cancelled = false;
            loop {
                let response = this.receive_response(CommandField::C_FIND_RSP, message_id)?;
                let status = response.command.status().unwrap_or(status::PROCESSING_FAILURE);
                if !status::is_pending(status) {
                    return Ok(outcome_of(&response.command));
                }
                if cancelled {
                    continue;
                }
                if let Some(obj) = response.data_set(&ts_uid) {
                    if on_match(obj).is_break() {
                        info!("Cancelling C-FIND request {}", message_id);
                        this.c_cancel(pc_id, message_id)?;
                        cancelled = true;
                    }
                }
            }
        })
    }

    /// Ask the peer to send matching instances to another node
    /// through a C-MOVE.
    pub fn c_move(
        &mut self,
        information_model: &str,
        destination: &str,
        identifier: &DefaultDicomObject,
    ) -> Result<MoveResponse> {
        self.c_move_with(information_model, destination, identifier, |_| {
            ControlFlow::Continue(())
        })
    }

    /// Perform a C-MOVE,
    /// reporting the sub-operation counters of each pending response.
    ///
    /// When the callback breaks, a C-CANCEL is sent.
    pub fn c_move_with(
        &mut self,
        information_model: &str,
        destination: &str,
        identifier: &DefaultDicomObject,
        mut on_progress: impl FnMut(SubOperations) -> ControlFlow<()>,
    ) -> Result<MoveResponse> {
        let pc_id = self.presentation_context_for(information_model)?.id;
        let message_id = self.next_message_id();
        let command = Command::request(CommandField::C_MOVE_RQ, information_model, message_id)?
            .with(tags::PRIORITY, Priority::Medium as u16)?
            .with(tags::MOVE_DESTINATION, destination)?;
        self.exchange(|this| {
            this.send_message(pc_id, &command, Some(identifier))?;
            let mut cancelled = false;
            loop {
                let response = this.receive_response(CommandField::C_MOVE_RSP, message_id)?;
                let status = response.command.status().unwrap_or(status::PROCESSING_FAILURE);
                let sub_operations = response.command.sub_operations();
                if !status::is_pending(status) {
                    return Ok(MoveResponse {
                        outcome: outcome_of(&response.command),
                        sub_operations,
                    });
                }
                if !cancelled && on_progress(sub_operations).is_break() {
                    info!("Cancelling C-MOVE request {}", message_id);
                    this.c_cancel(pc_id, message_id)?;
                    cancelled = true;
                }
            }
        })
    }

    /// Ask the peer to cancel the operation of the given request.
    ///
    /// No response is expected for the cancellation itself.
    pub fn c_cancel(&mut self, presentation_context_id: u8, message_id: u16) -> Result<()> {
        let command = Command::new(CommandField::C_CANCEL_RQ)?
            .with(tags::MESSAGE_ID_BEING_RESPONDED_TO, message_id)?;
        send_message(&mut self.channel, presentation_context_id, &command, None)
    }
}

fn response_name(field: CommandField) -> &'static str {
    match field {
        CommandField::C_ECHO_RSP => "C-ECHO-RSP",
        CommandField::C_STORE_RSP => "C-STORE-RSP",
        CommandField::C_FIND_RSP => "C-FIND-RSP",
        CommandField::C_MOVE_RSP => "C-MOVE-RSP",
        _ => "a response",
    }
}

fn outcome_of(response: &Command) -> DimseOutcome {
    let status = response.status().unwrap_or(status::PROCESSING_FAILURE);
    DimseOutcome::from_status(status, response.error_comment())
}

fn data_str(obj: &DefaultDicomObject, tag: dcm_core::Tag) -> Option<String> {
    let value = obj.value(tag).ok()?;
    let text = value
        .to_str()
        .trim_end_matches(|c: char| c == '\0' || c == ' ')
        .to_string();
    Some(text).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_names() {
        assert_eq!(response_name(CommandField::C_FIND_RSP), "C-FIND-RSP");
        assert_eq!(response_name(CommandField::C_ECHO_RQ), "a response");
    }

    #[test]
    fn outcome_without_status_is_a_failure() {
        let response = Command::new(CommandField::C_ECHO_RSP).unwrap();
        let outcome = outcome_of(&response);
        assert!(!outcome.success);
        assert_eq!(outcome.status, status::PROCESSING_FAILURE);
    }

    #[test]
    fn padded_uids_are_trimmed() {
        let mut obj = DefaultDicomObject::new();
        obj.set_value(tags::SOP_INSTANCE_UID, "1.2.3\0").unwrap();
        assert_eq!(data_str(&obj, tags::SOP_INSTANCE_UID).as_deref(), Some("1.2.3"));
        assert_eq!(data_str(&obj, tags::SOP_CLASS_UID), None);
    }
}
