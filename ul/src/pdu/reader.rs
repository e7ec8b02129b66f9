//! PDU reader module
//!
//! PDUs are decoded from a [`Stream`] which may be filled incrementally,
//! typically from a socket.
//! Nothing is consumed until a whole PDU is available.
use crate::pdu::*;
use dcm_encoding::stream::Error as StreamError;
use dcm_encoding::{Endianness, Stream};
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};
use tracing::warn;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Invalid max PDU length {}", max_pdu_length))]
    InvalidMaxPdu {
        max_pdu_length: u32,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not read PDU field `{}`", field))]
    ReadPduField {
        field: &'static str,
        #[snafu(backtrace)]
        source: StreamError,
    },

    #[snafu(display("Invalid item length {} (must be >=2)", length))]
    InvalidItemLength { length: u32, backtrace: Backtrace },

    #[snafu(display(
        "Incoming PDU was too large: length {}, maximum is {}",
        pdu_length,
        max_pdu_length
    ))]
    PduTooLarge {
        pdu_length: u32,
        max_pdu_length: u32,
        backtrace: Backtrace,
    },

    #[snafu(display("PDU contained an unexpected item {:?}", var_item))]
    InvalidPduVariable {
        var_item: PduVariableItem,
        backtrace: Backtrace,
    },

    #[snafu(display("Invalid reject source or reason"))]
    InvalidRejectSourceOrReason { backtrace: Backtrace },

    #[snafu(display("Invalid abort source or reason"))]
    InvalidAbortSourceOrReason { backtrace: Backtrace },

    #[snafu(display("Invalid presentation context result reason"))]
    InvalidPresentationContextResultReason { backtrace: Backtrace },

    #[snafu(display("Unknown presentation context sub-item {:#04x}", item_type))]
    UnknownPresentationContextSubItem { item_type: u8, backtrace: Backtrace },

    #[snafu(display("Missing application context name"))]
    MissingApplicationContextName { backtrace: Backtrace },

    #[snafu(display("Missing abstract syntax"))]
    MissingAbstractSyntax { backtrace: Backtrace },

    #[snafu(display("Missing transfer syntax"))]
    MissingTransferSyntax { backtrace: Backtrace },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Read a PDU from the stream.
///
/// Returns `Ok(None)` without consuming any bytes
/// if the stream does not hold a whole PDU yet.
///
/// With `strict`, a PDU longer than `max_pdu_length` is an error.
/// Otherwise it is accepted up to [`MAXIMUM_PDU_SIZE`] with a warning.
pub fn read_pdu(stream: &mut Stream, max_pdu_length: u32, strict: bool) -> Result<Option<Pdu>> {
    ensure!(
        (MINIMUM_PDU_SIZE..=MAXIMUM_PDU_SIZE).contains(&max_pdu_length),
        InvalidMaxPduSnafu { max_pdu_length }
    );

    let Ok(header) = stream.peek_bytes(PDU_HEADER_SIZE as usize) else {
        return Ok(None);
    };
    let pdu_type = header[0];
    let pdu_length = u32::from_be_bytes([header[2], header[3], header[4], header[5]]);

    if strict {
        ensure!(
            pdu_length <= max_pdu_length,
            PduTooLargeSnafu {
                pdu_length,
                max_pdu_length
            }
        );
    } else if pdu_length > max_pdu_length {
        ensure!(
            pdu_length <= MAXIMUM_PDU_SIZE,
            PduTooLargeSnafu {
                pdu_length,
                max_pdu_length: MAXIMUM_PDU_SIZE
            }
        );
        warn!(
            "Incoming PDU was too large: length {}, maximum is {}",
            pdu_length, max_pdu_length
        );
    }

    if stream.remaining() < (PDU_HEADER_SIZE + pdu_length) as usize {
        return Ok(None);
    }
    stream
        .skip(PDU_HEADER_SIZE as usize)
        .context(ReadPduFieldSnafu { field: "header" })?;
    let body = stream
        .read_bytes(pdu_length as usize)
        .context(ReadPduFieldSnafu { field: "body" })?;
    let mut body = Stream::from_bytes(body, Endianness::Big);

    let pdu = match pdu_type {
        0x01 => {
            let (protocol_version, called_ae_title, calling_ae_title) = read_association_header(&mut body)?;
            let mut application_context_name = None;
            let mut presentation_contexts = vec![];
            let mut user_variables = vec![];
            while !body.is_exhausted() {
                match read_pdu_variable(&mut body)? {
                    PduVariableItem::ApplicationContext(val) => application_context_name = Some(val),
                    PduVariableItem::PresentationContextProposed(val) => presentation_contexts.push(val),
                    PduVariableItem::UserVariables(val) => user_variables = val,
                    var_item => return InvalidPduVariableSnafu { var_item }.fail(),
                }
            }
            Pdu::AssociationRQ(AssociationRQ {
                protocol_version,
                calling_ae_title,
                called_ae_title,
                application_context_name: application_context_name
                    .context(MissingApplicationContextNameSnafu)?,
                presentation_contexts,
                user_variables,
            })
        }
        0x02 => {
            let (protocol_version, called_ae_title, calling_ae_title) = read_association_header(&mut body)?;
            let mut application_context_name = None;
            let mut presentation_contexts = vec![];
            let mut user_variables = vec![];
            while !body.is_exhausted() {
                match read_pdu_variable(&mut body)? {
                    PduVariableItem::ApplicationContext(val) => application_context_name = Some(val),
                    PduVariableItem::PresentationContextResult(val) => presentation_contexts.push(val),
                    PduVariableItem::UserVariables(val) => user_variables = val,
                    var_item => return InvalidPduVariableSnafu { var_item }.fail(),
                }
            }
            Pdu::AssociationAC(AssociationAC {
                protocol_version,
                calling_ae_title,
                called_ae_title,
                application_context_name: application_context_name
                    .context(MissingApplicationContextNameSnafu)?,
                presentation_contexts,
                user_variables,
            })
        }
        0x03 => {
            // reserved
            body.skip(1).context(ReadPduFieldSnafu { field: "Reserved" })?;
            let result = body.read_u8().context(ReadPduFieldSnafu { field: "Result" })?;
            let source = body.read_u8().context(ReadPduFieldSnafu { field: "Source" })?;
            let reason = body.read_u8().context(ReadPduFieldSnafu { field: "Reason/Diag." })?;
            Pdu::AssociationRJ(AssociationRJ {
                result: AssociationRJResult::from_code(result)
                    .context(InvalidRejectSourceOrReasonSnafu)?,
                source: AssociationRJSource::from_code(source, reason)
                    .context(InvalidRejectSourceOrReasonSnafu)?,
            })
        }
        0x04 => {
            let mut values = vec![];
            while !body.is_exhausted() {
                let item_length = body
                    .read_u32()
                    .context(ReadPduFieldSnafu { field: "Item-Length" })?;
                ensure!(item_length >= 2, InvalidItemLengthSnafu { length: item_length });
                let presentation_context_id = body.read_u8().context(ReadPduFieldSnafu {
                    field: "Presentation-context-ID",
                })?;
                let header = body.read_u8().context(ReadPduFieldSnafu {
                    field: "Message Control Header",
                })?;
                let value_type = if header & 0x01 != 0 {
                    PDataValueType::Command
                } else {
                    PDataValueType::Data
                };
                let data = body
                    .read_bytes((item_length - 2) as usize)
                    .context(ReadPduFieldSnafu {
                        field: "Presentation-data-value",
                    })?;
                values.push(PDataValue {
                    presentation_context_id,
                    value_type,
                    is_last: header & 0x02 != 0,
                    data,
                });
            }
            Pdu::PData { data: values }
        }
        0x05 => Pdu::ReleaseRQ,
        0x06 => Pdu::ReleaseRP,
        0x07 => {
            body.skip(2).context(ReadPduFieldSnafu { field: "Reserved" })?;
            let source = body.read_u8().context(ReadPduFieldSnafu { field: "Source" })?;
            let reason = body.read_u8().context(ReadPduFieldSnafu { field: "Reason/Diag" })?;
            Pdu::AbortRQ {
                source: AbortRQSource::from_code(source, reason)
                    .context(InvalidAbortSourceOrReasonSnafu)?,
            }
        }
        _ => Pdu::Unknown {
            pdu_type,
            data: body.into_inner(),
        },
    };
    Ok(Some(pdu))
}

/// Read the fixed part of an A-ASSOCIATE-RQ or A-ASSOCIATE-AC PDU:
/// protocol version, called and calling AE titles.
fn read_association_header(body: &mut Stream) -> Result<(u16, String, String)> {
    let protocol_version = body.read_u16().context(ReadPduFieldSnafu {
        field: "Protocol-version",
    })?;
    body.skip(2).context(ReadPduFieldSnafu { field: "Reserved" })?;
    let called_ae_title = body.read_string(16).context(ReadPduFieldSnafu {
        field: "Called-AE-title",
    })?;
    let calling_ae_title = body.read_string(16).context(ReadPduFieldSnafu {
        field: "Calling-AE-title",
    })?;
    body.skip(32).context(ReadPduFieldSnafu { field: "Reserved" })?;
    Ok((
        protocol_version,
        called_ae_title.trim().to_string(),
        calling_ae_title.trim().to_string(),
    ))
}

fn read_uid(stream: &mut Stream, len: usize, field: &'static str) -> Result<String> {
    let text = stream.read_string(len).context(ReadPduFieldSnafu { field })?;
    Ok(text
        .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string())
}

/// Read an item type, a reserved byte and a 2-byte item length,
/// then the item content.
fn read_item(stream: &mut Stream) -> Result<(u8, Stream)> {
    let item_type = stream.read_u8().context(ReadPduFieldSnafu { field: "Item-type" })?;
    stream.skip(1).context(ReadPduFieldSnafu { field: "Reserved" })?;
    let item_length = stream.read_u16().context(ReadPduFieldSnafu {
        field: "Item-length",
    })?;
    let content = stream
        .read_bytes(item_length as usize)
        .context(ReadPduFieldSnafu { field: "Item" })?;
    Ok((item_type, Stream::from_bytes(content, Endianness::Big)))
}

fn read_pdu_variable(stream: &mut Stream) -> Result<PduVariableItem> {
    let (item_type, mut item) = read_item(stream)?;
    let len = item.len();

    match item_type {
        0x10 => Ok(PduVariableItem::ApplicationContext(read_uid(
            &mut item,
            len,
            "Application-context-name",
        )?)),
        0x20 => {
            let id = item.read_u8().context(ReadPduFieldSnafu {
                field: "Presentation-context-ID",
            })?;
            item.skip(3).context(ReadPduFieldSnafu { field: "Reserved" })?;
            let mut abstract_syntax = None;
            let mut transfer_syntaxes = vec![];
            while !item.is_exhausted() {
                let (sub_type, mut sub_item) = read_item(&mut item)?;
                let len = sub_item.len();
                match sub_type {
                    0x30 => {
                        abstract_syntax = Some(read_uid(&mut sub_item, len, "Abstract-syntax-name")?)
                    }
                    0x40 => {
                        transfer_syntaxes.push(read_uid(&mut sub_item, len, "Transfer-syntax-name")?)
                    }
                    item_type => {
                        return UnknownPresentationContextSubItemSnafu { item_type }.fail();
                    }
                }
            }
            ensure!(!transfer_syntaxes.is_empty(), MissingTransferSyntaxSnafu);
            Ok(PduVariableItem::PresentationContextProposed(
                PresentationContextProposed {
                    id,
                    abstract_syntax: abstract_syntax.context(MissingAbstractSyntaxSnafu)?,
                    transfer_syntaxes,
                },
            ))
        }
        0x21 => {
            let id = item.read_u8().context(ReadPduFieldSnafu {
                field: "Presentation-context-ID",
            })?;
            item.skip(1).context(ReadPduFieldSnafu { field: "Reserved" })?;
            let reason = item.read_u8().context(ReadPduFieldSnafu {
                field: "Result/Reason",
            })?;
            let reason = PresentationContextResultReason::from_code(reason)
                .context(InvalidPresentationContextResultReasonSnafu)?;
            item.skip(1).context(ReadPduFieldSnafu { field: "Reserved" })?;
            let mut transfer_syntax = None;
            while !item.is_exhausted() {
                let (sub_type, mut sub_item) = read_item(&mut item)?;
                let len = sub_item.len();
                match sub_type {
                    0x40 => {
                        transfer_syntax = Some(read_uid(&mut sub_item, len, "Transfer-syntax-name")?)
                    }
                    item_type => {
                        return UnknownPresentationContextSubItemSnafu { item_type }.fail();
                    }
                }
            }
            // not significant unless accepted
            let transfer_syntax = match (reason, transfer_syntax) {
                (_, Some(ts)) => ts,
                (PresentationContextResultReason::Acceptance, None) => {
                    return MissingTransferSyntaxSnafu.fail()
                }
                (_, None) => String::new(),
            };
            Ok(PduVariableItem::PresentationContextResult(
                PresentationContextResult {
                    id,
                    reason,
                    transfer_syntax,
                },
            ))
        }
        0x50 => {
            let mut user_variables = vec![];
            while !item.is_exhausted() {
                let (sub_type, mut sub_item) = read_item(&mut item)?;
                let len = sub_item.len();
                let user_variable = match sub_type {
                    0x51 => UserVariableItem::MaxLength(sub_item.read_u32().context(
                        ReadPduFieldSnafu {
                            field: "Maximum-length-received",
                        },
                    )?),
                    0x52 => UserVariableItem::ImplementationClassUid(read_uid(
                        &mut sub_item,
                        len,
                        "Implementation-class-uid",
                    )?),
                    0x54 => {
                        let uid_length = sub_item.read_u16().context(ReadPduFieldSnafu {
                            field: "UID-length",
                        })?;
                        let sop_class_uid =
                            read_uid(&mut sub_item, uid_length as usize, "SOP-class-uid")?;
                        let scu_role = sub_item.read_u8().context(ReadPduFieldSnafu {
                            field: "SCU-role",
                        })?;
                        let scp_role = sub_item.read_u8().context(ReadPduFieldSnafu {
                            field: "SCP-role",
                        })?;
                        UserVariableItem::RoleSelection(RoleSelection {
                            sop_class_uid,
                            scu_role: scu_role != 0,
                            scp_role: scp_role != 0,
                        })
                    }
                    0x55 => UserVariableItem::ImplementationVersionName(
                        sub_item
                            .read_string(len)
                            .context(ReadPduFieldSnafu {
                                field: "Implementation-version-name",
                            })?
                            .trim()
                            .to_string(),
                    ),
                    _ => UserVariableItem::Unknown(sub_type, sub_item.into_inner()),
                };
                user_variables.push(user_variable);
            }
            Ok(PduVariableItem::UserVariables(user_variables))
        }
        _ => Ok(PduVariableItem::Unknown(item_type)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::writer::write_pdu;
    use matches::assert_matches;

    fn encode(pdu: &Pdu) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_pdu(&mut bytes, pdu).unwrap();
        bytes
    }

    #[test]
    fn incomplete_pdu_is_not_consumed() {
        let bytes = encode(&Pdu::ReleaseRQ);
        assert_eq!(bytes, vec![0x05, 0x00, 0x00, 0x00, 0x00, 0x04, 0, 0, 0, 0]);

        let mut stream = Stream::new(Endianness::Big);
        stream.extend(&bytes[..3]);
        assert_matches!(read_pdu(&mut stream, DEFAULT_MAX_PDU, true), Ok(None));
        stream.extend(&bytes[3..8]);
        assert_matches!(read_pdu(&mut stream, DEFAULT_MAX_PDU, true), Ok(None));
        assert_eq!(stream.position(), 0);
        stream.extend(&bytes[8..]);
        assert_matches!(
            read_pdu(&mut stream, DEFAULT_MAX_PDU, true),
            Ok(Some(Pdu::ReleaseRQ))
        );
        assert!(stream.is_exhausted());
    }

    #[test]
    fn two_pdus_in_one_buffer() {
        let mut bytes = encode(&Pdu::ReleaseRP);
        bytes.extend(encode(&Pdu::AbortRQ {
            source: AbortRQSource::ServiceUser,
        }));
        let mut stream = Stream::from_bytes(bytes, Endianness::Big);
        assert_matches!(
            read_pdu(&mut stream, DEFAULT_MAX_PDU, true),
            Ok(Some(Pdu::ReleaseRP))
        );
        assert_matches!(
            read_pdu(&mut stream, DEFAULT_MAX_PDU, true),
            Ok(Some(Pdu::AbortRQ {
                source: AbortRQSource::ServiceUser
            }))
        );
        assert_matches!(read_pdu(&mut stream, DEFAULT_MAX_PDU, true), Ok(None));
    }

    #[test]
    fn pdu_too_large() {
        let pdu = Pdu::PData {
            data: vec![PDataValue {
                presentation_context_id: 1,
                value_type: PDataValueType::Data,
                is_last: true,
                data: vec![0; 5_000],
            }],
        };
        let bytes = encode(&pdu);
        let mut stream = Stream::from_bytes(bytes.clone(), Endianness::Big);
        assert_matches!(
            read_pdu(&mut stream, MINIMUM_PDU_SIZE, true),
            Err(Error::PduTooLarge { .. })
        );
        let mut stream = Stream::from_bytes(bytes, Endianness::Big);
        assert_eq!(
            read_pdu(&mut stream, MINIMUM_PDU_SIZE, false).unwrap(),
            Some(pdu)
        );
    }

    #[test]
    fn invalid_max_pdu() {
        let mut stream = Stream::new(Endianness::Big);
        assert_matches!(
            read_pdu(&mut stream, 1_000, true),
            Err(Error::InvalidMaxPdu { .. })
        );
    }

    #[test]
    fn unknown_pdu_type_is_kept() {
        let bytes = vec![0x0F, 0x00, 0x00, 0x00, 0x00, 0x02, 0xAB, 0xCD];
        let mut stream = Stream::from_bytes(bytes, Endianness::Big);
        assert_eq!(
            read_pdu(&mut stream, DEFAULT_MAX_PDU, true).unwrap(),
            Some(Pdu::Unknown {
                pdu_type: 0x0F,
                data: vec![0xAB, 0xCD]
            })
        );
    }
}
