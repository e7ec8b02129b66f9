//! PDU writer module
use crate::pdu::*;
use byteordered::byteorder::{BigEndian, WriteBytesExt};
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::Write;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not write chunk of {} PDU structure", name))]
    WriteChunk {
        /// the name of the PDU structure
        name: &'static str,
        source: WriteChunkError,
    },

    #[snafu(display("Could not write field `{}`", field))]
    WriteField {
        field: &'static str,
        backtrace: Backtrace,
        source: std::io::Error,
    },

    #[snafu(display("Could not write {} reserved bytes", bytes))]
    WriteReserved {
        bytes: u32,
        backtrace: Backtrace,
        source: std::io::Error,
    },

    #[snafu(display("Field `{}` is too long ({} bytes)", field, len))]
    FieldTooLong {
        field: &'static str,
        len: usize,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum WriteChunkError {
    #[snafu(display("Failed to build chunk"))]
    BuildChunk {
        backtrace: Backtrace,
        source: Box<Error>,
    },
    #[snafu(display("Chunk of {} bytes does not fit its length field", len))]
    ChunkTooLong { len: usize, backtrace: Backtrace },
    #[snafu(display("Failed to write chunk length"))]
    WriteLength {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write chunk data"))]
    WriteData {
        backtrace: Backtrace,
        source: std::io::Error,
    },
}

/// Write the bytes built by `func`, preceded by their length as a `u32`.
fn write_chunk_u32<F>(writer: &mut dyn Write, func: F) -> std::result::Result<(), WriteChunkError>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let mut data = vec![];
    func(&mut data).map_err(Box::from).context(BuildChunkSnafu)?;
    let length = u32::try_from(data.len()).map_err(|_| ChunkTooLongSnafu { len: data.len() }.build())?;
    writer.write_u32::<BigEndian>(length).context(WriteLengthSnafu)?;
    writer.write_all(&data).context(WriteDataSnafu)
}

/// Write the bytes built by `func`, preceded by their length as a `u16`.
fn write_chunk_u16<F>(writer: &mut dyn Write, func: F) -> std::result::Result<(), WriteChunkError>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let mut data = vec![];
    func(&mut data).map_err(Box::from).context(BuildChunkSnafu)?;
    let length = u16::try_from(data.len()).map_err(|_| ChunkTooLongSnafu { len: data.len() }.build())?;
    writer.write_u16::<BigEndian>(length).context(WriteLengthSnafu)?;
    writer.write_all(&data).context(WriteDataSnafu)
}

/// Write an item type byte followed by a reserved byte.
fn write_item_type(writer: &mut dyn Write, item_type: u8) -> Result<()> {
    writer.write_u8(item_type).context(WriteFieldSnafu { field: "Item-type" })?;
    writer.write_u8(0x00).context(WriteReservedSnafu { bytes: 1_u32 })
}

/// Write a sub-item holding a single text value, such as a UID.
fn write_text_item(
    writer: &mut dyn Write,
    item_type: u8,
    text: &str,
    name: &'static str,
) -> Result<()> {
    write_item_type(writer, item_type)?;
    write_chunk_u16(writer, |writer| {
        writer
            .write_all(text.as_bytes())
            .context(WriteFieldSnafu { field: name })
    })
    .context(WriteChunkSnafu { name })
}

/// Write an AE title as 16 characters padded with spaces.
fn write_ae_title(writer: &mut dyn Write, ae_title: &str, field: &'static str) -> Result<()> {
    let mut bytes = ae_title.as_bytes().to_vec();
    snafu::ensure!(
        bytes.len() <= 16,
        FieldTooLongSnafu {
            field,
            len: bytes.len()
        }
    );
    bytes.resize(16, b' ');
    writer.write_all(&bytes).context(WriteFieldSnafu { field })
}

/// Write the fixed part shared by A-ASSOCIATE-RQ and A-ASSOCIATE-AC.
fn write_association_header(
    writer: &mut dyn Write,
    protocol_version: u16,
    called_ae_title: &str,
    calling_ae_title: &str,
) -> Result<()> {
    writer
        .write_u16::<BigEndian>(protocol_version)
        .context(WriteFieldSnafu {
            field: "Protocol-version",
        })?;
    writer
        .write_u16::<BigEndian>(0x00)
        .context(WriteReservedSnafu { bytes: 2_u32 })?;
    write_ae_title(writer, called_ae_title, "Called-AE-title")?;
    write_ae_title(writer, calling_ae_title, "Calling-AE-title")?;
    writer
        .write_all(&[0; 32])
        .context(WriteReservedSnafu { bytes: 32_u32 })
}

/// Write a PDU to the given writer.
pub fn write_pdu<W>(writer: &mut W, pdu: &Pdu) -> Result<()>
where
    W: Write,
{
    match pdu {
        Pdu::AssociationRQ(AssociationRQ {
            protocol_version,
            calling_ae_title,
            called_ae_title,
            application_context_name,
            presentation_contexts,
            user_variables,
        }) => {
            writer.write_u8(0x01).context(WriteFieldSnafu { field: "PDU-type" })?;
            writer.write_u8(0x00).context(WriteReservedSnafu { bytes: 1_u32 })?;
            write_chunk_u32(writer, |writer| {
                write_association_header(writer, *protocol_version, called_ae_title, calling_ae_title)?;
                write_text_item(writer, 0x10, application_context_name, "Application Context Item")?;
                for presentation_context in presentation_contexts {
                    write_presentation_context_proposed(writer, presentation_context)?;
                }
                write_user_variables(writer, user_variables)
            })
            .context(WriteChunkSnafu {
                name: "A-ASSOCIATE-RQ",
            })
        }
        Pdu::AssociationAC(AssociationAC {
            protocol_version,
            calling_ae_title,
            called_ae_title,
            application_context_name,
            presentation_contexts,
            user_variables,
        }) => {
            writer.write_u8(0x02).context(WriteFieldSnafu { field: "PDU-type" })?;
            writer.write_u8(0x00).context(WriteReservedSnafu { bytes: 1_u32 })?;
            write_chunk_u32(writer, |writer| {
                write_association_header(writer, *protocol_version, called_ae_title, calling_ae_title)?;
                write_text_item(writer, 0x10, application_context_name, "Application Context Item")?;
                for presentation_context in presentation_contexts {
                    write_presentation_context_result(writer, presentation_context)?;
                }
                write_user_variables(writer, user_variables)
            })
            .context(WriteChunkSnafu {
                name: "A-ASSOCIATE-AC",
            })
        }
        Pdu::AssociationRJ(AssociationRJ { result, source }) => {
            writer.write_u8(0x03).context(WriteFieldSnafu { field: "PDU-type" })?;
            writer.write_u8(0x00).context(WriteReservedSnafu { bytes: 1_u32 })?;
            write_chunk_u32(writer, |writer| {
                writer.write_u8(0x00).context(WriteReservedSnafu { bytes: 1_u32 })?;
                writer
                    .write_u8(*result as u8)
                    .context(WriteFieldSnafu { field: "Result" })?;
                let (source, reason) = source.to_code();
                writer.write_u8(source).context(WriteFieldSnafu { field: "Source" })?;
                writer
                    .write_u8(reason)
                    .context(WriteFieldSnafu { field: "Reason/Diag." })
            })
            .context(WriteChunkSnafu {
                name: "A-ASSOCIATE-RJ",
            })
        }
        Pdu::PData { data } => {
            writer.write_u8(0x04).context(WriteFieldSnafu { field: "PDU-type" })?;
            writer.write_u8(0x00).context(WriteReservedSnafu { bytes: 1_u32 })?;
            write_chunk_u32(writer, |writer| {
                for pdv in data {
                    write_chunk_u32(writer, |writer| {
                        writer
                            .write_u8(pdv.presentation_context_id)
                            .context(WriteFieldSnafu {
                                field: "Presentation-context-ID",
                            })?;
                        writer
                            .write_u8(pdv.control_header())
                            .context(WriteFieldSnafu {
                                field: "Message Control Header",
                            })?;
                        writer.write_all(&pdv.data).context(WriteFieldSnafu {
                            field: "Presentation-data-value",
                        })
                    })
                    .context(WriteChunkSnafu {
                        name: "Presentation Data Value Item",
                    })?;
                }
                Ok(())
            })
            .context(WriteChunkSnafu { name: "P-DATA-TF" })
        }
        Pdu::ReleaseRQ => write_empty(writer, 0x05, "A-RELEASE-RQ"),
        Pdu::ReleaseRP => write_empty(writer, 0x06, "A-RELEASE-RP"),
        Pdu::AbortRQ { source } => {
            writer.write_u8(0x07).context(WriteFieldSnafu { field: "PDU-type" })?;
            writer.write_u8(0x00).context(WriteReservedSnafu { bytes: 1_u32 })?;
            write_chunk_u32(writer, |writer| {
                writer
                    .write_all(&[0x00, 0x00])
                    .context(WriteReservedSnafu { bytes: 2_u32 })?;
                let (source, reason) = source.to_code();
                writer.write_u8(source).context(WriteFieldSnafu { field: "Source" })?;
                writer
                    .write_u8(reason)
                    .context(WriteFieldSnafu { field: "Reason/Diag." })
            })
            .context(WriteChunkSnafu { name: "A-ABORT" })
        }
        Pdu::Unknown { pdu_type, data } => {
            writer.write_u8(*pdu_type).context(WriteFieldSnafu { field: "PDU-type" })?;
            writer.write_u8(0x00).context(WriteReservedSnafu { bytes: 1_u32 })?;
            write_chunk_u32(writer, |writer| {
                writer.write_all(data).context(WriteFieldSnafu { field: "Unknown" })
            })
            .context(WriteChunkSnafu { name: "Unknown" })
        }
    }
}

/// Write a release PDU: a header and 4 reserved bytes.
fn write_empty<W>(writer: &mut W, pdu_type: u8, name: &'static str) -> Result<()>
where
    W: Write,
{
    writer.write_u8(pdu_type).context(WriteFieldSnafu { field: "PDU-type" })?;
    writer.write_u8(0x00).context(WriteReservedSnafu { bytes: 1_u32 })?;
    write_chunk_u32(writer, |writer| {
        writer
            .write_all(&[0; 4])
            .context(WriteReservedSnafu { bytes: 4_u32 })
    })
    .context(WriteChunkSnafu { name })
}

fn write_presentation_context_proposed(
    writer: &mut dyn Write,
    presentation_context: &PresentationContextProposed,
) -> Result<()> {
    write_item_type(writer, 0x20)?;
    write_chunk_u16(writer, |writer| {
        writer
            .write_u8(presentation_context.id)
            .context(WriteFieldSnafu {
                field: "Presentation-context-ID",
            })?;
        writer
            .write_all(&[0; 3])
            .context(WriteReservedSnafu { bytes: 3_u32 })?;
        write_text_item(
            writer,
            0x30,
            &presentation_context.abstract_syntax,
            "Abstract Syntax Sub-Item",
        )?;
        for transfer_syntax in &presentation_context.transfer_syntaxes {
            write_text_item(writer, 0x40, transfer_syntax, "Transfer Syntax Sub-Item")?;
        }
        Ok(())
    })
    .context(WriteChunkSnafu {
        name: "Presentation Context Item",
    })
}

fn write_presentation_context_result(
    writer: &mut dyn Write,
    presentation_context: &PresentationContextResult,
) -> Result<()> {
    write_item_type(writer, 0x21)?;
    write_chunk_u16(writer, |writer| {
        writer
            .write_u8(presentation_context.id)
            .context(WriteFieldSnafu {
                field: "Presentation-context-ID",
            })?;
        writer.write_u8(0x00).context(WriteReservedSnafu { bytes: 1_u32 })?;
        writer
            .write_u8(presentation_context.reason as u8)
            .context(WriteFieldSnafu {
                field: "Result/Reason",
            })?;
        writer.write_u8(0x00).context(WriteReservedSnafu { bytes: 1_u32 })?;
        write_text_item(
            writer,
            0x40,
            &presentation_context.transfer_syntax,
            "Transfer Syntax Sub-Item",
        )
    })
    .context(WriteChunkSnafu {
        name: "Presentation Context Item",
    })
}

fn write_user_variables(writer: &mut dyn Write, user_variables: &[UserVariableItem]) -> Result<()> {
    if user_variables.is_empty() {
        return Ok(());
    }
    write_item_type(writer, 0x50)?;
    write_chunk_u16(writer, |writer| {
        for user_variable in user_variables {
            match user_variable {
                UserVariableItem::MaxLength(max_length) => {
                    write_item_type(writer, 0x51)?;
                    write_chunk_u16(writer, |writer| {
                        writer
                            .write_u32::<BigEndian>(*max_length)
                            .context(WriteFieldSnafu {
                                field: "Maximum-length-received",
                            })
                    })
                    .context(WriteChunkSnafu {
                        name: "Maximum Length Sub-Item",
                    })?;
                }
                UserVariableItem::ImplementationClassUid(uid) => {
                    write_text_item(writer, 0x52, uid, "Implementation Class UID Sub-Item")?;
                }
                UserVariableItem::ImplementationVersionName(name) => {
                    write_text_item(writer, 0x55, name, "Implementation Version Name Sub-Item")?;
                }
                UserVariableItem::RoleSelection(role) => {
                    write_item_type(writer, 0x54)?;
                    write_chunk_u16(writer, |writer| {
                        write_chunk_u16(writer, |writer| {
                            writer
                                .write_all(role.sop_class_uid.as_bytes())
                                .context(WriteFieldSnafu {
                                    field: "SOP-class-uid",
                                })
                        })
                        .context(WriteChunkSnafu {
                            name: "SOP Class UID",
                        })?;
                        writer
                            .write_u8(role.scu_role as u8)
                            .context(WriteFieldSnafu { field: "SCU-role" })?;
                        writer
                            .write_u8(role.scp_role as u8)
                            .context(WriteFieldSnafu { field: "SCP-role" })
                    })
                    .context(WriteChunkSnafu {
                        name: "SCP/SCU Role Selection Sub-Item",
                    })?;
                }
                UserVariableItem::Unknown(item_type, data) => {
                    write_item_type(writer, *item_type)?;
                    write_chunk_u16(writer, |writer| {
                        writer.write_all(data).context(WriteFieldSnafu { field: "Unknown" })
                    })
                    .context(WriteChunkSnafu {
                        name: "Unknown Sub-Item",
                    })?;
                }
            }
        }
        Ok(())
    })
    .context(WriteChunkSnafu {
        name: "User Information Item",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::reader::read_pdu;
    use dcm_encoding::{Endianness, Stream};
    use matches::assert_matches;

    fn round_trip(pdu: &Pdu) -> Pdu {
        let mut bytes = Vec::new();
        write_pdu(&mut bytes, pdu).unwrap();
        let mut stream = Stream::from_bytes(bytes, Endianness::Big);
        let out = read_pdu(&mut stream, MAXIMUM_PDU_SIZE, true).unwrap().unwrap();
        assert!(stream.is_exhausted());
        out
    }

    #[test]
    fn can_write_chunks_with_preceding_u32_length() {
        let mut bytes = vec![0u8; 0];
        write_chunk_u32(&mut bytes, |writer| {
            writer.write_u8(0x02).context(WriteFieldSnafu { field: "Field1" })?;
            write_chunk_u32(writer, |writer| {
                writer.write_u8(0x03).context(WriteFieldSnafu { field: "Field2" })?;
                writer.write_u8(0x04).context(WriteFieldSnafu { field: "Field3" })
            })
            .context(WriteChunkSnafu { name: "Chunk2" })
        })
        .unwrap();

        assert_eq!(bytes, vec![0, 0, 0, 7, 2, 0, 0, 0, 2, 3, 4]);
    }

    #[test]
    fn can_write_chunks_with_preceding_u16_length() {
        let mut bytes = vec![0u8; 0];
        write_chunk_u16(&mut bytes, |writer| {
            writer.write_u8(0x02).context(WriteFieldSnafu { field: "Field1" })?;
            write_chunk_u16(writer, |writer| {
                writer.write_u8(0x03).context(WriteFieldSnafu { field: "Field2" })?;
                writer.write_u8(0x04).context(WriteFieldSnafu { field: "Field3" })
            })
            .context(WriteChunkSnafu { name: "Chunk2" })
        })
        .unwrap();

        assert_eq!(bytes, vec![0, 5, 2, 0, 2, 3, 4]);
    }

    #[test]
    fn association_rq_with_role_selection() {
        let pdu = Pdu::AssociationRQ(AssociationRQ {
            protocol_version: 1,
            calling_ae_title: "STORE-SCU".to_string(),
            called_ae_title: "STORE-SCP".to_string(),
            application_context_name: "1.2.840.10008.3.1.1.1".to_string(),
            presentation_contexts: vec![PresentationContextProposed {
                id: 1,
                abstract_syntax: "1.2.840.10008.5.1.4.1.1.7".to_string(),
                transfer_syntaxes: vec![
                    "1.2.840.10008.1.2.1".to_string(),
                    "1.2.840.10008.1.2".to_string(),
                ],
            }],
            user_variables: vec![
                UserVariableItem::MaxLength(16_384),
                UserVariableItem::ImplementationClassUid("1.2.3.4".to_string()),
                UserVariableItem::RoleSelection(RoleSelection::new(
                    "1.2.840.10008.5.1.4.1.1.7",
                    true,
                    false,
                )),
                UserVariableItem::ImplementationVersionName("TEST 1.0".to_string()),
                UserVariableItem::Unknown(0x58, vec![1, 0, 0, 3, b'b', b'o', b'b', 0, 0]),
            ],
        });
        assert_eq!(round_trip(&pdu), pdu);
    }

    #[test]
    fn association_ac_with_rejected_context() {
        let pdu = Pdu::AssociationAC(AssociationAC {
            protocol_version: 1,
            calling_ae_title: "ECHO-SCU".to_string(),
            called_ae_title: "ANY-SCP".to_string(),
            application_context_name: "1.2.840.10008.3.1.1.1".to_string(),
            presentation_contexts: vec![
                PresentationContextResult {
                    id: 1,
                    reason: PresentationContextResultReason::Acceptance,
                    transfer_syntax: "1.2.840.10008.1.2".to_string(),
                },
                PresentationContextResult {
                    id: 3,
                    reason: PresentationContextResultReason::TransferSyntaxesNotSupported,
                    transfer_syntax: "1.2.840.10008.1.2".to_string(),
                },
            ],
            user_variables: vec![UserVariableItem::MaxLength(0)],
        });
        assert_eq!(round_trip(&pdu), pdu);
    }

    #[test]
    fn reject_and_abort() {
        let pdu = Pdu::AssociationRJ(AssociationRJ {
            result: AssociationRJResult::Permanent,
            source: AssociationRJSource::ServiceUser(
                AssociationRJServiceUserReason::CalledAeTitleNotRecognized,
            ),
        });
        let mut bytes = Vec::new();
        write_pdu(&mut bytes, &pdu).unwrap();
        assert_eq!(bytes, vec![0x03, 0, 0, 0, 0, 4, 0, 1, 1, 7]);
        assert_eq!(round_trip(&pdu), pdu);

        let pdu = Pdu::AbortRQ {
            source: AbortRQSource::ServiceProvider(AbortRQServiceProviderReason::UnexpectedPdu),
        };
        assert_eq!(round_trip(&pdu), pdu);
    }

    #[test]
    fn pdata_values() {
        let pdu = Pdu::PData {
            data: vec![
                PDataValue {
                    presentation_context_id: 1,
                    value_type: PDataValueType::Command,
                    is_last: true,
                    data: vec![1, 2, 3, 4],
                },
                PDataValue {
                    presentation_context_id: 1,
                    value_type: PDataValueType::Data,
                    is_last: false,
                    data: vec![5; 10],
                },
            ],
        };
        let mut bytes = Vec::new();
        write_pdu(&mut bytes, &pdu).unwrap();
        // PDU header, then the first PDV: length 6, context 1, command + last
        assert_eq!(&bytes[..12], &[0x04, 0, 0, 0, 0, 26, 0, 0, 0, 6, 1, 0x03]);
        assert_eq!(round_trip(&pdu), pdu);
    }

    #[test]
    fn ae_title_too_long() {
        let pdu = Pdu::AssociationRQ(AssociationRQ {
            protocol_version: 1,
            calling_ae_title: "A-VERY-LONG-AE-TITLE".to_string(),
            called_ae_title: "ANY-SCP".to_string(),
            application_context_name: "1.2.840.10008.3.1.1.1".to_string(),
            presentation_contexts: vec![],
            user_variables: vec![],
        });
        let mut bytes = Vec::new();
        assert_matches!(write_pdu(&mut bytes, &pdu), Err(Error::WriteChunk { .. }));
    }
}
