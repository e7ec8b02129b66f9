use std::collections::VecDeque;
use std::io::{Read, Write};

use tracing::warn;

use crate::association::{Channel, Result};
use crate::pdu::{PDataValueType, Pdu, PDV_HEADER_SIZE};

/// Set up the P-Data PDU header for sending.
fn setup_pdata_header(buffer: &mut [u8], value_type: PDataValueType, is_last: bool) {
    let data_len = (buffer.len() - 12) as u32;

    // full PDU length (minus PDU type and reserved byte)
    let pdu_len = data_len + PDV_HEADER_SIZE;
    buffer[2..6].copy_from_slice(&pdu_len.to_be_bytes());

    // presentation data length (data + 2 properties below)
    let pdv_data_len = data_len + 2;
    buffer[6..10].copy_from_slice(&pdv_data_len.to_be_bytes());

    // message control header
    let mut control = if is_last { 0x02 } else { 0x00 };
    if value_type == PDataValueType::Command {
        control |= 0x01;
    }
    buffer[11] = control;
}

/// A P-Data value writer.
///
/// This exposes an API to iteratively construct and send
/// command or data fragments to another node.
/// Using this as a [standard writer](std::io::Write)
/// will automatically split the incoming bytes
/// into separate PDUs if they do not fit in a single one.
///
/// # Example
///
/// Use an association's `send_pdata` method
/// to create a new P-Data value writer.
///
/// ```no_run
/// # use std::io::Write;
/// # use dcm_ul::association::ClientAssociationOptions;
/// # fn dicom_data() -> &'static [u8] { unimplemented!() }
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut association = ClientAssociationOptions::new()
///     .with_abstract_syntax("1.2.840.10008.1.1")
///     .establish("129.168.0.5:104")?;
///
/// let presentation_context_id = association.presentation_contexts()[0].id;
///
/// let mut pdata = association.send_pdata(presentation_context_id);
/// pdata.write_all(dicom_data())?;
/// pdata.finish()?;
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct PDataWriter<W: Write> {
    buffer: Vec<u8>,
    stream: W,
    value_type: PDataValueType,
    max_data_len: u32,
}

impl<W> PDataWriter<W>
where
    W: Write,
{
    /// Construct a new writer of data set fragments.
    ///
    /// `max_pdu_length` is the maximum value of the PDU-length property.
    pub(crate) fn new(stream: W, presentation_context_id: u8, max_pdu_length: u32) -> Self {
        Self::with_value_type(
            stream,
            presentation_context_id,
            PDataValueType::Data,
            max_pdu_length,
        )
    }

    pub(crate) fn with_value_type(
        stream: W,
        presentation_context_id: u8,
        value_type: PDataValueType,
        max_pdu_length: u32,
    ) -> Self {
        let max_data_len = calculate_max_data_len_single(max_pdu_length);
        let mut buffer = Vec::with_capacity(max_data_len as usize + 12);
        buffer.extend([
            // PDU-type + reserved byte
            0x04,
            0x00,
            // full PDU length, unknown at this point
            0xFF,
            0xFF,
            0xFF,
            0xFF,
            // presentation data length, unknown at this point
            0xFF,
            0xFF,
            0xFF,
            0xFF,
            presentation_context_id,
            // message control header, unknown at this point
            0xFF,
        ]);

        PDataWriter {
            buffer,
            stream,
            value_type,
            max_data_len,
        }
    }

    /// Declare to have finished sending P-Data fragments,
    /// thus emitting the last P-Data fragment PDU.
    ///
    /// This is also done automatically once the P-Data writer is dropped.
    pub fn finish(mut self) -> std::io::Result<()> {
        self.finish_impl()
    }

    fn finish_impl(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            setup_pdata_header(&mut self.buffer, self.value_type, true);
            self.stream.write_all(&self.buffer)?;
            // subsequent calls send nothing
            self.buffer.clear();
        }
        Ok(())
    }

    /// Send the buffer as a non-last fragment.
    fn dispatch_pdu(&mut self) -> std::io::Result<()> {
        debug_assert!(self.buffer.len() >= 12);
        setup_pdata_header(&mut self.buffer, self.value_type, false);
        self.stream.write_all(&self.buffer)?;
        self.buffer.truncate(12);
        Ok(())
    }
}

impl<W> Write for PDataWriter<W>
where
    W: Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let total_len = self.max_data_len as usize + 12;
        if self.buffer.len() + buf.len() <= total_len {
            self.buffer.extend(buf);
            Ok(buf.len())
        } else {
            // fill in the rest of the buffer and send the PDU,
            // leaving the rest for subsequent writes
            let buf = &buf[..total_len - self.buffer.len()];
            self.buffer.extend(buf);
            self.dispatch_pdu()?;
            Ok(buf.len())
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.stream.flush()
    }
}

/// With the P-Data writer dropped,
/// this `Drop` implementation
/// will construct and emit the last P-Data fragment PDU
/// if there is any data left to send.
impl<W> Drop for PDataWriter<W>
where
    W: Write,
{
    fn drop(&mut self) {
        let _ = self.finish_impl();
    }
}

/// A source of whole PDUs.
pub(crate) trait PduSource {
    fn next_pdu(&mut self) -> Result<Pdu>;
}

impl PduSource for Channel {
    fn next_pdu(&mut self) -> Result<Pdu> {
        self.receive()
    }
}

/// A P-Data value reader.
///
/// This exposes an API which provides a byte stream of data
/// by iteratively collecting data fragments from another node.
/// Using this as a [standard reader](std::io::Read)
/// will provide all incoming bytes,
/// even if they reside in separate PDUs,
/// until the last fragment is received.
///
/// Command fragments and fragments of other presentation contexts
/// are skipped.
/// Any PDU other than P-DATA-TF ends the stream with an error.
#[must_use]
pub struct PDataReader<'a> {
    source: &'a mut dyn PduSource,
    buffer: VecDeque<u8>,
    presentation_context_id: Option<u8>,
    last_pdu: bool,
}

impl<'a> PDataReader<'a> {
    pub(crate) fn new(source: &'a mut dyn PduSource) -> Self {
        PDataReader {
            source,
            buffer: VecDeque::new(),
            presentation_context_id: None,
            last_pdu: false,
        }
    }

    /// The presentation context of the fragments read so far.
    pub fn presentation_context_id(&self) -> Option<u8> {
        self.presentation_context_id
    }

    /// Whether the last fragment was already received.
    pub fn stop_receiving(&self) -> bool {
        self.last_pdu
    }

    fn fill_buffer(&mut self) -> std::io::Result<()> {
        let pdu = self
            .source
            .next_pdu()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        match pdu {
            Pdu::PData { data } => {
                for pdata_value in data {
                    if pdata_value.value_type != PDataValueType::Data {
                        warn!("Ignoring command fragment while reading data");
                        continue;
                    }
                    match self.presentation_context_id {
                        None => {
                            self.presentation_context_id =
                                Some(pdata_value.presentation_context_id)
                        }
                        Some(id) if id != pdata_value.presentation_context_id => {
                            warn!(
                                "Ignoring fragment of presentation context {}",
                                pdata_value.presentation_context_id
                            );
                            continue;
                        }
                        Some(_) => {}
                    }
                    self.buffer.extend(pdata_value.data);
                    self.last_pdu = pdata_value.is_last;
                }
                Ok(())
            }
            pdu => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Unexpected PDU {}", pdu.short_description()),
            )),
        }
    }
}

impl Read for PDataReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        while self.buffer.is_empty() {
            if self.last_pdu {
                return Ok(0);
            }
            self.fill_buffer()?;
        }
        self.buffer.read(buf)
    }
}

/// Determine the maximum length of actual PDV data
/// when encapsulated in a PDU with the given length property.
/// Does not account for the first 2 bytes (type + reserved).
#[inline]
pub(crate) fn calculate_max_data_len_single(pdu_len: u32) -> u32 {
    // data length: 4 bytes
    // context id and control header: 2 bytes
    pdu_len - PDV_HEADER_SIZE
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use dcm_encoding::{Endianness, Stream};

    use crate::association::{ReceivePduSnafu, Result};
    use crate::pdu::{read_pdu, write_pdu, Pdu, MINIMUM_PDU_SIZE, PDU_HEADER_SIZE};
    use crate::pdu::{PDataValue, PDataValueType};
    use snafu::ResultExt;

    use super::{PDataReader, PDataWriter, PduSource};

    struct BufferSource(Stream);

    impl PduSource for BufferSource {
        fn next_pdu(&mut self) -> Result<Pdu> {
            let pdu = read_pdu(&mut self.0, MINIMUM_PDU_SIZE, true).context(ReceivePduSnafu)?;
            Ok(pdu.expect("whole PDU in buffer"))
        }
    }

    fn read_all(buf: Vec<u8>) -> Vec<Pdu> {
        let mut stream = Stream::from_bytes(buf, Endianness::Big);
        let mut pdus = Vec::new();
        while let Some(pdu) = read_pdu(&mut stream, MINIMUM_PDU_SIZE, true).unwrap() {
            pdus.push(pdu);
        }
        assert!(stream.is_exhausted());
        pdus
    }

    #[test]
    fn write_pdata_and_finish() {
        let presentation_context_id = 12;

        let mut buf = Vec::new();
        {
            let mut writer = PDataWriter::new(&mut buf, presentation_context_id, MINIMUM_PDU_SIZE);
            writer.write_all(&(0..64).collect::<Vec<u8>>()).unwrap();
            writer.finish().unwrap();
        }

        let pdus = read_all(buf);
        assert_eq!(pdus.len(), 1);
        match &pdus[0] {
            Pdu::PData { data } => {
                let data = &data[0];
                assert_eq!(data.value_type, PDataValueType::Data);
                assert_eq!(data.presentation_context_id, presentation_context_id);
                assert!(data.is_last);
                assert_eq!(data.data, (0..64).collect::<Vec<u8>>());
            }
            pdu => panic!("Expected PData, got {:?}", pdu),
        }
    }

    #[test]
    fn write_large_pdata_in_fragments() {
        let presentation_context_id = 32;
        let my_data: Vec<_> = (0..9000).map(|x: u32| x as u8).collect();

        let mut buf = Vec::new();
        {
            let mut writer = PDataWriter::new(&mut buf, presentation_context_id, MINIMUM_PDU_SIZE);
            writer.write_all(&my_data).unwrap();
        }

        let pdus = read_all(buf);
        assert_eq!(pdus.len(), 3);
        let mut all_data: Vec<u8> = Vec::new();
        for (i, pdu) in pdus.into_iter().enumerate() {
            match pdu {
                Pdu::PData { data } => {
                    assert_eq!(data.len(), 1);
                    let pdv = &data[0];
                    assert_eq!(pdv.presentation_context_id, presentation_context_id);
                    assert_eq!(pdv.is_last, i == 2);
                    if i < 2 {
                        assert_eq!(pdv.data.len(), (MINIMUM_PDU_SIZE - PDU_HEADER_SIZE) as usize);
                    } else {
                        assert_eq!(pdv.data.len(), 820);
                    }
                    all_data.extend(&pdv.data);
                }
                pdu => panic!("Expected PData, got {:?}", pdu),
            }
        }
        assert_eq!(all_data, my_data);
    }

    #[test]
    fn command_fragments_set_the_command_bit() {
        let mut buf = Vec::new();
        {
            let mut writer = PDataWriter::with_value_type(
                &mut buf,
                1,
                PDataValueType::Command,
                MINIMUM_PDU_SIZE,
            );
            writer.write_all(&[1, 2, 3, 4]).unwrap();
        }
        assert_eq!(buf[11], 0x03);
        assert_eq!(&buf[12..], &[1, 2, 3, 4]);
    }

    #[test]
    fn read_large_pdata() {
        let presentation_context_id = 32;
        let my_data: Vec<_> = (0..9000).map(|x: u32| x as u8).collect();

        let mut bytes = Vec::new();
        for (range, is_last) in [(0..3000, false), (3000..6000, false), (6000..9000, true)] {
            let pdu = Pdu::PData {
                data: vec![PDataValue {
                    value_type: PDataValueType::Data,
                    data: my_data[range].to_owned(),
                    presentation_context_id,
                    is_last,
                }],
            };
            write_pdu(&mut bytes, &pdu).unwrap();
        }
        // the next PDU must stay unread
        write_pdu(&mut bytes, &Pdu::ReleaseRQ).unwrap();

        let mut source = BufferSource(Stream::from_bytes(bytes, Endianness::Big));
        let mut buf = Vec::new();
        {
            let mut reader = PDataReader::new(&mut source);
            reader.read_to_end(&mut buf).unwrap();
            assert_eq!(reader.presentation_context_id(), Some(presentation_context_id));
            assert!(reader.stop_receiving());
        }
        assert_eq!(buf, my_data);
        assert_eq!(source.next_pdu().unwrap(), Pdu::ReleaseRQ);
    }

    #[test]
    fn read_pdata_fails_on_other_pdus() {
        let mut bytes = Vec::new();
        write_pdu(&mut bytes, &Pdu::ReleaseRQ).unwrap();
        let mut source = BufferSource(Stream::from_bytes(bytes, Endianness::Big));
        let mut reader = PDataReader::new(&mut source);
        let mut buf = Vec::new();
        assert!(reader.read_to_end(&mut buf).is_err());
    }
}
