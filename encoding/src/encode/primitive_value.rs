//! Encoding of element values into their binary form.
use byteordered::{ByteOrdered, Endianness};
use dcm_core::value::ConvertValueError;
use dcm_core::{Tag, Value, VR};
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Cannot convert value for VR {}", vr))]
    Convert {
        vr: VR,
        source: ConvertValueError,
        backtrace: Backtrace,
    },
    #[snafu(display("Number {} does not fit in VR {}", value, vr))]
    NumberOutOfRange {
        vr: VR,
        value: i64,
        backtrace: Backtrace,
    },
    #[snafu(display("Invalid attribute tag `{}`", text))]
    InvalidTag { text: String, backtrace: Backtrace },
    #[snafu(display("Sequences have no primitive value"))]
    SequenceValue { backtrace: Backtrace },
    #[snafu(display("Could not write number"))]
    WriteNumber {
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Encode a value in the binary form of the given VR.
///
/// The value is first converted to the kind that the VR expects.
/// The output always has an even length:
/// odd-length text is padded with a space (NUL for UI),
/// odd-length bytes with NUL.
///
/// ```
/// # use dcm_encoding::{encode_value, Endianness};
/// # use dcm_core::{Value, VR};
/// let bytes = encode_value(&Value::from("OddName"), VR::PN, Endianness::Little)?;
/// assert_eq!(bytes, b"OddName ");
/// # Ok::<(), dcm_encoding::encode::primitive_value::Error>(())
/// ```
pub fn encode_value(value: &Value, vr: VR, endianness: Endianness) -> Result<Vec<u8>> {
    ensure!(vr != VR::SQ, SequenceValueSnafu);
    let value = value.clone().convert_for(vr).context(ConvertSnafu { vr })?;

    let mut out = match (&value, vr) {
        (Value::Empty, _) => Vec::new(),
        (Value::Text(text), VR::AT) => encode_tags(text, endianness)?,
        (Value::Text(text), _) => text.as_bytes().to_vec(),
        (Value::Bytes(bytes), _) => bytes.clone(),
        (Value::Integers(numbers), vr) => encode_integers(numbers, vr, endianness)?,
        (Value::Floats(numbers), vr) => encode_floats(numbers, vr, endianness)?,
    };

    if out.len() % 2 == 1 {
        out.push(vr.padding());
    }
    Ok(out)
}

fn encode_tags(text: &str, endianness: Endianness) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut sink = ByteOrdered::runtime(&mut out, endianness);
    for part in text.split('\\').map(str::trim) {
        let tag: Tag = part
            .parse()
            .ok()
            .context(InvalidTagSnafu { text: part })?;
        sink.write_u16(tag.group()).context(WriteNumberSnafu)?;
        sink.write_u16(tag.element()).context(WriteNumberSnafu)?;
    }
    Ok(out)
}

fn encode_integers(numbers: &[i64], vr: VR, endianness: Endianness) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(numbers.len() * vr.unit_size().unwrap_or(1));
    let mut sink = ByteOrdered::runtime(&mut out, endianness);
    for &value in numbers {
        let out_of_range = || NumberOutOfRangeSnafu { vr, value }.build();
        match vr {
            VR::US | VR::OW => {
                let v = u16::try_from(value).map_err(|_| out_of_range())?;
                sink.write_u16(v).context(WriteNumberSnafu)?;
            }
            VR::SS => {
                let v = i16::try_from(value).map_err(|_| out_of_range())?;
                sink.write_i16(v).context(WriteNumberSnafu)?;
            }
            VR::UL | VR::OL => {
                let v = u32::try_from(value).map_err(|_| out_of_range())?;
                sink.write_u32(v).context(WriteNumberSnafu)?;
            }
            VR::SL => {
                let v = i32::try_from(value).map_err(|_| out_of_range())?;
                sink.write_i32(v).context(WriteNumberSnafu)?;
            }
            _ => {
                let v = u8::try_from(value).map_err(|_| out_of_range())?;
                sink.write_u8(v).context(WriteNumberSnafu)?;
            }
        }
    }
    Ok(out)
}

fn encode_floats(numbers: &[f64], vr: VR, endianness: Endianness) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(numbers.len() * 8);
    let mut sink = ByteOrdered::runtime(&mut out, endianness);
    for &value in numbers {
        if matches!(vr, VR::FD | VR::OD) {
            sink.write_f64(value).context(WriteNumberSnafu)?;
        } else {
            sink.write_f32(value as f32).context(WriteNumberSnafu)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::primitive_value::decode_value;
    use matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case("OddName", VR::PN, b"OddName ")]
    #[case("1.2.3", VR::UI, b"1.2.3\0")]
    #[case("EVEN", VR::CS, b"EVEN")]
    fn odd_text_is_padded(#[case] text: &str, #[case] vr: VR, #[case] expected: &[u8]) {
        let bytes = encode_value(&Value::from(text), vr, Endianness::Little).unwrap();
        assert_eq!(bytes, expected);
        assert_eq!(bytes.len() % 2, 0);
    }

    #[test]
    fn text_is_converted_for_numeric_vrs() {
        let bytes = encode_value(&Value::from("12"), VR::US, Endianness::Little).unwrap();
        assert_eq!(bytes, &[12, 0]);
        let bytes = encode_value(&Value::from(512_u16), VR::US, Endianness::Big).unwrap();
        assert_eq!(bytes, &[2, 0]);
    }

    #[test]
    fn numbers_out_of_range() {
        assert_matches!(
            encode_value(&Value::from(70000_i32), VR::US, Endianness::Little),
            Err(Error::NumberOutOfRange { value: 70000, .. })
        );
        assert_matches!(
            encode_value(&Value::from(-1_i32), VR::UL, Endianness::Little),
            Err(Error::NumberOutOfRange { .. })
        );
    }

    #[test]
    fn odd_byte_data_is_padded_with_nul() {
        let bytes = encode_value(&Value::Bytes(vec![1, 2, 3]), VR::UN, Endianness::Little).unwrap();
        assert_eq!(bytes, &[1, 2, 3, 0]);
        let bytes = encode_value(&Value::from(vec![1_u16, 2, 3]), VR::OB, Endianness::Little).unwrap();
        assert_eq!(bytes, &[1, 2, 3, 0]);
    }

    #[test]
    fn raw_bytes_keep_their_length_as_ow() {
        let bytes = encode_value(&Value::from(vec![1_u8, 2, 3, 4]), VR::OW, Endianness::Little).unwrap();
        assert_eq!(bytes, &[1, 2, 3, 4]);
        let decoded = decode_value(&bytes, VR::OW, Endianness::Little).unwrap();
        assert_eq!(decoded.integers(), Some(&[0x0201, 0x0403][..]));
    }

    #[test]
    fn attribute_tags() {
        let bytes = encode_value(&Value::from("0010,0020"), VR::AT, Endianness::Big).unwrap();
        assert_eq!(bytes, &[0x00, 0x10, 0x00, 0x20]);
        assert_matches!(
            encode_value(&Value::from("0010-0020"), VR::AT, Endianness::Big),
            Err(Error::InvalidTag { .. })
        );
    }

    #[rstest]
    #[case(Value::from(vec![1_u16, 65535]), VR::US)]
    #[case(Value::from(vec![-32768_i16, 7]), VR::SS)]
    #[case(Value::from(vec![4_000_000_000_u32]), VR::UL)]
    #[case(Value::from(-5_i32), VR::SL)]
    #[case(Value::from(vec![0.5, -1.25]), VR::FD)]
    #[case(Value::from(vec![0.5, 3.0]), VR::FL)]
    #[case(Value::from("SMITH^JOHN"), VR::PN)]
    #[case(Value::from("0008,0016\\0008,0018"), VR::AT)]
    #[case(Value::Bytes(vec![9, 8, 7, 6]), VR::UN)]
    fn round_trip(
        #[case] value: Value,
        #[case] vr: VR,
        #[values(Endianness::Little, Endianness::Big)] endianness: Endianness,
    ) {
        let bytes = encode_value(&value, vr, endianness).unwrap();
        let decoded = decode_value(&bytes, vr, endianness).unwrap();
        assert_eq!(decoded, value);
    }
}
