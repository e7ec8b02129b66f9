//! Decoding of element values from their binary form.
use byteordered::{ByteOrdered, Endianness};
use dcm_core::{Tag, Value, ValueKind, C, VR};
use snafu::{ensure, Backtrace, ResultExt, Snafu};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Value of {} bytes is not a multiple of {} for VR {}", len, unit, vr))]
    MisalignedValue {
        vr: VR,
        len: usize,
        unit: usize,
        backtrace: Backtrace,
    },
    #[snafu(display("Sequences have no primitive value"))]
    SequenceValue { backtrace: Backtrace },
    #[snafu(display("Could not read number"))]
    ReadNumber {
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Decode the binary form of a value of the given VR.
///
/// Text is stripped of its trailing padding (spaces and NUL).
/// Attribute tags become `GGGG,EEEE` text, joined by backslashes
/// when there are several.
/// An empty byte string decodes to [`Value::Empty`].
pub fn decode_value(bytes: &[u8], vr: VR, endianness: Endianness) -> Result<Value> {
    ensure!(vr != VR::SQ, SequenceValueSnafu);
    if bytes.is_empty() {
        return Ok(Value::Empty);
    }

    if vr == VR::AT {
        return decode_tags(bytes, endianness);
    }

    match vr.value_kind() {
        ValueKind::Text => Ok(Value::Text(decode_text(bytes))),
        ValueKind::Bytes => Ok(Value::Bytes(bytes.to_vec())),
        ValueKind::Integer => decode_integers(bytes, vr, endianness).map(Value::Integers),
        ValueKind::Float => decode_floats(bytes, vr, endianness).map(Value::Floats),
    }
}

/// Interpret bytes as text, removing trailing whitespace and NUL padding.
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

fn check_alignment(bytes: &[u8], vr: VR, unit: usize) -> Result<()> {
    ensure!(
        bytes.len() % unit == 0,
        MisalignedValueSnafu {
            vr,
            len: bytes.len(),
            unit,
        }
    );
    Ok(())
}

fn decode_tags(bytes: &[u8], endianness: Endianness) -> Result<Value> {
    check_alignment(bytes, VR::AT, 4)?;
    let mut source = ByteOrdered::runtime(bytes, endianness);
    let mut tags = Vec::with_capacity(bytes.len() / 4);
    for _ in 0..bytes.len() / 4 {
        let group = source.read_u16().context(ReadNumberSnafu)?;
        let element = source.read_u16().context(ReadNumberSnafu)?;
        tags.push(Tag(group, element).to_string());
    }
    Ok(Value::Text(tags.join("\\")))
}

fn decode_integers(bytes: &[u8], vr: VR, endianness: Endianness) -> Result<C<i64>> {
    let unit = vr.unit_size().unwrap_or(1);
    check_alignment(bytes, vr, unit)?;

    let count = bytes.len() / unit;
    let mut source = ByteOrdered::runtime(bytes, endianness);
    let mut out = C::with_capacity(count);
    for _ in 0..count {
        let v = match vr {
            VR::US | VR::OW => i64::from(source.read_u16().context(ReadNumberSnafu)?),
            VR::SS => i64::from(source.read_i16().context(ReadNumberSnafu)?),
            VR::UL | VR::OL => i64::from(source.read_u32().context(ReadNumberSnafu)?),
            VR::SL => i64::from(source.read_i32().context(ReadNumberSnafu)?),
            _ => i64::from(source.read_u8().context(ReadNumberSnafu)?),
        };
        out.push(v);
    }
    Ok(out)
}

fn decode_floats(bytes: &[u8], vr: VR, endianness: Endianness) -> Result<C<f64>> {
    let unit = vr.unit_size().unwrap_or(4);
    check_alignment(bytes, vr, unit)?;

    let count = bytes.len() / unit;
    let mut source = ByteOrdered::runtime(bytes, endianness);
    let mut out = C::with_capacity(count);
    for _ in 0..count {
        let v = if unit == 8 {
            source.read_f64().context(ReadNumberSnafu)?
        } else {
            f64::from(source.read_f32().context(ReadNumberSnafu)?)
        };
        out.push(v);
    }
    Ok(out)
}
