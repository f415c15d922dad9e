//! Field-tagged binary record layout.
//!
//! Layout (all integers big-endian):
//! ```text
//! ┌──────────┬───────────┬──────────────────────┐
//! │ Type (1B)│ Field (2B)│ Value                │  repeated per field
//! └──────────┴───────────┴──────────────────────┘
//! ┌──────────┐
//! │ STOP 0x00│
//! └──────────┘
//!
//! name: type 11 (string), field 1, value = len (4B) + UTF-8 bytes
//! age:  type 8  (i32),    field 2, value = 4B
//! ```
//!
//! Readers skip unknown scalar fields so the layout can grow new fields
//! without breaking older readers.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{LayoutError, Result};
use crate::record::Record;

pub const TYPE_STOP: u8 = 0;
pub const TYPE_BOOL: u8 = 2;
pub const TYPE_BYTE: u8 = 3;
pub const TYPE_DOUBLE: u8 = 4;
pub const TYPE_I16: u8 = 6;
pub const TYPE_I32: u8 = 8;
pub const TYPE_I64: u8 = 10;
pub const TYPE_STRING: u8 = 11;

pub const FIELD_NAME: i16 = 1;
pub const FIELD_AGE: i16 = 2;

/// Field header: type (1) + field id (2).
const FIELD_HEADER_SIZE: usize = 3;

/// Exact number of bytes [`encode_record`] writes for `record`.
pub fn encoded_len(record: &Record) -> usize {
    (FIELD_HEADER_SIZE + 4 + record.name().len()) + (FIELD_HEADER_SIZE + 4) + 1
}

/// Append the binary layout of `record` to `dst`.
pub fn encode_record(record: &Record, dst: &mut BytesMut) {
    dst.reserve(encoded_len(record));

    dst.put_u8(TYPE_STRING);
    dst.put_i16(FIELD_NAME);
    dst.put_i32(record.name().len() as i32);
    dst.put_slice(record.name().as_bytes());

    dst.put_u8(TYPE_I32);
    dst.put_i16(FIELD_AGE);
    dst.put_i32(record.age());

    dst.put_u8(TYPE_STOP);
}

/// Decode exactly one record from `data`.
///
/// The whole slice must be consumed; bytes after the STOP marker are an
/// error.
pub fn decode_record(data: &[u8]) -> Result<Record> {
    let mut src = data;
    let mut name: Option<String> = None;
    let mut age: Option<i32> = None;

    loop {
        need(&src, 1)?;
        let type_id = src.get_u8();
        if type_id == TYPE_STOP {
            break;
        }
        need(&src, 2)?;
        let field_id = src.get_i16();

        match field_id {
            FIELD_NAME => {
                expect_type(field_id, TYPE_STRING, type_id)?;
                let raw = read_string(&mut src)?;
                name = Some(String::from_utf8(raw).map_err(|_| LayoutError::InvalidUtf8)?);
            }
            FIELD_AGE => {
                expect_type(field_id, TYPE_I32, type_id)?;
                need(&src, 4)?;
                age = Some(src.get_i32());
            }
            _ => skip_field(&mut src, field_id, type_id)?,
        }
    }

    if src.has_remaining() {
        return Err(LayoutError::TrailingBytes(src.remaining()));
    }

    let name = name.ok_or(LayoutError::MissingField("name"))?;
    let age = age.ok_or(LayoutError::MissingField("age"))?;
    Ok(Record::new(name, age)?)
}

fn need(src: &&[u8], n: usize) -> Result<()> {
    if src.remaining() < n {
        return Err(LayoutError::UnexpectedEof {
            needed: n - src.remaining(),
        });
    }
    Ok(())
}

fn expect_type(field_id: i16, expected: u8, found: u8) -> Result<()> {
    if expected != found {
        return Err(LayoutError::TypeMismatch {
            field_id,
            expected,
            found,
        });
    }
    Ok(())
}

fn read_string(src: &mut &[u8]) -> Result<Vec<u8>> {
    need(src, 4)?;
    let len = src.get_i32();
    if len < 0 {
        return Err(LayoutError::NegativeLength(len));
    }
    let len = len as usize;
    need(src, len)?;
    let bytes = src[..len].to_vec();
    src.advance(len);
    Ok(bytes)
}

fn skip_field(src: &mut &[u8], field_id: i16, type_id: u8) -> Result<()> {
    let width = match type_id {
        TYPE_BOOL | TYPE_BYTE => 1,
        TYPE_I16 => 2,
        TYPE_I32 => 4,
        TYPE_DOUBLE | TYPE_I64 => 8,
        TYPE_STRING => {
            read_string(src)?;
            return Ok(());
        }
        _ => return Err(LayoutError::UnsupportedType { field_id, type_id }),
    };
    need(src, width)?;
    src.advance(width);
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn encode(record: &Record) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_record(record, &mut buf);
        buf.to_vec()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let record = Record::new("Alice", 30).unwrap();
        let wire = encode(&record);

        assert_eq!(wire.len(), encoded_len(&record));
        assert_eq!(decode_record(&wire).unwrap(), record);
    }

    #[test]
    fn test_exact_wire_bytes() {
        let wire = encode(&Record::new("Al", -1).unwrap());
        assert_eq!(
            wire,
            vec![
                11, 0, 1, 0, 0, 0, 2, b'A', b'l', // name
                8, 0, 2, 0xFF, 0xFF, 0xFF, 0xFF, // age
                0,    // stop
            ]
        );
    }

    #[test]
    fn test_name_with_delimiters_and_unicode() {
        let record = Record::new("tab\there\nnewline ünï", i32::MIN).unwrap();
        assert_eq!(decode_record(&encode(&record)).unwrap(), record);
    }

    #[test]
    fn test_fields_in_any_order() {
        let mut buf = BytesMut::new();
        buf.put_u8(TYPE_I32);
        buf.put_i16(FIELD_AGE);
        buf.put_i32(9);
        buf.put_u8(TYPE_STRING);
        buf.put_i16(FIELD_NAME);
        buf.put_i32(3);
        buf.put_slice(b"Zed");
        buf.put_u8(TYPE_STOP);

        assert_eq!(decode_record(&buf).unwrap(), Record::new("Zed", 9).unwrap());
    }

    #[test]
    fn test_skips_unknown_scalar_fields() {
        let mut buf = BytesMut::new();
        buf.put_u8(TYPE_I64);
        buf.put_i16(7);
        buf.put_i64(123);
        buf.put_u8(TYPE_STRING);
        buf.put_i16(8);
        buf.put_i32(2);
        buf.put_slice(b"xx");
        buf.put_u8(TYPE_BOOL);
        buf.put_i16(9);
        buf.put_u8(1);
        encode_record(&Record::new("Kim", 4).unwrap(), &mut buf);

        assert_eq!(decode_record(&buf).unwrap(), Record::new("Kim", 4).unwrap());
    }

    #[test]
    fn test_rejects_unsupported_field_type() {
        let mut buf = BytesMut::new();
        buf.put_u8(12); // struct
        buf.put_i16(5);
        buf.put_u8(TYPE_STOP);

        assert_eq!(
            decode_record(&buf),
            Err(LayoutError::UnsupportedType {
                field_id: 5,
                type_id: 12
            })
        );
    }

    #[test]
    fn test_rejects_type_mismatch() {
        let mut buf = BytesMut::new();
        buf.put_u8(TYPE_I64);
        buf.put_i16(FIELD_AGE);
        buf.put_i64(1);
        buf.put_u8(TYPE_STOP);

        assert!(matches!(
            decode_record(&buf),
            Err(LayoutError::TypeMismatch { field_id: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_missing_fields() {
        let mut buf = BytesMut::new();
        buf.put_u8(TYPE_I32);
        buf.put_i16(FIELD_AGE);
        buf.put_i32(1);
        buf.put_u8(TYPE_STOP);
        assert_eq!(decode_record(&buf), Err(LayoutError::MissingField("name")));

        assert_eq!(
            decode_record(&[TYPE_STOP]),
            Err(LayoutError::MissingField("name"))
        );
    }

    #[test]
    fn test_rejects_truncated_layout() {
        let wire = encode(&Record::new("Alice", 30).unwrap());
        for cut in 0..wire.len() {
            assert!(
                matches!(
                    decode_record(&wire[..cut]),
                    Err(LayoutError::UnexpectedEof { .. })
                ),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut wire = encode(&Record::new("Alice", 30).unwrap());
        wire.extend_from_slice(&[1, 2]);
        assert_eq!(decode_record(&wire), Err(LayoutError::TrailingBytes(2)));
    }

    #[test]
    fn test_rejects_negative_length() {
        let mut buf = BytesMut::new();
        buf.put_u8(TYPE_STRING);
        buf.put_i16(FIELD_NAME);
        buf.put_i32(-1);
        assert_eq!(decode_record(&buf), Err(LayoutError::NegativeLength(-1)));
    }

    #[test]
    fn test_rejects_invalid_utf8_and_empty_name() {
        let mut buf = BytesMut::new();
        buf.put_u8(TYPE_STRING);
        buf.put_i16(FIELD_NAME);
        buf.put_i32(1);
        buf.put_u8(0xFF);
        assert_eq!(decode_record(&buf), Err(LayoutError::InvalidUtf8));

        let mut buf = BytesMut::new();
        buf.put_u8(TYPE_STRING);
        buf.put_i16(FIELD_NAME);
        buf.put_i32(0);
        buf.put_u8(TYPE_I32);
        buf.put_i16(FIELD_AGE);
        buf.put_i32(1);
        buf.put_u8(TYPE_STOP);
        assert!(matches!(
            decode_record(&buf),
            Err(LayoutError::InvalidRecord(_))
        ));
    }

    fn any_name() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![Just('\t'), Just('\r'), Just('\n'), any::<char>()],
            1..48,
        )
        .prop_map(|chars| chars.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_layout_roundtrip(name in any_name(), age in any::<i32>()) {
            let record = Record::new(name, age).unwrap();
            let wire = encode(&record);

            prop_assert_eq!(wire.len(), encoded_len(&record));
            prop_assert_eq!(decode_record(&wire).unwrap(), record);
        }
    }
}
