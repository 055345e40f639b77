//! Thin adapter over the MessagePack crates.
//!
//! [`Encoder`] writes single values to any `io::Write` sink. [`Decoder`] reads from
//! a byte slice and can peek at the next marker without consuming it, which is what
//! lets optional containers branch on `nil` before committing to a value decoder.

use std::io::Write;

pub use rmp::Marker;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::error::{BoxError, DecodeError, EncodeError};
use crate::optional::OptionalValue;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("truncated payload: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },
    #[error("payload of {0} bytes does not fit an extension block")]
    PayloadTooLarge(usize),
    #[error("unexpected marker {0:?}")]
    TypeMismatch(Marker),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Read(#[from] rmp::decode::ValueReadError),
    #[error(transparent)]
    NumRead(#[from] rmp::decode::NumValueReadError),
    #[error(transparent)]
    Write(#[from] rmp::encode::ValueWriteError),
    #[error("invalid utf-8 string: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error(transparent)]
    SerdeEncode(#[from] rmp_serde::encode::Error),
    #[error(transparent)]
    SerdeDecode(#[from] rmp_serde::decode::Error),
    #[error("dynamic value: {0}")]
    Value(BoxError),
}

pub fn is_nil(marker: Marker) -> bool {
    marker == Marker::Null
}

pub fn is_number(marker: Marker) -> bool {
    matches!(
        marker,
        Marker::FixPos(_)
            | Marker::FixNeg(_)
            | Marker::U8
            | Marker::U16
            | Marker::U32
            | Marker::U64
            | Marker::I8
            | Marker::I16
            | Marker::I32
            | Marker::I64
    )
}

pub fn is_float(marker: Marker) -> bool {
    is_number(marker) || matches!(marker, Marker::F32 | Marker::F64)
}

fn is_str(marker: Marker) -> bool {
    matches!(
        marker,
        Marker::FixStr(_) | Marker::Str8 | Marker::Str16 | Marker::Str32
    )
}

fn is_bin(marker: Marker) -> bool {
    matches!(marker, Marker::Bin8 | Marker::Bin16 | Marker::Bin32)
}

/// Strings may arrive as `str` or `bin`.
pub fn is_string(marker: Marker) -> bool {
    is_str(marker) || is_bin(marker)
}

pub fn is_bytes(marker: Marker) -> bool {
    is_str(marker) || is_bin(marker)
}

pub fn is_bool(marker: Marker) -> bool {
    matches!(marker, Marker::True | Marker::False)
}

pub fn is_ext(marker: Marker) -> bool {
    matches!(
        marker,
        Marker::FixExt1
            | Marker::FixExt2
            | Marker::FixExt4
            | Marker::FixExt8
            | Marker::FixExt16
            | Marker::Ext8
            | Marker::Ext16
            | Marker::Ext32
    )
}

pub fn is_any(marker: Marker) -> bool {
    !is_nil(marker)
}

#[derive(Debug)]
pub struct Encoder<W> {
    wr: W,
}

macro_rules! encode_ints {
    ($($name:ident: $ty:ty => $write:ident as $wide:ty;)*) => {
        $(
            pub fn $name(&mut self, value: $ty) -> Result<(), WireError> {
                rmp::encode::$write(&mut self.wr, <$wide>::from(value))?;
                Ok(())
            }
        )*
    };
}

impl<W: Write> Encoder<W> {
    pub fn new(wr: W) -> Self {
        Encoder { wr }
    }

    pub fn get_ref(&self) -> &W {
        &self.wr
    }

    pub fn into_inner(self) -> W {
        self.wr
    }

    pub fn encode_nil(&mut self) -> Result<(), WireError> {
        rmp::encode::write_nil(&mut self.wr)?;
        Ok(())
    }

    pub fn encode_bool(&mut self, value: bool) -> Result<(), WireError> {
        rmp::encode::write_bool(&mut self.wr, value)?;
        Ok(())
    }

    encode_ints! {
        encode_i8: i8 => write_sint as i64;
        encode_i16: i16 => write_sint as i64;
        encode_i32: i32 => write_sint as i64;
        encode_i64: i64 => write_sint as i64;
        encode_u8: u8 => write_uint as u64;
        encode_u16: u16 => write_uint as u64;
        encode_u32: u32 => write_uint as u64;
        encode_u64: u64 => write_uint as u64;
    }

    pub fn encode_f32(&mut self, value: f32) -> Result<(), WireError> {
        rmp::encode::write_f32(&mut self.wr, value)?;
        Ok(())
    }

    pub fn encode_f64(&mut self, value: f64) -> Result<(), WireError> {
        rmp::encode::write_f64(&mut self.wr, value)?;
        Ok(())
    }

    pub fn encode_str(&mut self, value: &str) -> Result<(), WireError> {
        rmp::encode::write_str(&mut self.wr, value)?;
        Ok(())
    }

    pub fn encode_bytes(&mut self, value: &[u8]) -> Result<(), WireError> {
        rmp::encode::write_bin(&mut self.wr, value)?;
        Ok(())
    }

    /// Writes an extension header followed by the raw payload.
    pub fn encode_ext(&mut self, ext_type: i8, payload: &[u8]) -> Result<(), WireError> {
        let len =
            u32::try_from(payload.len()).map_err(|_| WireError::PayloadTooLarge(payload.len()))?;
        rmp::encode::write_ext_meta(&mut self.wr, len, ext_type)?;
        self.wr.write_all(payload)?;
        Ok(())
    }

    pub fn encode_value(&mut self, value: &rmpv::Value) -> Result<(), WireError> {
        rmpv::encode::write_value(&mut self.wr, value).map_err(|err| WireError::Value(Box::new(err)))
    }

    /// Default encoding for any serde type; structs are written as maps.
    pub fn encode_serde<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), WireError> {
        rmp_serde::encode::write_named(&mut self.wr, value)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    rd: &'a [u8],
}

macro_rules! decode_ints {
    ($($name:ident: $ty:ty;)*) => {
        $(
            pub fn $name(&mut self) -> Result<$ty, WireError> {
                Ok(rmp::decode::read_int::<$ty, _>(&mut self.rd)?)
            }
        )*
    };
}

impl<'a> Decoder<'a> {
    pub fn new(rd: &'a [u8]) -> Self {
        Decoder { rd }
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.rd
    }

    pub fn is_empty(&self) -> bool {
        self.rd.is_empty()
    }

    pub fn peek_code(&self) -> Result<u8, WireError> {
        self.rd.first().copied().ok_or(WireError::UnexpectedEof)
    }

    pub fn peek_marker(&self) -> Result<Marker, WireError> {
        self.peek_code().map(Marker::from_u8)
    }

    pub fn skip_nil(&mut self) -> Result<(), WireError> {
        rmp::decode::read_nil(&mut self.rd)?;
        Ok(())
    }

    /// Reads an extension header, returning `(type, payload length)`.
    pub fn read_ext_header(&mut self) -> Result<(i8, u32), WireError> {
        let meta = rmp::decode::read_ext_meta(&mut self.rd)?;
        Ok((meta.typeid, meta.size))
    }

    pub fn read_payload(&mut self, len: u32) -> Result<&'a [u8], WireError> {
        let need = usize::try_from(len).unwrap_or(usize::MAX);
        let rd: &'a [u8] = self.rd;
        if need > rd.len() {
            return Err(WireError::Truncated {
                need,
                have: rd.len(),
            });
        }
        let (payload, rest) = rd.split_at(need);
        self.rd = rest;
        Ok(payload)
    }

    pub fn decode_bool(&mut self) -> Result<bool, WireError> {
        Ok(rmp::decode::read_bool(&mut self.rd)?)
    }

    decode_ints! {
        decode_i8: i8;
        decode_i16: i16;
        decode_i32: i32;
        decode_i64: i64;
        decode_u8: u8;
        decode_u16: u16;
        decode_u32: u32;
        decode_u64: u64;
    }

    pub fn decode_f32(&mut self) -> Result<f32, WireError> {
        match self.peek_marker()? {
            Marker::F32 => Ok(rmp::decode::read_f32(&mut self.rd)?),
            Marker::F64 => Ok(rmp::decode::read_f64(&mut self.rd)? as f32),
            Marker::U64 => Ok(self.decode_u64()? as f32),
            marker if is_number(marker) => Ok(self.decode_i64()? as f32),
            marker => Err(WireError::TypeMismatch(marker)),
        }
    }

    pub fn decode_f64(&mut self) -> Result<f64, WireError> {
        match self.peek_marker()? {
            Marker::F32 => Ok(f64::from(rmp::decode::read_f32(&mut self.rd)?)),
            Marker::F64 => Ok(rmp::decode::read_f64(&mut self.rd)?),
            Marker::U64 => Ok(self.decode_u64()? as f64),
            marker if is_number(marker) => Ok(self.decode_i64()? as f64),
            marker => Err(WireError::TypeMismatch(marker)),
        }
    }

    fn read_str_or_bin(&mut self) -> Result<&'a [u8], WireError> {
        let marker = self.peek_marker()?;
        let len = if is_str(marker) {
            rmp::decode::read_str_len(&mut self.rd)?
        } else if is_bin(marker) {
            rmp::decode::read_bin_len(&mut self.rd)?
        } else {
            return Err(WireError::TypeMismatch(marker));
        };
        self.read_payload(len)
    }

    pub fn decode_string(&mut self) -> Result<String, WireError> {
        let raw = self.read_str_or_bin()?;
        Ok(std::str::from_utf8(raw)?.to_owned())
    }

    pub fn decode_bytes(&mut self) -> Result<Vec<u8>, WireError> {
        Ok(self.read_str_or_bin()?.to_vec())
    }

    pub fn decode_value(&mut self) -> Result<rmpv::Value, WireError> {
        rmpv::decode::read_value(&mut self.rd).map_err(|err| WireError::Value(Box::new(err)))
    }

    pub fn decode_serde<T: DeserializeOwned>(&mut self) -> Result<T, WireError> {
        Ok(rmp_serde::from_read(&mut self.rd)?)
    }
}

/// Encodes a single optional into a fresh buffer.
pub fn to_vec<O: OptionalValue>(opt: &O) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = Encoder::new(Vec::new());
    opt.encode_msgpack(&mut encoder)?;
    Ok(encoder.into_inner())
}

/// Decodes a single optional from the front of `bytes`; trailing bytes are ignored.
pub fn from_slice<O: OptionalValue + Default>(bytes: &[u8]) -> Result<O, DecodeError> {
    let mut out = O::default();
    out.decode_msgpack(&mut Decoder::new(bytes))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(f: impl FnOnce(&mut Encoder<Vec<u8>>) -> Result<(), WireError>) -> Vec<u8> {
        let mut enc = Encoder::new(Vec::new());
        f(&mut enc).expect("encode");
        enc.into_inner()
    }

    #[test]
    fn peek_does_not_consume() {
        let bytes = encoded(|e| e.encode_i64(7));
        let mut dec = Decoder::new(&bytes);
        assert_eq!(dec.peek_marker().unwrap(), Marker::FixPos(7));
        assert_eq!(dec.peek_code().unwrap(), 7);
        assert_eq!(dec.decode_i64().unwrap(), 7);
        assert!(dec.is_empty());
        assert!(matches!(dec.peek_code(), Err(WireError::UnexpectedEof)));
    }

    #[test]
    fn nil_is_single_marker_byte() {
        let bytes = encoded(|e| e.encode_nil());
        assert_eq!(bytes, vec![0xc0]);
        let mut dec = Decoder::new(&bytes);
        assert!(is_nil(dec.peek_marker().unwrap()));
        dec.skip_nil().unwrap();
        assert!(dec.is_empty());
    }

    #[test]
    fn ext_header_and_payload() {
        let bytes = encoded(|e| e.encode_ext(-3, b"abc"));
        let mut dec = Decoder::new(&bytes);
        assert!(is_ext(dec.peek_marker().unwrap()));
        let (ext_type, len) = dec.read_ext_header().unwrap();
        assert_eq!((ext_type, len), (-3, 3));
        assert_eq!(dec.read_payload(len).unwrap(), b"abc");
        assert!(dec.is_empty());
    }

    #[test]
    fn empty_ext_payload() {
        let bytes = encoded(|e| e.encode_ext(9, &[]));
        let mut dec = Decoder::new(&bytes);
        assert_eq!(dec.peek_marker().unwrap(), Marker::Ext8);
        let (ext_type, len) = dec.read_ext_header().unwrap();
        assert_eq!((ext_type, len), (9, 0));
        assert_eq!(dec.read_payload(len).unwrap(), b"");
        assert!(dec.is_empty());
    }

    #[test]
    fn truncated_payload_is_reported() {
        let mut bytes = encoded(|e| e.encode_ext(1, b"abcdef"));
        bytes.truncate(bytes.len() - 2);
        let mut dec = Decoder::new(&bytes);
        let (_, len) = dec.read_ext_header().unwrap();
        match dec.read_payload(len) {
            Err(WireError::Truncated { need, have }) => {
                assert_eq!(need, 6);
                assert_eq!(have, 4);
            }
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn floats_accept_integer_markers() {
        let bytes = encoded(|e| e.encode_i64(12));
        assert_eq!(Decoder::new(&bytes).decode_f64().unwrap(), 12.0);
        let bytes = encoded(|e| e.encode_f32(1.5));
        assert_eq!(Decoder::new(&bytes).decode_f64().unwrap(), 1.5);
        let bytes = encoded(|e| e.encode_str("x"));
        assert!(matches!(
            Decoder::new(&bytes).decode_f64(),
            Err(WireError::TypeMismatch(Marker::FixStr(1)))
        ));
    }

    #[test]
    fn floats_accept_u64_above_i64_range() {
        let bytes = encoded(|e| e.encode_u64(u64::MAX));
        assert_eq!(Decoder::new(&bytes).decode_f64().unwrap(), u64::MAX as f64);
        assert_eq!(Decoder::new(&bytes).decode_f32().unwrap(), u64::MAX as f32);
    }

    #[test]
    fn strings_accept_bin_markers() {
        let bytes = encoded(|e| e.encode_bytes(b"hello"));
        assert_eq!(Decoder::new(&bytes).decode_string().unwrap(), "hello");
        let bytes = encoded(|e| e.encode_str("hello"));
        assert_eq!(Decoder::new(&bytes).decode_bytes().unwrap(), b"hello".to_vec());
    }

    #[test]
    fn serde_values_consume_exactly_one_value() {
        let mut enc = Encoder::new(Vec::new());
        enc.encode_serde(&("a".to_string(), 5u32)).unwrap();
        enc.encode_bool(true).unwrap();
        let bytes = enc.into_inner();

        let mut dec = Decoder::new(&bytes);
        let pair: (String, u32) = dec.decode_serde().unwrap();
        assert_eq!(pair, ("a".to_string(), 5));
        assert!(dec.decode_bool().unwrap());
        assert!(dec.is_empty());
    }

    #[test]
    fn marker_classes() {
        assert!(is_number(Marker::FixNeg(-1)));
        assert!(is_number(Marker::U64));
        assert!(!is_number(Marker::F64));
        assert!(is_float(Marker::F32));
        assert!(is_string(Marker::Bin8));
        assert!(is_bool(Marker::False));
        assert!(is_any(Marker::FixArray(0)));
        assert!(!is_any(Marker::Null));
    }
}
