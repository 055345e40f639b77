//! Value codecs.
//!
//! A container picks its codec through a type parameter instead of probing the
//! value at runtime: [`DefaultCodec`] uses the serde encoding of `T`,
//! [`CustomCodec`] calls the value's own [`MsgpackEncode`]/[`MsgpackDecode`]
//! implementation, and [`crate::ExtCodec`] wraps a value's raw marshaller in an
//! extension block. Which one applies is visible in the type, e.g.
//! `Optional<Point, CustomCodec>`.

use std::io::Write;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{BoxError, DecodeError, DecodeErrorKind, EncodeError};
use crate::wire::{Decoder, Encoder};

/// Encodes and decodes present values. `nil` handling stays with the container.
pub trait ValueCodec<T> {
    fn encode<W: Write>(value: &T, encoder: &mut Encoder<W>) -> Result<(), BoxError>;

    /// Decodes into `value` in place. On error `value` may be partially written.
    fn decode(value: &mut T, decoder: &mut Decoder<'_>) -> Result<(), DecodeErrorKind>;
}

/// Values that write themselves to the stream.
pub trait MsgpackEncode {
    fn encode_msgpack<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError>;
}

/// Values that read themselves from the stream.
pub trait MsgpackDecode {
    fn decode_msgpack(&mut self, decoder: &mut Decoder<'_>) -> Result<(), DecodeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DefaultCodec;

impl<T: Serialize + DeserializeOwned> ValueCodec<T> for DefaultCodec {
    fn encode<W: Write>(value: &T, encoder: &mut Encoder<W>) -> Result<(), BoxError> {
        encoder.encode_serde(value)?;
        Ok(())
    }

    fn decode(value: &mut T, decoder: &mut Decoder<'_>) -> Result<(), DecodeErrorKind> {
        *value = decoder.decode_serde()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CustomCodec;

impl<T: MsgpackEncode + MsgpackDecode> ValueCodec<T> for CustomCodec {
    fn encode<W: Write>(value: &T, encoder: &mut Encoder<W>) -> Result<(), BoxError> {
        value.encode_msgpack(encoder)?;
        Ok(())
    }

    fn decode(value: &mut T, decoder: &mut Decoder<'_>) -> Result<(), DecodeErrorKind> {
        value.decode_msgpack(decoder).map_err(DecodeErrorKind::custom)
    }
}
