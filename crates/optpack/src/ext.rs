//! Extension-coded values.
//!
//! Present values are written as one extension block: a header carrying
//! `(type: i8, len: u32)` followed by exactly `len` bytes from
//! [`MsgpackExt::marshal_msgpack`]. Decoding peeks the next marker and takes one of
//! three branches:
//!
//! 1. `nil`: absent (handled by the container).
//! 2. extension block: the header type must equal the bound type, then the payload
//!    goes to [`MsgpackExt::unmarshal_msgpack`].
//! 3. anything else: "unexpected code".
//!
//! `optpack-gen` emits the same state machine, monomorphized per target type.

use std::io::Write;

use crate::codec::ValueCodec;
use crate::error::{BoxError, DecodeErrorKind};
use crate::wire::{self, Decoder, Encoder};

pub trait MsgpackExt {
    /// Extension type code embedded in every encoded payload.
    const EXT_TYPE: i8;

    /// Flat payload, without any presence information.
    fn marshal_msgpack(&self) -> Result<Vec<u8>, BoxError>;

    fn unmarshal_msgpack(&mut self, data: &[u8]) -> Result<(), BoxError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExtCodec;

/// Reads one extension block of type `expected` and returns its payload.
pub fn read_ext_payload<'a>(
    decoder: &mut Decoder<'a>,
    expected: i8,
) -> Result<&'a [u8], DecodeErrorKind> {
    let marker = decoder.peek_marker()?;
    if !wire::is_ext(marker) {
        return Err(DecodeErrorKind::UnexpectedCode(marker.to_u8()));
    }
    let (actual, len) = decoder.read_ext_header()?;
    if actual != expected {
        tracing::trace!(expected, actual, "extension type mismatch");
        return Err(DecodeErrorKind::UnexpectedExtType { expected, actual });
    }
    Ok(decoder.read_payload(len)?)
}

impl<T: MsgpackExt> ValueCodec<T> for ExtCodec {
    fn encode<W: Write>(value: &T, encoder: &mut Encoder<W>) -> Result<(), BoxError> {
        let payload = value.marshal_msgpack()?;
        encoder.encode_ext(T::EXT_TYPE, &payload)?;
        Ok(())
    }

    fn decode(value: &mut T, decoder: &mut Decoder<'_>) -> Result<(), DecodeErrorKind> {
        let payload = read_ext_payload(decoder, T::EXT_TYPE)?;
        value.unmarshal_msgpack(payload).map_err(DecodeErrorKind::Custom)
    }
}
