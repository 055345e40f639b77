//! Optional scalars with a fixed wire shape.
//!
//! Unlike [`crate::Optional`], these check the peeked marker before decoding and
//! report a mismatch as "unexpected code" carrying the offending marker byte.

use std::io::Write;

use optpack_contracts::VALUE_NOT_SET;

use crate::error::{DecodeError, DecodeErrorKind, EncodeError};
use crate::optional::OptionalValue;
use crate::wire::{self, Decoder, Encoder};

macro_rules! typed_optional {
    (
        $(#[$meta:meta])*
        $name:ident($ty:ty) {
            check: $check:path,
            decode: $decode:ident,
            encode: |$enc:ident, $val:ident| $encode:expr,
            zero: $zero:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            value: $ty,
            exists: bool,
        }

        impl $name {
            const TYPE_NAME: &'static str = stringify!($name);

            pub fn some(value: $ty) -> Self {
                $name { value, exists: true }
            }

            pub fn none() -> Self {
                $name { value: $zero, exists: false }
            }

            pub fn is_some(&self) -> bool {
                self.exists
            }

            pub fn is_zero(&self) -> bool {
                !self.exists
            }

            pub fn is_nil(&self) -> bool {
                !self.exists
            }

            pub fn get(self) -> ($ty, bool) {
                (self.value, self.exists)
            }

            pub fn must_get(self) -> $ty {
                if !self.exists {
                    panic!("{}", VALUE_NOT_SET);
                }
                self.value
            }

            pub fn unwrap(self) -> $ty {
                self.value
            }

            pub fn unwrap_or(self, default: $ty) -> $ty {
                if self.exists {
                    self.value
                } else {
                    default
                }
            }

            pub fn unwrap_or_else<F: FnOnce() -> $ty>(self, f: F) -> $ty {
                if self.exists {
                    self.value
                } else {
                    f()
                }
            }

            pub fn encode_msgpack<W: Write>(
                &self,
                encoder: &mut Encoder<W>,
            ) -> Result<(), EncodeError> {
                let res = if self.exists {
                    let $enc = &mut *encoder;
                    let $val = &self.value;
                    $encode
                } else {
                    encoder.encode_nil()
                };
                res.map_err(|err| EncodeError::new(Self::TYPE_NAME, err))
            }

            pub fn decode_msgpack(&mut self, decoder: &mut Decoder<'_>) -> Result<(), DecodeError> {
                let wrap = |kind: DecodeErrorKind| DecodeError::new(Self::TYPE_NAME, kind);
                let marker = decoder.peek_marker().map_err(|err| wrap(err.into()))?;
                if wire::is_nil(marker) {
                    decoder.skip_nil().map_err(|err| wrap(err.into()))?;
                    *self = Self::none();
                    return Ok(());
                }
                if !$check(marker) {
                    return Err(wrap(DecodeErrorKind::UnexpectedCode(marker.to_u8())));
                }
                self.value = decoder.$decode().map_err(|err| wrap(err.into()))?;
                self.exists = true;
                Ok(())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::none()
            }
        }

        impl From<Option<$ty>> for $name {
            fn from(value: Option<$ty>) -> Self {
                value.map_or_else(Self::none, Self::some)
            }
        }

        impl OptionalValue for $name {
            type Value = $ty;

            fn is_some(&self) -> bool {
                $name::is_some(self)
            }

            fn get(self) -> ($ty, bool) {
                $name::get(self)
            }

            fn must_get(self) -> $ty {
                $name::must_get(self)
            }

            fn unwrap(self) -> $ty {
                $name::unwrap(self)
            }

            fn unwrap_or(self, default: $ty) -> $ty {
                $name::unwrap_or(self, default)
            }

            fn unwrap_or_else<F: FnOnce() -> $ty>(self, f: F) -> $ty {
                $name::unwrap_or_else(self, f)
            }

            fn encode_msgpack<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
                $name::encode_msgpack(self, encoder)
            }

            fn decode_msgpack(&mut self, decoder: &mut Decoder<'_>) -> Result<(), DecodeError> {
                $name::decode_msgpack(self, decoder)
            }
        }
    };
}

typed_optional! {
    OptionalBool(bool) {
        check: wire::is_bool,
        decode: decode_bool,
        encode: |enc, v| enc.encode_bool(*v),
        zero: false,
    }
}

typed_optional! {
    OptionalI8(i8) {
        check: wire::is_number,
        decode: decode_i8,
        encode: |enc, v| enc.encode_i8(*v),
        zero: 0,
    }
}

typed_optional! {
    OptionalI16(i16) {
        check: wire::is_number,
        decode: decode_i16,
        encode: |enc, v| enc.encode_i16(*v),
        zero: 0,
    }
}

typed_optional! {
    OptionalI32(i32) {
        check: wire::is_number,
        decode: decode_i32,
        encode: |enc, v| enc.encode_i32(*v),
        zero: 0,
    }
}

typed_optional! {
    OptionalI64(i64) {
        check: wire::is_number,
        decode: decode_i64,
        encode: |enc, v| enc.encode_i64(*v),
        zero: 0,
    }
}

typed_optional! {
    OptionalU8(u8) {
        check: wire::is_number,
        decode: decode_u8,
        encode: |enc, v| enc.encode_u8(*v),
        zero: 0,
    }
}

typed_optional! {
    OptionalU16(u16) {
        check: wire::is_number,
        decode: decode_u16,
        encode: |enc, v| enc.encode_u16(*v),
        zero: 0,
    }
}

typed_optional! {
    OptionalU32(u32) {
        check: wire::is_number,
        decode: decode_u32,
        encode: |enc, v| enc.encode_u32(*v),
        zero: 0,
    }
}

typed_optional! {
    OptionalU64(u64) {
        check: wire::is_number,
        decode: decode_u64,
        encode: |enc, v| enc.encode_u64(*v),
        zero: 0,
    }
}

typed_optional! {
    /// Accepts integer markers as well as `float32`/`float64`.
    OptionalF32(f32) {
        check: wire::is_float,
        decode: decode_f32,
        encode: |enc, v| enc.encode_f32(*v),
        zero: 0.0,
    }
}

typed_optional! {
    /// Accepts integer markers as well as `float32`/`float64`.
    OptionalF64(f64) {
        check: wire::is_float,
        decode: decode_f64,
        encode: |enc, v| enc.encode_f64(*v),
        zero: 0.0,
    }
}

typed_optional! {
    /// Encoded as `str`; decodes from `str` or `bin`.
    OptionalString(String) {
        check: wire::is_string,
        decode: decode_string,
        encode: |enc, v| enc.encode_str(v),
        zero: String::new(),
    }
}

typed_optional! {
    /// Encoded as `bin`; decodes from `bin` or `str`.
    OptionalBytes(Vec<u8>) {
        check: wire::is_bytes,
        decode: decode_bytes,
        encode: |enc, v| enc.encode_bytes(v),
        zero: Vec::new(),
    }
}

typed_optional! {
    /// Any non-nil value. A present `rmpv::Value::Nil` cannot survive a round trip,
    /// it decodes as absent.
    OptionalAny(rmpv::Value) {
        check: wire::is_any,
        decode: decode_value,
        encode: |enc, v| enc.encode_value(v),
        zero: rmpv::Value::Nil,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{from_slice, to_vec};

    #[test]
    fn some_matches_bare_encoding() {
        let bytes = to_vec(&OptionalI64::some(42)).unwrap();
        assert_eq!(bytes, rmp_serde::to_vec(&42i64).unwrap());
        assert_eq!(to_vec(&OptionalI64::none()).unwrap(), vec![0xc0]);
    }

    #[test]
    fn wrong_marker_is_unexpected_code() {
        let bytes = to_vec(&OptionalString::some("x".into())).unwrap();
        let err = from_slice::<OptionalU8>(&bytes).unwrap_err();
        assert!(err.is_unexpected_code());
        assert_eq!(err.type_name(), "OptionalU8");
        assert_eq!(err.to_string(), "failed to decode OptionalU8: invalid code: 0xa1");

        let bytes = to_vec(&OptionalBool::some(true)).unwrap();
        let err = from_slice::<OptionalF64>(&bytes).unwrap_err();
        assert!(matches!(err.kind(), DecodeErrorKind::UnexpectedCode(0xc3)));
    }

    #[test]
    fn integer_overflow_is_a_wire_error() {
        let bytes = to_vec(&OptionalU16::some(300)).unwrap();
        let err = from_slice::<OptionalU8>(&bytes).unwrap_err();
        assert!(matches!(err.kind(), DecodeErrorKind::Wire(_)));
    }

    #[test]
    fn float_accepts_integer() {
        let bytes = to_vec(&OptionalI8::some(-3)).unwrap();
        let back: OptionalF32 = from_slice(&bytes).unwrap();
        assert_eq!(back.must_get(), -3.0);

        let bytes = to_vec(&OptionalU64::some(u64::MAX)).unwrap();
        let back: OptionalF64 = from_slice(&bytes).unwrap();
        assert_eq!(back.must_get(), u64::MAX as f64);
    }

    #[test]
    fn any_rejects_nothing_but_nil() {
        let value = rmpv::Value::Array(vec![1.into(), "two".into(), rmpv::Value::Boolean(false)]);
        let bytes = to_vec(&OptionalAny::some(value.clone())).unwrap();
        let back: OptionalAny = from_slice(&bytes).unwrap();
        assert_eq!(back, OptionalAny::some(value));

        let back: OptionalAny = from_slice(&[0xc0]).unwrap();
        assert!(back.is_nil());
        assert_eq!(back.unwrap(), rmpv::Value::Nil);
    }

    #[test]
    fn decode_nil_resets_to_zero() {
        let mut opt = OptionalString::some("stale".into());
        opt.decode_msgpack(&mut Decoder::new(&[0xc0])).unwrap();
        assert_eq!(opt.get(), (String::new(), false));
    }

    #[test]
    fn option_conversion() {
        assert_eq!(OptionalU32::from(Some(5)), OptionalU32::some(5));
        assert_eq!(OptionalU32::from(None), OptionalU32::none());
    }
}
