//! Optional values with a MessagePack wire encoding.
//!
//! An absent value is written as the MessagePack `nil` marker and a present value
//! as exactly the bytes its codec produces, so an `Optional<T>` stays readable by
//! consumers that expect a plain nilable `T`. Values with their own binary
//! representation are carried inside extension blocks, see [`ext`].
//!
//! ```
//! use optpack::Optional;
//!
//! let opt = Optional::<i64>::some(42i64);
//! let bytes = optpack::to_vec(&opt).unwrap();
//! let back: Optional<i64> = optpack::from_slice(&bytes).unwrap();
//! assert_eq!(back.unwrap(), 42);
//! ```

pub mod codec;
pub mod error;
pub mod ext;
pub mod optional;
pub mod primitives;
pub mod wire;

pub use codec::{CustomCodec, DefaultCodec, MsgpackDecode, MsgpackEncode, ValueCodec};
pub use error::{BoxError, DecodeError, DecodeErrorKind, EncodeError};
pub use ext::{ExtCodec, MsgpackExt};
pub use optional::{Optional, OptionalValue};
pub use primitives::{
    OptionalAny, OptionalBool, OptionalBytes, OptionalF32, OptionalF64, OptionalI16,
    OptionalI32, OptionalI64, OptionalI8, OptionalString, OptionalU16, OptionalU32,
    OptionalU64, OptionalU8,
};
pub use wire::{from_slice, to_vec, Decoder, Encoder, Marker, WireError};
