use std::any::type_name;
use std::io::Write;
use std::marker::PhantomData;

use optpack_contracts::VALUE_NOT_SET;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{DefaultCodec, ValueCodec};
use crate::error::{DecodeError, EncodeError};
use crate::wire::{self, Decoder, Encoder};

/// Operations shared by every optional container in this crate and by the types
/// `optpack-gen` emits.
pub trait OptionalValue {
    type Value;

    fn is_some(&self) -> bool;

    fn is_zero(&self) -> bool {
        !self.is_some()
    }

    fn is_nil(&self) -> bool {
        self.is_zero()
    }

    /// `(value, present)`. The value is `Default::default()` when absent.
    fn get(self) -> (Self::Value, bool);

    /// # Panics
    ///
    /// Panics with `optional value is not set` when absent.
    fn must_get(self) -> Self::Value;

    /// The stored value, or the default when absent. Never panics.
    fn unwrap(self) -> Self::Value;

    fn unwrap_or(self, default: Self::Value) -> Self::Value;

    /// `f` runs only when the value is absent.
    fn unwrap_or_else<F: FnOnce() -> Self::Value>(self, f: F) -> Self::Value;

    fn encode_msgpack<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError>;

    /// Overwrites both the value and the presence flag. On error the container is
    /// left in an unspecified state.
    fn decode_msgpack(&mut self, decoder: &mut Decoder<'_>) -> Result<(), DecodeError>;
}

/// A value of `T` that may be absent.
///
/// Absent values are encoded as `nil`; present ones are encoded by the codec `C`.
/// The invariant is that an absent container always holds `T::default()`.
///
/// Decoding takes `&mut self`, so concurrent mutation of one instance needs the
/// usual external synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Optional<T, C = DefaultCodec> {
    value: T,
    exists: bool,
    codec: PhantomData<C>,
}

impl<T, C> Optional<T, C> {
    pub fn some(value: T) -> Self {
        Optional {
            value,
            exists: true,
            codec: PhantomData,
        }
    }

    pub fn none() -> Self
    where
        T: Default,
    {
        Optional {
            value: T::default(),
            exists: false,
            codec: PhantomData,
        }
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

    pub fn get(self) -> (T, bool) {
        (self.value, self.exists)
    }

    pub fn must_get(self) -> T {
        if !self.exists {
            panic!("{}", VALUE_NOT_SET);
        }
        self.value
    }

    pub fn unwrap(self) -> T {
        self.value
    }

    pub fn unwrap_or(self, default: T) -> T {
        if self.exists {
            self.value
        } else {
            default
        }
    }

    pub fn unwrap_or_else<F: FnOnce() -> T>(self, f: F) -> T {
        if self.exists {
            self.value
        } else {
            f()
        }
    }

    pub fn into_option(self) -> Option<T> {
        self.exists.then_some(self.value)
    }

    fn type_name() -> String {
        format!("Optional<{}>", type_name::<T>())
    }
}

impl<T, C: ValueCodec<T>> Optional<T, C> {
    pub fn encode_msgpack<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        if !self.exists {
            return encoder
                .encode_nil()
                .map_err(|err| EncodeError::new(Self::type_name(), err));
        }
        C::encode(&self.value, encoder).map_err(|err| EncodeError::new(Self::type_name(), err))
    }

    pub fn decode_msgpack(&mut self, decoder: &mut Decoder<'_>) -> Result<(), DecodeError>
    where
        T: Default,
    {
        let marker = decoder
            .peek_marker()
            .map_err(|err| DecodeError::new(Self::type_name(), err))?;
        if wire::is_nil(marker) {
            decoder
                .skip_nil()
                .map_err(|err| DecodeError::new(Self::type_name(), err))?;
            self.value = T::default();
            self.exists = false;
            return Ok(());
        }

        C::decode(&mut self.value, decoder)
            .map_err(|kind| DecodeError::new(Self::type_name(), kind))?;
        self.exists = true;
        Ok(())
    }
}

impl<T: Default, C> Default for Optional<T, C> {
    fn default() -> Self {
        Optional::none()
    }
}

impl<T: Default, C> From<Option<T>> for Optional<T, C> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Optional::some(value),
            None => Optional::none(),
        }
    }
}

impl<T: Default, C: ValueCodec<T>> OptionalValue for Optional<T, C> {
    type Value = T;

    fn is_some(&self) -> bool {
        Optional::is_some(self)
    }

    fn get(self) -> (T, bool) {
        Optional::get(self)
    }

    fn must_get(self) -> T {
        Optional::must_get(self)
    }

    fn unwrap(self) -> T {
        Optional::unwrap(self)
    }

    fn unwrap_or(self, default: T) -> T {
        Optional::unwrap_or(self, default)
    }

    fn unwrap_or_else<F: FnOnce() -> T>(self, f: F) -> T {
        Optional::unwrap_or_else(self, f)
    }

    fn encode_msgpack<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        Optional::encode_msgpack(self, encoder)
    }

    fn decode_msgpack(&mut self, decoder: &mut Decoder<'_>) -> Result<(), DecodeError> {
        Optional::decode_msgpack(self, decoder)
    }
}

// Nested inside serde structs an absent value is still written as `nil`.
impl<T: Serialize> Serialize for Optional<T, DefaultCodec> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.exists {
            serializer.serialize_some(&self.value)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for Optional<T, DefaultCodec> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Optional::from)
    }
}
