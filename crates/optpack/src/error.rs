use std::borrow::Cow;

use thiserror::Error;

use crate::wire::WireError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum DecodeErrorKind {
    /// The next marker matches no branch the decoder understands.
    #[error("invalid code: {0:#04x}")]
    UnexpectedCode(u8),
    #[error("unexpected extension type {actual}, expected {expected}")]
    UnexpectedExtType { expected: i8, actual: i8 },
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error(transparent)]
    Custom(BoxError),
}

impl DecodeErrorKind {
    pub fn custom(err: impl Into<BoxError>) -> Self {
        DecodeErrorKind::Custom(err.into())
    }
}

/// Decoding failed; the stream position afterwards is unspecified.
#[derive(Debug, Error)]
#[error("failed to decode {type_name}: {kind}")]
pub struct DecodeError {
    type_name: Cow<'static, str>,
    kind: DecodeErrorKind,
}

impl DecodeError {
    pub fn new(type_name: impl Into<Cow<'static, str>>, kind: impl Into<DecodeErrorKind>) -> Self {
        DecodeError {
            type_name: type_name.into(),
            kind: kind.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> DecodeErrorKind {
        self.kind
    }

    pub fn is_unexpected_code(&self) -> bool {
        matches!(self.kind, DecodeErrorKind::UnexpectedCode(_))
    }

    pub fn is_unexpected_ext_type(&self) -> bool {
        matches!(self.kind, DecodeErrorKind::UnexpectedExtType { .. })
    }
}

/// The sink or the value's own marshaller failed.
#[derive(Debug, Error)]
#[error("failed to encode {type_name}: {cause}")]
pub struct EncodeError {
    type_name: Cow<'static, str>,
    cause: BoxError,
}

impl EncodeError {
    pub fn new(type_name: impl Into<Cow<'static, str>>, cause: impl Into<BoxError>) -> Self {
        EncodeError {
            type_name: type_name.into(),
            cause: cause.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }
}
