//! Pass graph error types.

use crate::backend::BackendError;
use thiserror::Error;

/// Broad classification of a [`RenderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or conflicting assembly input.
    Assembly,
    /// A consumer could not be resolved to a producer.
    LinkageUnresolved,
    /// A consumer was linked to a producer exposing the wrong resource type.
    LinkageTypeMismatch,
    /// An exclusive resource was handed out twice.
    ExclusiveResourceReuse,
    /// The device failed to create a resource.
    Device,
    /// Lifecycle misuse or an internal defect.
    Lifecycle,
}

/// Errors raised while assembling, linking or running a pass graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("invalid {kind} name '{name}'")]
    InvalidName { kind: &'static str, name: String },

    #[error("pass name '{0}' is already registered")]
    DuplicatePassName(String),

    #[error("producer '{producer}' is already registered on '{pass}'")]
    DuplicateProducer { pass: String, producer: String },

    #[error("consumer '{consumer}' is already registered on '{pass}'")]
    DuplicateConsumer { pass: String, consumer: String },

    #[error("renderer is already validated; passes and globals can no longer be added")]
    AssemblyClosed,

    #[error("consumer '{consumer}' of '{pass}' is not linked")]
    LinkageUnresolved { pass: String, consumer: String },

    #[error("consumer '{consumer}' of '{pass}' targets unknown pass '{target_pass}'")]
    PassNotFound {
        pass: String,
        consumer: String,
        target_pass: String,
    },

    #[error(
        "consumer '{consumer}' of '{pass}' targets unknown producer '{producer}' on '{target_pass}'"
    )]
    ProducerNotFound {
        pass: String,
        consumer: String,
        target_pass: String,
        producer: String,
    },

    #[error("consumer '{consumer}' not found on '{pass}'")]
    ConsumerNotFound { pass: String, consumer: String },

    #[error("producer '{producer}' has no resource to expose")]
    EmptyProducer { producer: String },

    #[error("pass '{pass}' has neither a color nor a depth surface")]
    MissingRenderSurface { pass: String },

    #[error(
        "consumer '{consumer}' of '{pass}' linked to '{target}': expected {expected}, got {actual}"
    )]
    LinkageTypeMismatch {
        pass: String,
        consumer: String,
        target: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("exclusive producer '{producer}' was already bound to a consumer")]
    ExclusiveResourceReuse { producer: String },

    #[error("device error: {0}")]
    Device(#[from] BackendError),

    #[error("renderer consumers were already validated")]
    AlreadyValidated,

    #[error("renderer must be validated before running")]
    NotValidated,

    #[error("pass '{0}' is not a render queue pass")]
    NotARenderQueuePass(String),

    #[error("no pass named '{0}'")]
    UnknownPass(String),

    #[error("cache entry '{key}' holds a different type than {requested}")]
    CacheTypeMismatch { key: String, requested: &'static str },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl RenderError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName { .. }
            | Self::DuplicatePassName(_)
            | Self::DuplicateProducer { .. }
            | Self::DuplicateConsumer { .. }
            | Self::AssemblyClosed => ErrorKind::Assembly,
            Self::LinkageUnresolved { .. }
            | Self::PassNotFound { .. }
            | Self::ProducerNotFound { .. }
            | Self::ConsumerNotFound { .. }
            | Self::EmptyProducer { .. }
            | Self::MissingRenderSurface { .. } => ErrorKind::LinkageUnresolved,
            Self::LinkageTypeMismatch { .. } => ErrorKind::LinkageTypeMismatch,
            Self::ExclusiveResourceReuse { .. } => ErrorKind::ExclusiveResourceReuse,
            Self::Device(_) => ErrorKind::Device,
            Self::AlreadyValidated
            | Self::NotValidated
            | Self::NotARenderQueuePass(_)
            | Self::UnknownPass(_)
            | Self::CacheTypeMismatch { .. }
            | Self::InvalidParameter(_) => ErrorKind::Lifecycle,
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;
