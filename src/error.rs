use core::fmt;

/// Result alias that carries the crate [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Kind of entity referenced by a [`Error::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Device,
    Effect,
    OutputType,
    Setting,
    Color,
    Gradient,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Device => "device",
            Self::Effect => "effect",
            Self::OutputType => "output type",
            Self::Setting => "setting",
            Self::Color => "color",
            Self::Gradient => "gradient",
        };
        f.write_str(name)
    }
}

/// Errors produced by the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or incomplete input, rejected before any state change.
    #[error("input data invalid: {0}")]
    Validation(String),

    /// Reference to an unknown device, effect, color, gradient or key.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// A setting required by the active effect is absent or mistyped.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A bounded channel has no free slot.
    #[error("channel is full")]
    Busy,

    /// The other side of a queue has been closed.
    #[error("queue is closed")]
    Closed,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A worker thread could not be spawned.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn not_found<T: Into<String>>(kind: EntityKind, id: T) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}
