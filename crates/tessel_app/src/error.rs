//! Error types for tessel_app

use std::fmt;

use tessel_core::{CoreError, Ikey};
use tessel_dom::DomError;
use thiserror::Error;

/// Errors that can occur in a Tessel application
#[derive(Error, Debug)]
pub enum AppError {
    /// No component is registered under the name
    #[error("unknown component `{0}`")]
    UnknownComponent(String),

    /// Dynamic dispatch received props of the wrong type
    #[error("component `{name}` expects props of type `{expected}`")]
    PropsMismatch { name: String, expected: &'static str },

    /// A component's output could not be read as the requested type
    #[error("component `{name}` does not produce `{requested}`")]
    OutputMismatch { name: String, requested: &'static str },

    /// `prevent_default`/`stop_propagation` without an event to act on
    #[error("no event is being processed")]
    NoEvent,

    /// `prevent_default` on an event that is not cancelable
    #[error("`{0}` event is not cancelable")]
    NotCancelable(String),

    /// Listener creation outside a trigger or status component
    #[error("listeners can only be created by trigger or status components")]
    NotInteractive,

    /// Classes, style, listeners or primary designation staged before a portal
    #[error("portals cannot carry {0}")]
    PortalStyling(&'static str),

    /// `force_inject` found nothing provided for the type
    #[error("no value of type `{0}` has been provided")]
    NotProvided(&'static str),

    /// A component was called again while its own render was in progress
    #[error("component `{0}` re-entered during its own render")]
    Reentrant(String),

    /// Configuration could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Result type for tessel_app operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Result of a render procedure; any error type converts into it
pub type RenderResult<T = ()> = anyhow::Result<T>;

/// A render error caught at a dispatch boundary
#[derive(Debug)]
pub struct RenderFailure {
    /// Identity of the component or element whose content failed
    pub ikey: Ikey,
    pub error: anyhow::Error,
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "render failed at `{}`: {:#}", self.ikey, self.error)
    }
}
