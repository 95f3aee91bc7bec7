//! Error types for tessel_core

use thiserror::Error;

/// Errors raised by the identity and value primitives
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A write targeted a plain value instead of a [`Binding`](crate::Binding)
    #[error("cannot write through a plain value: it is not bound to a cell")]
    NotBound,

    /// An identity was bound twice
    #[error("identity `{0}` is already bound")]
    AlreadyBound(String),
}
