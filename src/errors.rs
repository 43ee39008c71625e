//! Typed errors for registry construction.
//!
//! Registry errors are the only fatal errors in the engine: a plan with a
//! duplicate ordinal or name must be rejected before any phase executes.
//! Phase failures are not errors at this level: they are recorded in the
//! execution report and the run continues.

use thiserror::Error;

/// Errors raised while building a [`crate::registry::PhaseRegistry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Phase ordinal {ordinal} is already registered (as '{existing}')")]
    DuplicateOrdinal { ordinal: u32, existing: String },

    #[error("Phase name '{name}' is already registered (at ordinal {existing})")]
    DuplicateName { name: String, existing: u32 },
}
