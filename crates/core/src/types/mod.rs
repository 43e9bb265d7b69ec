//! Core types for the culinary domain.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod recipe;

pub use email::{Email, EmailError};
pub use id::*;
pub use recipe::{Difficulty, Unit, UnknownVariant};
