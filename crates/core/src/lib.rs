//! Culinary Core - Shared types and validation rules.
//!
//! This crate provides the pieces shared by every culinary component:
//! - `api` - The REST service (users, recipes, ingredients)
//! - `cli` - Operator tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Payload validation lives here because it never touches the
//! store.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, emails, and the recipe/ingredient enums
//! - [`validation`] - Declarative field rule tables for incoming payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
