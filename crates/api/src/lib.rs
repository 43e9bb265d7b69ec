//! Culinary Recipes API library.
//!
//! A REST API over users, recipes and ingredients. Incoming payloads are
//! checked by the declarative schemas in `culinary_core::validation`, parent
//! references are checked before writes, and deletes cascade through an
//! explicit plan executed by the store in one unit.
//!
//! The binary (`culinary-api`) and the operator CLI both build on this
//! library, so routes, store backends and seeding are tested in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod envelope;
pub mod error;
pub mod integrity;
pub mod middleware;
pub mod models;
pub mod query;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;
