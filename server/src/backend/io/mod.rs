//! # IO Module
//!
//! Adapter layer between HTTP clients (game server plugin, admin tools) and the
//! reward service. Handlers translate requests into service calls and domain
//! results into `shared` DTOs; they hold no business rules of their own.

pub mod rest;

pub use rest::*;
