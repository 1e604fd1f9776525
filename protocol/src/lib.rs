//! Wire protocol for the jzip conversion service
//!
//! Shared request and response types for every conversion endpoint. The
//! service speaks camelCase JSON; the types here own that mapping so the
//! rest of the client never spells wire keys by hand.

pub mod api;
pub mod common;

pub use api::*;
pub use common::*;
