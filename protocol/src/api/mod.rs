//! API DTOs module
//!
//! Request and response bodies for the conversion endpoints, organized by
//! domain:
//! - `convert`: conversion, job status, validation, and capability discovery

pub mod convert;

pub use convert::*;
