//! Public API for the xray-enhance crate.
//!
//! This module provides the high-level API: [`Enhancer`] builder and
//! [`EnhanceError`] unified error type.

mod builder;
mod error;

pub use builder::Enhancer;
pub use error::EnhanceError;
