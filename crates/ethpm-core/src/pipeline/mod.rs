//! Manifest checking pipeline.
//!
//! Callers gather bytes; the core turns them into verdicts:
//! - `parse`: bytes to `serde_json::Value` under a size limit
//! - `validate`: rule-set evaluation, violations collected
//! - `fixture`: standardized fixture records combining both verdicts
//!
//! The core crate does not do network or filesystem I/O.

pub mod fixture;
pub mod parse;
pub mod validate;
