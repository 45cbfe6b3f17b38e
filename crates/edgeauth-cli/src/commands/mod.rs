//! CLI command implementations for the EdgeAuth issuer.

pub mod token;
