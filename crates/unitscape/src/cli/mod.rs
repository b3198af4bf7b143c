//! CLI functionality for the unitscape tool
//!
//! This module contains all CLI-related functionality including:
//! - Validation of declaration manifests
//! - Writing the resolved model
//! - Output formatting

pub mod output;
pub mod resolve;
pub mod validate;
