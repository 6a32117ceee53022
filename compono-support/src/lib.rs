//! # Compono Support
//!
//! Shared utilities for the Compono DI runtime.
//!
//! This crate provides:
//! - Text rendering for error messages
//! - Naming conventions for discovered definition sources

pub mod naming;
pub mod rendering;
