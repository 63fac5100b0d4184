//! Catalogue use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the bulk load use-case.
//! - Keep the CLI decoupled from storage details.

pub mod load_service;
