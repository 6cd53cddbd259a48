//! core
//!
//! Core domain types and configuration for repodash.
//!
//! # Modules
//!
//! - [`types`] - Descriptors, status records, remote states, action results
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Paths are the join key; records are never addressed by position
//! - Schemas are strict and self-describing

pub mod config;
pub mod types;
