//! Core business logic for Kantor.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and lifecycle calculations live here.
//!
//! # Modules
//!
//! - `order` - Order lifecycle state machine and revision quota rules
//! - `auth` - Password hashing

pub mod auth;
pub mod order;
