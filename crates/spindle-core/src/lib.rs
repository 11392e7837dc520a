//! Spindle Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Spindle layout
//! and consistency engine. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Elements**: Registry records for shapes, flows, labels and containers ([`element`] module)
//! - **Conditions**: Result-code condition payloads on sequence flows ([`condition`] module)

pub mod condition;
pub mod element;
pub mod geometry;
pub mod identifier;
