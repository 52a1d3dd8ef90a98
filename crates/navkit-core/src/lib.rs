#![forbid(unsafe_code)]

//! Core data types for navkit.
//!
//! This crate provides:
//! - [`AnyValue`] and [`NavigationId`] for type-erased path entries
//! - [`NavigationPath`] and [`CodableRepresentation`] for heterogeneous,
//!   persistable paths
//! - [`Difference`] for ordered-collection diffing
//! - [`Issue`] reporting for non-fatal navigation misconfiguration
//! - [`Transaction`] for animation intent

pub mod codable;
pub mod diff;
pub mod id;
pub mod issue;
pub mod path;
pub mod transaction;
pub mod value;

pub use codable::{CodableElement, CodableError, CodableRepresentation};
pub use diff::Difference;
pub use id::NavigationId;
pub use issue::{Issue, IssueCapture, report_issue};
pub use path::NavigationPath;
pub use transaction::{Transaction, with_transaction, without_animation};
pub use value::{AnyValue, CodableValue, PathValue, type_tag};
