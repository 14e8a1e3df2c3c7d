//! `family-fund` - a REST API for managing a family's pooled money
//!
//! Members record contributions, administrators review them and allocate part of
//! the completed total into tracked investments under a configurable cap. Meeting
//! details and announcements are shared with everyone through the same service.

#![deny(
    unsafe_code,
    unsafe_op_in_unsafe_fn,
    unreachable_code,
    unreachable_patterns,
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    // money paths must not abort the request
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::exit,
    // amounts are f64; compare through round2 or explicit tolerances
    clippy::float_cmp,
    clippy::clone_on_ref_ptr,
    clippy::needless_pass_by_value,
    clippy::unnecessary_wraps,
    clippy::cognitive_complexity,
    clippy::too_many_lines,
    clippy::enum_glob_use,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,
    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // handlers and core functions return `Error` by value
    clippy::result_large_err,
)]

/// HTTP interface - router, extractors, error mapping and route handlers
pub mod api;
/// Configuration management for database and application settings
pub mod config;
/// Core business logic - framework-agnostic ledger, capacity and valuation operations
pub mod core;
/// SeaORM entity definitions for database tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;

#[cfg(test)]
pub mod test_utils;
