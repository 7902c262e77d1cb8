//! Error types and error handling for the front end.
//!
//! Two disjoint families live here:
//!
//! - Diagnostics (`errors::Error`) describe a problem in the input program.
//!   They carry a category, a message and a source trace, and are returned
//!   through `Result` from every lexing, parsing and building operation.
//! - Internal faults (`fault::InternalFault`) describe a broken invariant in
//!   the front end itself. They are raised with `INTERNAL_FAULT!` and unwind
//!   as a panic; they are never returned as a `Result`.

pub mod errors;
pub mod fault;
