//! # seatplan-codes
//!
//! Identifier types shared by every seatplan crate.
//!
//! ## Design Principles
//!
//! - Identifiers come from spreadsheets and are opaque labels, never generated
//! - All identifiers have a canonical trimmed string form with strict parsing
//! - Identifiers are typed so a room number cannot be passed as a roll number
//! - Ordering is lexicographic on the canonical text
//!
//! Examples:
//! - room `101`, `LT102`
//! - course `CS101`
//! - roll `2101CS01`

mod error;
mod macros;
mod types;

pub use error::CodeError;
pub use types::*;
