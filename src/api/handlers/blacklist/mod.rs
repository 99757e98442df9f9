//! Registry of blacklisted addresses: a public existence check for external
//! consumers and session-gated list/add/remove for the administrator.

pub mod check;
pub mod manage;
pub mod registry;
pub mod types;

pub use registry::{BlacklistError, NewEntry, Verdict, normalize_address};
