//! # Warden (Address Blacklist Registry)
//!
//! `warden` keeps a registry of blacklisted blockchain addresses that other
//! services consult before interacting with an address, plus the single-operator
//! console used to curate it.
//!
//! ## Access Control
//!
//! - **Bootstrap:** exactly one administrator can ever be created. Creation is only
//!   allowed while none exists; the store's uniqueness constraints are the final
//!   arbiter when two bootstraps race.
//! - **Login:** username, password and a secondary access token must all match the
//!   stored administrator. Failures never reveal which field was wrong.
//! - **Session:** a successful login sets an `HttpOnly`, `SameSite=Lax` cookie with a
//!   fixed marker value and a 7-day `Max-Age`. Expiry is left to the cookie itself.
//! - **Route Guard:** a declarative table decides per path whether a session is
//!   required. Browser pages redirect to the login page; API calls get `401`.
//!
//! ## Blacklist Registry
//!
//! - **Normalization:** addresses are trimmed and lower-cased before storage and
//!   before every lookup.
//! - **Scoping:** an entry without a network is global and matches every network;
//!   an entry with a network only matches that network.
//! - **Uniqueness:** keyed on the normalized address alone, so one address holds at
//!   most one entry regardless of network.
//! - The existence check is public so external systems can consult it without a
//!   session; listing and mutation require the administrator session.

pub mod api;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
