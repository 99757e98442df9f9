//! Single-operator administration: one-time bootstrap, credential checks and
//! the cookie session that gates the console and the registry mutations.

pub mod credentials;
pub mod guard;
pub mod login;
pub mod session;
pub mod setup;
pub mod types;

pub use guard::{Access, classify, route_guard};
pub use session::{SessionAuthority, SessionConfig};
