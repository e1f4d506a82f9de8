//! Client Session
//!
//! Durable client-side storage of the bearer token and the last-known
//! user profile.
//!
//! ## Architecture
//!
//! - **KeyValueStore**: string key/value backend (in-memory or a JSON file)
//! - **SessionStore**: token and profile accessors over a backend
//!
//! The token and the profile live under two keys and are always cleared
//! together.

mod backend;
mod error;
mod store;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use error::{SessionError, SessionResult};
pub use store::{Session, SessionStore, TOKEN_KEY, USER_KEY};
