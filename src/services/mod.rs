//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation and auth plumbing.

pub mod email_auth;
pub mod generation;
pub mod moodboard;
pub mod session;

#[cfg(all(test, feature = "live-db-tests"))]
pub(crate) mod test_db;
