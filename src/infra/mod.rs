//! Concrete [`AlertStore`](crate::services::alert_store::AlertStore) backends.
//!
//! [`SupabaseClient`] reads the live store over its REST API.
//! [`FileStore`] serves a JSON snapshot from disk for offline runs and tests.

pub mod file_store;
pub mod supabase;

pub use file_store::FileStore;
pub use supabase::SupabaseClient;
