//! Infrastructure layer: user persistence and database wiring.

pub mod db;
pub mod user_store;

pub use db::open_user_store;
pub use user_store::{InMemoryUserStore, PostgresUserStore, StoreError, UserStore};
