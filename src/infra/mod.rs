//! Infrastructure: SQLite connection, provisioning, store capabilities.

pub mod db;
pub mod live;
pub mod vector;

pub(crate) use db::get_connection;
pub use db::{init_db, DbOptions, DbPool};
pub use live::{ChangeOp, TableChange};
