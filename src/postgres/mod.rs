// ABOUTME: PostgreSQL utilities module
// ABOUTME: Exports connection management and the psql client wrapper

pub mod connection;
pub mod psql;

pub use connection::connect;
pub use psql::{Psql, PsqlOutput, PsqlRunner};
