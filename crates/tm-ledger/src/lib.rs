//! tm-ledger - Migration ledger for Tidemark
//!
//! The ledger is the table recording which versions were applied, when, by
//! whom, and with what outcome. [`LedgerSchema`] provisions it,
//! [`LedgerWriter`] records outcomes, and [`LedgerReader`] answers "what is
//! the current version" and "what has been applied". All three render the
//! active platform's templates and run them on a caller-supplied
//! [`LedgerConnection`]: a `duckdb::Connection`, or a
//! [`SqlServerConnection`] wrapping a tiberius client.

mod bind;
pub mod connection;
pub mod error;
pub mod reader;
pub mod schema;
pub mod sqlserver;
pub mod writer;

#[cfg(test)]
mod test_support;

pub use connection::{LedgerConnection, LedgerRow};
pub use error::{LedgerError, LedgerResult};
pub use reader::LedgerReader;
pub use schema::LedgerSchema;
pub use sqlserver::SqlServerConnection;
pub use writer::LedgerWriter;
