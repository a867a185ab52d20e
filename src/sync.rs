mod connection;
mod hdb_response;
mod hdb_return_value;
mod prepared_statement;
mod prepared_statement_core;

pub use self::connection::{Connection, IsolationLevel};
pub use self::hdb_response::HdbResponse;
pub use self::hdb_return_value::HdbReturnValue;
pub use self::prepared_statement::{PreparedStatement, RowProducer};
pub use crate::protocol::parts::ResultSet;

pub(crate) use self::prepared_statement_core::{AmPsCore, PreparedStatementCore};
