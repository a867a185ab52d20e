//! A synchronous, pure-rust client driver core for the HDB wire protocol.
//!
//! The crate covers the binary protocol engine: message framing into
//! segments and parts, the typed codec for the scalar, temporal, decimal
//! and LOB field types, the authentication handshake, the per-connection
//! session state machine, and piecewise LOB streaming.
//!
//! The application-facing surface is deliberately small:
//! [`Connection`](crate::Connection) is produced by the connection factory,
//! [`PreparedStatement`](crate::PreparedStatement) executes with bound
//! parameters, and [`ResultSet`](crate::ResultSet) iterates over rows,
//! fetching on demand.

#![deny(missing_debug_implementations)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

mod conn;
mod hdb_error;
mod protocol;
mod row;
mod sync;
mod types_impl;

pub use crate::conn::{
    ConnectParams, ConnectParamsBuilder, ConnectionConfiguration, ConnectionStatistics,
    CredentialRefresh, Credentials, ServerCerts, ServerVersion, Tls,
};
pub use crate::hdb_error::{HdbError, HdbResult};
pub use crate::protocol::parts::{
    ExecutionResult, FieldMetadata, HdbValue, OutputParameters, ParameterBinding,
    ParameterDescriptor, ParameterDescriptors, ParameterDirection, ResultSetMetadata, ServerError,
    Severity, TypeId,
};
pub use crate::row::Row;
pub use crate::sync::{
    Connection, HdbResponse, HdbReturnValue, IsolationLevel, PreparedStatement, ResultSet,
    RowProducer,
};

/// Non-standard types that appear within the
/// [`HdbValue`](crate::HdbValue)s of a [`ResultSet`](crate::ResultSet).
pub mod types {
    pub use crate::types_impl::{
        daydate::DayDate,
        legacy_temporal::{LegacyDate, LegacyTime, LegacyTimestamp},
        lob::{BLob, CLob, NCLob},
        longdate::LongDate,
        seconddate::SecondDate,
        secondtime::SecondTime,
    };
}

/// Default number of resultset rows fetched with a single FETCH roundtrip.
///
/// Can be changed with
/// [`ConnectionConfiguration::with_fetch_size`](crate::ConnectionConfiguration::with_fetch_size).
pub const DEFAULT_FETCH_SIZE: u32 = 100_000;

/// Number of bytes (BLOB, CLOB) or 1-2-3-byte sequences (NCLOB)
/// fetched in a single LOB READ roundtrip.
pub const DEFAULT_LOB_READ_LENGTH: u32 = 16_000_000;

/// Number of bytes written in a single LOB WRITE roundtrip.
pub const DEFAULT_LOB_WRITE_LENGTH: usize = 16_000_000;
