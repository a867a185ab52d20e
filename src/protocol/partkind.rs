use crate::hdb_error::impl_err;
use crate::HdbResult;

// All part kinds that this driver knows how to read or write.
// ABAP related numbers and "reserved" numbers are omitted; receiving one of
// those is an error at read time, not a silent skip.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum PartKind {
    Command = 3,               // SQL Command Data
    ResultSet = 5,             // Tabular resultset data
    Error = 6,                 // Error information
    StatementId = 10,          // Prepared statement identifier
    TransactionId = 11,        // Transaction identifier
    ExecutionResults = 12,     // Number of affected rows of dml statement
    ResultSetId = 13,          // Identifier of resultset
    TopologyInformation = 15,  // Topology information
    TableLocation = 16,        // Location of table data
    ReadLobRequest = 17,       // Request data of READLOB message
    ReadLobReply = 18,         // Reply data of READLOB message
    CommandInfo = 27,          // Command information
    WriteLobRequest = 28,      // Request data of WRITELOB message
    ClientContext = 29,        // Client context
    WriteLobReply = 30,        // Reply data of WRITELOB message
    Parameters = 32,           // Parameter data
    Authentication = 33,       // Authentication data
    SessionContext = 34,       // Session context information
    ClientId = 35,             // Client identification (process and host)
    StatementContext = 39,     // Statement visibility context
    PartitionInformation = 40, // Table partitioning information
    OutputParameters = 41,     // Output parameter data
    ConnectOptions = 42,       // Connect options
    FetchSize = 45,            // Number of rows to fetch
    ParameterMetadata = 47,    // Parameter metadata (type and length information)
    ResultSetMetadata = 48,    // Result set metadata (type, name information)
    ClientInfo = 57,           // Client information values
    TransactionFlags = 64,     // Transaction handling flags
    DbConnectInfo = 67,        // Part of redirect response
    LobFlags = 68,             // LOB flags
}
impl PartKind {
    pub fn from_i8(val: i8) -> HdbResult<Self> {
        match val {
            3 => Ok(Self::Command),
            5 => Ok(Self::ResultSet),
            6 => Ok(Self::Error),
            10 => Ok(Self::StatementId),
            11 => Ok(Self::TransactionId),
            12 => Ok(Self::ExecutionResults),
            13 => Ok(Self::ResultSetId),
            15 => Ok(Self::TopologyInformation),
            16 => Ok(Self::TableLocation),
            17 => Ok(Self::ReadLobRequest),
            18 => Ok(Self::ReadLobReply),
            27 => Ok(Self::CommandInfo),
            28 => Ok(Self::WriteLobRequest),
            29 => Ok(Self::ClientContext),
            30 => Ok(Self::WriteLobReply),
            32 => Ok(Self::Parameters),
            33 => Ok(Self::Authentication),
            34 => Ok(Self::SessionContext),
            35 => Ok(Self::ClientId),
            39 => Ok(Self::StatementContext),
            40 => Ok(Self::PartitionInformation),
            41 => Ok(Self::OutputParameters),
            42 => Ok(Self::ConnectOptions),
            45 => Ok(Self::FetchSize),
            47 => Ok(Self::ParameterMetadata),
            48 => Ok(Self::ResultSetMetadata),
            57 => Ok(Self::ClientInfo),
            64 => Ok(Self::TransactionFlags),
            67 => Ok(Self::DbConnectInfo),
            68 => Ok(Self::LobFlags),
            _ => Err(impl_err!("PartKind {val} not implemented")),
        }
    }
}
