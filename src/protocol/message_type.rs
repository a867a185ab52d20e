// Defines the action requested from the database server.
// Is documented as Message Type.
// Irrelevant numbers (abap related, "reserved" stuff) are omitted.
#[derive(Copy, Clone, Debug)]
pub(crate) enum MessageType {
    ExecuteDirect = 2,    // Directly execute SQL statement
    Prepare = 3,          // Prepare an SQL statement
    Execute = 13,         // Execute a previously prepared SQL statement
    ReadLob = 16,         // Reads large object data
    WriteLob = 17,        // Writes large object data
    Authenticate = 65,    // Sends authentication data
    Connect = 66,         // Connects to the database
    Commit = 67,          // Commits current transaction
    Rollback = 68,        // Rolls back current transaction
    CloseResultSet = 69,  // Closes resultset
    DropStatementId = 70, // Drops prepared statement identifier
    FetchNext = 71,       // Fetches next data from resultset
    Disconnect = 77,      // Disconnects session
    DbConnectInfo = 82,   // Request/receive database connect information
                          // FindLob = 18,       // Finds data in a large object
                          // FetchAbsolute = 72, // Moves the cursor to the given row number and fetches the data
                          // FetchRelative = 73, // Like above, but moves the cursor relative to the current position
                          // FetchFirst = 74,    // Moves the cursor to the first row and fetches the data
                          // FetchLast = 75,     // Moves the cursor to the last row and fetches the data
}
