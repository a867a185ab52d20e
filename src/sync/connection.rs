use crate::conn::{AmConnCore, ConnectParams, ConnectionConfiguration, ConnectionStatistics};
use crate::hdb_error::{impl_err, usage_err};
use crate::protocol::parts::{
    ParameterDescriptors, ResultSet, ResultSetMetadata, ServerError, StatementContext,
};
use crate::protocol::{MessageType, Part, PartKind, ReplyType, Request, HOLD_CURSORS_OVER_COMMIT};
use crate::sync::{HdbResponse, PreparedStatement};
use crate::HdbResult;
use std::sync::Arc;

/// The transaction isolation levels the server supports.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IsolationLevel {
    /// Statement-level snapshot isolation.
    ReadCommitted,
    /// Transaction-level snapshot isolation, reads are repeatable.
    RepeatableRead,
    /// Transaction-level snapshot isolation with serializable schedules.
    Serializable,
}

impl IsolationLevel {
    fn sql(self) -> &'static str {
        match self {
            Self::ReadCommitted => "set transaction isolation level read committed",
            Self::RepeatableRead => "set transaction isolation level repeatable read",
            Self::Serializable => "set transaction isolation level serializable",
        }
    }
}

/// A synchronous connection to the database.
#[derive(Clone, Debug)]
pub struct Connection {
    am_conn_core: AmConnCore,
}

impl Connection {
    /// Factory method for authenticated connections.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use hdbclient::Connection;
    /// # fn foo() -> hdbclient::HdbResult<()> {
    /// let params = hdbclient::ConnectParams::builder()
    ///     .hostname("abcd123")
    ///     .port(30015)
    ///     .dbuser("MEIER")
    ///     .password("schLau")
    ///     .build()?;
    /// let mut connection = Connection::new(params)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(params: ConnectParams) -> HdbResult<Self> {
        Self::with_configuration(params, &ConnectionConfiguration::default())
    }

    /// Factory method for authenticated connections with a non-default
    /// configuration.
    pub fn with_configuration(
        params: ConnectParams,
        configuration: &ConnectionConfiguration,
    ) -> HdbResult<Self> {
        let o_default_schema = params.default_schema().map(ToString::to_string);
        let connection = Self {
            am_conn_core: AmConnCore::try_new(params, configuration)?,
        };
        if let Some(schema) = o_default_schema {
            connection.set_default_schema(schema)?;
        }
        Ok(connection)
    }

    /// Executes a statement on the database.
    ///
    /// This generic method can handle all kinds of calls, and thus has the
    /// most generic return type. In many cases it will be more convenient
    /// to use one of the dedicated methods `query()`, `dml()`, or
    /// `exec()`, which have the adequate simple result type.
    pub fn statement<S: AsRef<str>>(&self, stmt: S) -> HdbResult<HdbResponse> {
        self.execute_direct(stmt.as_ref())
    }

    /// Executes a statement and expects a single `ResultSet`.
    ///
    /// A DML or DDL statement issued through this method yields an empty
    /// resultset.
    pub fn query<S: AsRef<str>>(&self, stmt: S) -> HdbResult<ResultSet> {
        let response = self.execute_direct(stmt.as_ref())?;
        let mut resultsets = response.into_resultsets();
        match resultsets.len() {
            0 => Ok(ResultSet::new_empty(Arc::new(ResultSetMetadata::empty()))),
            1 => resultsets
                .pop()
                .ok_or_else(|| impl_err!("resultset disappeared")),
            _ => Err(usage_err!("The statement produced more than one ResultSet")),
        }
    }

    /// Executes a statement and expects a single number of affected rows.
    pub fn dml<S: AsRef<str>>(&self, stmt: S) -> HdbResult<usize> {
        self.execute_direct(stmt.as_ref())?.into_affected_rows()
    }

    /// Executes a statement and expects a plain success.
    pub fn exec<S: AsRef<str>>(&self, stmt: S) -> HdbResult<()> {
        self.execute_direct(stmt.as_ref())?.into_success()
    }

    /// Prepares a statement and returns a handle (a `PreparedStatement`)
    /// to it.
    ///
    /// Note that the `PreparedStatement` keeps using the same database
    /// connection as this `Connection`.
    pub fn prepare<S: AsRef<str>>(&self, stmt: S) -> HdbResult<PreparedStatement> {
        let mut request = Request::new(MessageType::Prepare, HOLD_CURSORS_OVER_COMMIT);
        request.push(Part::Command(stmt.as_ref()));

        let reply = self.am_conn_core.full_send(request, None, None, &mut None)?;

        let mut o_statement_id = None;
        let mut a_descriptors: Arc<ParameterDescriptors> = Arc::new(ParameterDescriptors::default());
        let mut o_a_rsmd: Option<Arc<ResultSetMetadata>> = None;
        let mut o_stmt_ctx: Option<StatementContext> = None;
        for part in reply.parts {
            match part {
                Part::ParameterMetadata(descriptors) => {
                    a_descriptors = Arc::new(descriptors);
                }
                Part::StatementId(id) => {
                    o_statement_id = Some(id);
                }
                Part::TransactionFlags(ta_flags) => {
                    self.am_conn_core.lock()?.evaluate_ta_flags(&ta_flags)?;
                }
                Part::ResultSetMetadata(rsmd) => {
                    o_a_rsmd = Some(Arc::new(rsmd));
                }
                Part::StatementContext(stmt_ctx) => {
                    o_stmt_ctx = Some(stmt_ctx);
                }
                x => warn!("prepare(): Unexpected reply part found {x:?}"),
            }
        }
        if let Some(stmt_ctx) = o_stmt_ctx {
            self.am_conn_core
                .lock()?
                .evaluate_statement_context(&stmt_ctx);
        }

        let statement_id =
            o_statement_id.ok_or_else(|| impl_err!("No StatementId received for prepare"))?;

        debug!(
            "PreparedStatement created with parameter descriptors = {a_descriptors:?}",
        );
        Ok(PreparedStatement::new(
            self.am_conn_core.clone(),
            statement_id,
            a_descriptors,
            o_a_rsmd,
        ))
    }

    /// Commits the current transaction.
    pub fn commit(&self) -> HdbResult<()> {
        let request = Request::new(MessageType::Commit, 0);
        let reply = self.am_conn_core.send(request)?;
        reply.assert_expected_reply_type(ReplyType::Commit)?;
        self.am_conn_core.lock()?.end_explicit_transaction();
        Ok(())
    }

    /// Rolls back the current transaction.
    pub fn rollback(&self) -> HdbResult<()> {
        let request = Request::new(MessageType::Rollback, 0);
        let reply = self.am_conn_core.send(request)?;
        reply.assert_expected_reply_type(ReplyType::Rollback)?;
        self.am_conn_core.lock()?.end_explicit_transaction();
        Ok(())
    }

    /// Starts an explicit transaction by switching off auto-commit.
    ///
    /// Fails locally, without touching the wire, if an explicit
    /// transaction is already open.
    pub fn begin_transaction(&self) -> HdbResult<()> {
        let mut conn_core = self.am_conn_core.lock()?;
        conn_core.begin_explicit_transaction()
    }

    /// Sets the transaction isolation level for subsequent transactions.
    ///
    /// Must not be called within an open transaction.
    pub fn set_isolation_level(&self, isolation_level: IsolationLevel) -> HdbResult<()> {
        {
            let conn_core = self.am_conn_core.lock()?;
            if conn_core.is_in_transaction() || conn_core.has_explicit_transaction() {
                return Err(usage_err!(
                    "The isolation level cannot be changed within a transaction"
                ));
            }
        }
        self.exec(isolation_level.sql())
    }

    /// Sets the auto-commit behavior for future calls.
    pub fn set_auto_commit(&self, ac: bool) -> HdbResult<()> {
        self.am_conn_core.lock()?.set_auto_commit(ac);
        Ok(())
    }

    /// Returns the auto-commit behavior.
    pub fn is_auto_commit(&self) -> HdbResult<bool> {
        Ok(self.am_conn_core.lock()?.is_auto_commit())
    }

    /// Returns a clone of the connection's configuration.
    pub fn configuration(&self) -> HdbResult<ConnectionConfiguration> {
        Ok(self.am_conn_core.lock()?.configuration().clone())
    }

    /// Configures the connection's fetch size for future queries.
    pub fn set_fetch_size(&self, fetch_size: u32) -> HdbResult<()> {
        self.am_conn_core
            .lock()?
            .configuration_mut()
            .set_fetch_size(fetch_size);
        Ok(())
    }

    /// Configures the connection's lob read length for future queries.
    pub fn set_lob_read_length(&self, lob_read_length: u32) -> HdbResult<()> {
        self.am_conn_core
            .lock()?
            .configuration_mut()
            .set_lob_read_length(lob_read_length);
        Ok(())
    }

    /// Configures the connection's lob write length for future statements.
    pub fn set_lob_write_length(&self, lob_write_length: usize) -> HdbResult<()> {
        self.am_conn_core
            .lock()?
            .configuration_mut()
            .set_lob_write_length(lob_write_length);
        Ok(())
    }

    /// Returns a snapshot of the connection's statistics.
    pub fn statistics(&self) -> HdbResult<ConnectionStatistics> {
        Ok(self.am_conn_core.lock()?.statistics().clone())
    }

    /// Resets the connection's statistics.
    pub fn reset_statistics(&self) -> HdbResult<()> {
        self.am_conn_core.lock()?.statistics_mut().reset();
        Ok(())
    }

    /// Returns warnings that the server returned with earlier replies, and
    /// clears them on the connection.
    pub fn pop_warnings(&self) -> HdbResult<Option<Vec<ServerError>>> {
        Ok(self.am_conn_core.lock()?.pop_warnings())
    }

    /// Sets client information into a session variable on the server.
    pub fn set_application<S: AsRef<str>>(&self, application: S) -> HdbResult<()> {
        self.am_conn_core.lock()?.set_application(application);
        Ok(())
    }

    /// Sets client information into a session variable on the server.
    pub fn set_application_version<S: AsRef<str>>(&self, version: S) -> HdbResult<()> {
        self.am_conn_core
            .lock()?
            .set_application_version(version.as_ref());
        Ok(())
    }

    /// Sets client information into a session variable on the server.
    pub fn set_application_source<S: AsRef<str>>(&self, source: S) -> HdbResult<()> {
        self.am_conn_core
            .lock()?
            .set_application_source(source.as_ref());
        Ok(())
    }

    /// Sets client information into a session variable on the server.
    pub fn set_application_user<S: AsRef<str>>(&self, appl_user: S) -> HdbResult<()> {
        self.am_conn_core
            .lock()?
            .set_application_user(appl_user.as_ref());
        Ok(())
    }

    /// Sets an arbitrary session variable; it is transferred to the server
    /// with the next request.
    pub fn set_session_variable<S: AsRef<str>>(&self, key: S, value: S) -> HdbResult<()> {
        self.am_conn_core
            .lock()?
            .set_session_variable(key.as_ref(), value.as_ref());
        Ok(())
    }

    /// Removes a session variable.
    pub fn unset_session_variable<S: AsRef<str>>(&self, key: S) -> HdbResult<()> {
        self.am_conn_core
            .lock()?
            .unset_session_variable(key.as_ref());
        Ok(())
    }

    /// Returns the current value of a session variable.
    pub fn get_session_variable<S: AsRef<str>>(&self, key: S) -> HdbResult<Option<String>> {
        Ok(self
            .am_conn_core
            .lock()?
            .get_session_variable(key.as_ref())
            .map(ToString::to_string))
    }

    /// Returns the id of the connection, as assigned by the server.
    pub fn id(&self) -> HdbResult<u32> {
        Ok(self.am_conn_core.lock()?.connection_id())
    }

    /// The negotiated data format version.
    pub fn data_format_version(&self) -> HdbResult<u8> {
        Ok(self.am_conn_core.lock()?.dataformat_version2())
    }

    /// The name of the database.
    pub fn database_name(&self) -> HdbResult<String> {
        Ok(self.am_conn_core.lock()?.database_name())
    }

    /// The system id of the database.
    pub fn system_id(&self) -> HdbResult<String> {
        Ok(self.am_conn_core.lock()?.system_id())
    }

    /// The version string of the server.
    pub fn full_version_string(&self) -> HdbResult<String> {
        Ok(self.am_conn_core.lock()?.full_version_string())
    }

    /// The parsed version of the server.
    pub fn server_version(&self) -> HdbResult<crate::ServerVersion> {
        crate::ServerVersion::parse(&self.full_version_string()?)
    }

    /// Number of server nodes reported with the topology information, if
    /// any was received.
    pub fn topology_node_count(&self) -> HdbResult<Option<usize>> {
        Ok(self.am_conn_core.lock()?.topology_node_count())
    }

    /// A descriptor of this connection's endpoint and user.
    pub fn connect_string(&self) -> HdbResult<String> {
        Ok(self.am_conn_core.lock()?.connect_string())
    }

    /// Dumps the client-info (session variables) of the connection.
    pub fn dump_client_info(&self) -> HdbResult<String> {
        Ok(self.am_conn_core.lock()?.dump_client_info())
    }

    /// Asks the server for the host and port of the given database, and
    /// whether this connection is already attached to it.
    ///
    /// Can be used for redirecting a connect to the right database of a
    /// multi-database system.
    pub fn db_connect_info(&self, database_name: &str) -> HdbResult<(String, u16, bool)> {
        let mut conn_core = self.am_conn_core.lock()?;
        let db_connect_info = conn_core.db_connect_info(database_name)?;
        let connected = db_connect_info.on_correct_database().unwrap_or(false);
        if connected {
            let params = conn_core.connect_params();
            let (host, port) = params
                .addr()
                .rsplit_once(':')
                .map(|(h, p)| (h.to_string(), p.parse::<u16>().unwrap_or_default()))
                .unwrap_or_default();
            Ok((host, port, true))
        } else {
            Ok((
                db_connect_info.host()?.clone(),
                db_connect_info.port()?,
                false,
            ))
        }
    }

    /// Sets the default schema for the session.
    pub fn set_default_schema<S: AsRef<str>>(&self, schema: S) -> HdbResult<()> {
        self.exec(format!("set schema {}", schema.as_ref()))
    }

    /// True if the connection is broken and must be discarded.
    pub fn is_broken(&self) -> HdbResult<bool> {
        Ok(self.am_conn_core.lock()?.is_broken())
    }

    /// Terminates the session on the server; all subsequent operations
    /// fail.
    pub fn disconnect(&self) -> HdbResult<()> {
        self.am_conn_core.lock()?.disconnect()
    }

    // Sends the statement as MessageType::ExecuteDirect and digests the
    // reply.
    fn execute_direct(&self, stmt: &str) -> HdbResult<HdbResponse> {
        debug!("connection.execute_direct(\"{stmt}\")");
        let mut request = Request::new(MessageType::ExecuteDirect, HOLD_CURSORS_OVER_COMMIT);
        request.push(Part::Command(stmt));
        let mut reply = self.am_conn_core.full_send(request, None, None, &mut None)?;
        reply.parts.remove_first_of_kind(PartKind::WriteLobReply);
        let int_return_values = reply.parts.into_internal_return_values(&self.am_conn_core)?;
        HdbResponse::try_new(int_return_values)
    }
}
