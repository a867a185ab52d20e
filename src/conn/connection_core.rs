use crate::conn::{
    authentication::{self, AuthenticationResult},
    initial_request, AmConnCore, ConnectParams, ConnectionConfiguration, ConnectionStatistics,
    SessionState, TcpClient,
};
use crate::hdb_error::impl_err;
use crate::protocol::parts::{
    resultset::RsState, ClientInfo, ConnectOptions, DbConnectInfo, ParameterDescriptors,
    ResultSetMetadata, ServerError, StatementContext, Topology, TransactionFlags,
};
use crate::protocol::{MessageType, Part, Reply, ReplyType, Request};
use crate::{HdbError, HdbResult};
use std::mem;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug)]
pub(crate) struct ConnectionCore {
    authenticated: bool,
    session_id: i64,
    client_info: ClientInfo,
    client_info_touched: bool,
    seq_number: i32,
    configuration: ConnectionConfiguration,
    statistics: ConnectionStatistics,
    session_state: SessionState,
    // set between an explicit "begin" and the next commit/rollback;
    // remembers the auto-commit value to restore
    o_explicit_transaction: Option<bool>,
    statement_sequence: Option<i64>, // statement sequence within the transaction
    connect_options: ConnectOptions,
    o_topology: Option<Topology>,
    pub warnings: Vec<ServerError>,
    tcp_client: TcpClient,
}

impl ConnectionCore {
    pub fn try_new(params: ConnectParams, configuration: &ConnectionConfiguration) -> HdbResult<Self> {
        let o_dbname = params.dbname().map(ToString::to_string);
        let network_group = params.network_group().unwrap_or_default().to_string();
        let mut conn_core = ConnectionCore::try_new_initialized(params, configuration)?;
        if let Some(dbname) = o_dbname {
            // since a dbname is specified, we ask explicitly for a redirect
            trace!("Redirect to {dbname} initiated by client");
            let mut request = Request::new(MessageType::DbConnectInfo, 0);
            request.push(Part::DbConnectInfo(DbConnectInfo::new(
                dbname,
                network_group,
            )));
            let reply = conn_core.roundtrip(&request, None, None, None, &mut None)?;
            reply.assert_expected_reply_type(ReplyType::Nil)?;

            match reply.parts.into_iter().next() {
                Some(Part::DbConnectInfo(db_connect_info)) => {
                    trace!("Received DbConnectInfo");
                    if db_connect_info.on_correct_database()? {
                        trace!("Already connected to the right database");
                    } else {
                        let redirect_params = conn_core
                            .connect_params()
                            .redirect(db_connect_info.host()?, db_connect_info.port()?);
                        debug!("Redirected (1) to {redirect_params}");
                        conn_core =
                            ConnectionCore::try_new_initialized(redirect_params, configuration)?;
                    }
                }
                o_part => {
                    warn!("Did not find a DbConnectInfo; got {o_part:?}");
                }
            }
        }

        // here we can encounter an additional implicit redirect, triggered by
        // the server itself, and - on authentication failures - consult the
        // credential refresh callback
        loop {
            let (_, credential_version) = conn_core.connect_params().credentials();
            match authentication::authenticate(&mut conn_core, false) {
                Ok(AuthenticationResult::Ok) => return Ok(conn_core),
                Ok(AuthenticationResult::Redirect(db_connect_info)) => {
                    trace!("Redirect initiated by the server");
                    let redirect_params = conn_core
                        .connect_params()
                        .redirect(db_connect_info.host()?, db_connect_info.port()?);
                    debug!("Redirected (2) to {redirect_params}");
                    conn_core =
                        ConnectionCore::try_new_initialized(redirect_params, configuration)?;
                }
                Err(auth_error @ HdbError::Authentication { .. }) => {
                    let params = conn_core.connect_params().clone();
                    let config = conn_core.configuration().clone();
                    if params.try_credential_refresh(credential_version) {
                        debug!("Retrying after credential refresh");
                        conn_core = ConnectionCore::try_new_initialized(params, &config)?;
                    } else {
                        return Err(auth_error);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn try_new_initialized(
        params: ConnectParams,
        configuration: &ConnectionConfiguration,
    ) -> HdbResult<Self> {
        let connect_options = ConnectOptions::new(params.clientlocale(), &get_os_user());
        let tcp_client = TcpClient::try_new(params)?;
        let mut conn_core = Self {
            authenticated: false,
            session_id: 0,
            seq_number: 0,
            configuration: configuration.clone(),
            statistics: ConnectionStatistics::new(),
            client_info: ClientInfo::default(),
            client_info_touched: true,
            session_state: SessionState::Dialed,
            o_explicit_transaction: None,
            statement_sequence: None,
            connect_options,
            o_topology: None,
            warnings: Vec::<ServerError>::new(),
            tcp_client,
        };
        initial_request::send_and_receive(&mut conn_core.tcp_client)?;
        conn_core.session_state = SessionState::Prologed;
        Ok(conn_core)
    }

    pub fn connect_params(&self) -> &ConnectParams {
        self.tcp_client.connect_params()
    }

    pub fn connect_string(&self) -> String {
        format!("{}", self.connect_params())
    }

    pub fn set_application<S: AsRef<str>>(&mut self, application: S) {
        self.client_info.set_application(application);
        self.client_info_touched = true;
    }

    pub fn set_application_version(&mut self, version: &str) {
        self.client_info.set_application_version(version);
        self.client_info_touched = true;
    }

    pub fn set_application_source(&mut self, source: &str) {
        self.client_info.set_application_source(source);
        self.client_info_touched = true;
    }

    pub fn set_application_user(&mut self, application_user: &str) {
        self.client_info.set_application_user(application_user);
        self.client_info_touched = true;
    }

    pub fn set_session_variable(&mut self, key: &str, value: &str) {
        self.client_info.set(key, value);
        self.client_info_touched = true;
    }

    pub fn unset_session_variable(&mut self, key: &str) {
        if self.client_info.unset(key) {
            self.client_info_touched = true;
        }
    }

    pub fn get_session_variable(&self, key: &str) -> Option<&str> {
        self.client_info.get(key)
    }

    fn is_client_info_touched(&self) -> bool {
        self.client_info_touched
    }
    fn get_client_info_for_sending(&mut self) -> ClientInfo {
        debug!("cloning client info for sending");
        self.client_info_touched = false;
        self.client_info.clone()
    }

    pub fn evaluate_statement_context(&mut self, stmt_ctx: &StatementContext) {
        trace!(
            "Received StatementContext with sequence_info = {:?}",
            stmt_ctx.statement_sequence_info()
        );
        self.set_statement_sequence(stmt_ctx.statement_sequence_info());
        if let Some(server_processing_time) = stmt_ctx.server_processing_time() {
            self.statistics.add_sql_time(server_processing_time);
        }
    }

    pub fn evaluate_ta_flags(&mut self, ta_flags: &TransactionFlags) -> HdbResult<()> {
        if self.session_state.update(ta_flags) {
            Err(HdbError::SessionClosingTransactionError)
        } else {
            Ok(())
        }
    }

    pub fn set_auto_commit(&mut self, ac: bool) {
        self.configuration.set_auto_commit(ac);
    }

    pub fn is_auto_commit(&self) -> bool {
        self.configuration.is_auto_commit()
    }

    pub fn configuration(&self) -> &ConnectionConfiguration {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut ConnectionConfiguration {
        &mut self.configuration
    }

    pub fn statistics(&self) -> &ConnectionStatistics {
        &self.statistics
    }

    pub fn statistics_mut(&mut self) -> &mut ConnectionStatistics {
        &mut self.statistics
    }

    pub fn fetch_size(&self) -> u32 {
        self.configuration.fetch_size()
    }

    pub fn lob_read_length(&self) -> u32 {
        self.configuration.lob_read_length()
    }

    pub fn lob_write_length(&self) -> usize {
        self.configuration.lob_write_length()
    }

    pub fn set_session_id(&mut self, session_id: i64) {
        if session_id != self.session_id {
            debug!(
                "ConnectionCore: setting session_id from {} to {}",
                self.session_id, session_id
            );
            self.session_id = session_id;
        }
    }

    pub fn set_topology(&mut self, topology: Topology) {
        self.o_topology = Some(topology);
    }

    // Number of server nodes reported with the topology part.
    pub fn topology_node_count(&self) -> Option<usize> {
        self.o_topology.as_ref().map(|t| t.lines().len())
    }

    pub fn dump_client_info(&self) -> String {
        self.client_info.to_string()
    }

    pub fn set_authenticated(&mut self) {
        self.authenticated = true;
        self.session_state = SessionState::Ready;
    }

    pub fn statement_sequence(&self) -> &Option<i64> {
        &self.statement_sequence
    }

    fn set_statement_sequence(&mut self, statement_sequence: Option<i64>) {
        self.statement_sequence = statement_sequence;
    }

    pub fn session_id(&self) -> i64 {
        self.session_id
    }

    pub fn connection_id(&self) -> u32 {
        self.connect_options.connection_id()
    }

    pub fn database_name(&self) -> String {
        self.connect_options.database_name().to_string()
    }

    pub fn system_id(&self) -> String {
        self.connect_options.system_id().to_string()
    }

    pub fn full_version_string(&self) -> String {
        self.connect_options.full_version_string().to_string()
    }

    pub fn dataformat_version2(&self) -> u8 {
        self.connect_options.dataformat_version2()
    }

    pub fn implicit_lob_streaming(&self) -> bool {
        self.connect_options.implicit_lob_streaming()
    }

    fn next_seq_number(&mut self) -> i32 {
        self.seq_number += 1;
        self.seq_number
    }

    pub fn is_broken(&self) -> bool {
        self.session_state.is_broken()
    }

    // An explicit transaction is rejected locally, without touching the
    // wire, when one is already open.
    pub fn begin_explicit_transaction(&mut self) -> HdbResult<()> {
        if self.o_explicit_transaction.is_some() || self.is_in_transaction() {
            return Err(crate::hdb_error::usage_err!(
                "Nested transactions are not supported"
            ));
        }
        self.o_explicit_transaction = Some(self.is_auto_commit());
        self.configuration.set_auto_commit(false);
        Ok(())
    }

    pub fn has_explicit_transaction(&self) -> bool {
        self.o_explicit_transaction.is_some()
    }

    pub fn end_explicit_transaction(&mut self) {
        if let Some(auto_commit) = self.o_explicit_transaction.take() {
            self.configuration.set_auto_commit(auto_commit);
        }
    }

    pub fn is_in_transaction(&self) -> bool {
        self.session_state.is_in_transaction()
    }

    pub fn mark_broken(&mut self, reason: &'static str) {
        warn!("Connection is marked as broken: {reason}");
        self.session_state = SessionState::Broken;
    }

    pub fn pop_warnings(&mut self) -> Option<Vec<ServerError>> {
        if self.warnings.is_empty() {
            None
        } else {
            let mut v = Vec::<ServerError>::new();
            mem::swap(&mut v, &mut self.warnings);
            Some(v)
        }
    }

    pub(crate) fn connect_options(&self) -> &ConnectOptions {
        &self.connect_options
    }

    pub(crate) fn connect_options_mut(&mut self) -> &mut ConnectOptions {
        &mut self.connect_options
    }

    pub fn augment_request(&mut self, request: &mut Request) {
        if self.authenticated {
            if let Some(ssi_value) = self.statement_sequence() {
                request.add_statement_context(*ssi_value);
            }
            if self.is_client_info_touched() {
                request.push(Part::ClientInfo(self.get_client_info_for_sending()));
            }
        }
    }

    // Sends the request and reads the reply: the strict request/reply
    // discipline of the protocol. Any I/O error, and any decode error that
    // cannot be resynchronized at a part boundary, marks the session as
    // broken.
    pub(crate) fn roundtrip(
        &mut self,
        request: &Request,
        o_am_conn_core: Option<&AmConnCore>,
        o_a_rsmd: Option<&Arc<ResultSetMetadata>>,
        o_a_descriptors: Option<&Arc<ParameterDescriptors>>,
        o_rs: &mut Option<&mut RsState>,
    ) -> HdbResult<Reply> {
        if self.is_broken() {
            return Err(HdbError::DeadConnection("session is broken"));
        }

        let (session_id, nsn, default_error_handling) =
            if let MessageType::Authenticate = request.message_type {
                (0, 1, false)
            } else {
                (self.session_id(), self.next_seq_number(), true)
            };
        let auto_commit = self.is_auto_commit();
        let dfv = self.dataformat_version2();

        let start = Instant::now();
        self.statistics.next_sequence_number();

        let emit_result = request.emit(
            session_id,
            nsn,
            auto_commit,
            o_a_descriptors,
            self.tcp_client.writer(),
        );
        if let Err(e) = emit_result {
            self.mark_broken("emitting a request failed");
            return Err(e);
        }

        let parse_result = Reply::parse(
            o_a_rsmd,
            o_a_descriptors,
            o_rs,
            o_am_conn_core,
            dfv,
            self.tcp_client.reader(),
        );
        let mut reply = match parse_result {
            Ok(reply) => reply,
            Err(e) => {
                self.mark_broken("parsing a reply failed");
                return Err(e);
            }
        };
        self.statistics
            .add_wait_time(Instant::now().duration_since(start));

        if default_error_handling {
            reply.handle_db_error(self)?;
        }
        Ok(reply)
    }

    // Asks the server for the connect information of the given database.
    pub fn db_connect_info(&mut self, dbname: &str) -> HdbResult<DbConnectInfo> {
        let mut request = Request::new(MessageType::DbConnectInfo, 0);
        request.push(Part::DbConnectInfo(DbConnectInfo::new(
            dbname.to_string(),
            self.connect_params()
                .network_group()
                .unwrap_or_default()
                .to_string(),
        )));
        let reply = self.roundtrip(&request, None, None, None, &mut None)?;
        reply.assert_expected_reply_type(ReplyType::Nil)?;
        for part in reply.parts {
            if let Part::DbConnectInfo(db_connect_info) = part {
                return Ok(db_connect_info);
            }
        }
        Err(impl_err!("no DbConnectInfo part found"))
    }

    pub fn disconnect(&mut self) -> HdbResult<()> {
        if self.authenticated && !self.is_broken() {
            let request = Request::new_for_disconnect();
            let session_id = self.session_id();
            let nsn = self.next_seq_number();
            request
                .emit(session_id, nsn, false, None, self.tcp_client.writer())
                .ok();
            self.authenticated = false;
        }
        self.session_state = SessionState::Closed;
        Ok(())
    }
}

impl Drop for ConnectionCore {
    // try to send a disconnect to the database, ignore all errors
    fn drop(&mut self) {
        debug!("Drop of ConnectionCore, session_id = {}", self.session_id);
        if self.authenticated && !self.session_state.is_broken() {
            let request = Request::new_for_disconnect();
            let session_id = self.session_id();
            let nsn = self.next_seq_number();
            request
                .emit(session_id, nsn, false, None, self.tcp_client.writer())
                .map_err(|e| {
                    trace!("Disconnect request failed with {e:?}");
                    e
                })
                .ok();
        }
    }
}

fn get_os_user() -> String {
    let os_user = username::get_user_name().unwrap_or_default();
    trace!("OS user: {os_user}");
    os_user
}
