use crate::conn::AmConnCore;
use crate::protocol::{MessageType, Part, PartKind, Request};
use std::sync::{Arc, Mutex};

pub(crate) type AmPsCore = Arc<Mutex<PreparedStatementCore>>;

// The server-side representation of a prepared statement.
#[derive(Debug)]
pub(crate) struct PreparedStatementCore {
    pub am_conn_core: AmConnCore,
    pub statement_id: u64,
}

impl Drop for PreparedStatementCore {
    // Frees the server-side resources of the prepared statement,
    // ignoring all errors.
    fn drop(&mut self) {
        debug!("PreparedStatementCore::drop()");
        let mut request = Request::new(MessageType::DropStatementId, 0);
        request.push(Part::StatementId(self.statement_id));
        if let Ok(mut reply) = self.am_conn_core.send(request) {
            reply.parts.pop_if_kind(PartKind::StatementContext);
        }
    }
}
