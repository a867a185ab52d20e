use crate::conn::AmConnCore;
use crate::hdb_error::impl_err;
use crate::protocol::{
    parts::{ReadLobReply, ReadLobRequest},
    MessageType, Part, ReplyType, Request,
};
use crate::HdbResult;

// Fetches one chunk of a lob from the server.
// Note that requested_length and offset count either bytes (BLOB, CLOB),
// or 1-2-3-byte sequences (NCLOB).
pub(crate) fn fetch_a_lob_chunk(
    am_conn_core: &AmConnCore,
    locator_id: u64,
    offset: u64,
    length: u32,
) -> HdbResult<(Vec<u8>, bool)> {
    let mut request = Request::new(MessageType::ReadLob, 0);
    let offset = offset + 1;
    request.push(Part::ReadLobRequest(ReadLobRequest::new(
        locator_id, offset, length,
    )));

    let reply = am_conn_core.send(request)?;
    reply.assert_expected_reply_type(ReplyType::ReadLob)?;
    am_conn_core.lock()?.statistics_mut().add_lob_read_roundtrip();

    let mut o_read_lob_reply = None;
    for part in reply.parts {
        match part {
            Part::ReadLobReply(read_lob_reply) => {
                if *read_lob_reply.locator_id() != locator_id {
                    return Err(impl_err!("locator ids do not match"));
                }
                o_read_lob_reply = Some(read_lob_reply);
            }
            Part::StatementContext(stmt_ctx) => {
                am_conn_core.lock()?.evaluate_statement_context(&stmt_ctx);
            }
            x => warn!(
                "Unexpected part of kind {:?} received and ignored",
                x.kind()
            ),
        }
    }

    o_read_lob_reply
        .map(ReadLobReply::into_data_and_last)
        .ok_or_else(|| impl_err!("fetching a lob chunk failed"))
}
