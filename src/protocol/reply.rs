use crate::conn::{AmConnCore, ConnectionCore};
use crate::hdb_error::impl_err;
use crate::protocol::parts::{
    resultset::RsState, ExecutionResult, ParameterDescriptors, Parts, ResultSetMetadata,
    ServerError, Severity,
};
use crate::protocol::{util_sync, Part, PartKind, ReplyType};
use crate::{HdbError, HdbResult};
use byteorder::{LittleEndian, ReadBytesExt};
use std::sync::Arc;

// Since there is no usecase for multiple segments in one reply,
// message and segment are modelled together.
#[derive(Debug)]
pub(crate) struct Reply {
    session_id: i64,
    pub replytype: ReplyType,
    pub parts: Parts<'static>,
}
impl Reply {
    fn new(session_id: i64, replytype: ReplyType) -> Self {
        Self {
            session_id,
            replytype,
            parts: Parts::default(),
        }
    }

    pub fn session_id(&self) -> i64 {
        self.session_id
    }

    // Parse a reply from the stream, building a Reply object.
    //
    // * `ResultSetMetadata` need to be injected in case of execute calls
    //   of prepared statements
    // * `RsState` needs to be injected (and is extended) in case of fetch
    //   requests
    pub(crate) fn parse(
        o_a_rsmd: Option<&Arc<ResultSetMetadata>>,
        o_a_descriptors: Option<&Arc<ParameterDescriptors>>,
        o_rs: &mut Option<&mut RsState>,
        o_am_conn_core: Option<&AmConnCore>,
        dfv: u8,
        rdr: &mut dyn std::io::Read,
    ) -> HdbResult<Self> {
        trace!("Reply::parse()");
        let (no_of_parts, mut cursor, mut reply) = parse_msg_and_seg_header(rdr)?;

        for i in 0..no_of_parts {
            let part = Part::parse(
                &mut (reply.parts),
                o_am_conn_core,
                o_a_rsmd,
                o_a_descriptors,
                o_rs,
                i == no_of_parts - 1,
                dfv,
                &mut cursor,
            )?;
            reply.push(part);
        }

        Ok(reply)
    }

    pub fn assert_expected_reply_type(&self, expected_reply_type: ReplyType) -> HdbResult<()> {
        if self.replytype == expected_reply_type {
            Ok(())
        } else {
            Err(impl_err!(
                "Expected reply type {expected_reply_type:?}, got {:?}",
                self.replytype,
            ))
        }
    }

    pub fn push(&mut self, part: Part<'static>) {
        self.parts.push(part);
    }

    // Digests the error part of a reply, if any.
    //
    // Warning-severity entries are collected on the connection; an
    // ExecutionResults part, if present, is correlated with the remaining
    // entries so that each failing row of a bulk execution carries its
    // server error with the row number set.
    pub(crate) fn handle_db_error(&mut self, conn_core: &mut ConnectionCore) -> HdbResult<()> {
        conn_core.warnings.clear();

        // retrieve server_errors from returned parts
        let mut server_errors = {
            match self.parts.remove_first_of_kind(PartKind::Error) {
                None => {
                    // No error part found, regular reply evaluation happens elsewhere
                    return Ok(());
                }
                Some(Part::Error(server_warnings_and_errors)) => {
                    let (mut warnings, server_errors): (Vec<ServerError>, Vec<ServerError>) =
                        server_warnings_and_errors
                            .into_iter()
                            .partition(|se| &Severity::Warning == se.severity());
                    std::mem::swap(&mut conn_core.warnings, &mut warnings);
                    if server_errors.is_empty() {
                        // only warnings, so return Ok(())
                        return Ok(());
                    }
                    server_errors
                }
                Some(_non_error_part) => {
                    return Err(impl_err!("inconsistent error part"));
                }
            }
        };

        if server_errors
            .iter()
            .any(|se| se.severity() == &Severity::Fatal)
        {
            conn_core.mark_broken("fatal server error");
        }

        // evaluate the other parts that can come with an error part
        let mut o_execution_results = None;
        self.parts.reverse(); // digest with pop
        while let Some(part) = self.parts.pop() {
            match part {
                Part::StatementContext(ref stmt_ctx) => {
                    conn_core.evaluate_statement_context(stmt_ctx);
                }
                Part::TransactionFlags(ta_flags) => {
                    conn_core.evaluate_ta_flags(&ta_flags)?;
                }
                Part::ExecutionResults(vec) => {
                    o_execution_results = Some(vec);
                }
                part => warn!(
                    "Reply::handle_db_error(): ignoring unexpected part of kind {:?}",
                    part.kind()
                ),
            }
        }

        match o_execution_results {
            Some(execution_results) => {
                // mix server_errors into execution results
                let mut err_iter = server_errors.into_iter();
                let mut execution_results = execution_results
                    .into_iter()
                    .enumerate()
                    .map(|(row_number, er)| match er {
                        ExecutionResult::Failure(_) => ExecutionResult::Failure(
                            err_iter.next().map(|mut se| {
                                se.set_row_number(row_number);
                                se
                            }),
                        ),
                        _ => er,
                    })
                    .collect::<Vec<ExecutionResult>>();
                for e in err_iter {
                    warn!(
                        "Reply::handle_db_error(): \
                         found more server_errors than instances of ExecutionResult::Failure"
                    );
                    execution_results.push(ExecutionResult::Failure(Some(e)));
                }
                Err(HdbError::ExecutionResults(execution_results))
            }
            None => {
                if server_errors.len() == 1 {
                    Err(HdbError::from(server_errors.remove(0)))
                } else {
                    Err(impl_err!(
                        "got multiple server errors without ExecutionResults part"
                    ))
                }
            }
        }
    }
}

// Reads the message header and the single segment header, and returns the
// number of parts, a cursor over the remaining variable part, and the
// Reply shell.
fn parse_msg_and_seg_header(
    rdr: &mut dyn std::io::Read,
) -> HdbResult<(i16, std::io::Cursor<Vec<u8>>, Reply)> {
    // MESSAGE HEADER: 32 bytes
    let session_id: i64 = rdr.read_i64::<LittleEndian>()?; // I8
    let packet_seq_number: i32 = rdr.read_i32::<LittleEndian>()?; // I4
    let varpart_size: u32 = rdr.read_u32::<LittleEndian>()?; // UI4
    let remaining_bufsize: u32 = rdr.read_u32::<LittleEndian>()?; // UI4
    let no_of_segs = rdr.read_i16::<LittleEndian>()?; // I2
    if no_of_segs == 0 {
        return Err(impl_err!("empty response (is ok for drop connection)"));
    }

    if no_of_segs > 1 {
        return Err(impl_err!("no_of_segs = {no_of_segs} > 1"));
    }

    util_sync::skip_bytes(10, rdr)?; // (I1 + B[9])

    // buffer the complete variable part, so that part readers can skip
    // precisely to part boundaries
    let mut varpart = vec![0_u8; varpart_size as usize];
    rdr.read_exact(&mut varpart)?;
    let mut cursor = std::io::Cursor::new(varpart);

    // SEGMENT HEADER: 24 bytes
    cursor.read_i32::<LittleEndian>()?; // I4 seg_size
    cursor.read_i32::<LittleEndian>()?; // I4 seg_offset
    let no_of_parts: i16 = cursor.read_i16::<LittleEndian>()?; // I2
    cursor.read_i16::<LittleEndian>()?; // I2 seg_number
    let seg_kind = Kind::from_i8(cursor.read_i8()?)?; // I1

    trace!(
        "message and segment header: {{ packet_seq_number = {packet_seq_number}, \
         varpart_size = {varpart_size}, remaining_bufsize = {remaining_bufsize}, \
         no_of_parts = {no_of_parts} }}"
    );

    match seg_kind {
        Kind::Request => Err(impl_err!("Cannot _parse_ a request")),
        Kind::Reply | Kind::Error => {
            util_sync::skip_bytes(1, &mut cursor)?; // I1 reserved2
            let reply_type = ReplyType::from_i16(cursor.read_i16::<LittleEndian>()?)?; // I2
            util_sync::skip_bytes(8, &mut cursor)?; // B[8] reserved3
            debug!(
                "Reply::parse(): got reply of type {reply_type:?} and seg_kind {seg_kind:?} \
                 for session_id {session_id}"
            );
            let reply = Reply::new(session_id, reply_type);
            Ok((no_of_parts, cursor, reply))
        }
    }
}

/// Specifies the layout of the remaining segment header structure
#[derive(Debug)]
enum Kind {
    Request,
    Reply,
    Error,
}
impl Kind {
    fn from_i8(val: i8) -> HdbResult<Self> {
        match val {
            1 => Ok(Self::Request),
            2 => Ok(Self::Reply),
            5 => Ok(Self::Error),
            _ => Err(impl_err!("reply::Kind {val} not implemented")),
        }
    }
}
