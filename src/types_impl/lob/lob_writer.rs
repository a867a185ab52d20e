use crate::conn::AmConnCore;
use crate::hdb_error::impl_err;
use crate::protocol::parts::{ParameterDescriptors, ResultSetMetadata, TypeId, WriteLobRequest};
use crate::protocol::{util, MessageType, Part, Reply, ReplyType, Request};
use crate::HdbResult;
use std::sync::Arc;

// Transfers the content of one outbound lob to the server, in chunks of at
// most `lob_write_length` bytes.
//
// The server finalizes the surrounding statement execution only after the
// last chunk of the last lob was written; the reply to that chunk then
// carries the statement's results and is kept for the caller.
#[derive(Debug)]
pub(crate) struct LobWriter<'a> {
    locator_id: u64,
    type_id: TypeId,
    am_conn_core: AmConnCore,
    o_a_rsmd: Option<&'a Arc<ResultSetMetadata>>,
    o_a_descriptors: Option<&'a Arc<ParameterDescriptors>>,
    buffer: Vec<u8>,
    lob_write_length: usize,
    o_final_reply: Option<Reply>,
}
impl<'a> LobWriter<'a> {
    pub fn new(
        locator_id: u64,
        type_id: TypeId,
        am_conn_core: AmConnCore,
        o_a_rsmd: Option<&'a Arc<ResultSetMetadata>>,
        o_a_descriptors: Option<&'a Arc<ParameterDescriptors>>,
    ) -> HdbResult<LobWriter<'a>> {
        if let TypeId::BLOB | TypeId::BINTEXT | TypeId::CLOB | TypeId::NCLOB | TypeId::TEXT =
            type_id
        {
            let lob_write_length = am_conn_core.lock()?.lob_write_length();
            Ok(LobWriter {
                locator_id,
                type_id,
                am_conn_core,
                o_a_rsmd,
                o_a_descriptors,
                buffer: Vec::<u8>::with_capacity(lob_write_length + 8200),
                lob_write_length,
                o_final_reply: None,
            })
        } else {
            Err(impl_err!("Unsupported type-id {type_id:?}"))
        }
    }

    // Pulls everything from the reader into the server. Only the reply to
    // the last chunk of the last still-open lob carries the results of the
    // surrounding statement execution; in that case it is returned.
    pub fn copy_from(mut self, reader: &mut dyn std::io::Read) -> HdbResult<Option<Reply>> {
        std::io::copy(reader, &mut self)?;
        std::io::Write::flush(&mut self)?;
        Ok(self.o_final_reply)
    }

    fn write_a_lob_chunk(&mut self, buf: &[u8], last_data: bool) -> HdbResult<()> {
        let mut request = Request::new(MessageType::WriteLob, 0);
        request.push(Part::WriteLobRequest(WriteLobRequest::new(
            self.locator_id,
            -1_i64,
            buf,
            last_data,
        )));

        let reply = self.am_conn_core.full_send(
            request,
            self.o_a_rsmd,
            self.o_a_descriptors,
            &mut None,
        )?;
        self.am_conn_core
            .lock()?
            .statistics_mut()
            .add_lob_write_roundtrip();

        match reply.replytype {
            // regular response
            ReplyType::WriteLob => {
                let mut found = false;
                for part in reply.parts {
                    match part {
                        Part::StatementContext(stmt_ctx) => {
                            self.am_conn_core.lock()?.evaluate_statement_context(&stmt_ctx);
                        }
                        Part::TransactionFlags(ta_flags) => {
                            self.am_conn_core.lock()?.evaluate_ta_flags(&ta_flags)?;
                        }
                        Part::WriteLobReply(write_lob_reply) => {
                            found = write_lob_reply
                                .locator_ids()
                                .contains(&self.locator_id);
                        }
                        _ => trace!("write_a_lob_chunk: ignoring part {:?}", part.kind()),
                    }
                }
                if found || last_data {
                    Ok(())
                } else {
                    Err(impl_err!("WriteLobReply does not contain our locator id"))
                }
            }

            // response of the last chunk of the last lob: carries the
            // results of the statement execution
            _ => {
                self.o_final_reply = Some(reply);
                Ok(())
            }
        }
    }
}

impl std::io::Write for LobWriter<'_> {
    // Either buffers (in self.buffer) or writes buffer + input to the db
    fn write(&mut self, input: &[u8]) -> std::io::Result<usize> {
        trace!("write() with input of len {}", input.len());
        if input.len() + self.buffer.len() < self.lob_write_length {
            self.buffer.extend_from_slice(input);
        } else {
            let mut payload_raw = std::mem::take(&mut self.buffer);
            payload_raw.extend_from_slice(input);

            // if necessary, cut off the new utf-8 tail and convert to cesu8
            let payload = if is_character_type(self.type_id) {
                let (payload, utf8_tail) = utf8_to_cesu8_and_utf8_tail(payload_raw)?;
                self.buffer = utf8_tail;
                payload
            } else {
                payload_raw
            };

            self.write_a_lob_chunk(&payload, false)
                .map_err(|e| util::io_error(e.to_string()))?;
        }
        Ok(input.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        trace!("flush(), with buffer of {} bytes", self.buffer.len());
        let payload_raw = std::mem::take(&mut self.buffer);
        let payload = if is_character_type(self.type_id) {
            let (payload, utf8_tail) = utf8_to_cesu8_and_utf8_tail(payload_raw)?;
            if !utf8_tail.is_empty() {
                return Err(util::io_error("stream ending with invalid utf-8"));
            }
            payload
        } else {
            payload_raw
        };

        self.write_a_lob_chunk(&payload, true)
            .map_err(|e| util::io_error(e.to_string()))?;
        Ok(())
    }
}

fn is_character_type(type_id: TypeId) -> bool {
    matches!(type_id, TypeId::CLOB | TypeId::NCLOB | TypeId::TEXT)
}

// Splits off an incomplete trailing utf-8 character, converts the rest to
// cesu-8.
fn utf8_to_cesu8_and_utf8_tail(mut utf8: Vec<u8>) -> std::io::Result<(Vec<u8>, Vec<u8>)> {
    let tail_len = utf8_tail_len(&utf8)?;
    let tail = utf8.split_off(utf8.len() - tail_len);
    let utf8_str = std::str::from_utf8(&utf8)
        .map_err(|_| util::io_error("buffer contains invalid utf-8"))?;
    Ok((cesu8::to_cesu8(utf8_str).to_vec(), tail))
}

fn utf8_tail_len(bytes: &[u8]) -> std::io::Result<usize> {
    let len = bytes.len();
    if len == 0 {
        return Ok(0);
    }
    // walk back over continuation bytes to the last character start
    for back in 1..=std::cmp::min(4, len) {
        let b = bytes[len - back];
        let char_len = match b {
            0x00..=0x7F => Some(1),
            0xC0..=0xDF => Some(2),
            0xE0..=0xEF => Some(3),
            0xF0..=0xF7 => Some(4),
            _ => None, // continuation byte
        };
        if let Some(char_len) = char_len {
            return Ok(if char_len == back { 0 } else { back });
        }
    }
    Err(util::io_error("no utf-8 character start found"))
}

#[cfg(test)]
mod tests {
    #[test]
    fn utf8_tail_detection() {
        let bytes = "abc💩".as_bytes();
        assert_eq!(super::utf8_tail_len(&bytes[..3]).unwrap(), 0);
        assert_eq!(super::utf8_tail_len(&bytes[..4]).unwrap(), 1);
        assert_eq!(super::utf8_tail_len(&bytes[..5]).unwrap(), 2);
        assert_eq!(super::utf8_tail_len(&bytes[..6]).unwrap(), 3);
        assert_eq!(super::utf8_tail_len(bytes).unwrap(), 0);
    }
}
