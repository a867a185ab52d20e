//! Since there is no usecase for multiple segments in one request,
//! message and segment are modelled together.
use crate::hdb_error::usage_err;
use crate::protocol::{
    parts::{ParameterDescriptors, Parts, StatementContext},
    MessageType, Part,
};
use crate::HdbResult;
use byteorder::{LittleEndian, WriteBytesExt};
use std::sync::Arc;

const MESSAGE_HEADER_SIZE: u32 = 32;
const SEGMENT_HEADER_SIZE: usize = 24; // same for in and out
pub(crate) const HOLD_CURSORS_OVER_COMMIT: u8 = 8;

// The total message size must stay below the 31-bit limit.
const MAX_MESSAGE_SIZE: u32 = i32::MAX as u32;

// Packets having the same sequence number belong to one request/response
// pair.
#[derive(Debug)]
pub(crate) struct Request<'a> {
    pub message_type: MessageType,
    command_options: u8,
    parts: Parts<'a>,
}

// Methods for defining a request
impl<'a> Request<'a> {
    pub fn new(message_type: MessageType, command_options: u8) -> Request<'a> {
        Request {
            message_type,
            command_options,
            parts: Parts::default(),
        }
    }

    pub fn new_for_disconnect() -> Request<'a> {
        Request::new(MessageType::Disconnect, 0)
    }

    pub fn push(&mut self, part: Part<'a>) {
        self.parts.push(part);
    }

    pub fn add_statement_context(&mut self, ssi_value: i64) {
        let mut stmt_ctx = StatementContext::default();
        stmt_ctx.set_statement_sequence_info(ssi_value);
        trace!("Sending StatementContext with sequence_info = {ssi_value:?}");
        self.push(Part::StatementContext(stmt_ctx));
    }

    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_possible_wrap)]
    pub fn emit(
        &self,
        session_id: i64,
        seq_number: i32,
        auto_commit: bool,
        o_a_descriptors: Option<&Arc<ParameterDescriptors>>,
        w: &mut dyn std::io::Write,
    ) -> HdbResult<()> {
        let varpart_size = self.varpart_size(o_a_descriptors)?;
        let total_size = MESSAGE_HEADER_SIZE
            .checked_add(varpart_size)
            .ok_or_else(|| usage_err!("message too large"))?;
        if total_size > MAX_MESSAGE_SIZE {
            return Err(usage_err!(
                "message of {total_size} bytes exceeds the maximum message size"
            ));
        }
        trace!("Writing request with total size {total_size}");
        let mut remaining_bufsize = total_size - MESSAGE_HEADER_SIZE;

        debug!(
            "Request::emit() of type {:?} for session_id = {session_id}, seq_number = {seq_number}",
            self.message_type
        );

        // MESSAGE HEADER
        w.write_i64::<LittleEndian>(session_id)?; // I8
        w.write_i32::<LittleEndian>(seq_number)?; // I4
        w.write_u32::<LittleEndian>(varpart_size)?; // UI4
        w.write_u32::<LittleEndian>(remaining_bufsize)?; // UI4
        w.write_i16::<LittleEndian>(1)?; // I2    Number of segments
        for _ in 0..10 {
            w.write_u8(0)?;
        } // I1 + B[9]  unused

        // SEGMENT HEADER
        let parts_len = self.parts.len() as i16;
        let size = self.seg_size(o_a_descriptors)? as i32;
        w.write_i32::<LittleEndian>(size)?; // I4  Length including the header
        w.write_i32::<LittleEndian>(0)?; // I4 Offset within the message buffer
        w.write_i16::<LittleEndian>(parts_len)?; // I2 Number of contained parts
        w.write_i16::<LittleEndian>(1)?; // I2 Number of this segment, starting with 1
        w.write_i8(1)?; // I1 Segment kind: always 1 = Request
        w.write_i8(self.message_type as i8)?; // I1 Message type
        w.write_i8(auto_commit.into())?; // I1 auto_commit on/off
        w.write_u8(self.command_options)?; // I1 Bit set for options
        for _ in 0..8 {
            w.write_u8(0)?;
        } // [B;8] Reserved, do not use

        remaining_bufsize -= SEGMENT_HEADER_SIZE as u32;
        trace!("Headers are written");
        // PARTS
        for part in self.parts.ref_inner() {
            remaining_bufsize = part.emit(remaining_bufsize, o_a_descriptors, w)?;
        }
        w.flush()?;
        trace!("Parts are written");
        Ok(())
    }

    // Length in bytes of the variable part of the message, i.e. total
    // message without the header
    #[allow(clippy::cast_possible_truncation)]
    fn varpart_size(&self, o_a_descriptors: Option<&Arc<ParameterDescriptors>>) -> HdbResult<u32> {
        let mut len = 0_u32;
        len += self.seg_size(o_a_descriptors)? as u32;
        trace!("varpart_size = {len}");
        Ok(len)
    }

    fn seg_size(&self, o_a_descriptors: Option<&Arc<ParameterDescriptors>>) -> HdbResult<usize> {
        let mut len = SEGMENT_HEADER_SIZE;
        for part in self.parts.ref_inner() {
            len += part.size(true, o_a_descriptors)?;
        }
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::Request;
    use crate::protocol::{MessageType, Part};
    use byteorder::{LittleEndian, ReadBytesExt};

    // The bytes written for a message must equal the message header size
    // plus the advertised varpart length, and every part except the last
    // one must be aligned to 8 bytes including its header.
    #[test]
    fn framing_invariants() {
        let mut request = Request::new(MessageType::ExecuteDirect, 0);
        request.push(Part::Command("select 42 from dummy"));
        request.push(Part::FetchSize(32));

        let mut buf = Vec::<u8>::new();
        request.emit(4711, 1, true, None, &mut buf).unwrap();

        let mut rdr = std::io::Cursor::new(&buf);
        let session_id = rdr.read_i64::<LittleEndian>().unwrap();
        assert_eq!(session_id, 4711);
        let seq_number = rdr.read_i32::<LittleEndian>().unwrap();
        assert_eq!(seq_number, 1);
        let varpart_size = rdr.read_u32::<LittleEndian>().unwrap();
        assert_eq!(buf.len(), 32 + varpart_size as usize);
        let _remaining_bufsize = rdr.read_u32::<LittleEndian>().unwrap();
        let no_of_segs = rdr.read_i16::<LittleEndian>().unwrap();
        assert_eq!(no_of_segs, 1);

        // segment header starts at offset 32
        let mut rdr = std::io::Cursor::new(&buf[32..]);
        let seg_size = rdr.read_i32::<LittleEndian>().unwrap();
        assert_eq!(seg_size as u32, varpart_size);
        let _seg_offset = rdr.read_i32::<LittleEndian>().unwrap();
        let no_of_parts = rdr.read_i16::<LittleEndian>().unwrap();
        assert_eq!(no_of_parts, 2);

        // first part starts at offset 56; its length incl. header is
        // aligned to 8 bytes
        let mut rdr = std::io::Cursor::new(&buf[56..]);
        let _kind = rdr.read_i8().unwrap();
        let _attrs = rdr.read_u8().unwrap();
        let _count16 = rdr.read_i16::<LittleEndian>().unwrap();
        let _count32 = rdr.read_i32::<LittleEndian>().unwrap();
        let buffer_length = rdr.read_i32::<LittleEndian>().unwrap();
        let padded = 16 + buffer_length + ((8 - buffer_length % 8) % 8);
        assert_eq!(padded % 8, 0);

        // the second part directly follows the padded first part
        let second_part_offset = 56 + padded as usize;
        assert!(second_part_offset < buf.len());
        assert_eq!(buf[second_part_offset], 45); // FetchSize
    }
}
