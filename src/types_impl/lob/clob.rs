use crate::conn::AmConnCore;
use crate::hdb_error::impl_err;
use crate::protocol::parts::resultset::OAmRsCore;
use crate::protocol::util;
use crate::types_impl::lob::fetch::fetch_a_lob_chunk;
use crate::HdbResult;
use debug_ignore::DebugIgnore;

/// A character large object (ASCII payload) that is being read from the
/// database.
///
/// CLOB data on the wire are a single-byte character stream; offsets and
/// lengths count bytes.
#[derive(Clone, Debug)]
pub struct CLob {
    am_conn_core: AmConnCore,
    o_am_rscore: OAmRsCore,
    is_data_complete: bool,
    total_char_length: u64,
    total_byte_length: u64,
    locator_id: u64,
    data: DebugIgnore<Vec<u8>>,
    acc_byte_length: usize,
}

impl CLob {
    pub(crate) fn new(
        am_conn_core: &AmConnCore,
        o_am_rscore: &OAmRsCore,
        is_data_complete: bool,
        total_char_length: u64,
        total_byte_length: u64,
        locator_id: u64,
        data: Vec<u8>,
    ) -> Self {
        Self {
            am_conn_core: am_conn_core.clone(),
            o_am_rscore: o_am_rscore.clone(),
            is_data_complete,
            total_char_length,
            total_byte_length,
            locator_id,
            acc_byte_length: data.len(),
            data: DebugIgnore::from(data),
        }
    }

    /// Total length of the value on the server, in bytes.
    pub fn total_byte_length(&self) -> u64 {
        self.total_byte_length
    }

    /// Total length of the value on the server, in characters.
    pub fn total_char_length(&self) -> u64 {
        self.total_char_length
    }

    /// True if all data have been transferred to the client already.
    pub fn is_data_complete(&self) -> bool {
        self.is_data_complete
    }

    /// Fetches all remaining chunks and returns the complete value as
    /// String.
    pub fn into_string(mut self) -> HdbResult<String> {
        self.fetch_all()?;
        util::string_from_cesu8(self.data.0)
    }

    fn fetch_all(&mut self) -> HdbResult<()> {
        while !self.is_data_complete {
            self.fetch_next_chunk()?;
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn fetch_next_chunk(&mut self) -> HdbResult<()> {
        if self.is_data_complete {
            return Err(impl_err!("fetch_next_chunk(): already complete"));
        }

        let read_length = std::cmp::min(
            self.am_conn_core.lock()?.lob_read_length(),
            (self.total_byte_length - self.acc_byte_length as u64) as u32,
        );

        let (reply_data, reply_is_last_data) = fetch_a_lob_chunk(
            &self.am_conn_core,
            self.locator_id,
            self.acc_byte_length as u64,
            read_length,
        )?;
        self.acc_byte_length += reply_data.len();
        self.data.extend_from_slice(&reply_data);
        if reply_is_last_data {
            self.is_data_complete = true;
            self.o_am_rscore = None;
        }
        Ok(())
    }
}
