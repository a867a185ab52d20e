use crate::conn::AmConnCore;
use crate::hdb_error::impl_err;
use crate::protocol::parts::resultset::OAmRsCore;
use crate::types_impl::lob::fetch::fetch_a_lob_chunk;
use crate::HdbResult;
use debug_ignore::DebugIgnore;

/// A binary large object that is being read from the database.
///
/// The data are often not transferred completely with the result row, so
/// the handle carries the database connection and the locator id to fetch
/// the remaining chunks on demand.
#[derive(Clone, Debug)]
pub struct BLob {
    am_conn_core: AmConnCore,
    o_am_rscore: OAmRsCore,
    is_data_complete: bool,
    total_byte_length: u64,
    locator_id: u64,
    data: DebugIgnore<Vec<u8>>,
    acc_byte_length: usize,
    read_pos: usize,
}

impl BLob {
    pub(crate) fn new(
        am_conn_core: &AmConnCore,
        o_am_rscore: &OAmRsCore,
        is_data_complete: bool,
        total_byte_length: u64,
        locator_id: u64,
        data: Vec<u8>,
    ) -> Self {
        Self {
            am_conn_core: am_conn_core.clone(),
            o_am_rscore: o_am_rscore.clone(),
            is_data_complete,
            total_byte_length,
            locator_id,
            acc_byte_length: data.len(),
            data: DebugIgnore::from(data),
            read_pos: 0,
        }
    }

    /// Total length of the value on the server, in bytes.
    pub fn total_byte_length(&self) -> u64 {
        self.total_byte_length
    }

    /// True if all data have been transferred to the client already.
    pub fn is_data_complete(&self) -> bool {
        self.is_data_complete
    }

    /// Fetches all remaining chunks and returns the complete value.
    pub fn into_bytes(mut self) -> HdbResult<Vec<u8>> {
        self.fetch_all()?;
        Ok(self.data.0)
    }

    /// Reads a slice of the lob directly from the server, without
    /// touching the handle's buffer.
    pub fn read_slice(&mut self, offset: u64, length: u32) -> HdbResult<Vec<u8>> {
        let (reply_data, _reply_is_last_data) =
            fetch_a_lob_chunk(&self.am_conn_core, self.locator_id, offset, length)?;
        debug!("read_slice(): got {} bytes", reply_data.len());
        Ok(reply_data)
    }

    fn fetch_all(&mut self) -> HdbResult<()> {
        while !self.is_data_complete {
            self.fetch_next_chunk()?;
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn fetch_next_chunk(&mut self) -> HdbResult<usize> {
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
        let reply_len = reply_data.len();
        self.acc_byte_length += reply_len;
        self.data.extend_from_slice(&reply_data);
        if reply_is_last_data {
            self.is_data_complete = true;
            self.o_am_rscore = None;
        }
        trace!(
            "fetch_next_chunk: is_data_complete = {}, data.len() = {}",
            self.is_data_complete,
            self.data.len()
        );
        Ok(reply_len)
    }
}

// Support for streaming the lob out of the driver.
impl std::io::Read for BLob {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        while self.data.len() - self.read_pos < buf.len() && !self.is_data_complete {
            self.fetch_next_chunk()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        }
        let count = std::cmp::min(buf.len(), self.data.len() - self.read_pos);
        buf[0..count].copy_from_slice(&self.data[self.read_pos..self.read_pos + count]);
        self.read_pos += count;
        Ok(count)
    }
}
