use crate::conn::AmConnCore;
use crate::hdb_error::impl_err;
use crate::protocol::parts::resultset::OAmRsCore;
use crate::protocol::util;
use crate::types_impl::lob::fetch::fetch_a_lob_chunk;
use crate::HdbResult;
use debug_ignore::DebugIgnore;

/// A unicode character large object that is being read from the database.
///
/// NCLOB data on the wire are CESU-8; server-side offsets and lengths
/// count 1-2-3-byte sequences (a supplementary character counts as two).
/// The handle keeps an undecodable CESU-8 tail between chunk fetches so
/// that the decoded part always ends in complete characters.
#[derive(Clone, Debug)]
pub struct NCLob {
    am_conn_core: AmConnCore,
    o_am_rscore: OAmRsCore,
    is_data_complete: bool,
    total_char_length: u64,
    total_byte_length: u64,
    locator_id: u64,
    utf8: DebugIgnore<String>,
    cesu8_tail: DebugIgnore<Vec<u8>>,
    acc_byte_length: usize,
    acc_char_length: usize,
}

impl NCLob {
    pub(crate) fn new(
        am_conn_core: &AmConnCore,
        o_am_rscore: &OAmRsCore,
        is_data_complete: bool,
        total_char_length: u64,
        total_byte_length: u64,
        locator_id: u64,
        data: Vec<u8>,
    ) -> HdbResult<Self> {
        let acc_byte_length = data.len();
        let acc_char_length = count_1_2_3_sequences(&data);
        let mut nclob = Self {
            am_conn_core: am_conn_core.clone(),
            o_am_rscore: o_am_rscore.clone(),
            is_data_complete,
            total_char_length,
            total_byte_length,
            locator_id,
            utf8: DebugIgnore::from(String::new()),
            cesu8_tail: DebugIgnore::from(Vec::new()),
            acc_byte_length,
            acc_char_length,
        };
        nclob.digest_chunk(data)?;
        Ok(nclob)
    }

    /// Total length of the value on the server, in bytes.
    pub fn total_byte_length(&self) -> u64 {
        self.total_byte_length
    }

    /// Total length of the value on the server, in 1-2-3-byte sequences.
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
        while !self.is_data_complete {
            self.fetch_next_chunk()?;
        }
        if !self.cesu8_tail.is_empty() {
            return Err(impl_err!("NCLob ends with incomplete CESU-8 sequence"));
        }
        Ok(self.utf8.0)
    }

    // Appends the decodable prefix of tail+chunk to self.utf8,
    // keeps the new undecodable tail.
    fn digest_chunk(&mut self, chunk: Vec<u8>) -> HdbResult<()> {
        let mut cesu8 = std::mem::take(&mut self.cesu8_tail.0);
        cesu8.extend_from_slice(&chunk);
        let tail_len = util::cesu8_tail_len(&cesu8, cesu8.len())?;
        let tail = cesu8.split_off(cesu8.len() - tail_len);
        self.cesu8_tail.0 = tail;
        self.utf8.push_str(&util::string_from_cesu8(cesu8)?);
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn fetch_next_chunk(&mut self) -> HdbResult<()> {
        if self.is_data_complete {
            return Err(impl_err!("fetch_next_chunk(): already complete"));
        }

        let read_length = std::cmp::min(
            self.am_conn_core.lock()?.lob_read_length(),
            (self.total_char_length - self.acc_char_length as u64) as u32,
        );

        let (reply_data, reply_is_last_data) = fetch_a_lob_chunk(
            &self.am_conn_core,
            self.locator_id,
            self.acc_char_length as u64,
            read_length,
        )?;
        self.acc_byte_length += reply_data.len();
        self.acc_char_length += count_1_2_3_sequences(&reply_data);
        self.digest_chunk(reply_data)?;
        if reply_is_last_data {
            self.is_data_complete = true;
            self.o_am_rscore = None;
        }
        Ok(())
    }
}

// Each non-continuation byte starts a 1-2-3-byte sequence.
fn count_1_2_3_sequences(cesu8: &[u8]) -> usize {
    cesu8.iter().filter(|b| (**b & 0b_1100_0000) != 0b_1000_0000).count()
}

#[cfg(test)]
mod tests {
    #[test]
    fn sequence_counting() {
        // "a" = 1 sequence, "ä" = 1, a supplementary char = 2 (surrogate pair)
        assert_eq!(super::count_1_2_3_sequences("a".as_bytes()), 1);
        assert_eq!(super::count_1_2_3_sequences("ä".as_bytes()), 1);
        assert_eq!(super::count_1_2_3_sequences(&cesu8::to_cesu8("💩")), 2);
    }
}
