/// Runtime-relevant configuration of a connection.
#[derive(Debug, Clone)]
pub struct ConnectionConfiguration {
    auto_commit: bool,
    fetch_size: u32,
    lob_read_length: u32,
    lob_write_length: usize,
    bulk_size: usize,
}

impl Default for ConnectionConfiguration {
    fn default() -> Self {
        Self {
            auto_commit: true,
            fetch_size: crate::DEFAULT_FETCH_SIZE,
            lob_read_length: crate::DEFAULT_LOB_READ_LENGTH,
            lob_write_length: crate::DEFAULT_LOB_WRITE_LENGTH,
            bulk_size: Self::DEFAULT_BULK_SIZE,
        }
    }
}

impl ConnectionConfiguration {
    /// Default number of rows of a bulk execution that are sent to the
    /// server in a single roundtrip.
    pub const DEFAULT_BULK_SIZE: usize = 10_000;

    /// Returns whether the connection uses auto-commit.
    pub fn is_auto_commit(&self) -> bool {
        self.auto_commit
    }
    /// Defines whether the connection should use auto-commit.
    pub fn set_auto_commit(&mut self, ac: bool) {
        self.auto_commit = ac;
    }
    /// Builder-method for defining whether the connection should use
    /// auto-commit.
    #[must_use]
    pub fn with_auto_commit(mut self, ac: bool) -> Self {
        self.auto_commit = ac;
        self
    }

    /// Returns the connection's fetch size.
    pub fn fetch_size(&self) -> u32 {
        self.fetch_size
    }
    /// Sets the connection's fetch size.
    pub fn set_fetch_size(&mut self, fetch_size: u32) {
        self.fetch_size = fetch_size;
    }
    /// Builder-method for setting the connection's fetch size.
    #[must_use]
    pub fn with_fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = fetch_size;
        self
    }

    /// Returns the connection's lob read length.
    pub fn lob_read_length(&self) -> u32 {
        self.lob_read_length
    }
    /// Sets the connection's lob read length.
    pub fn set_lob_read_length(&mut self, lob_read_length: u32) {
        self.lob_read_length = lob_read_length;
    }
    /// Builder-method for setting the connection's lob read length.
    #[must_use]
    pub fn with_lob_read_length(mut self, lob_read_length: u32) -> Self {
        self.lob_read_length = lob_read_length;
        self
    }

    /// Returns the connection's lob write length.
    pub fn lob_write_length(&self) -> usize {
        self.lob_write_length
    }
    /// Sets the connection's lob write length.
    pub fn set_lob_write_length(&mut self, lob_write_length: usize) {
        self.lob_write_length = lob_write_length;
    }
    /// Builder-method for setting the connection's lob write length.
    #[must_use]
    pub fn with_lob_write_length(mut self, lob_write_length: usize) -> Self {
        self.lob_write_length = lob_write_length;
        self
    }

    /// Returns the number of rows of a bulk execution that are sent to the
    /// server in a single roundtrip.
    pub fn bulk_size(&self) -> usize {
        self.bulk_size
    }
    /// Sets the connection's bulk size.
    pub fn set_bulk_size(&mut self, bulk_size: usize) {
        self.bulk_size = std::cmp::max(bulk_size, 1);
    }
    /// Builder-method for setting the connection's bulk size.
    #[must_use]
    pub fn with_bulk_size(mut self, bulk_size: usize) -> Self {
        self.set_bulk_size(bulk_size);
        self
    }
}
