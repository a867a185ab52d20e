/// Statistics of a connection: the metrics sink of the driver core.
///
/// Counter and duration updates are accumulated per connection while it
/// serves requests; the application can scrape and reset them at any time.
#[derive(Debug, Clone)]
pub struct ConnectionStatistics {
    sequence_number: u32,
    reset_base: u32,
    lob_read_roundtrip_count: u32,
    lob_write_roundtrip_count: u32,
    fetch_roundtrip_count: u32,
    wait_time: std::time::Duration,
    sql_time: std::time::Duration,
    created_at: time::OffsetDateTime,
    last_reset_at: time::OffsetDateTime,
}
impl Default for ConnectionStatistics {
    fn default() -> Self {
        let timestamp = time::OffsetDateTime::now_utc();
        Self {
            created_at: timestamp,
            last_reset_at: timestamp,
            sequence_number: 0,
            reset_base: 0,
            lob_read_roundtrip_count: 0,
            lob_write_roundtrip_count: 0,
            fetch_roundtrip_count: 0,
            wait_time: std::time::Duration::default(),
            sql_time: std::time::Duration::default(),
        }
    }
}
impl ConnectionStatistics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        *self = Self {
            created_at: self.created_at,
            last_reset_at: time::OffsetDateTime::now_utc(),
            reset_base: self.sequence_number,
            sequence_number: self.sequence_number,
            ..Default::default()
        };
    }

    pub(crate) fn next_sequence_number(&mut self) -> u32 {
        self.sequence_number += 1;
        self.sequence_number
    }

    pub(crate) fn add_lob_read_roundtrip(&mut self) {
        self.lob_read_roundtrip_count += 1;
    }
    pub(crate) fn add_lob_write_roundtrip(&mut self) {
        self.lob_write_roundtrip_count += 1;
    }
    pub(crate) fn add_fetch_roundtrip(&mut self) {
        self.fetch_roundtrip_count += 1;
    }
    pub(crate) fn add_wait_time(&mut self, wait_time: std::time::Duration) {
        self.wait_time += wait_time;
    }
    pub(crate) fn add_sql_time(&mut self, sql_time: std::time::Duration) {
        self.sql_time += sql_time;
    }

    /// Returns the number of roundtrips to the database that were done
    /// through this connection since the last reset.
    pub fn call_count(&self) -> u32 {
        self.sequence_number - self.reset_base
    }

    /// Returns the number of LOB READ roundtrips since the last reset.
    pub fn lob_read_roundtrip_count(&self) -> u32 {
        self.lob_read_roundtrip_count
    }

    /// Returns the number of LOB WRITE roundtrips since the last reset.
    pub fn lob_write_roundtrip_count(&self) -> u32 {
        self.lob_write_roundtrip_count
    }

    /// Returns the number of FETCH roundtrips since the last reset.
    pub fn fetch_roundtrip_count(&self) -> u32 {
        self.fetch_roundtrip_count
    }

    /// Returns the total wait time, from start of serializing a request
    /// until receiving a reply, for all roundtrips since the last reset.
    pub fn accumulated_wait_time(&self) -> std::time::Duration {
        self.wait_time
    }

    /// Returns the server-reported processing time accumulated since the
    /// last reset.
    pub fn accumulated_sql_time(&self) -> std::time::Duration {
        self.sql_time
    }
}

impl std::fmt::Display for ConnectionStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Connection statistics")?;
        writeln!(f, "Created at:     {}", self.created_at)?;
        writeln!(f, "Last reset at:  {}", self.last_reset_at)?;
        writeln!(f, "Total number of requests: {}", self.call_count())?;
        writeln!(f, "Total wait time:          {:?}", self.wait_time)?;
        writeln!(f, "Total server time:        {:?}", self.sql_time)?;
        writeln!(
            f,
            "LOB roundtrips:           {} read, {} write",
            self.lob_read_roundtrip_count, self.lob_write_roundtrip_count
        )?;
        writeln!(f, "FETCH roundtrips:         {}", self.fetch_roundtrip_count)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::ConnectionStatistics;

    #[test]
    fn test_statistics() {
        let mut stat = ConnectionStatistics::default();
        stat.next_sequence_number();
        stat.next_sequence_number();
        stat.add_lob_read_roundtrip();
        stat.add_wait_time(std::time::Duration::from_millis(5));
        assert_eq!(stat.call_count(), 2);
        assert_eq!(stat.lob_read_roundtrip_count(), 1);

        std::thread::sleep(std::time::Duration::from_millis(10));
        stat.reset();
        assert_eq!(stat.call_count(), 0);
        assert_eq!(stat.lob_read_roundtrip_count(), 0);
        assert_ne!(stat.created_at, stat.last_reset_at);
    }
}
