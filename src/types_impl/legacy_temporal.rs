//! Wire codec for the legacy temporal types DATE, TIME, and TIMESTAMP,
//! which were deprecated with protocol version 3 but remain decodable.
//!
//! DATE (4 bytes): a little-endian u16 year whose high bit is the
//! non-null marker, a 0-based month byte, and a 1-based day byte.
//! TIME (4 bytes): an hour byte whose high bit is the non-null marker, a
//! minute byte, and a little-endian u16 millisecond value.
//! TIMESTAMP is a DATE followed by a TIME.

use crate::hdb_error::impl_err;
use crate::{HdbResult, HdbValue};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

const DATE_NOT_NULL: u16 = 0x8000;
const YEAR_MASK: u16 = 0x3FFF;
const TIME_NOT_NULL: u8 = 0x80;

/// A date in the legacy wire representation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LegacyDate {
    year: u16,
    month: u8, // 1-based
    day: u8,
}

impl LegacyDate {
    /// Constructs from calendar elements (month and day are 1-based).
    pub fn new(year: u16, month: u8, day: u8) -> HdbResult<Self> {
        if year > YEAR_MASK || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(impl_err!("illegal date elements {year}-{month}-{day}"));
        }
        Ok(Self { year, month, day })
    }

    /// Returns `(year, month, day)` with a 1-based month.
    pub fn as_ymd(&self) -> (u16, u8, u8) {
        (self.year, self.month, self.day)
    }

    pub(crate) fn emit(&self, w: &mut dyn std::io::Write) -> HdbResult<()> {
        w.write_u16::<LittleEndian>(self.year | DATE_NOT_NULL)?;
        w.write_u8(self.month - 1)?;
        w.write_u8(self.day)?;
        Ok(())
    }
}

impl std::fmt::Display for LegacyDate {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// A time of day in the legacy wire representation, with millisecond
/// precision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LegacyTime {
    hour: u8,
    minute: u8,
    millis: u16,
}

impl LegacyTime {
    /// Constructs from time elements; `millis` carries seconds and
    /// milliseconds combined (0..60000).
    pub fn new(hour: u8, minute: u8, millis: u16) -> HdbResult<Self> {
        if hour > 23 || minute > 59 || millis > 59_999 {
            return Err(impl_err!("illegal time elements {hour}:{minute}:{millis}"));
        }
        Ok(Self {
            hour,
            minute,
            millis,
        })
    }

    /// Returns `(hour, minute, milliseconds-of-minute)`.
    pub fn as_hm_millis(&self) -> (u8, u8, u16) {
        (self.hour, self.minute, self.millis)
    }

    pub(crate) fn emit(&self, w: &mut dyn std::io::Write) -> HdbResult<()> {
        w.write_u8(self.hour | TIME_NOT_NULL)?;
        w.write_u8(self.minute)?;
        w.write_u16::<LittleEndian>(self.millis)?;
        Ok(())
    }
}

impl std::fmt::Display for LegacyTime {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            fmt,
            "{:02}:{:02}:{:02}.{:03}",
            self.hour,
            self.minute,
            self.millis / 1000,
            self.millis % 1000
        )
    }
}

/// A timestamp in the legacy wire representation: a [`LegacyDate`]
/// followed by a [`LegacyTime`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LegacyTimestamp {
    date: LegacyDate,
    time: LegacyTime,
}

impl LegacyTimestamp {
    pub fn new(date: LegacyDate, time: LegacyTime) -> Self {
        Self { date, time }
    }
    pub fn date(&self) -> &LegacyDate {
        &self.date
    }
    pub fn time(&self) -> &LegacyTime {
        &self.time
    }

    pub(crate) fn emit(&self, w: &mut dyn std::io::Write) -> HdbResult<()> {
        self.date.emit(w)?;
        self.time.emit(w)
    }
}

impl std::fmt::Display for LegacyTimestamp {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}T{}", self.date, self.time)
    }
}

// Null is signalled in-band by a cleared high bit in the year field.
fn parse_date_raw(rdr: &mut dyn std::io::Read) -> HdbResult<Option<LegacyDate>> {
    let year_raw = rdr.read_u16::<LittleEndian>()?;
    let month = rdr.read_u8()?;
    let day = rdr.read_u8()?;
    if year_raw & DATE_NOT_NULL == 0 {
        Ok(None)
    } else {
        Ok(Some(LegacyDate::new(year_raw & YEAR_MASK, month + 1, day)?))
    }
}

fn parse_time_raw(rdr: &mut dyn std::io::Read) -> HdbResult<Option<LegacyTime>> {
    let hour_raw = rdr.read_u8()?;
    let minute = rdr.read_u8()?;
    let millis = rdr.read_u16::<LittleEndian>()?;
    if hour_raw & TIME_NOT_NULL == 0 {
        Ok(None)
    } else {
        Ok(Some(LegacyTime::new(hour_raw & 0x7F, minute, millis)?))
    }
}

pub(crate) fn parse_date(
    nullable: bool,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<HdbValue<'static>> {
    match parse_date_raw(rdr)? {
        Some(date) => Ok(HdbValue::DATE(date)),
        None if nullable => Ok(HdbValue::NULL),
        None => Err(impl_err!("found NULL value for NOT NULL DATE column")),
    }
}

pub(crate) fn parse_time(
    nullable: bool,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<HdbValue<'static>> {
    match parse_time_raw(rdr)? {
        Some(time) => Ok(HdbValue::TIME(time)),
        None if nullable => Ok(HdbValue::NULL),
        None => Err(impl_err!("found NULL value for NOT NULL TIME column")),
    }
}

pub(crate) fn parse_timestamp(
    nullable: bool,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<HdbValue<'static>> {
    let o_date = parse_date_raw(rdr)?;
    let o_time = parse_time_raw(rdr)?;
    match (o_date, o_time) {
        (Some(date), Some(time)) => Ok(HdbValue::TIMESTAMP(LegacyTimestamp::new(date, time))),
        _ if nullable => Ok(HdbValue::NULL),
        _ => Err(impl_err!("found NULL value for NOT NULL TIMESTAMP column")),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_date, parse_time, LegacyDate, LegacyTime};
    use crate::HdbValue;

    #[test]
    fn date_round_trip() {
        let date = LegacyDate::new(2023, 7, 16).unwrap();
        let mut buf = Vec::<u8>::new();
        date.emit(&mut buf).unwrap();
        assert_eq!(buf.len(), 4);
        assert_eq!(buf[2], 6); // month is 0-based on the wire
        let mut rdr = std::io::Cursor::new(buf);
        match parse_date(false, &mut rdr).unwrap() {
            HdbValue::DATE(d) => assert_eq!(d, date),
            v => panic!("unexpected value {v:?}"),
        }
    }

    #[test]
    fn time_round_trip_keeps_millisecond_precision() {
        let time = LegacyTime::new(13, 37, 59_123).unwrap();
        let mut buf = Vec::<u8>::new();
        time.emit(&mut buf).unwrap();
        assert_eq!(buf.len(), 4);
        let mut rdr = std::io::Cursor::new(buf);
        match parse_time(false, &mut rdr).unwrap() {
            HdbValue::TIME(t) => assert_eq!(t, time),
            v => panic!("unexpected value {v:?}"),
        }
    }

    #[test]
    fn cleared_high_bit_is_null() {
        let buf = vec![0_u8, 0, 0, 0];
        let mut rdr = std::io::Cursor::new(buf);
        assert!(matches!(
            parse_date(true, &mut rdr).unwrap(),
            HdbValue::NULL
        ));
    }
}
