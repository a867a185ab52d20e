use crate::hdb_error::impl_err;
use crate::types_impl::julian;
use crate::{HdbResult, HdbValue};
use byteorder::{LittleEndian, ReadBytesExt};

const NULL_REPRESENTATION: i64 = 3_155_380_704_000_000_001;
const SECOND_FACTOR: i64 = 10_000_000;
const MINUTE_FACTOR: i64 = 600_000_000; // 10_000_000 * 60;
const HOUR_FACTOR: i64 = 36_000_000_000; // 10_000_000 * 60 * 60;
const DAY_FACTOR: i64 = 864_000_000_000; // 10_000_000 * 60 * 60 * 24;

/// Implementation of the database type `LONGDATE`.
///
/// Carries a timestamp with 100ns precision, measured from 0001-01-01,
/// in UTC. The type is agnostic of timezones.
#[derive(Clone, Debug, Serialize)]
pub struct LongDate(i64);

impl std::fmt::Display for LongDate {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (year, month, day, hour, minute, second, fraction) = self.as_ymd_hms_f();
        write!(
            fmt,
            "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{fraction:07}",
        )
    }
}

impl std::cmp::PartialEq<LongDate> for LongDate {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl LongDate {
    pub(crate) fn new(raw: i64) -> Self {
        Self(raw)
    }
    pub(crate) fn ref_raw(&self) -> &i64 {
        &self.0
    }

    /// Constructs from date and time elements (month and day are 1-based,
    /// fraction is in 100ns units).
    pub fn from_ymd_hms_f(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        fraction: u32,
    ) -> HdbResult<Self> {
        let datevalue = julian::day_number_from_ymd(year, u32::from(month), u32::from(day))?
            - julian::ZEITENWENDE;
        let timevalue = i64::from(hour) * HOUR_FACTOR
            + i64::from(minute) * MINUTE_FACTOR
            + i64::from(second) * SECOND_FACTOR
            + i64::from(fraction);
        Ok(Self(datevalue * DAY_FACTOR + timevalue + 1))
    }

    /// Converts into a tuple of
    /// `(year, month, day, hour, minute, second, fraction-in-100ns)`.
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    pub fn as_ymd_hms_f(&self) -> (i32, u8, u8, u8, u8, u8, u32) {
        let value = match self.0 {
            0 => 0, // maps the special value '' == 0 to '0001-01-01 00:00:00.000000000'
            v => v - 1,
        };

        let datevalue = value / DAY_FACTOR;
        let mut timevalue = value - (datevalue * DAY_FACTOR);
        let hour: u8 = (timevalue / HOUR_FACTOR) as u8;
        timevalue -= HOUR_FACTOR * (i64::from(hour));
        let minute: u8 = (timevalue / MINUTE_FACTOR) as u8;
        timevalue -= MINUTE_FACTOR * (i64::from(minute));
        let second: u8 = (timevalue / SECOND_FACTOR) as u8;
        timevalue -= SECOND_FACTOR * (i64::from(second));
        let fraction: u32 = timevalue as u32; // 10**-7

        let (year, month, day) = julian::ymd_from_day_number(datevalue + julian::ZEITENWENDE);
        (year, month as u8, day as u8, hour, minute, second, fraction)
    }

    /// Converts into a `time::PrimitiveDateTime`, truncating the 100ns
    /// fraction to nanoseconds.
    pub fn to_primitive_date_time(&self) -> HdbResult<time::PrimitiveDateTime> {
        let (year, month, day, hour, minute, second, fraction) = self.as_ymd_hms_f();
        let date = time::Date::from_calendar_date(
            year,
            time::Month::try_from(month).map_err(|_| impl_err!("illegal month"))?,
            day,
        )
        .map_err(|_| impl_err!("illegal date"))?;
        let time = time::Time::from_hms_nano(hour, minute, second, fraction * 100)
            .map_err(|_| impl_err!("illegal time"))?;
        Ok(time::PrimitiveDateTime::new(date, time))
    }

    /// Constructs from a `time::PrimitiveDateTime` (UTC), keeping 100ns
    /// precision.
    pub fn from_primitive_date_time(ts: time::PrimitiveDateTime) -> HdbResult<Self> {
        Self::from_ymd_hms_f(
            ts.year(),
            ts.month() as u8,
            ts.day(),
            ts.hour(),
            ts.minute(),
            ts.second(),
            ts.nanosecond() / 100,
        )
    }
}

pub(crate) fn parse_longdate(
    nullable: bool,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<HdbValue<'static>> {
    let i = rdr.read_i64::<LittleEndian>()?;
    if i == NULL_REPRESENTATION {
        if nullable {
            Ok(HdbValue::NULL)
        } else {
            Err(impl_err!("found NULL value for NOT NULL LONGDATE column"))
        }
    } else {
        Ok(HdbValue::LONGDATE(LongDate::new(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::LongDate;

    #[test]
    fn element_round_trip() {
        for (y, m, d, h, min, s, f) in [
            (1, 1, 1, 0, 0, 0, 0),
            (1582, 10, 4, 12, 0, 0, 1),
            (1582, 10, 15, 0, 30, 30, 9_999_999),
            (1970, 1, 1, 0, 0, 0, 0),
            (2023, 5, 31, 23, 59, 59, 1_234_567),
            (9999, 12, 31, 23, 59, 59, 9_999_999),
        ] {
            let ld = LongDate::from_ymd_hms_f(y, m, d, h, min, s, f).unwrap();
            assert_eq!(ld.as_ymd_hms_f(), (y, m, d, h, min, s, f));
        }
    }

    #[test]
    fn hundred_ns_precision_survives_time_conversion() {
        let ld = LongDate::from_ymd_hms_f(2020, 2, 29, 13, 14, 15, 1_234_567).unwrap();
        let pdt = ld.to_primitive_date_time().unwrap();
        assert_eq!(pdt.nanosecond(), 123_456_700);
        let ld2 = LongDate::from_primitive_date_time(pdt).unwrap();
        assert_eq!(ld, ld2);
    }
}
