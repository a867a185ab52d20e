use crate::hdb_error::impl_err;
use crate::types_impl::julian;
use crate::{HdbResult, HdbValue};
use byteorder::{LittleEndian, ReadBytesExt};

const NULL_REPRESENTATION: i64 = 315_538_070_401;

const MINUTE_FACTOR: i64 = 60;
const HOUR_FACTOR: i64 = 3_600;
const DAY_FACTOR: i64 = 86_400;

/// Implementation of the database type `SECONDDATE`.
///
/// Carries a timestamp with second precision, measured from 0001-01-01,
/// in UTC.
#[derive(Clone, Debug, Serialize)]
pub struct SecondDate(i64);

impl std::fmt::Display for SecondDate {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (year, month, day, hour, minute, second) = self.as_ymd_hms();
        write!(
            fmt,
            "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}",
        )
    }
}

impl std::cmp::PartialEq<SecondDate> for SecondDate {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl SecondDate {
    pub(crate) fn new(raw: i64) -> Self {
        Self(raw)
    }
    pub(crate) fn ref_raw(&self) -> &i64 {
        &self.0
    }

    /// Constructs from date and time elements (month and day are 1-based).
    pub fn from_ymd_hms(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> HdbResult<Self> {
        let datevalue = julian::day_number_from_ymd(year, u32::from(month), u32::from(day))?
            - julian::ZEITENWENDE;
        let timevalue = i64::from(hour) * HOUR_FACTOR
            + i64::from(minute) * MINUTE_FACTOR
            + i64::from(second);
        Ok(Self(datevalue * DAY_FACTOR + timevalue + 1))
    }

    /// Converts into a tuple of `(year, month, day, hour, minute, second)`.
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    pub fn as_ymd_hms(&self) -> (i32, u8, u8, u8, u8, u8) {
        let value = match self.0 {
            0 => 0,
            v => v - 1,
        };

        let datevalue = value / DAY_FACTOR;
        let mut timevalue = value - (datevalue * DAY_FACTOR);
        let hour: u8 = (timevalue / HOUR_FACTOR) as u8;
        timevalue -= HOUR_FACTOR * (i64::from(hour));
        let minute: u8 = (timevalue / MINUTE_FACTOR) as u8;
        timevalue -= MINUTE_FACTOR * (i64::from(minute));
        let second: u8 = timevalue as u8;

        let (year, month, day) = julian::ymd_from_day_number(datevalue + julian::ZEITENWENDE);
        (year, month as u8, day as u8, hour, minute, second)
    }
}

pub(crate) fn parse_seconddate(
    nullable: bool,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<HdbValue<'static>> {
    let i = rdr.read_i64::<LittleEndian>()?;
    if i == NULL_REPRESENTATION {
        if nullable {
            Ok(HdbValue::NULL)
        } else {
            Err(impl_err!("found NULL value for NOT NULL SECONDDATE column"))
        }
    } else {
        Ok(HdbValue::SECONDDATE(SecondDate::new(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::SecondDate;

    #[test]
    fn element_round_trip() {
        for (y, m, d, h, min, s) in [
            (1, 1, 1, 0, 0, 0),
            (1970, 1, 1, 0, 0, 1),
            (2023, 6, 15, 23, 59, 59),
        ] {
            let sd = SecondDate::from_ymd_hms(y, m, d, h, min, s).unwrap();
            assert_eq!(sd.as_ymd_hms(), (y, m, d, h, min, s));
        }
    }
}
