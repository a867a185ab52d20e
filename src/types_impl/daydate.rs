use crate::hdb_error::impl_err;
use crate::types_impl::julian;
use crate::{HdbResult, HdbValue};
use byteorder::{LittleEndian, ReadBytesExt};

const NULL_REPRESENTATION: i32 = 3_652_062;

/// Implementation of the database type `DAYDATE`.
///
/// Carries a date with day precision, measured from 0001-01-01.
#[derive(Clone, Debug, Serialize)]
pub struct DayDate(i32);

impl std::fmt::Display for DayDate {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (year, month, day) = self.as_ymd();
        write!(fmt, "{year:04}-{month:02}-{day:02}")
    }
}

impl std::cmp::PartialEq<DayDate> for DayDate {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl DayDate {
    pub(crate) fn new(raw: i32) -> Self {
        assert!((0..NULL_REPRESENTATION).contains(&raw));
        Self(raw)
    }
    pub(crate) fn ref_raw(&self) -> &i32 {
        &self.0
    }

    /// Constructs from calendar elements (month and day are 1-based).
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_ymd(year: i32, month: u8, day: u8) -> HdbResult<Self> {
        let dn = julian::day_number_from_ymd(year, u32::from(month), u32::from(day))?;
        Ok(Self((dn - julian::ZEITENWENDE + 1) as i32))
    }

    /// Converts into a tuple of `(year, month, day)`.
    pub fn as_ymd(&self) -> (i32, u32, u32) {
        let datevalue = match self.0 {
            0 => 0, // maps the special value '' == 0 to '0001-01-01'
            v => v - 1,
        };
        julian::ymd_from_day_number(i64::from(datevalue) + julian::ZEITENWENDE)
    }

    /// Converts into a `time::Date`.
    pub fn to_date(&self) -> HdbResult<time::Date> {
        let (year, month, day) = self.as_ymd();
        #[allow(clippy::cast_possible_truncation)]
        time::Date::from_calendar_date(
            year,
            time::Month::try_from(month as u8).map_err(|_| impl_err!("illegal month"))?,
            day as u8,
        )
        .map_err(|_| impl_err!("illegal date"))
    }
}

pub(crate) fn parse_daydate(
    nullable: bool,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<HdbValue<'static>> {
    let i = rdr.read_i32::<LittleEndian>()?;
    if i == NULL_REPRESENTATION {
        if nullable {
            Ok(HdbValue::NULL)
        } else {
            Err(impl_err!("found NULL value for NOT NULL DAYDATE column"))
        }
    } else {
        Ok(HdbValue::DAYDATE(DayDate::new(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::DayDate;

    #[test]
    fn element_round_trip() {
        for (y, m, d) in [(1, 1, 1), (1582, 10, 15), (1970, 1, 1), (2024, 2, 29)] {
            let dd = DayDate::from_ymd(y, m as u8, d as u8).unwrap();
            assert_eq!(dd.as_ymd(), (y, m, d));
        }
    }

    #[test]
    fn epoch_anchor() {
        // 0001-01-01 is day 1
        assert_eq!(*DayDate::from_ymd(1, 1, 1).unwrap().ref_raw(), 1);
    }
}
