use crate::hdb_error::impl_err;
use crate::{HdbResult, HdbValue};
use byteorder::{LittleEndian, ReadBytesExt};

const NULL_REPRESENTATION: i32 = 86_402;

const MINUTE_FACTOR: u32 = 60;
const HOUR_FACTOR: u32 = 3_600;

/// Implementation of the database type `SECONDTIME`.
///
/// Carries a time of day with second precision.
///
/// The server maps the empty-string input to 0, all other legal values to
/// `hours * 3600 + minutes * 60 + seconds + 1 < 86400`. When reading, 0 and
/// 1 are both treated as "00:00:00".
#[derive(Clone, Debug, Serialize)]
pub struct SecondTime(u32);

impl std::fmt::Display for SecondTime {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (hour, minute, second) = self.as_hms();
        write!(fmt, "{hour:02}:{minute:02}:{second:02}")
    }
}

impl std::cmp::PartialEq<SecondTime> for SecondTime {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl SecondTime {
    #[allow(clippy::cast_sign_loss)]
    pub(crate) fn new(raw: i32) -> Self {
        assert!((0..NULL_REPRESENTATION).contains(&raw));
        Self(raw as u32)
    }

    pub(crate) fn ref_raw(&self) -> &u32 {
        &self.0
    }

    /// Constructs from time-of-day elements.
    pub fn from_hms(hour: u8, minute: u8, second: u8) -> HdbResult<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(impl_err!("illegal time elements {hour}:{minute}:{second}"));
        }
        Ok(Self(
            u32::from(hour) * HOUR_FACTOR + u32::from(minute) * MINUTE_FACTOR + u32::from(second)
                + 1,
        ))
    }

    /// Converts into a tuple of `(hour, minute, second)`.
    pub fn as_hms(&self) -> (u32, u32, u32) {
        let mut second = if self.0 == 0 { 0 } else { self.0 - 1 };
        let hour = second / HOUR_FACTOR;
        second -= HOUR_FACTOR * hour;
        let minute = second / MINUTE_FACTOR;
        second -= MINUTE_FACTOR * minute;

        (hour, minute, second)
    }
}

pub(crate) fn parse_secondtime(
    nullable: bool,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<HdbValue<'static>> {
    let i = rdr.read_i32::<LittleEndian>()?;
    if i == NULL_REPRESENTATION {
        if nullable {
            Ok(HdbValue::NULL)
        } else {
            Err(impl_err!("found NULL value for NOT NULL SECONDTIME column"))
        }
    } else {
        Ok(HdbValue::SECONDTIME(SecondTime::new(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::SecondTime;

    #[test]
    fn element_round_trip() {
        for (h, m, s) in [(0, 0, 0), (12, 30, 45), (23, 59, 59)] {
            let st = SecondTime::from_hms(h as u8, m as u8, s as u8).unwrap();
            assert_eq!(st.as_hms(), (h, m, s));
        }
    }

    #[test]
    fn wire_value_is_offset_by_one() {
        assert_eq!(*SecondTime::from_hms(0, 0, 0).unwrap().ref_raw(), 1);
        assert_eq!(*SecondTime::from_hms(23, 59, 59).unwrap().ref_raw(), 86_400);
    }
}
