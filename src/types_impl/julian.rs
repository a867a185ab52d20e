use crate::hdb_error::impl_err;
use crate::HdbResult;

// Day number of 0001-01-01 in the hybrid (Julian/Gregorian) calendar
// that the server uses for its day-based date types.
pub(crate) const ZEITENWENDE: i64 = 1_721_424;
const JGREG: i64 = 2_299_161; // first Gregorian day, 1582-10-15

// Converts a day number into calendar elements.
// Dates before the Gregorian reform are interpreted in the Julian calendar.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_sign_loss)]
pub(crate) fn ymd_from_day_number(julian: i64) -> (i32, u32, u32) {
    let ja: i64 = if julian >= JGREG {
        let jalpha: i64 = (((julian - 1_867_216) as f64 - 0.25_f64) / 36_524.25_f64) as i64;
        julian + 1 + jalpha - ((0.25_f64 * jalpha as f64) as i64)
    } else {
        julian
    };

    let jb: i64 = ja + 1524;
    let jc: i64 = (6680_f64 + ((jb - 2_439_870) as f64 - 122.1_f64) / 365.25_f64) as i64;
    let jd: i64 = ((365 * jc) as f64 + (0.25_f64 * jc as f64)) as i64;
    let je: i64 = ((jb - jd) as f64 / 30.6001) as i64;

    let day: u32 = (jb - jd - ((30.6001 * je as f64) as i64)) as u32;
    let mut month: u32 = je as u32 - 1;
    let mut year: i32 = jc as i32 - 4715;

    if month > 12 {
        month -= 12;
    }
    if month > 2 {
        year -= 1;
    }
    if year <= 0 {
        year -= 1;
    }
    (year, month, day)
}

// Converts calendar elements into a day number (inverse of
// `ymd_from_day_number`), with the Julian/Gregorian switch at 1582-10-15.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn day_number_from_ymd(year: i32, month: u32, day: u32) -> HdbResult<i64> {
    if year == 0 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(impl_err!("illegal date elements {year}-{month}-{day}"));
    }
    let mut jy = i64::from(year);
    if jy < 0 {
        jy += 1;
    }
    let jm = if month > 2 {
        i64::from(month) + 1
    } else {
        jy -= 1;
        i64::from(month) + 13
    };

    let mut julian = (365.25_f64 * jy as f64).floor() as i64
        + (30.6001_f64 * jm as f64) as i64
        + i64::from(day)
        + 1_720_995;

    // switch to the Gregorian calendar for dates from 1582-10-15 on
    if i64::from(day) + 31 * (i64::from(month) + 12 * i64::from(year))
        >= 15 + 31 * (10 + 12 * 1582)
    {
        let ja = (0.01_f64 * jy as f64) as i64;
        julian += 2 - ja + (0.25_f64 * ja as f64) as i64;
    }
    Ok(julian)
}

#[cfg(test)]
mod tests {
    use super::{day_number_from_ymd, ymd_from_day_number, ZEITENWENDE};

    #[test]
    fn conversions_are_inverse() {
        for (y, m, d) in [
            (1, 1, 1),
            (1582, 10, 4),
            (1582, 10, 15),
            (1600, 2, 29),
            (1899, 12, 31),
            (1970, 1, 1),
            (2000, 2, 29),
            (2023, 12, 31),
            (9999, 12, 31),
        ] {
            let dn = day_number_from_ymd(y, m, d).unwrap();
            assert_eq!(ymd_from_day_number(dn), (y, m, d), "{y}-{m}-{d}");
        }
    }

    #[test]
    fn anchor_day() {
        assert_eq!(day_number_from_ymd(1, 1, 1).unwrap(), ZEITENWENDE);
    }
}
