use crate::conn::AmConnCore;
use crate::hdb_error::{impl_err, usage_err};
use crate::protocol::parts::resultset::OAmRsCore;
use crate::protocol::parts::{length_indicator, ParameterDescriptor, TypeId};
use crate::protocol::{util, util_sync};
use crate::types::{
    BLob, CLob, DayDate, LegacyDate, LegacyTime, LegacyTimestamp, LongDate, NCLob, SecondDate,
    SecondTime,
};
use crate::types_impl::{
    daydate::parse_daydate, decimal, legacy_temporal, lob, longdate::parse_longdate,
    seconddate::parse_seconddate, secondtime::parse_secondtime,
};
use crate::{HdbError, HdbResult};
use bigdecimal::BigDecimal;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

const ALPHANUM_PURELY_NUMERIC: u8 = 0b_1000_0000_u8;
const ALPHANUM_LENGTH_MASK: u8 = 0b_0111_1111_u8;

/// Enum for all supported database value types.
#[allow(non_camel_case_types)]
pub enum HdbValue<'a> {
    /// Representation of a database NULL value.
    NULL,
    /// Stores an 8-bit unsigned integer.
    TINYINT(u8),
    /// Stores a 16-bit signed integer.
    SMALLINT(i16),
    /// Stores a 32-bit signed integer.
    INT(i32),
    /// Stores a 64-bit signed integer.
    BIGINT(i64),

    /// Representation for fixed-point decimal values.
    DECIMAL(BigDecimal),

    /// Stores a single-precision 32-bit floating-point number.
    REAL(f32),
    /// Stores a double-precision 64-bit floating-point number.
    DOUBLE(f64),
    /// Stores binary data.
    BINARY(Vec<u8>),

    /// Stores a large ASCII character string.
    CLOB(CLob),
    /// Stores a large Unicode string.
    NCLOB(NCLob),
    /// Stores a large binary string.
    BLOB(BLob),

    /// Used for streaming LOBs to the database (see
    /// [`PreparedStatement::execute_row()`](crate::PreparedStatement::execute_row)).
    LOBSTREAM(Option<std::sync::Arc<std::sync::Mutex<dyn std::io::Read + Send>>>),

    /// BOOLEAN stores boolean values, which are TRUE or FALSE.
    BOOLEAN(bool),

    /// The database returns all valid Strings as type STRING, independent
    /// of the concrete column type.
    STRING(String),

    /// In rare cases, when the database sends invalid CESU-8, we fall back
    /// to this type.
    DBSTRING(Vec<u8>),

    /// Can be used to avoid cloning when sending large Strings to the
    /// database.
    STR(&'a str),

    /// Legacy date with day precision.
    DATE(LegacyDate),
    /// Legacy time with millisecond precision.
    TIME(LegacyTime),
    /// Legacy timestamp with millisecond precision.
    TIMESTAMP(LegacyTimestamp),

    /// Timestamp with 10^-7 seconds precision, uses eight bytes.
    LONGDATE(LongDate),
    /// TIMESTAMP with second precision.
    SECONDDATE(SecondDate),
    /// DATE with day precision.
    DAYDATE(DayDate),
    /// TIME with second precision.
    SECONDTIME(SecondTime),
}

impl<'a> HdbValue<'a> {
    pub(crate) fn type_id_for_emit(&self, requested_type_id: TypeId) -> HdbResult<TypeId> {
        Ok(match *self {
            HdbValue::NULL => requested_type_id,

            HdbValue::TINYINT(_) => TypeId::TINYINT,
            HdbValue::SMALLINT(_) => TypeId::SMALLINT,
            HdbValue::INT(_) => TypeId::INT,
            HdbValue::BIGINT(_) => TypeId::BIGINT,
            HdbValue::DECIMAL(_) => match requested_type_id {
                TypeId::FIXED8 | TypeId::FIXED12 | TypeId::FIXED16 | TypeId::DECIMAL => {
                    requested_type_id
                }
                _ => {
                    return Err(impl_err!(
                        "Can't send DECIMAL for requested type {requested_type_id:?}"
                    ));
                }
            },
            HdbValue::REAL(_) => TypeId::REAL,
            HdbValue::DOUBLE(_) => TypeId::DOUBLE,

            HdbValue::BLOB(_) | HdbValue::CLOB(_) | HdbValue::NCLOB(_) | HdbValue::LOBSTREAM(_) => {
                requested_type_id
            }

            HdbValue::BOOLEAN(_) => TypeId::BOOLEAN,
            HdbValue::STR(_) | HdbValue::STRING(_) => TypeId::STRING,
            HdbValue::DATE(_) => TypeId::DATE,
            HdbValue::TIME(_) => TypeId::TIME,
            HdbValue::TIMESTAMP(_) => TypeId::TIMESTAMP,
            HdbValue::LONGDATE(_) => TypeId::LONGDATE,
            HdbValue::SECONDDATE(_) => TypeId::SECONDDATE,
            HdbValue::DAYDATE(_) => TypeId::DAYDATE,
            HdbValue::SECONDTIME(_) => TypeId::SECONDTIME,
            HdbValue::BINARY(_) => TypeId::BINARY,
            HdbValue::DBSTRING(_) => {
                return Err(usage_err!("Can't send DBSTRINGs to the database"))
            }
        })
    }

    /// Returns true if the value is a NULL value.
    pub fn is_null(&self) -> bool {
        matches!(*self, HdbValue::NULL)
    }

    /// Converts the value into the form requested by the given parameter
    /// field, with range checks, so that conversion errors surface before
    /// anything is sent to the server.
    pub(crate) fn into_field_form(self, descriptor: &ParameterDescriptor) -> HdbResult<Self> {
        let target = descriptor.type_id();
        Ok(match (self, target) {
            (HdbValue::NULL, _) => HdbValue::NULL,

            // integer narrowing and widening, range-checked
            (v @ HdbValue::TINYINT(_), TypeId::TINYINT)
            | (v @ HdbValue::SMALLINT(_), TypeId::SMALLINT)
            | (v @ HdbValue::INT(_), TypeId::INT)
            | (v @ HdbValue::BIGINT(_), TypeId::BIGINT) => v,
            (v, TypeId::TINYINT) if v.is_integer_like() => HdbValue::TINYINT(
                u8::try_from(v.as_i64()?)
                    .map_err(|_| HdbError::Conversion("integer out of range for TINYINT"))?,
            ),
            (v, TypeId::SMALLINT) if v.is_integer_like() => HdbValue::SMALLINT(
                i16::try_from(v.as_i64()?)
                    .map_err(|_| HdbError::Conversion("integer out of range for SMALLINT"))?,
            ),
            (v, TypeId::INT) if v.is_integer_like() => HdbValue::INT(
                i32::try_from(v.as_i64()?)
                    .map_err(|_| HdbError::Conversion("integer out of range for INT"))?,
            ),
            (v, TypeId::BIGINT) if v.is_integer_like() => HdbValue::BIGINT(v.as_i64()?),

            (v @ HdbValue::REAL(_), TypeId::REAL) => v,
            (HdbValue::DOUBLE(d), TypeId::REAL) => {
                if d.is_finite() && d.abs() > f64::from(f32::MAX) {
                    return Err(HdbError::Conversion("float out of range for REAL"));
                }
                #[allow(clippy::cast_possible_truncation)]
                HdbValue::REAL(d as f32)
            }
            (HdbValue::REAL(f), TypeId::DOUBLE) => HdbValue::DOUBLE(f64::from(f)),
            (v @ HdbValue::DOUBLE(_), TypeId::DOUBLE) => v,

            // everything else must already match; type_id_for_emit and
            // matches_value_type do the remaining policing
            (v, _) => v,
        })
    }

    fn is_integer_like(&self) -> bool {
        matches!(
            self,
            HdbValue::TINYINT(_)
                | HdbValue::SMALLINT(_)
                | HdbValue::INT(_)
                | HdbValue::BIGINT(_)
                | HdbValue::BOOLEAN(_)
        )
    }

    fn as_i64(&self) -> HdbResult<i64> {
        match self {
            HdbValue::TINYINT(u) => Ok(i64::from(*u)),
            HdbValue::SMALLINT(i) => Ok(i64::from(*i)),
            HdbValue::INT(i) => Ok(i64::from(*i)),
            HdbValue::BIGINT(i) => Ok(*i),
            HdbValue::BOOLEAN(b) => Ok(i64::from(*b)),
            _ => Err(HdbError::Conversion("not an integer value")),
        }
    }

    pub(crate) fn emit(
        &self,
        data_pos: &mut i32,
        descriptor: &ParameterDescriptor,
        w: &mut dyn std::io::Write,
    ) -> HdbResult<()> {
        if !self.emit_type_id(descriptor.type_id(), w)? {
            match *self {
                HdbValue::NULL => {}
                HdbValue::TINYINT(u) => w.write_u8(u)?,
                HdbValue::SMALLINT(i) => w.write_i16::<LittleEndian>(i)?,
                HdbValue::INT(i) => w.write_i32::<LittleEndian>(i)?,
                HdbValue::BIGINT(i) => w.write_i64::<LittleEndian>(i)?,
                HdbValue::DECIMAL(ref bigdec) => {
                    decimal::emit(bigdec, descriptor.type_id(), descriptor.scale(), w)?;
                }
                HdbValue::REAL(f) => w.write_f32::<LittleEndian>(f)?,
                HdbValue::DOUBLE(f) => w.write_f64::<LittleEndian>(f)?,
                HdbValue::BOOLEAN(b) => emit_bool(b, w)?,
                HdbValue::DATE(ref date) => date.emit(w)?,
                HdbValue::TIME(ref time) => time.emit(w)?,
                HdbValue::TIMESTAMP(ref ts) => ts.emit(w)?,
                HdbValue::LONGDATE(ref ld) => w.write_i64::<LittleEndian>(*ld.ref_raw())?,
                HdbValue::SECONDDATE(ref sd) => w.write_i64::<LittleEndian>(*sd.ref_raw())?,
                HdbValue::DAYDATE(ref dd) => w.write_i32::<LittleEndian>(*dd.ref_raw())?,
                HdbValue::SECONDTIME(ref st) => w.write_u32::<LittleEndian>(*st.ref_raw())?,

                HdbValue::LOBSTREAM(None) => lob::wire::emit_lob_header(0, data_pos, w)?,
                HdbValue::STR(s) => emit_length_and_string(s, w)?,
                HdbValue::STRING(ref s) => emit_length_and_string(s, w)?,
                HdbValue::BINARY(ref v) => emit_length_and_bytes(v, w)?,
                _ => {
                    return Err(impl_err!("HdbValue::{self} cannot be sent to the database"));
                }
            }
        }
        Ok(())
    }

    // emits the type-id; returns true if the value is a null value
    fn emit_type_id(&self, requested_type_id: TypeId, w: &mut dyn std::io::Write) -> HdbResult<bool> {
        let is_null = self.is_null();
        let type_code = self.type_id_for_emit(requested_type_id)?.type_code(is_null);
        w.write_u8(type_code)?;
        Ok(is_null)
    }

    // is used to calculate the part size (in emit())
    pub(crate) fn size(&self, type_id: TypeId) -> HdbResult<usize> {
        Ok(1 + match self {
            HdbValue::NULL => 0,
            HdbValue::BOOLEAN(_) | HdbValue::TINYINT(_) => 1,
            HdbValue::SMALLINT(_) => 2,
            HdbValue::DECIMAL(_) => match type_id {
                TypeId::FIXED8 => 8,
                TypeId::FIXED12 => 12,
                TypeId::FIXED16 | TypeId::DECIMAL => 16,
                tid => {
                    return Err(impl_err!("invalid TypeId {tid:?} for DECIMAL"));
                }
            },

            HdbValue::INT(_)
            | HdbValue::REAL(_)
            | HdbValue::DATE(_)
            | HdbValue::TIME(_)
            | HdbValue::DAYDATE(_)
            | HdbValue::SECONDTIME(_) => 4,

            HdbValue::BIGINT(_)
            | HdbValue::DOUBLE(_)
            | HdbValue::TIMESTAMP(_)
            | HdbValue::LONGDATE(_)
            | HdbValue::SECONDDATE(_) => 8,

            HdbValue::LOBSTREAM(None) => 9,
            HdbValue::STR(s) => binary_length(util::cesu8_length(s)),
            HdbValue::STRING(ref s) => binary_length(util::cesu8_length(s)),
            HdbValue::BINARY(ref v) => binary_length(v.len()),

            HdbValue::BLOB(_)
            | HdbValue::CLOB(_)
            | HdbValue::NCLOB(_)
            | HdbValue::LOBSTREAM(Some(_))
            | HdbValue::DBSTRING(_) => {
                return Err(impl_err!("size(): can't send {self:?} directly to the database"));
            }
        })
    }
}

impl HdbValue<'static> {
    /// Convert into `BLob`.
    pub fn try_into_blob(self) -> HdbResult<BLob> {
        match self {
            HdbValue::BLOB(blob) => Ok(blob),
            v => Err(usage_err!("The value {v:?} cannot be converted into a BLOB")),
        }
    }

    /// Convert into `CLob`.
    pub fn try_into_clob(self) -> HdbResult<CLob> {
        match self {
            HdbValue::CLOB(clob) => Ok(clob),
            v => Err(usage_err!("The value {v:?} cannot be converted into a CLOB")),
        }
    }

    /// Convert into `NCLob`.
    pub fn try_into_nclob(self) -> HdbResult<NCLob> {
        match self {
            HdbValue::NCLOB(nclob) => Ok(nclob),
            v => Err(usage_err!(
                "The database value {v:?} cannot be converted into a NCLob"
            )),
        }
    }

    pub(crate) fn parse(
        type_id: TypeId,
        scale: i16,
        nullable: bool,
        dfv: u8,
        am_conn_core: &AmConnCore,
        o_am_rscore: &OAmRsCore,
        rdr: &mut dyn std::io::Read,
    ) -> HdbResult<HdbValue<'static>> {
        let t = type_id;
        match t {
            TypeId::TINYINT => parse_tinyint(nullable, rdr),
            TypeId::SMALLINT => parse_smallint(nullable, rdr),
            TypeId::INT => parse_int(nullable, rdr),
            TypeId::BIGINT => parse_bigint(nullable, rdr),
            TypeId::REAL => parse_real(nullable, rdr),
            TypeId::DOUBLE => parse_double(nullable, rdr),

            TypeId::BOOLEAN => parse_bool(nullable, rdr),

            TypeId::DECIMAL | TypeId::FIXED8 | TypeId::FIXED12 | TypeId::FIXED16 => {
                decimal::parse(nullable, t, scale, rdr)
            }

            TypeId::CHAR
            | TypeId::VARCHAR
            | TypeId::NCHAR
            | TypeId::NVARCHAR
            | TypeId::STRING
            | TypeId::NSTRING
            | TypeId::SHORTTEXT => parse_string(nullable, t, rdr),

            TypeId::ALPHANUM => parse_alphanum(nullable, dfv, rdr),

            TypeId::BINARY | TypeId::VARBINARY | TypeId::BSTRING => parse_binary(nullable, t, rdr),

            TypeId::BLOCATOR => Err(HdbError::Impl("parsing BLOCATOR not implemented")),
            TypeId::BLOB | TypeId::BINTEXT => {
                lob::wire::parse_blob(am_conn_core, o_am_rscore, nullable, rdr)
            }
            TypeId::CLOB => lob::wire::parse_clob(am_conn_core, o_am_rscore, nullable, rdr),
            TypeId::NCLOB | TypeId::TEXT => {
                lob::wire::parse_nclob(am_conn_core, o_am_rscore, nullable, t, rdr)
            }

            TypeId::DATE => legacy_temporal::parse_date(nullable, rdr),
            TypeId::TIME => legacy_temporal::parse_time(nullable, rdr),
            TypeId::TIMESTAMP => legacy_temporal::parse_timestamp(nullable, rdr),
            TypeId::LONGDATE => parse_longdate(nullable, rdr),
            TypeId::SECONDDATE => parse_seconddate(nullable, rdr),
            TypeId::DAYDATE => parse_daydate(nullable, rdr),
            TypeId::SECONDTIME => parse_secondtime(nullable, rdr),
        }
    }
}

fn emit_bool(b: bool, w: &mut dyn std::io::Write) -> HdbResult<()> {
    // 0x00 = FALSE, 0x01 = NULL, 0x02 = TRUE
    w.write_u8(2 * u8::from(b))?;
    Ok(())
}

// Reads the null indicator byte and
// - returns Ok(true) if the value is NULL
// - returns Ok(false) if a normal value is to be expected
// - throws an error if NULL is found but nullable is false
fn parse_null(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<bool> {
    let is_null = rdr.read_u8()? == 0;
    if is_null && !nullable {
        Err(HdbError::Impl("found null value for not-null column"))
    } else {
        Ok(is_null)
    }
}

fn parse_tinyint(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<HdbValue<'static>> {
    Ok(if parse_null(nullable, rdr)? {
        HdbValue::NULL
    } else {
        HdbValue::TINYINT(rdr.read_u8()?)
    })
}

fn parse_smallint(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<HdbValue<'static>> {
    Ok(if parse_null(nullable, rdr)? {
        HdbValue::NULL
    } else {
        HdbValue::SMALLINT(rdr.read_i16::<LittleEndian>()?)
    })
}

fn parse_int(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<HdbValue<'static>> {
    Ok(if parse_null(nullable, rdr)? {
        HdbValue::NULL
    } else {
        HdbValue::INT(rdr.read_i32::<LittleEndian>()?)
    })
}

fn parse_bigint(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<HdbValue<'static>> {
    Ok(if parse_null(nullable, rdr)? {
        HdbValue::NULL
    } else {
        HdbValue::BIGINT(rdr.read_i64::<LittleEndian>()?)
    })
}

// The NULL representation of REAL is all-bits-set.
fn parse_real(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<HdbValue<'static>> {
    let mut vec = vec![0_u8; 4];
    rdr.read_exact(&mut vec[..])?;
    let mut cursor = std::io::Cursor::new(&vec);
    let tmp = cursor.read_u32::<LittleEndian>()?;
    if tmp == u32::MAX {
        if nullable {
            Ok(HdbValue::NULL)
        } else {
            Err(HdbError::Impl("found NULL value for NOT NULL column"))
        }
    } else {
        cursor.set_position(0);
        Ok(HdbValue::REAL(cursor.read_f32::<LittleEndian>()?))
    }
}

fn parse_double(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<HdbValue<'static>> {
    let mut vec = vec![0_u8; 8];
    rdr.read_exact(&mut vec[..])?;
    let mut cursor = std::io::Cursor::new(&vec);
    let tmp = cursor.read_u64::<LittleEndian>()?;
    if tmp == u64::MAX {
        if nullable {
            Ok(HdbValue::NULL)
        } else {
            Err(HdbError::Impl("found NULL value for NOT NULL column"))
        }
    } else {
        cursor.set_position(0);
        Ok(HdbValue::DOUBLE(cursor.read_f64::<LittleEndian>()?))
    }
}

fn parse_bool(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<HdbValue<'static>> {
    // 0x00 = FALSE, 0x01 = NULL, 0x02 = TRUE
    match rdr.read_u8()? {
        0 => Ok(HdbValue::BOOLEAN(false)),
        2 => Ok(HdbValue::BOOLEAN(true)),
        1 => {
            if nullable {
                Ok(HdbValue::NULL)
            } else {
                Err(HdbError::Impl("parse_bool: got null value"))
            }
        }
        i => Err(impl_err!("parse_bool: got bad value {i}")),
    }
}

fn parse_alphanum(
    nullable: bool,
    dfv: u8,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<HdbValue<'static>> {
    let indicator1 = rdr.read_u8()?;
    if indicator1 == length_indicator::LENGTH_INDICATOR_NULL {
        if nullable {
            Ok(HdbValue::NULL)
        } else {
            Err(HdbError::Impl("found NULL value for NOT NULL ALPHANUM column"))
        }
    } else if dfv < 4 {
        // baseline data format: plain bytes, no marker byte
        let value = util_sync::parse_bytes(indicator1 as usize, rdr)?;
        Ok(HdbValue::STRING(util::string_from_cesu8(value)?))
    } else {
        let data_length = indicator1 - 1; // the marker byte is included

        let indicator2 = rdr.read_u8()?;
        let mut value = util_sync::parse_bytes(data_length as usize, rdr)?;

        let s = util::string_from_cesu8(if indicator2 & ALPHANUM_PURELY_NUMERIC == 0 {
            // no prefix
            value
        } else {
            // purely numeric -> prefix with leading zeros
            let field_length = indicator2 & ALPHANUM_LENGTH_MASK;
            let mut prefix: Vec<u8> = std::iter::repeat(b'0')
                .take((field_length - data_length) as usize)
                .collect();
            prefix.append(&mut value);
            prefix
        })?;
        Ok(HdbValue::STRING(s))
    }
}

fn parse_string(
    nullable: bool,
    type_id: TypeId,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<HdbValue<'static>> {
    let l8 = rdr.read_u8()?; // B1
    let is_null = l8 == length_indicator::LENGTH_INDICATOR_NULL;

    if is_null {
        if nullable {
            Ok(HdbValue::NULL)
        } else {
            Err(HdbError::Impl("found NULL value for NOT NULL string column"))
        }
    } else {
        Ok(match type_id {
            TypeId::CHAR
            | TypeId::VARCHAR
            | TypeId::NCHAR
            | TypeId::NVARCHAR
            | TypeId::NSTRING
            | TypeId::SHORTTEXT
            | TypeId::STRING => {
                // In most cases we get correct cesu-8;
                // if cesu8-decoding fails, we try utf8, and if that fails
                // too, we make the original bytes accessible
                match util::try_string_from_cesu8(parse_length_and_bytes(l8, rdr)?) {
                    Ok(s) => HdbValue::STRING(s),
                    Err(v) => match String::from_utf8(v) {
                        Ok(s) => HdbValue::STRING(s),
                        Err(e) => HdbValue::DBSTRING(e.into_bytes()),
                    },
                }
            }
            _ => return Err(HdbError::Impl("unexpected type id for string")),
        })
    }
}

fn parse_binary(
    nullable: bool,
    type_id: TypeId,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<HdbValue<'static>> {
    let l8 = rdr.read_u8()?; // B1
    let is_null = l8 == length_indicator::LENGTH_INDICATOR_NULL;

    if is_null {
        if nullable {
            Ok(HdbValue::NULL)
        } else {
            Err(HdbError::Impl("found NULL value for NOT NULL binary column"))
        }
    } else {
        let bytes = parse_length_and_bytes(l8, rdr)?;
        Ok(match type_id {
            TypeId::BSTRING | TypeId::VARBINARY | TypeId::BINARY => HdbValue::BINARY(bytes),
            _ => return Err(HdbError::Impl("unexpected type id for binary")),
        })
    }
}

fn parse_length_and_bytes(l8: u8, rdr: &mut dyn std::io::Read) -> HdbResult<Vec<u8>> {
    let len = length_indicator::parse(l8, rdr)?;
    util_sync::parse_bytes(len, rdr)
}

pub(crate) fn string_length<S: AsRef<str>>(s: S) -> usize {
    binary_length(util::cesu8_length(s.as_ref()))
}

pub(crate) fn binary_length(l: usize) -> usize {
    match l {
        l if l <= length_indicator::MAX_1_BYTE_LENGTH as usize => 1 + l,
        l if l <= length_indicator::MAX_2_BYTE_LENGTH as usize => 3 + l,
        l => 5 + l,
    }
}

pub(crate) fn emit_length_and_string<S: AsRef<str>>(
    s: S,
    w: &mut dyn std::io::Write,
) -> HdbResult<()> {
    emit_length_and_bytes(&cesu8::to_cesu8(s.as_ref()), w)
}

fn emit_length_and_bytes(v: &[u8], w: &mut dyn std::io::Write) -> HdbResult<()> {
    length_indicator::emit(v.len(), w)?;
    w.write_all(v)?;
    Ok(())
}

// host-value conversions into the driver's value type

impl From<u8> for HdbValue<'static> {
    fn from(u: u8) -> Self {
        HdbValue::TINYINT(u)
    }
}
impl From<i16> for HdbValue<'static> {
    fn from(i: i16) -> Self {
        HdbValue::SMALLINT(i)
    }
}
impl From<i32> for HdbValue<'static> {
    fn from(i: i32) -> Self {
        HdbValue::INT(i)
    }
}
impl From<i64> for HdbValue<'static> {
    fn from(i: i64) -> Self {
        HdbValue::BIGINT(i)
    }
}
impl From<f32> for HdbValue<'static> {
    fn from(f: f32) -> Self {
        HdbValue::REAL(f)
    }
}
impl From<f64> for HdbValue<'static> {
    fn from(f: f64) -> Self {
        HdbValue::DOUBLE(f)
    }
}
impl From<bool> for HdbValue<'static> {
    fn from(b: bool) -> Self {
        HdbValue::BOOLEAN(b)
    }
}
impl From<String> for HdbValue<'static> {
    fn from(s: String) -> Self {
        HdbValue::STRING(s)
    }
}
impl From<Vec<u8>> for HdbValue<'static> {
    fn from(v: Vec<u8>) -> Self {
        HdbValue::BINARY(v)
    }
}
impl From<BigDecimal> for HdbValue<'static> {
    fn from(bd: BigDecimal) -> Self {
        HdbValue::DECIMAL(bd)
    }
}
impl<'a> From<&'a str> for HdbValue<'a> {
    fn from(s: &'a str) -> Self {
        HdbValue::STR(s)
    }
}
impl<T> From<Option<T>> for HdbValue<'static>
where
    T: Into<HdbValue<'static>>,
{
    fn from(o: Option<T>) -> Self {
        match o {
            Some(v) => v.into(),
            None => HdbValue::NULL,
        }
    }
}

// An unsigned 64-bit host value with the top bit set does not fit into any
// signed field type.
impl TryFrom<u64> for HdbValue<'static> {
    type Error = HdbError;
    fn try_from(u: u64) -> HdbResult<Self> {
        i64::try_from(u)
            .map(HdbValue::BIGINT)
            .map_err(|_| HdbError::Conversion("unsigned 64-bit value out of range"))
    }
}

// typed access to result values

impl TryFrom<HdbValue<'static>> for i64 {
    type Error = HdbError;
    fn try_from(value: HdbValue<'static>) -> HdbResult<Self> {
        value.as_i64()
    }
}
impl TryFrom<HdbValue<'static>> for i32 {
    type Error = HdbError;
    fn try_from(value: HdbValue<'static>) -> HdbResult<Self> {
        i32::try_from(value.as_i64()?)
            .map_err(|_| HdbError::Conversion("integer out of range for i32"))
    }
}
impl TryFrom<HdbValue<'static>> for u8 {
    type Error = HdbError;
    fn try_from(value: HdbValue<'static>) -> HdbResult<Self> {
        u8::try_from(value.as_i64()?)
            .map_err(|_| HdbError::Conversion("integer out of range for u8"))
    }
}
impl TryFrom<HdbValue<'static>> for bool {
    type Error = HdbError;
    fn try_from(value: HdbValue<'static>) -> HdbResult<Self> {
        match value {
            HdbValue::BOOLEAN(b) => Ok(b),
            _ => Err(HdbError::Conversion("not a BOOLEAN value")),
        }
    }
}
impl TryFrom<HdbValue<'static>> for f64 {
    type Error = HdbError;
    fn try_from(value: HdbValue<'static>) -> HdbResult<Self> {
        match value {
            HdbValue::REAL(f) => Ok(f64::from(f)),
            HdbValue::DOUBLE(f) => Ok(f),
            _ => Err(HdbError::Conversion("not a floating-point value")),
        }
    }
}
impl TryFrom<HdbValue<'static>> for String {
    type Error = HdbError;
    fn try_from(value: HdbValue<'static>) -> HdbResult<Self> {
        match value {
            HdbValue::STRING(s) => Ok(s),
            HdbValue::CLOB(clob) => clob.into_string(),
            HdbValue::NCLOB(nclob) => nclob.into_string(),
            v => Ok(v.to_string()),
        }
    }
}
impl TryFrom<HdbValue<'static>> for Vec<u8> {
    type Error = HdbError;
    fn try_from(value: HdbValue<'static>) -> HdbResult<Self> {
        match value {
            HdbValue::BINARY(v) | HdbValue::DBSTRING(v) => Ok(v),
            HdbValue::BLOB(blob) => blob.into_bytes(),
            HdbValue::STRING(s) => Ok(s.into_bytes()),
            _ => Err(HdbError::Conversion("not a binary value")),
        }
    }
}
impl TryFrom<HdbValue<'static>> for BigDecimal {
    type Error = HdbError;
    fn try_from(value: HdbValue<'static>) -> HdbResult<Self> {
        match value {
            HdbValue::DECIMAL(bd) => Ok(bd),
            _ => Err(HdbError::Conversion("not a DECIMAL value")),
        }
    }
}

impl std::fmt::Display for HdbValue<'_> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            HdbValue::NULL => write!(fmt, "<NULL>"),
            HdbValue::TINYINT(value) => write!(fmt, "{value}"),
            HdbValue::SMALLINT(value) => write!(fmt, "{value}"),
            HdbValue::INT(value) => write!(fmt, "{value}"),
            HdbValue::BIGINT(value) => write!(fmt, "{value}"),
            HdbValue::DECIMAL(ref value) => write!(fmt, "{value}"),
            HdbValue::REAL(value) => write!(fmt, "{value}"),
            HdbValue::DOUBLE(value) => write!(fmt, "{value}"),
            HdbValue::STR(value) => {
                if value.len() < 10_000 {
                    write!(fmt, "{value}")
                } else {
                    write!(fmt, "<STRING length = {}>", value.len())
                }
            }
            HdbValue::STRING(ref value) => {
                if value.len() < 10_000 {
                    write!(fmt, "{value}")
                } else {
                    write!(fmt, "<STRING length = {}>", value.len())
                }
            }
            HdbValue::DBSTRING(ref bytes) => {
                if bytes.len() < 5_000 {
                    write!(fmt, "{bytes:?}")
                } else {
                    write!(fmt, "<STRING length = {}>", bytes.len())
                }
            }
            HdbValue::BINARY(ref vec) => write!(fmt, "<BINARY length = {}>", vec.len()),

            HdbValue::CLOB(ref clob) => {
                write!(fmt, "<CLOB length = {}>", clob.total_byte_length())
            }
            HdbValue::NCLOB(ref nclob) => {
                write!(fmt, "<NCLOB length = {}>", nclob.total_byte_length())
            }
            HdbValue::BLOB(ref blob) => {
                write!(fmt, "<BLOB length = {}>", blob.total_byte_length())
            }
            HdbValue::LOBSTREAM(_) => write!(fmt, "<LOBSTREAM>"),
            HdbValue::BOOLEAN(value) => write!(fmt, "{value}"),
            HdbValue::DATE(ref value) => write!(fmt, "{value}"),
            HdbValue::TIME(ref value) => write!(fmt, "{value}"),
            HdbValue::TIMESTAMP(ref value) => write!(fmt, "{value}"),
            HdbValue::LONGDATE(ref value) => write!(fmt, "{value}"),
            HdbValue::SECONDDATE(ref value) => write!(fmt, "{value}"),
            HdbValue::DAYDATE(ref value) => write!(fmt, "{value}"),
            HdbValue::SECONDTIME(ref value) => write!(fmt, "{value}"),
        }
    }
}

impl std::fmt::Debug for HdbValue<'_> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&self, fmt)
    }
}

impl std::cmp::PartialEq<i32> for HdbValue<'_> {
    fn eq(&self, rhs: &i32) -> bool {
        match self {
            HdbValue::TINYINT(i) => i32::from(*i) == *rhs,
            HdbValue::SMALLINT(i) => i32::from(*i) == *rhs,
            HdbValue::INT(i) => *i == *rhs,
            HdbValue::BIGINT(i) => *i == i64::from(*rhs),
            _ => false,
        }
    }
}
impl std::cmp::PartialEq<&str> for HdbValue<'_> {
    fn eq(&self, rhs: &&str) -> bool {
        match self {
            HdbValue::STRING(ref s) => s == rhs,
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::types::{DayDate, LongDate, SecondDate, SecondTime};
    use crate::HdbValue;
    use bigdecimal::BigDecimal;
    use num::bigint::BigInt;
    use num::FromPrimitive;

    #[test]
    fn test_display() {
        for value in [
            HdbValue::STRING("foo".to_string()),
            HdbValue::INT(42),
            HdbValue::NULL,
            HdbValue::TINYINT(42),
            HdbValue::SMALLINT(42),
            HdbValue::BIGINT(42),
            HdbValue::DECIMAL(BigDecimal::new(BigInt::from_i64(42_i64).unwrap(), 42_i64)),
            HdbValue::REAL(42_f32),
            HdbValue::DOUBLE(42_f64),
            HdbValue::STR("foo bar"),
            HdbValue::BINARY(vec![42, 42, 42]),
            HdbValue::BOOLEAN(true),
            HdbValue::LONGDATE(LongDate::new(100_i64)),
            HdbValue::SECONDDATE(SecondDate::new(100_i64)),
            HdbValue::DAYDATE(DayDate::new(100_i32)),
            HdbValue::SECONDTIME(SecondTime::new(100_i32)),
        ] {
            let _s = value.to_string();
        }
    }

    #[test]
    fn unsigned_top_bit_is_rejected() {
        assert!(HdbValue::try_from(u64::MAX).is_err());
        assert!(HdbValue::try_from(1_u64 << 63).is_err());
        assert!(matches!(
            HdbValue::try_from((1_u64 << 63) - 1),
            Ok(HdbValue::BIGINT(_))
        ));
    }
}
