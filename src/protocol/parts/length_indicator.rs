use crate::hdb_error::impl_err;
use crate::HdbResult;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

pub(crate) const MAX_1_BYTE_LENGTH: u8 = 245;
pub(crate) const MAX_2_BYTE_LENGTH: i16 = i16::MAX;
const LENGTH_INDICATOR_2BYTE: u8 = 246;
const LENGTH_INDICATOR_4BYTE: u8 = 247;
pub(crate) const LENGTH_INDICATOR_NULL: u8 = 255;

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn emit(l: usize, w: &mut dyn std::io::Write) -> HdbResult<()> {
    match l {
        l if l <= MAX_1_BYTE_LENGTH as usize => w.write_u8(l as u8)?,
        l if l <= 0xFFFF => {
            w.write_u8(LENGTH_INDICATOR_2BYTE)?;
            w.write_u16::<LittleEndian>(l as u16)?;
        }
        l if l <= 0xFFFF_FFFF => {
            w.write_u8(LENGTH_INDICATOR_4BYTE)?;
            w.write_u32::<LittleEndian>(l as u32)?;
        }
        l => {
            return Err(impl_err!("Value too big: {l}"));
        }
    }
    Ok(())
}

// The length prefix of authentication sub-fields uses a reduced form:
// one byte up to 245, otherwise the byte 255 followed by a big-endian u16.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn emit_auth_field_length(l: usize, w: &mut dyn std::io::Write) -> HdbResult<()> {
    match l {
        l if l <= MAX_1_BYTE_LENGTH as usize => w.write_u8(l as u8)?,
        l if l <= 0xFFFF => {
            w.write_u8(LENGTH_INDICATOR_NULL)?;
            w.write_u16::<BigEndian>(l as u16)?;
        }
        l => {
            return Err(impl_err!("Auth field too big: {l}"));
        }
    }
    Ok(())
}

pub(crate) fn auth_field_length_size(l: usize) -> usize {
    if l <= MAX_1_BYTE_LENGTH as usize {
        1
    } else {
        3
    }
}

pub(crate) fn parse(l8: u8, rdr: &mut dyn std::io::Read) -> HdbResult<usize> {
    match l8 {
        0..=MAX_1_BYTE_LENGTH => Ok(l8 as usize),
        LENGTH_INDICATOR_2BYTE => Ok(rdr.read_u16::<LittleEndian>()? as usize),
        LENGTH_INDICATOR_4BYTE => Ok(rdr.read_u32::<LittleEndian>()? as usize),
        LENGTH_INDICATOR_NULL => Ok(rdr.read_u16::<BigEndian>()? as usize),
        _ => Err(impl_err!("Unknown length indicator: {l8}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_round_trips() {
        for l in [0_usize, 1, 245, 246, 65_535, 65_536, 1_000_000] {
            let mut buf = Vec::<u8>::new();
            emit(l, &mut buf).unwrap();
            let mut rdr = std::io::Cursor::new(&buf[1..]);
            assert_eq!(parse(buf[0], &mut rdr).unwrap(), l);
        }
    }

    #[test]
    fn auth_field_length_forms() {
        let mut buf = Vec::<u8>::new();
        emit_auth_field_length(245, &mut buf).unwrap();
        assert_eq!(buf, [245]);

        buf.clear();
        emit_auth_field_length(246, &mut buf).unwrap();
        assert_eq!(buf, [255, 0, 246]);

        buf.clear();
        emit_auth_field_length(0x1234, &mut buf).unwrap();
        assert_eq!(buf, [255, 0x12, 0x34]);

        buf.clear();
        assert!(emit_auth_field_length(0x1_0000, &mut buf).is_err());
    }
}
