use crate::hdb_error::impl_err;
use crate::types_impl::wire_decimal::{big_decimal_to_wire_decimal, wire_decimal_to_value};
use crate::{HdbResult, HdbValue, TypeId};
use bigdecimal::BigDecimal;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use num::{FromPrimitive, ToPrimitive};
use num_bigint::BigInt;

pub(crate) fn parse(
    nullable: bool,
    type_id: TypeId,
    scale: i16,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<HdbValue<'static>> {
    match type_id {
        TypeId::DECIMAL => {
            let mut raw = [0_u8; 16];
            rdr.read_exact(&mut raw[..])?;
            wire_decimal_to_value(raw, nullable, scale)
        }

        TypeId::FIXED8 => Ok({
            if parse_null(nullable, rdr)? {
                HdbValue::NULL
            } else {
                let i = rdr.read_i64::<LittleEndian>()?;
                let bigint =
                    BigInt::from_i64(i).ok_or_else(|| impl_err!("invalid value of type FIXED8"))?;
                let bd = BigDecimal::new(bigint, i64::from(scale));
                HdbValue::DECIMAL(bd)
            }
        }),

        TypeId::FIXED12 => Ok({
            if parse_null(nullable, rdr)? {
                HdbValue::NULL
            } else {
                let bytes = crate::protocol::util_sync::parse_bytes(12, rdr)?;
                let bigint = BigInt::from_signed_bytes_le(&bytes);
                let bd = BigDecimal::new(bigint, i64::from(scale));
                HdbValue::DECIMAL(bd)
            }
        }),

        TypeId::FIXED16 => Ok({
            if parse_null(nullable, rdr)? {
                HdbValue::NULL
            } else {
                let i = rdr.read_i128::<LittleEndian>()?;
                let bi = BigInt::from_i128(i)
                    .ok_or_else(|| impl_err!("invalid value of type FIXED16"))?;
                let bd = BigDecimal::new(bi, i64::from(scale));
                HdbValue::DECIMAL(bd)
            }
        }),
        _ => Err(impl_err!("unexpected type id for decimal")),
    }
}

fn parse_null(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<bool> {
    let is_null = rdr.read_u8()? == 0;
    if is_null && !nullable {
        Err(impl_err!("found null value for not-null column"))
    } else {
        Ok(is_null)
    }
}

pub(crate) fn emit(
    big_decimal: &BigDecimal,
    type_id: TypeId,
    scale: i16,
    w: &mut dyn std::io::Write,
) -> HdbResult<()> {
    match type_id {
        TypeId::DECIMAL => {
            let buffer = big_decimal_to_wire_decimal(big_decimal)?;
            w.write_all(&buffer)?;
        }
        TypeId::FIXED8 => {
            let bd = big_decimal.with_scale(i64::from(scale));
            let (bigint, _exponent) = bd.as_bigint_and_exponent();
            w.write_i64::<LittleEndian>(
                bigint
                    .to_i64()
                    .ok_or_else(|| impl_err!("conversion to FIXED8 fails"))?,
            )?;
        }
        TypeId::FIXED12 => {
            // if we get less than 12 bytes, we need to append bytes with either
            // value 0_u8 or 255_u8, depending on the value of the highest bit
            // of the last byte.
            let bd = big_decimal.with_scale(i64::from(scale));
            let (bigint, _exponent) = bd.as_bigint_and_exponent();
            let mut bytes = bigint.to_signed_bytes_le();
            let l = bytes.len();
            if l > 12 {
                return Err(impl_err!("conversion to FIXED12 fails"));
            }
            if l < 12 {
                let filler = if bytes[l - 1] & 0b_1000_0000_u8 == 0 {
                    0_u8
                } else {
                    255_u8
                };
                bytes.resize(12, filler);
            }
            w.write_all(&bytes)?;
        }
        TypeId::FIXED16 => {
            let bd = big_decimal.with_scale(i64::from(scale));
            let (bigint, _exponent) = bd.as_bigint_and_exponent();
            w.write_i128::<LittleEndian>(
                bigint
                    .to_i128()
                    .ok_or_else(|| impl_err!("conversion to FIXED16 fails"))?,
            )?;
        }
        _ => return Err(impl_err!("unexpected type id for decimal")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{HdbValue, TypeId};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    #[test]
    fn fixed_round_trips() {
        for (type_id, s, scale) in [
            (TypeId::FIXED8, "12345.67", 2_i16),
            (TypeId::FIXED8, "-12345.67", 2),
            (TypeId::FIXED12, "123456789012345.678", 3),
            (TypeId::FIXED12, "-1.000", 3),
            (TypeId::FIXED16, "12345678901234567890123456.789", 3),
            (TypeId::FIXED16, "-12345678901234567890123456.789", 3),
        ] {
            let bd = BigDecimal::from_str(s).unwrap();
            let mut buf = Vec::<u8>::new();
            super::emit(&bd, type_id, scale, &mut buf).unwrap();

            // result rows prefix non-null values with a non-zero indicator
            let mut wire = vec![1_u8];
            wire.extend(buf);
            let mut rdr = std::io::Cursor::new(wire);
            match super::parse(false, type_id, scale, &mut rdr).unwrap() {
                HdbValue::DECIMAL(bd2) => assert_eq!(bd, bd2),
                v => panic!("unexpected value {v:?}"),
            }
        }
    }
}
