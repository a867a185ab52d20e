use crate::hdb_error::impl_err;
use crate::{HdbResult, HdbValue};
use bigdecimal::{BigDecimal, Zero};
use byteorder::{ByteOrder, LittleEndian};
use num_bigint::{BigInt, Sign};

// The wire representation of the DECIMAL type follows IEEE 754 decimal128:
//
// MANTISSA     113-bit     integer mantissa (byte 0; byte 14, lowest bit)
// EXPONENT      14-bit     biased with 6176, range -6143 to +6144
//                          (byte 14, above lowest bit; byte 15, below
//                          highest bit)
// SIGN           1-bit     0 positive, 1 negative (byte 15, highest bit)
//
// The represented number is (10^EXPONENT)*MANTISSA; the mantissa must not
// be a multiple of 10.

const NULL_MASK: u8 = 0b_0111_0000_u8;

pub(crate) fn wire_decimal_to_value(
    mut raw: [u8; 16],
    nullable: bool,
    scale: i16,
) -> HdbResult<HdbValue<'static>> {
    if (raw[15] & NULL_MASK) == NULL_MASK && raw[0..=14].iter().all(|el| *el == 0) {
        if nullable {
            Ok(HdbValue::NULL)
        } else {
            Err(impl_err!("received null value for not-null column"))
        }
    } else {
        let is_negative = (raw[15] & 0b_1000_0000_u8) != 0;
        raw[15] &= 0b_0111_1111_u8;
        let exponent = i64::from(LittleEndian::read_u16(&raw[14..=15]) >> 1) - 6176;
        raw[14] &= 0b_0000_0001_u8;
        let mantissa = BigInt::from_bytes_le(Sign::Plus, &raw[0..=14]);

        let mut big_decimal = if is_negative {
            -BigDecimal::new(mantissa, -exponent)
        } else {
            BigDecimal::new(mantissa, -exponent)
        };

        if scale < i16::MAX {
            big_decimal = big_decimal.with_scale(i64::from(scale));
        }
        Ok(HdbValue::DECIMAL(big_decimal))
    }
}

// Creates the DECIMAL wire format from a BigDecimal.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
pub(crate) fn big_decimal_to_wire_decimal(bigdecimal: &BigDecimal) -> HdbResult<[u8; 16]> {
    let ten = BigInt::from(10_u8);
    let (sign, mantissa, exponent) = {
        let (mut bigint, neg_exponent) = bigdecimal.as_bigint_and_exponent();
        let mut exponent = -neg_exponent;

        // the server does not accept mantissas that are multiples of 10
        while !bigint.is_zero() && (&bigint % &ten).is_zero() {
            bigint /= 10;
            exponent += 1;
        }

        // only mantissas up to 113 bits are accepted, so round if necessary
        loop {
            let (_, mantissa) = bigint.to_bytes_le();
            let l = mantissa.len();
            if (l > 15) || ((l == 15) && (mantissa[14] & 0b1111_1110) != 0) {
                bigint /= 10;
                exponent += 1;
            } else {
                break;
            }
        }

        if !(-6143..=6144).contains(&exponent) {
            return Err(impl_err!("exponent '{exponent}' out of range"));
        }
        let (sign, mantissa) = bigint.to_bytes_le();
        (sign, mantissa, exponent)
    };

    let mut raw = [0_u8; 16];
    mantissa.iter().enumerate().for_each(|(i, b)| raw[i] = *b);

    let biased_exponent: u16 = (exponent + 6176) as u16; // bounds are checked above
    LittleEndian::write_u16(&mut raw[14..=15], biased_exponent * 2);

    if let Sign::Minus = sign {
        raw[15] |= 0b_1000_0000_u8;
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::{big_decimal_to_wire_decimal, wire_decimal_to_value};
    use bigdecimal::BigDecimal;
    use num::bigint::BigInt;
    use std::str::FromStr;

    #[test]
    fn test_all() {
        str_2_big_2_wire_2_big("1234.56780000");
        str_2_big_2_wire_2_big("1234.5678");
        str_2_big_2_wire_2_big("-1234.5678");

        str_2_big_2_wire_2_big("123456789");
        str_2_big_2_wire_2_big("123456789.0000");
        str_2_big_2_wire_2_big("0.1234567890000");
        str_2_big_2_wire_2_big(
            "0.000000000000000000000000000000000000000000000000000001234567890000",
        );

        str_2_big_2_wire_2_big("-123456789");
        str_2_big_2_wire_2_big("-123456789.0000");
        str_2_big_2_wire_2_big("-0.1234567890000");

        str_2_big_2_wire_2_big("123456789123456789");
        str_2_big_2_wire_2_big("1234567890012345678900000");
        str_2_big_2_wire_2_big("1234567890000000000000000123456789");

        me_2_big_2_wire_2_big(BigInt::from_str("0").unwrap(), 0);
        me_2_big_2_wire_2_big(BigInt::from_str("1234567890").unwrap(), -5);
        me_2_big_2_wire_2_big(BigInt::from_str("1234567890000").unwrap(), -8);
        me_2_big_2_wire_2_big(
            BigInt::from_str("123456789012345678901234567890").unwrap(),
            0,
        );
        me_2_big_2_wire_2_big(
            BigInt::from_str("1234567890123456789012345678901234").unwrap(),
            3,
        );
    }

    #[test]
    fn null_pattern_is_recognized() {
        let mut raw = [0_u8; 16];
        raw[15] = 0b_0111_0000;
        assert!(matches!(
            wire_decimal_to_value(raw, true, i16::MAX).unwrap(),
            crate::HdbValue::NULL
        ));
        assert!(wire_decimal_to_value(raw, false, i16::MAX).is_err());
    }

    fn str_2_big_2_wire_2_big(input: &str) {
        let bigdec = BigDecimal::from_str(input).unwrap();
        big_2_wire_2_big(&bigdec);
    }

    fn me_2_big_2_wire_2_big(mantissa: BigInt, exponent: i64) {
        let bigdec = BigDecimal::new(mantissa, -exponent);
        big_2_wire_2_big(&bigdec);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn big_2_wire_2_big(bigdec: &BigDecimal) {
        let raw = big_decimal_to_wire_decimal(bigdec).unwrap();
        let (_neg, _mant, exp) = into_elements(raw);
        let bigdec2 = match wire_decimal_to_value(raw, false, -exp as i16).unwrap() {
            crate::HdbValue::DECIMAL(bd) => bd,
            v => panic!("unexpected value {v:?}"),
        };
        assert_eq!(*bigdec, bigdec2, "start != end");
    }

    use byteorder::{ByteOrder, LittleEndian};
    // Retrieve the ingredients of the wire decimal
    fn into_elements(mut raw: [u8; 16]) -> (bool, BigInt, i64) {
        let is_negative = (raw[15] & 0b_1000_0000_u8) != 0;
        raw[15] &= 0b_0111_1111_u8;
        let exponent = i64::from(LittleEndian::read_u16(&raw[14..=15]) >> 1) - 6176;
        raw[14] &= 0b_0000_0001_u8;
        let mantissa = BigInt::from_bytes_le(num_bigint::Sign::Plus, &raw[0..=14]);
        (is_negative, mantissa, exponent)
    }
}
