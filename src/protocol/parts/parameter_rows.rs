use crate::hdb_error::impl_err;
use crate::protocol::parts::parameter_descriptor::ParameterDescriptors;
use crate::{HdbResult, HdbValue};

// Implementation of the PARAMETERS part.
//
// Contains rows of input parameters.
// The argument count of the part defines how many rows are included.
#[derive(Debug, Default)]
pub(crate) struct ParameterRows<'a>(Vec<ParameterRow<'a>>);
impl<'a> ParameterRows<'a> {
    pub fn new() -> ParameterRows<'a> {
        ParameterRows(Vec::<ParameterRow>::new())
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push_hdb_values(
        &mut self,
        hdb_parameters: Vec<HdbValue<'a>>,
        descriptors: &ParameterDescriptors,
    ) -> HdbResult<()> {
        self.0.push(ParameterRow::new(hdb_parameters, descriptors)?);
        Ok(())
    }

    pub(crate) fn emit(
        &self,
        descriptors: &ParameterDescriptors,
        w: &mut dyn std::io::Write,
    ) -> HdbResult<()> {
        for row in &self.0 {
            row.emit(descriptors, w)?;
        }
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn size(&self, descriptors: &ParameterDescriptors) -> HdbResult<usize> {
        let mut size = 0;
        for row in &self.0 {
            size += row.size(descriptors)?;
        }
        Ok(size)
    }
}

// A single row of parameters.
//
// The constructor converts the provided values into the form requested by
// the in-parameter descriptors, with range checks, so that nothing is
// written to the wire for an invalid row.
#[derive(Default, Debug)]
pub(crate) struct ParameterRow<'a>(Vec<HdbValue<'a>>);

impl<'a> ParameterRow<'a> {
    fn new(
        hdb_parameters: Vec<HdbValue<'a>>,
        descriptors: &ParameterDescriptors,
    ) -> HdbResult<ParameterRow<'a>> {
        if hdb_parameters.len() != descriptors.count_in() {
            return Err(impl_err!(
                "ParameterRow::new(): got {} values for {} in-parameters",
                hdb_parameters.len(),
                descriptors.count_in()
            ));
        }
        let mut in_descriptors = descriptors.iter_in();
        let mut converted = Vec::<HdbValue<'a>>::with_capacity(hdb_parameters.len());
        for hdb_value in hdb_parameters {
            let descriptor = in_descriptors
                .next()
                .ok_or_else(|| impl_err!("ParameterRow::new(): not enough metadata"))?;
            let hdb_value = hdb_value.into_field_form(descriptor)?;
            if !hdb_value.is_null() {
                descriptor
                    .type_id()
                    .matches_value_type(hdb_value.type_id_for_emit(descriptor.type_id())?)?;
            }
            converted.push(hdb_value);
        }
        Ok(ParameterRow(converted))
    }

    fn size(&self, descriptors: &ParameterDescriptors) -> HdbResult<usize> {
        let mut size = 0;
        let mut in_descriptors = descriptors.iter_in();
        for value in &(self.0) {
            if let Some(descriptor) = in_descriptors.next() {
                size += value.size(descriptor.type_id())?;
            } else {
                return Err(impl_err!("ParameterRow::size(): not enough metadata"));
            }
        }

        Ok(size)
    }

    fn emit(&self, descriptors: &ParameterDescriptors, w: &mut dyn std::io::Write) -> HdbResult<()> {
        let mut data_pos = 0_i32;
        let mut in_descriptors = descriptors.iter_in();
        for value in &(self.0) {
            if let Some(descriptor) = in_descriptors.next() {
                value.emit(&mut data_pos, descriptor, w)?;
            } else {
                return Err(impl_err!("ParameterRow::emit(): not enough metadata"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ParameterRows;
    use crate::protocol::parts::ParameterDescriptors;
    use crate::{HdbValue, TypeId};

    // One 16-byte descriptor entry as the server sends it.
    fn descriptor_entry(option: u8, type_code: u8, mode: u8, length: i16, fraction: i16) -> Vec<u8> {
        let mut entry = Vec::<u8>::new();
        entry.push(option);
        entry.push(type_code);
        entry.push(mode);
        entry.push(0);
        entry.extend_from_slice(&u32::MAX.to_le_bytes()); // no name
        entry.extend_from_slice(&length.to_le_bytes());
        entry.extend_from_slice(&fraction.to_le_bytes());
        entry.extend_from_slice(&0_u32.to_le_bytes());
        entry
    }

    fn parse_descriptors(entries: &[Vec<u8>]) -> ParameterDescriptors {
        let wire: Vec<u8> = entries.concat();
        let mut rdr = std::io::Cursor::new(wire);
        ParameterDescriptors::parse(entries.len(), &mut rdr).unwrap()
    }

    #[test]
    fn row_emission_is_typecode_prefixed() {
        let descriptors = parse_descriptors(&[
            descriptor_entry(0b10, TypeId::INT as u8, 1, 10, 0),
            descriptor_entry(0b10, TypeId::STRING as u8, 1, 20, 0),
        ]);

        let mut par_rows = ParameterRows::new();
        par_rows
            .push_hdb_values(
                vec![HdbValue::INT(4711), HdbValue::STR("ab")],
                &descriptors,
            )
            .unwrap();

        let mut wire = Vec::<u8>::new();
        par_rows.emit(&descriptors, &mut wire).unwrap();
        assert_eq!(wire.len(), par_rows.size(&descriptors).unwrap());

        // INT: typecode, then the little-endian value
        assert_eq!(&wire[0..5], &[3, 0x67, 0x12, 0, 0]);
        // STRING: typecode, one-byte length, bytes
        assert_eq!(&wire[5..], &[29, 2, b'a', b'b']);
    }

    #[test]
    fn null_uses_the_high_bit_of_the_typecode() {
        let descriptors = parse_descriptors(&[descriptor_entry(0b10, TypeId::INT as u8, 1, 10, 0)]);

        let mut par_rows = ParameterRows::new();
        par_rows
            .push_hdb_values(vec![HdbValue::NULL], &descriptors)
            .unwrap();

        let mut wire = Vec::<u8>::new();
        par_rows.emit(&descriptors, &mut wire).unwrap();
        assert_eq!(wire, [128 + 3]);
    }

    #[test]
    fn secondtime_null_uses_the_sentinel_typecode() {
        let descriptors =
            parse_descriptors(&[descriptor_entry(0b10, TypeId::SECONDTIME as u8, 1, 0, 0)]);

        let mut par_rows = ParameterRows::new();
        par_rows
            .push_hdb_values(vec![HdbValue::NULL], &descriptors)
            .unwrap();

        let mut wire = Vec::<u8>::new();
        par_rows.emit(&descriptors, &mut wire).unwrap();
        assert_eq!(wire, [0xB0]);
    }

    #[test]
    fn out_of_range_values_are_rejected_before_emission() {
        let descriptors =
            parse_descriptors(&[descriptor_entry(0b10, TypeId::TINYINT as u8, 1, 3, 0)]);

        let mut par_rows = ParameterRows::new();
        assert!(par_rows
            .push_hdb_values(vec![HdbValue::INT(256)], &descriptors)
            .is_err());
        assert!(par_rows
            .push_hdb_values(vec![HdbValue::INT(255)], &descriptors)
            .is_ok());
    }

    #[test]
    fn wrong_row_width_is_rejected() {
        let descriptors = parse_descriptors(&[descriptor_entry(0b10, TypeId::INT as u8, 1, 10, 0)]);

        let mut par_rows = ParameterRows::new();
        assert!(par_rows
            .push_hdb_values(
                vec![HdbValue::INT(1), HdbValue::INT(2)],
                &descriptors
            )
            .is_err());
    }
}
