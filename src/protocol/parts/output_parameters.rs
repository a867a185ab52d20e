use crate::conn::AmConnCore;
use crate::hdb_error::impl_err;
use crate::protocol::parts::{ParameterDescriptor, ParameterDescriptors, ParameterDirection};
use crate::{HdbResult, HdbValue};

/// A set of output parameters, as they can be returned by procedure calls.
///
/// Contains metadata (the descriptors) and the values.
#[derive(Debug)]
pub struct OutputParameters {
    descriptors: Vec<ParameterDescriptor>,
    values: Vec<HdbValue<'static>>,
}

impl OutputParameters {
    /// Converts into a vector of the contained values.
    pub fn into_values(self) -> Vec<HdbValue<'static>> {
        self.values
    }

    /// Returns the descriptors and the values.
    pub fn into_descriptors_and_values(
        self,
    ) -> (Vec<ParameterDescriptor>, Vec<HdbValue<'static>>) {
        (self.descriptors, self.values)
    }

    /// Returns a reference to the descriptors.
    pub fn descriptors(&self) -> &[ParameterDescriptor] {
        &self.descriptors
    }

    /// Returns a reference to the values.
    pub fn values(&self) -> &[HdbValue<'static>] {
        &self.values
    }

    pub(crate) fn parse(
        o_am_conn_core: Option<&AmConnCore>,
        descriptors: &ParameterDescriptors,
        dfv: u8,
        rdr: &mut dyn std::io::Read,
    ) -> HdbResult<Self> {
        trace!("OutputParameters::parse()");
        let am_conn_core =
            o_am_conn_core.ok_or_else(|| impl_err!("Cannot parse output parameters without am_conn_core"))?;

        let mut descriptors_out = Vec::<ParameterDescriptor>::new();
        let mut values = Vec::<HdbValue<'static>>::new();

        for descriptor in descriptors.iter_out() {
            trace!("parsing value with descriptor {descriptor}");
            let value = HdbValue::parse(
                descriptor.type_id(),
                descriptor.scale(),
                descriptor.is_nullable() || (descriptor.direction() == ParameterDirection::INOUT),
                dfv,
                am_conn_core,
                &None,
                rdr,
            )?;
            trace!("parsed value {value:?}");
            descriptors_out.push(descriptor.clone());
            values.push(value);
        }
        Ok(Self {
            descriptors: descriptors_out,
            values,
        })
    }
}

impl std::fmt::Display for OutputParameters {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (descriptor, value) in self.descriptors.iter().zip(self.values.iter()) {
            writeln!(
                fmt,
                "{} = {}",
                descriptor.name().unwrap_or("<unnamed>"),
                value
            )?;
        }
        Ok(())
    }
}
