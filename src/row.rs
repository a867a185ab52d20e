use crate::conn::AmConnCore;
use crate::hdb_error::usage_err;
use crate::protocol::parts::resultset::OAmRsCore;
use crate::protocol::parts::ResultSetMetadata;
use crate::{HdbError, HdbResult, HdbValue};
use std::sync::Arc;

/// A single line of a [`ResultSet`](crate::ResultSet), consisting of the
/// contained [`HdbValue`](crate::HdbValue)s and a reference to the metadata.
#[derive(Debug)]
pub struct Row {
    metadata: Arc<ResultSetMetadata>,
    values: Vec<HdbValue<'static>>,
}

impl Row {
    pub(crate) fn new(metadata: Arc<ResultSetMetadata>, values: Vec<HdbValue<'static>>) -> Self {
        Self { metadata, values }
    }

    /// Returns the length of the row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row contains no value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a reference to the metadata.
    pub fn metadata(&self) -> &ResultSetMetadata {
        &self.metadata
    }

    /// Removes and returns the next value.
    pub fn next_value(&mut self) -> Option<HdbValue<'static>> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values.remove(0))
        }
    }

    /// Removes and returns the next value, converted into the target type.
    pub fn next_try_into<T>(&mut self) -> HdbResult<T>
    where
        T: TryFrom<HdbValue<'static>, Error = HdbError>,
    {
        T::try_from(
            self.next_value()
                .ok_or_else(|| usage_err!("no more value in row"))?,
        )
    }

    /// Converts the row into the single contained value.
    pub fn into_single_value(mut self) -> HdbResult<HdbValue<'static>> {
        if self.values.len() == 1 {
            self.values.pop().ok_or_else(|| usage_err!("Row is empty"))
        } else {
            Err(usage_err!("Row has more than one field"))
        }
    }

    /// Converts the row into its values.
    pub fn into_values(self) -> Vec<HdbValue<'static>> {
        self.values
    }

    pub(crate) fn parse(
        metadata: Arc<ResultSetMetadata>,
        o_am_rscore: &OAmRsCore,
        am_conn_core: &AmConnCore,
        dfv: u8,
        rdr: &mut dyn std::io::Read,
    ) -> HdbResult<Self> {
        let mut values = Vec::<HdbValue<'static>>::with_capacity(metadata.len());
        for fmd in &**metadata {
            values.push(HdbValue::parse(
                fmd.type_id(),
                fmd.scale(),
                fmd.is_nullable(),
                dfv,
                am_conn_core,
                o_am_rscore,
                rdr,
            )?);
        }
        Ok(Self::new(metadata, values))
    }
}

impl std::ops::Index<usize> for Row {
    type Output = HdbValue<'static>;
    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl IntoIterator for Row {
    type Item = HdbValue<'static>;
    type IntoIter = std::vec::IntoIter<HdbValue<'static>>;
    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        for value in &self.values {
            write!(fmt, "{value}, ")?;
        }
        Ok(())
    }
}
