use crate::hdb_error::usage_err;
use crate::protocol::parts::{InternalReturnValue, OutputParameters, ResultSet};
use crate::sync::hdb_return_value::execution_results_into_return_value;
use crate::sync::HdbReturnValue;
use crate::HdbResult;

/// Represents all possible non-error responses to a database command.
///
/// A single database command can yield multiple return values, e.g. a
/// procedure call can return output parameters, affected-rows counts, and
/// several table outputs in one roundtrip.
#[derive(Debug)]
pub struct HdbResponse {
    return_values: Vec<HdbReturnValue>,
}

impl HdbResponse {
    pub(crate) fn try_new(int_return_values: Vec<InternalReturnValue>) -> HdbResult<Self> {
        let mut return_values = Vec::<HdbReturnValue>::with_capacity(int_return_values.len());
        for irv in int_return_values {
            match irv {
                InternalReturnValue::ResultSet(rs) => {
                    return_values.push(HdbReturnValue::ResultSet(rs));
                }
                InternalReturnValue::ExecutionResults(execution_results) => {
                    return_values.push(execution_results_into_return_value(execution_results));
                }
                InternalReturnValue::OutputParameters(op) => {
                    return_values.push(HdbReturnValue::OutputParameters(op));
                }
                InternalReturnValue::ParameterMetadata(_) => {
                    // metadata is kept with the PreparedStatement
                }
                InternalReturnValue::WriteLobReply(_) => {
                    warn!("HdbResponse::try_new(): ignoring WriteLobReply");
                }
            }
        }
        if return_values.is_empty() {
            return_values.push(HdbReturnValue::Success);
        }
        Ok(Self { return_values })
    }

    /// Returns the number of return values.
    pub fn count(&self) -> usize {
        self.return_values.len()
    }

    /// Turns itself into a single resultset.
    ///
    /// If this cannot be done without loss of information, an error is
    /// returned.
    pub fn into_resultset(self) -> HdbResult<ResultSet> {
        self.into_single_return_value()?.into_resultset()
    }

    /// Turns itself into a single number of affected rows.
    pub fn into_affected_rows(self) -> HdbResult<usize> {
        let vec = self.into_single_return_value()?.into_affected_rows()?;
        if vec.len() == 1 {
            Ok(vec[0])
        } else {
            Ok(vec.iter().sum())
        }
    }

    /// Turns itself into the output parameters of a procedure call.
    pub fn into_output_parameters(self) -> HdbResult<OutputParameters> {
        for rv in self.return_values {
            if let HdbReturnValue::OutputParameters(op) = rv {
                return Ok(op);
            }
        }
        Err(usage_err!("No OutputParameters contained in the response"))
    }

    /// Turns itself into (), if the database call was successful.
    pub fn into_success(self) -> HdbResult<()> {
        self.into_single_return_value()?.into_success()
    }

    /// Returns the contained resultsets, e.g. the table outputs of a
    /// procedure call.
    pub fn into_resultsets(self) -> Vec<ResultSet> {
        self.return_values
            .into_iter()
            .filter_map(|rv| match rv {
                HdbReturnValue::ResultSet(rs) => Some(rs),
                _ => None,
            })
            .collect()
    }

    /// Converts the response into its return values.
    pub fn into_return_values(self) -> Vec<HdbReturnValue> {
        self.return_values
    }

    fn into_single_return_value(mut self) -> HdbResult<HdbReturnValue> {
        if self.return_values.len() == 1 {
            self.return_values
                .pop()
                .ok_or_else(|| usage_err!("The response is empty"))
        } else {
            Err(usage_err!(
                "The response contains more than a single return value"
            ))
        }
    }
}

impl std::fmt::Display for HdbResponse {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(fmt, "HdbResponse [")?;
        for dbretval in &self.return_values {
            match dbretval {
                HdbReturnValue::AffectedRows(ref vec) => writeln!(fmt, "AffectedRows {vec:?},")?,
                HdbReturnValue::OutputParameters(ref op) => {
                    writeln!(fmt, "OutputParameters [")?;
                    writeln!(fmt, "{op}")?;
                    writeln!(fmt, "],")?;
                }
                HdbReturnValue::ResultSet(ref rs) => writeln!(fmt, "ResultSet {rs},")?,
                HdbReturnValue::Success => writeln!(fmt, "Success,")?,
            }
        }
        write!(fmt, "]")
    }
}
