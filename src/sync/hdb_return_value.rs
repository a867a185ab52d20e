use crate::hdb_error::usage_err;
use crate::protocol::parts::{ExecutionResult, OutputParameters, ResultSet};
use crate::HdbResult;

/// An enum that describes a single database return value.
#[derive(Debug)]
pub enum HdbReturnValue {
    /// A resultset of a query.
    ResultSet(ResultSet),
    /// A list of numbers of affected rows.
    AffectedRows(Vec<usize>),
    /// Values of output parameters of a procedure call.
    OutputParameters(OutputParameters),
    /// Indication that a db call was successful.
    Success,
}
impl HdbReturnValue {
    /// Turns itself into a single resultset.
    pub fn into_resultset(self) -> HdbResult<ResultSet> {
        match self {
            Self::ResultSet(rs) => Ok(rs),
            _ => Err(usage_err!("The return value is not a ResultSet")),
        }
    }

    /// Turns itself into a vector of numbers (each number representing a
    /// number of affected rows).
    pub fn into_affected_rows(self) -> HdbResult<Vec<usize>> {
        match self {
            Self::AffectedRows(array) => Ok(array),
            _ => Err(usage_err!("The return value is not a list of affected rows")),
        }
    }

    /// Turns itself into output parameters.
    pub fn into_output_parameters(self) -> HdbResult<OutputParameters> {
        match self {
            Self::OutputParameters(op) => Ok(op),
            _ => Err(usage_err!("The return value is not OutputParameters")),
        }
    }

    /// Turns itself into (), if the database call was successful.
    pub fn into_success(self) -> HdbResult<()> {
        match self {
            Self::Success => Ok(()),
            Self::AffectedRows(_) => Ok(()),
            _ => Err(usage_err!("The return value is not Success")),
        }
    }

    /// True if the value is a resultset.
    pub fn is_resultset(&self) -> bool {
        matches!(self, Self::ResultSet(_))
    }
}

pub(crate) fn execution_results_into_return_value(
    execution_results: Vec<ExecutionResult>,
) -> HdbReturnValue {
    let mut affected_rows = Vec::<usize>::with_capacity(execution_results.len());
    for execution_result in execution_results {
        match execution_result {
            ExecutionResult::RowsAffected(count) => affected_rows.push(count),
            ExecutionResult::SuccessNoInfo => affected_rows.push(0),
            ExecutionResult::Failure(_) => {
                // failures are surfaced as errors before we get here
                affected_rows.push(0);
            }
        }
    }
    HdbReturnValue::AffectedRows(affected_rows)
}
