use crate::conn::AmConnCore;
use crate::hdb_error::usage_err;
use crate::protocol::parts::{
    InternalReturnValue, LobFlags, ParameterDescriptors, ParameterRows, ResultSetMetadata, TypeId,
};
use crate::protocol::{MessageType, Part, PartKind, Request, HOLD_CURSORS_OVER_COMMIT};
use crate::sync::prepared_statement_core::{AmPsCore, PreparedStatementCore};
use crate::sync::HdbResponse;
use crate::types_impl::lob::LobWriter;
use crate::{HdbResult, HdbValue};
use std::sync::{Arc, Mutex};

/// Allows injection-safe SQL execution and repeated calls of the same
/// statement with different parameters with as few roundtrips as possible.
///
/// # Providing input parameters
///
/// The parameter values are provided as [`HdbValue`](crate::HdbValue)s;
/// the driver converts them into the wire format that the server has
/// requested for the respective parameter, and rejects values that do not
/// fit into the parameter's type before anything is sent.
///
/// # Streaming LOBs to the database
///
/// A parameter value of kind [`HdbValue::LOBSTREAM`](crate::HdbValue::LOBSTREAM)
/// wraps a shared mutable reference to a reader object; the driver first
/// executes the statement with a placeholder for each such parameter and
/// then transfers the data from the readers in additional roundtrips.
/// The server finalizes the statement execution only after the last chunk
/// was written.
///
/// In a bulk execution, only the last row of each server call may carry
/// streamed LOBs; the driver splits bigger batches accordingly.
pub struct PreparedStatement {
    am_ps_core: AmPsCore,
    a_descriptors: Arc<ParameterDescriptors>,
    o_a_rsmd: Option<Arc<ResultSetMetadata>>,
    batch: Vec<Vec<HdbValue<'static>>>,
}

/// Produces the rows of a function-driven bulk execution; see
/// [`PreparedStatement::execute_from`](crate::PreparedStatement::execute_from).
pub trait RowProducer {
    /// Returns the next row, or None when the rows are exhausted.
    fn next_row(&mut self) -> HdbResult<Option<Vec<HdbValue<'static>>>>;
}

impl<F> RowProducer for F
where
    F: FnMut() -> HdbResult<Option<Vec<HdbValue<'static>>>>,
{
    fn next_row(&mut self) -> HdbResult<Option<Vec<HdbValue<'static>>>> {
        self()
    }
}

impl PreparedStatement {
    pub(crate) fn new(
        am_conn_core: AmConnCore,
        statement_id: u64,
        a_descriptors: Arc<ParameterDescriptors>,
        o_a_rsmd: Option<Arc<ResultSetMetadata>>,
    ) -> Self {
        Self {
            am_ps_core: Arc::new(Mutex::new(PreparedStatementCore {
                am_conn_core,
                statement_id,
            })),
            a_descriptors,
            o_a_rsmd,
            batch: Vec::new(),
        }
    }

    /// Descriptors of the parameters of the prepared statement.
    pub fn parameter_descriptors(&self) -> Arc<ParameterDescriptors> {
        Arc::clone(&self.a_descriptors)
    }

    /// Executes the statement with the given row of parameters
    /// immediately.
    ///
    /// The row must be consistent with the in-parameter metadata; a
    /// statement without in-parameters is executed with an empty row.
    pub fn execute_row(&mut self, hdb_values: Vec<HdbValue<'static>>) -> HdbResult<HdbResponse> {
        let rows = if self.a_descriptors.has_in() {
            vec![hdb_values]
        } else if hdb_values.is_empty() {
            Vec::new()
        } else {
            return Err(usage_err!("The statement has no in-parameters"));
        };
        let int_return_values = self.execute_rows(rows)?;
        HdbResponse::try_new(int_return_values)
    }

    /// Adds a row of parameters to the batch.
    pub fn add_row(&mut self, hdb_values: Vec<HdbValue<'static>>) -> HdbResult<()> {
        let expected = self.a_descriptors.count_in();
        if hdb_values.len() == expected {
            self.batch.push(hdb_values);
            Ok(())
        } else {
            Err(usage_err!(
                "wrong number of parameter values (got {}, expected {expected})",
                hdb_values.len()
            ))
        }
    }

    /// Adds a flat list of parameter values to the batch; the length must
    /// be an exact multiple of the number of in-parameters.
    pub fn add_rows_flat(&mut self, hdb_values: Vec<HdbValue<'static>>) -> HdbResult<()> {
        let expected = self.a_descriptors.count_in();
        if expected == 0 {
            return Err(usage_err!("The statement has no in-parameters"));
        }
        if hdb_values.len() % expected != 0 {
            return Err(usage_err!(
                "the number of values ({}) is not a multiple of the number of in-parameters \
                 ({expected})",
                hdb_values.len()
            ));
        }
        let mut hdb_values = hdb_values;
        while !hdb_values.is_empty() {
            let rest = hdb_values.split_off(expected);
            self.batch.push(hdb_values);
            hdb_values = rest;
        }
        Ok(())
    }

    /// Executes the accumulated batch, in server calls of at most
    /// `bulk_size` rows each.
    ///
    /// Earlier server calls remain executed when a later one fails; the
    /// per-row results of the failing call are carried in the returned
    /// error.
    pub fn execute_batch(&mut self) -> HdbResult<HdbResponse> {
        let mut rows = std::mem::take(&mut self.batch);
        if rows.is_empty() && self.a_descriptors.has_in() {
            return Err(usage_err!("The batch is empty"));
        }
        let bulk_size = self.bulk_size()?;

        let mut int_return_values = Vec::<InternalReturnValue>::new();
        if rows.is_empty() {
            int_return_values = self.execute_rows(Vec::new())?;
        } else {
            while !rows.is_empty() {
                let rest = if rows.len() > bulk_size {
                    rows.split_off(bulk_size)
                } else {
                    Vec::new()
                };
                int_return_values.append(&mut self.execute_rows(rows)?);
                rows = rest;
            }
        }
        HdbResponse::try_new(merge_execution_results(int_return_values))
    }

    /// Pulls rows from the producer and executes them, accumulating up to
    /// `bulk_size` rows per server call, until the producer reports the
    /// end of the rows.
    pub fn execute_from(&mut self, producer: &mut dyn RowProducer) -> HdbResult<HdbResponse> {
        let bulk_size = self.bulk_size()?;
        let expected = self.a_descriptors.count_in();

        let mut int_return_values = Vec::<InternalReturnValue>::new();
        let mut pending = Vec::<Vec<HdbValue<'static>>>::with_capacity(bulk_size);
        loop {
            let o_row = producer.next_row()?;
            match o_row {
                Some(row) => {
                    if row.len() != expected {
                        return Err(usage_err!(
                            "wrong number of parameter values (got {}, expected {expected})",
                            row.len()
                        ));
                    }
                    pending.push(row);
                    if pending.len() >= bulk_size {
                        int_return_values
                            .append(&mut self.execute_rows(std::mem::take(&mut pending))?);
                    }
                }
                None => {
                    if !pending.is_empty() {
                        int_return_values
                            .append(&mut self.execute_rows(std::mem::take(&mut pending))?);
                    }
                    break;
                }
            }
        }
        HdbResponse::try_new(merge_execution_results(int_return_values))
    }

    fn bulk_size(&self) -> HdbResult<usize> {
        let ps_core_guard = self.am_ps_core.lock()?;
        let bulk_size = ps_core_guard
            .am_conn_core
            .lock()?
            .configuration()
            .bulk_size();
        Ok(bulk_size)
    }

    // One logical execution of a list of rows.
    //
    // A row that streams LOB data must be the last row of its server
    // call, so the list is split at every stream-carrying row; between the
    // resulting server calls the statement id is reused and the lob write
    // loop runs to completion.
    fn execute_rows(
        &mut self,
        rows: Vec<Vec<HdbValue<'static>>>,
    ) -> HdbResult<Vec<InternalReturnValue>> {
        if rows.is_empty() {
            return self.execute_one_call(Vec::new());
        }

        let mut int_return_values = Vec::<InternalReturnValue>::new();
        let mut sub_batch = Vec::<Vec<HdbValue<'static>>>::new();
        for row in rows {
            let has_stream = row
                .iter()
                .any(|value| matches!(value, HdbValue::LOBSTREAM(Some(_))));
            sub_batch.push(row);
            if has_stream {
                int_return_values.append(&mut self.execute_one_call(std::mem::take(&mut sub_batch))?);
            }
        }
        if !sub_batch.is_empty() {
            int_return_values.append(&mut self.execute_one_call(sub_batch)?);
        }
        Ok(int_return_values)
    }

    // A single Execute roundtrip, with the subsequent lob write loop if
    // the last row streams LOB data.
    #[allow(clippy::type_complexity)]
    fn execute_one_call(
        &mut self,
        rows: Vec<Vec<HdbValue<'static>>>,
    ) -> HdbResult<Vec<InternalReturnValue>> {
        let ps_core_guard = self.am_ps_core.lock()?;
        let am_conn_core = ps_core_guard.am_conn_core.clone();

        let mut request = Request::new(MessageType::Execute, HOLD_CURSORS_OVER_COMMIT);
        request.push(Part::StatementId(ps_core_guard.statement_id));

        // pick the readers out of the rows, replace them with placeholders
        let mut readers: Vec<(
            std::sync::Arc<std::sync::Mutex<dyn std::io::Read + Send>>,
            TypeId,
        )> = Vec::new();
        let mut par_rows = ParameterRows::new();
        let expected = self.a_descriptors.count_in();
        for row in rows {
            if row.len() != expected {
                return Err(usage_err!(
                    "wrong number of parameter values (got {}, expected {expected})",
                    row.len()
                ));
            }
            let row: Vec<HdbValue<'static>> = row
                .into_iter()
                .zip(self.a_descriptors.iter_in())
                .map(|(value, descriptor)| {
                    if let HdbValue::LOBSTREAM(Some(reader)) = value {
                        readers.push((reader, descriptor.type_id()));
                        HdbValue::LOBSTREAM(None)
                    } else {
                        value
                    }
                })
                .collect();
            par_rows.push_hdb_values(row, &self.a_descriptors)?;
        }
        if !par_rows.is_empty() {
            request.push(Part::ParameterRows(par_rows));
        }

        if !readers.is_empty() && am_conn_core.lock()?.implicit_lob_streaming() {
            request.push(Part::LobFlags(LobFlags::for_implicit_streaming()));
        }

        let mut main_reply = am_conn_core.full_send(
            request,
            self.o_a_rsmd.as_ref(),
            Some(&self.a_descriptors),
            &mut None,
        )?;

        // if lob input was not transferred completely in the same
        // roundtrip, the statement execution roundtrip cannot bring any of
        // the expected results; those are received with the response to
        // the last lob transfer roundtrip instead
        let o_write_lob_reply_part = main_reply.parts.remove_first_of_kind(PartKind::WriteLobReply);

        let mut int_return_values =
            main_reply.parts.into_internal_return_values(&am_conn_core)?;

        if let Some(Part::WriteLobReply(write_lob_reply)) = o_write_lob_reply_part {
            let locator_ids = write_lob_reply.into_locator_ids();
            if locator_ids.len() != readers.len() {
                return Err(usage_err!(
                    "The number of provided readers ({}) does not match the number of required \
                     readers ({})",
                    readers.len(),
                    locator_ids.len()
                ));
            }

            for (locator_id, (am_reader, type_id)) in locator_ids.into_iter().zip(readers) {
                let lob_writer = LobWriter::new(
                    locator_id,
                    type_id,
                    am_conn_core.clone(),
                    self.o_a_rsmd.as_ref(),
                    Some(&self.a_descriptors),
                )?;
                let mut reader_guard = am_reader.lock()?;
                let o_final_reply = lob_writer.copy_from(&mut *reader_guard)?;
                if let Some(final_reply) = o_final_reply {
                    // the results of the statement execution
                    int_return_values =
                        final_reply.parts.into_internal_return_values(&am_conn_core)?;
                }
            }
        }

        Ok(int_return_values)
    }
}

// Merges the per-call execution results of a bulk execution into a single
// list, so that the response carries one entry per row.
fn merge_execution_results(int_return_values: Vec<InternalReturnValue>) -> Vec<InternalReturnValue> {
    let mut merged = Vec::<InternalReturnValue>::with_capacity(int_return_values.len());
    let mut execution_results = Vec::new();
    for irv in int_return_values {
        match irv {
            InternalReturnValue::ExecutionResults(mut vec_er) => {
                execution_results.append(&mut vec_er);
            }
            other => merged.push(other),
        }
    }
    if !execution_results.is_empty() {
        merged.push(InternalReturnValue::ExecutionResults(execution_results));
    }
    merged
}

impl std::fmt::Debug for PreparedStatement {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            fmt,
            "PreparedStatement {{ batch size: {}, parameter descriptors: {:?} }}",
            self.batch.len(),
            self.a_descriptors,
        )
    }
}
