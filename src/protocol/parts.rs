mod authfields;
mod client_context;
mod client_info;
mod connect_options;
mod db_connect_info;
mod execution_result;
mod field_metadata;
mod hdb_value;
pub(crate) mod length_indicator;
mod lob_flags;
mod multiline_option_part;
mod option_part;
mod option_value;
mod output_parameters;
mod parameter_descriptor;
mod parameter_rows;
mod read_lob_reply;
mod read_lob_request;
pub(crate) mod resultset;
mod resultset_metadata;
mod server_error;
mod session_context;
mod statement_context;
mod topology;
mod transactionflags;
mod type_id;
mod write_lob_reply;
mod write_lob_request;

pub(crate) use self::{
    authfields::AuthFields,
    client_context::ClientContext,
    client_info::ClientInfo,
    connect_options::{ConnOptId, ConnectOptions, ConnectOptionsPart},
    db_connect_info::DbConnectInfo,
    lob_flags::LobFlags,
    option_value::OptionValue,
    parameter_rows::ParameterRows,
    read_lob_reply::ReadLobReply,
    read_lob_request::ReadLobRequest,
    resultset::RsState,
    session_context::SessionContext,
    statement_context::StatementContext,
    topology::Topology,
    transactionflags::{TaFlagId, TransactionFlags},
    write_lob_reply::WriteLobReply,
    write_lob_request::WriteLobRequest,
};
pub use self::{
    execution_result::ExecutionResult,
    field_metadata::FieldMetadata,
    hdb_value::HdbValue,
    output_parameters::OutputParameters,
    parameter_descriptor::{
        ParameterBinding, ParameterDescriptor, ParameterDescriptors, ParameterDirection,
    },
    resultset::ResultSet,
    resultset_metadata::ResultSetMetadata,
    server_error::{ServerError, Severity},
    type_id::TypeId,
};

use crate::conn::AmConnCore;
use crate::hdb_error::impl_err;
use crate::protocol::{Part, PartAttributes, PartKind};
use crate::HdbResult;
use std::{iter::IntoIterator, sync::Arc};

// Typed return values digested from the parts of a reply.
#[derive(Debug)]
pub(crate) enum InternalReturnValue {
    ExecutionResults(Vec<ExecutionResult>),
    OutputParameters(OutputParameters),
    ParameterMetadata(Arc<ParameterDescriptors>),
    ResultSet(ResultSet),
    WriteLobReply(WriteLobReply),
}

#[derive(Debug, Default)]
pub(crate) struct Parts<'a>(Vec<Part<'a>>);

impl<'a> Parts<'a> {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn reverse(&mut self) {
        self.0.reverse();
    }

    pub fn push(&mut self, part: Part<'a>) {
        self.0.push(part);
    }
    pub fn pop(&mut self) -> Option<Part<'a>> {
        self.0.pop()
    }
    pub fn pop_if_kind(&mut self, kind: PartKind) -> Option<Part<'a>> {
        match self.0.last() {
            Some(part) if (part.kind() as i8) == (kind as i8) => self.0.pop(),
            _ => None,
        }
    }

    pub fn remove_first_of_kind(&mut self, kind: PartKind) -> Option<Part<'a>> {
        self.0
            .iter()
            .position(|p| p.kind() == kind)
            .map(|i| self.0.remove(i))
    }

    pub fn ref_inner(&self) -> &Vec<Part<'a>> {
        &self.0
    }
}

impl IntoIterator for Parts<'static> {
    type Item = Part<'static>;
    type IntoIter = std::vec::IntoIter<Part<'static>>;
    fn into_iter(self) -> std::vec::IntoIter<Part<'static>> {
        self.0.into_iter()
    }
}

impl Parts<'static> {
    // digest parts, collect InternalReturnValues
    pub fn into_internal_return_values(
        self,
        am_conn_core: &AmConnCore,
    ) -> HdbResult<Vec<InternalReturnValue>> {
        let mut int_return_values = Vec::<InternalReturnValue>::new();
        let mut parts = self.into_iter();
        while let Some(part) = parts.next() {
            match part {
                Part::StatementContext(ref stmt_ctx) => {
                    am_conn_core.lock()?.evaluate_statement_context(stmt_ctx);
                }
                Part::TransactionFlags(ta_flags) => {
                    am_conn_core.lock()?.evaluate_ta_flags(&ta_flags)?;
                }

                Part::OutputParameters(op) => {
                    int_return_values.push(InternalReturnValue::OutputParameters(op));
                }
                Part::ParameterMetadata(pm) => {
                    int_return_values.push(InternalReturnValue::ParameterMetadata(Arc::new(pm)));
                }
                Part::ResultSet(Some(rs)) => {
                    int_return_values.push(InternalReturnValue::ResultSet(rs));
                }
                Part::ResultSetMetadata(rsmd) => {
                    // a table output of a procedure call whose rows arrive separately
                    if let Some(Part::ResultSetId(rs_id)) = parts.next() {
                        let rs = ResultSet::new(
                            am_conn_core,
                            PartAttributes::new(crate::protocol::part_attributes::FIRST_PACKET),
                            rs_id,
                            Arc::new(rsmd),
                            None,
                        );
                        int_return_values.push(InternalReturnValue::ResultSet(rs));
                    } else {
                        return Err(impl_err!("Missing required part ResultSetID"));
                    }
                }
                Part::ExecutionResults(vec_er) => {
                    int_return_values.push(InternalReturnValue::ExecutionResults(vec_er));
                }
                Part::WriteLobReply(wlr) => {
                    int_return_values.push(InternalReturnValue::WriteLobReply(wlr));
                }
                part => warn!(
                    "into_internal_return_values(): ignoring unexpected part = {:?}",
                    part.kind()
                ),
            }
        }
        Ok(int_return_values)
    }
}
