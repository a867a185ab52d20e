use crate::conn::AmConnCore;
use crate::hdb_error::{impl_err, usage_err};
use crate::protocol::parts::{Parts, ResultSetMetadata, StatementContext};
use crate::protocol::{MessageType, Part, PartAttributes, PartKind, ReplyType, Request};
use crate::{HdbResult, Row};
use std::sync::{Arc, Mutex};

pub(crate) type AmRsCore = Arc<Mutex<ResultSetCore>>;
pub(crate) type OAmRsCore = Option<AmRsCore>;

// The server-side existence of the resultset: its id and its attribute
// bits. References from Rows and LOB handles keep it alive until all data
// are fetched; dropping it closes the server-side resultset if necessary.
#[derive(Debug)]
pub(crate) struct ResultSetCore {
    am_conn_core: AmConnCore,
    pub attributes: PartAttributes,
    resultset_id: u64,
}

impl ResultSetCore {
    pub fn new_am_rscore(
        am_conn_core: &AmConnCore,
        attributes: PartAttributes,
        resultset_id: u64,
    ) -> AmRsCore {
        Arc::new(Mutex::new(Self {
            am_conn_core: am_conn_core.clone(),
            attributes,
            resultset_id,
        }))
    }
}

impl Drop for ResultSetCore {
    // inform the server in case the resultset is not yet closed, ignore all errors
    fn drop(&mut self) {
        let rs_id = self.resultset_id;
        trace!("ResultSetCore::drop(), resultset_id {rs_id}");
        if !self.attributes.resultset_is_closed() {
            let mut request = Request::new(MessageType::CloseResultSet, 0);
            request.push(Part::ResultSetId(rs_id));

            if let Ok(mut reply) = self.am_conn_core.send(request) {
                reply.parts.pop_if_kind(PartKind::StatementContext);
            }
        }
    }
}

// The client-side fetch state: buffered rows plus the optional handle to
// the server-side resultset for further fetches.
#[derive(Debug)]
pub(crate) struct RsState {
    pub o_am_rscore: OAmRsCore,
    pub next_rows: Vec<Row>,
    pub row_iter: <Vec<Row> as IntoIterator>::IntoIter,
}

impl RsState {
    pub fn len(&self) -> usize {
        self.next_rows.len() + self.row_iter.len()
    }

    pub fn fetch_all(&mut self, a_rsmd: &Arc<ResultSetMetadata>) -> HdbResult<()> {
        while !self.is_complete()? {
            self.fetch_next(a_rsmd)?;
        }
        Ok(())
    }

    pub fn total_number_of_rows(&mut self, a_rsmd: &Arc<ResultSetMetadata>) -> HdbResult<usize> {
        self.fetch_all(a_rsmd)?;
        Ok(self.len())
    }

    pub fn next_row(&mut self, a_rsmd: &Arc<ResultSetMetadata>) -> HdbResult<Option<Row>> {
        if let Some(r) = self.row_iter.next() {
            Ok(Some(r))
        } else {
            if self.next_rows.is_empty() {
                if self.is_complete()? {
                    return Ok(None);
                }
                self.fetch_next(a_rsmd)?;
            }
            let mut tmp_vec = Vec::<Row>::new();
            std::mem::swap(&mut tmp_vec, &mut self.next_rows);
            self.row_iter = tmp_vec.into_iter();
            Ok(self.row_iter.next())
        }
    }

    fn next_row_no_fetch(&mut self) -> Option<Row> {
        if let Some(r) = self.row_iter.next() {
            Some(r)
        } else {
            if self.next_rows.is_empty() {
                return None;
            }
            let mut tmp_vec = Vec::<Row>::new();
            std::mem::swap(&mut tmp_vec, &mut self.next_rows);
            self.row_iter = tmp_vec.into_iter();
            self.row_iter.next()
        }
    }

    pub fn single_row(&mut self) -> HdbResult<Row> {
        if self.has_multiple_rows() {
            Err(usage_err!("Resultset has more than one row"))
        } else {
            self.next_row_no_fetch()
                .ok_or_else(|| usage_err!("Resultset is empty"))
        }
    }

    // Returns true if the resultset contains more than one row.
    fn has_multiple_rows(&self) -> bool {
        let is_complete = self.is_complete().unwrap_or(false);
        !is_complete || (self.next_rows.len() + self.row_iter.len() > 1)
    }

    pub fn fetch_next(&mut self, a_rsmd: &Arc<ResultSetMetadata>) -> HdbResult<()> {
        trace!("ResultSet::fetch_next()");
        let (am_conn_core, resultset_id, fetch_size) = {
            // scope the borrow
            if let Some(ref am_rscore) = self.o_am_rscore {
                let rs_core = am_rscore.lock()?;
                let am_conn_core = rs_core.am_conn_core.clone();
                let fetch_size = { am_conn_core.lock()?.fetch_size() };
                (am_conn_core, rs_core.resultset_id, fetch_size)
            } else {
                return Err(impl_err!("Fetch no more possible"));
            }
        };

        // build the request, provide resultset-id and fetch-size
        debug!("ResultSet::fetch_next() with fetch_size = {fetch_size}");
        let mut request = Request::new(MessageType::FetchNext, 0);
        request.push(Part::ResultSetId(resultset_id));
        request.push(Part::FetchSize(fetch_size));

        let mut reply = am_conn_core.full_send(request, Some(a_rsmd), None, &mut Some(self))?;
        reply.assert_expected_reply_type(ReplyType::Fetch)?;
        am_conn_core.lock()?.statistics_mut().add_fetch_roundtrip();
        reply.parts.pop_if_kind(PartKind::ResultSet);

        let mut drop_rs_core = false;
        if let Some(ref am_rscore) = self.o_am_rscore {
            drop_rs_core = am_rscore.lock()?.attributes.is_last_packet();
        }
        if drop_rs_core {
            self.o_am_rscore = None;
        }
        Ok(())
    }

    pub fn is_complete(&self) -> HdbResult<bool> {
        if let Some(ref am_rscore) = self.o_am_rscore {
            let rs_core = am_rscore.lock()?;
            if (!rs_core.attributes.is_last_packet())
                && (rs_core.attributes.row_not_found() || rs_core.attributes.resultset_is_closed())
            {
                Err(impl_err!(
                    "ResultSet attributes inconsistent: incomplete, but already closed on server",
                ))
            } else {
                Ok(rs_core.attributes.is_last_packet())
            }
        } else {
            Ok(true)
        }
    }

    pub fn parse_rows(
        &mut self,
        no_of_rows: usize,
        metadata: &Arc<ResultSetMetadata>,
        dfv: u8,
        rdr: &mut dyn std::io::Read,
    ) -> HdbResult<()> {
        self.next_rows.reserve(no_of_rows);
        let no_of_cols = metadata.len();
        debug!("parse_rows(): {no_of_rows} lines, {no_of_cols} columns");

        if let Some(ref am_rscore) = self.o_am_rscore {
            let am_conn_core = am_rscore.lock()?.am_conn_core.clone();
            let o_am_rscore = Some(Arc::clone(am_rscore));
            for i in 0..no_of_rows {
                let row = Row::parse(
                    Arc::clone(metadata),
                    &o_am_rscore,
                    &am_conn_core,
                    dfv,
                    rdr,
                )?;
                trace!("parse_rows(): Found row #{i}: {row}");
                self.next_rows.push(row);
            }
        }
        Ok(())
    }
}

/// The result of a database query.
///
/// This is essentially a set of [`Row`](crate::Row)s, and each `Row` is a
/// set of [`HdbValue`](crate::HdbValue)s.
///
/// `ResultSet` implements `std::iter::Iterator`; while iterating, the not
/// yet transported rows are fetched on demand, which can fail. The
/// iterator item is thus not `Row`, but `HdbResult<Row>`.
#[derive(Debug)]
pub struct ResultSet {
    metadata: Arc<ResultSetMetadata>,
    state: RsState,
}

impl ResultSet {
    pub(crate) fn new(
        am_conn_core: &AmConnCore,
        attrs: PartAttributes,
        rs_id: u64,
        a_rsmd: Arc<ResultSetMetadata>,
        o_stmt_ctx: Option<StatementContext>,
    ) -> Self {
        // the connection core mutex is held while a reply is being parsed,
        // so the statement context is only traced here
        if let Some(stmt_ctx) = o_stmt_ctx {
            trace!(
                "ResultSet::new() with statement sequence = {:?}",
                stmt_ctx.statement_sequence_info()
            );
        }
        Self {
            metadata: a_rsmd,
            state: RsState {
                o_am_rscore: Some(ResultSetCore::new_am_rscore(am_conn_core, attrs, rs_id)),
                next_rows: Vec::<Row>::new(),
                row_iter: Vec::<Row>::new().into_iter(),
            },
        }
    }

    // Constructs an empty resultset, e.g. for a DML statement that was
    // erroneously issued as query.
    pub(crate) fn new_empty(a_rsmd: Arc<ResultSetMetadata>) -> Self {
        Self {
            metadata: a_rsmd,
            state: RsState {
                o_am_rscore: None,
                next_rows: Vec::<Row>::new(),
                row_iter: Vec::<Row>::new().into_iter(),
            },
        }
    }

    /// Access to metadata.
    pub fn metadata(&self) -> Arc<ResultSetMetadata> {
        Arc::clone(&self.metadata)
    }

    /// Removes the next row and returns it, or None if the `ResultSet` is
    /// empty. May need to fetch further rows from the database.
    pub fn next_row(&mut self) -> HdbResult<Option<Row>> {
        self.state.next_row(&self.metadata)
    }

    /// Converts the resultset into a single row.
    ///
    /// Fails with a usage error if the resultset contains more than a
    /// single row, or is empty.
    pub fn into_single_row(mut self) -> HdbResult<Row> {
        self.state.single_row()
    }

    /// Converts the resultset into a single value.
    pub fn into_single_value(self) -> HdbResult<crate::HdbValue<'static>> {
        self.into_single_row()?.into_single_value()
    }

    /// Fetches all not yet transported result rows from the server.
    ///
    /// Bigger resultsets are typically not transported in one roundtrip;
    /// the number of roundtrips depends on the total number of rows and
    /// the configured fetch-size.
    pub fn fetch_all(&mut self) -> HdbResult<()> {
        self.state.fetch_all(&self.metadata)
    }

    /// Returns the total number of rows, including those that still
    /// need to be fetched from the database.
    ///
    /// This method can be expensive since it fetches all outstanding rows.
    pub fn total_number_of_rows(&mut self) -> HdbResult<usize> {
        self.state.total_number_of_rows(&self.metadata)
    }

    // Resultsets appear in a response in three forms which differ in
    // metadata handling:
    //
    // a) a response to a direct "execute" contains the metadata in one of
    //    the other parts; the metadata parameter is then None
    //
    // b) a response to an "execute prepared" contains data only; the
    //    metadata had been returned already to the "prepare" call and are
    //    provided with o_a_rsmd
    //
    // c) a response to a "fetch more rows" arrives for an older resultset
    //    which already has its metadata (o_rs is Some)
    //
    // For first resultset packets, a new ResultSet object is created; the
    // previous parts are then expected to contain a matching
    // ResultSetMetadata, a ResultSetId, and a StatementContext.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn parse(
        no_of_rows: usize,
        attributes: PartAttributes,
        parts: &mut Parts,
        am_conn_core: &AmConnCore,
        o_a_rsmd: Option<&Arc<ResultSetMetadata>>,
        o_rs: &mut Option<&mut RsState>,
        dfv: u8,
        rdr: &mut dyn std::io::Read,
    ) -> HdbResult<Option<Self>> {
        match *o_rs {
            None => {
                // case a) or b)
                let o_stmt_ctx = match parts.pop_if_kind(PartKind::StatementContext) {
                    Some(Part::StatementContext(stmt_ctx)) => Some(stmt_ctx),
                    None => None,
                    Some(_) => return Err(impl_err!("Inconsistent StatementContext")),
                };

                let Some(Part::ResultSetId(rs_id)) = parts.pop() else {
                    return Err(impl_err!("ResultSetId missing"));
                };

                let a_rsmd = match parts.pop_if_kind(PartKind::ResultSetMetadata) {
                    Some(Part::ResultSetMetadata(rsmd)) => Arc::new(rsmd),
                    None => match o_a_rsmd {
                        Some(a_rsmd) => Arc::clone(a_rsmd),
                        None => return Err(impl_err!("No metadata provided for ResultSet")),
                    },
                    Some(_) => {
                        return Err(impl_err!("Inconsistent metadata part found for ResultSet"));
                    }
                };

                let mut rs = Self::new(am_conn_core, attributes, rs_id, a_rsmd, o_stmt_ctx);
                let a_rsmd = Arc::clone(&rs.metadata);
                rs.state.parse_rows(no_of_rows, &a_rsmd, dfv, rdr)?;
                Ok(Some(rs))
            }

            Some(ref mut fetching_state) => {
                // case c)
                match parts.pop_if_kind(PartKind::StatementContext) {
                    Some(Part::StatementContext(stmt_ctx)) => {
                        trace!(
                            "ResultSet fetch with statement sequence = {:?}",
                            stmt_ctx.statement_sequence_info()
                        );
                    }
                    None => {}
                    Some(_) => {
                        return Err(impl_err!(
                            "Inconsistent StatementContext part found for ResultSet"
                        ));
                    }
                }

                if let Some(ref am_rscore) = fetching_state.o_am_rscore {
                    let mut rscore = am_rscore.lock()?;
                    rscore.attributes = attributes;
                }
                let a_rsmd = if let Some(a_rsmd) = o_a_rsmd {
                    Arc::clone(a_rsmd)
                } else {
                    return Err(impl_err!("RsState provided without RsMetadata"));
                };
                fetching_state.parse_rows(no_of_rows, &a_rsmd, dfv, rdr)?;
                Ok(None)
            }
        }
    }
}

impl Iterator for ResultSet {
    type Item = HdbResult<Row>;
    fn next(&mut self) -> Option<HdbResult<Row>> {
        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl std::fmt::Display for ResultSet {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(fmt, "{}", &self.metadata)?;
        for row in self.state.row_iter.as_slice() {
            writeln!(fmt, "{row}")?;
        }
        for row in &self.state.next_rows {
            writeln!(fmt, "{row}")?;
        }
        Ok(())
    }
}
