use crate::conn::{ConnectParams, ConnectionConfiguration, ConnectionCore};
use crate::protocol::parts::{resultset::RsState, ParameterDescriptors, ResultSetMetadata};
use crate::protocol::{Reply, Request};
use crate::HdbResult;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

// A thread-safe encapsulation of the ConnectionCore.
//
// The mutex serializes all requests of a session: no two operations on the
// same session can be in flight concurrently, and the reply order matches
// the request order.
#[derive(Clone, Debug)]
pub(crate) struct AmConnCore(Arc<Mutex<ConnectionCore>>);

impl AmConnCore {
    pub fn try_new(
        conn_params: ConnectParams,
        configuration: &ConnectionConfiguration,
    ) -> HdbResult<Self> {
        trace!("trying to connect to {conn_params}");
        let start = Instant::now();
        let conn_core = ConnectionCore::try_new(conn_params, configuration)?;
        debug!(
            "user \"{}\" successfully logged on ({} µs) to {:?} of {:?} (server version: {:?})",
            conn_core.connect_params().dbuser(),
            Instant::now().duration_since(start).as_micros(),
            conn_core.database_name(),
            conn_core.system_id(),
            conn_core.full_version_string()
        );
        Ok(Self(Arc::new(Mutex::new(conn_core))))
    }

    pub fn lock(&self) -> std::sync::LockResult<MutexGuard<ConnectionCore>> {
        self.0.lock()
    }

    pub fn send(&self, request: Request) -> HdbResult<Reply> {
        self.full_send(request, None, None, &mut None)
    }

    pub(crate) fn full_send(
        &self,
        mut request: Request,
        o_a_rsmd: Option<&Arc<ResultSetMetadata>>,
        o_a_descriptors: Option<&Arc<ParameterDescriptors>>,
        o_rs: &mut Option<&mut RsState>,
    ) -> HdbResult<Reply> {
        trace!(
            "AmConnCore::full_send() with message_type = {:?}",
            request.message_type,
        );
        let start = Instant::now();
        let mut conn_core = self.lock()?;
        conn_core.augment_request(&mut request);

        let reply = conn_core.roundtrip(&request, Some(self), o_a_rsmd, o_a_descriptors, o_rs)?;
        trace!(
            "full_send() took {} ms",
            Instant::now().duration_since(start).as_millis(),
        );
        Ok(reply)
    }
}
