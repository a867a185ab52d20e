mod plain_tcp_client;
mod tls_tcp_client;

use crate::{ConnectParams, HdbResult};
use plain_tcp_client::PlainTcpClient;
use std::time::Instant;
use tls_tcp_client::TlsTcpClient;

// A buffered tcp connection, with or without TLS.
#[derive(Debug)]
pub(crate) enum TcpClient {
    // A buffered blocking tcp connection without TLS.
    Plain(PlainTcpClient),
    // A buffered blocking tcp connection with TLS.
    Tls(TlsTcpClient),
}
impl TcpClient {
    // Constructs a buffered tcp connection, with or without TLS,
    // depending on the given connect parameters.
    pub fn try_new(params: ConnectParams) -> HdbResult<Self> {
        let start = Instant::now();
        trace!("TcpClient: Connecting to {:?}", params.addr());

        let tcp_conn = if params.is_tls() {
            Self::Tls(TlsTcpClient::try_new(params)?)
        } else {
            Self::Plain(PlainTcpClient::try_new(params)?)
        };

        trace!(
            "Connection of type {} is initialized ({} µs)",
            tcp_conn.s_type(),
            Instant::now().duration_since(start).as_micros(),
        );
        Ok(tcp_conn)
    }

    // Returns a descriptor of the chosen type
    pub fn s_type(&self) -> &'static str {
        match self {
            Self::Plain(_) => "Plain TCP",
            Self::Tls(_) => "TLS TCP",
        }
    }

    pub fn connect_params(&self) -> &ConnectParams {
        match self {
            Self::Plain(client) => client.connect_params(),
            Self::Tls(client) => client.connect_params(),
        }
    }

    pub fn writer(&mut self) -> &mut dyn std::io::Write {
        match self {
            Self::Plain(client) => client.writer(),
            Self::Tls(client) => client.writer(),
        }
    }

    pub fn reader(&mut self) -> &mut dyn std::io::Read {
        match self {
            Self::Plain(client) => client.reader(),
            Self::Tls(client) => client.reader(),
        }
    }
}
impl Drop for TcpClient {
    fn drop(&mut self) {
        trace!("Drop of TcpClient");
    }
}
