use crate::{ConnectParams, HdbError, HdbResult};
use rustls::{ClientConnection, StreamOwned};
use std::sync::Arc;

pub(crate) struct TlsTcpClient {
    params: ConnectParams,
    tls_stream: StreamOwned<ClientConnection, std::net::TcpStream>,
}
impl std::fmt::Debug for TlsTcpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "TlsTcpClient {{params: {:?}, ... }}", &self.params)
    }
}
impl TlsTcpClient {
    pub fn try_new(params: ConnectParams) -> HdbResult<Self> {
        Ok(Self {
            tls_stream: try_new_tls_stream(&params)?,
            params,
        })
    }

    pub fn connect_params(&self) -> &ConnectParams {
        &self.params
    }

    pub fn writer(&mut self) -> &mut dyn std::io::Write {
        &mut self.tls_stream
    }

    pub fn reader(&mut self) -> &mut dyn std::io::Read {
        &mut self.tls_stream
    }
}

fn try_new_tls_stream(
    params: &ConnectParams,
) -> HdbResult<StreamOwned<ClientConnection, std::net::TcpStream>> {
    let a_client_config = Arc::new(params.rustls_clientconfig()?);
    let server_name =
        rustls::ServerName::try_from(params.host()).map_err(|_| HdbError::TlsServerName)?;
    let client_connection = ClientConnection::new(a_client_config, server_name)?;
    debug!("ClientConnection is set up");

    debug!("Connecting to {:?}", params.addr());
    let tcpstream = std::net::TcpStream::connect(params.addr())?;
    tcpstream.set_nodelay(params.tcp_nodelay())?;
    tcpstream.set_read_timeout(params.read_timeout())?;
    if params.tcp_keepalive() {
        socket2::SockRef::from(&tcpstream).set_tcp_keepalive(&socket2::TcpKeepalive::new())?;
    }
    trace!("tcpstream working");

    Ok(StreamOwned::new(client_connection, tcpstream))
}
