use crate::ConnectParams;
use std::io::{BufReader, BufWriter};
use std::net::TcpStream;

#[derive(Debug)]
pub(crate) struct PlainTcpClient {
    params: ConnectParams,
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl PlainTcpClient {
    // Returns an initialized plain tcp connection
    pub fn try_new(params: ConnectParams) -> std::io::Result<Self> {
        let tcpstream = match params.connect_timeout() {
            Some(timeout) => {
                // connect_timeout requires resolved addresses
                let mut last_error = None;
                let mut o_tcpstream = None;
                for addr in std::net::ToSocketAddrs::to_socket_addrs(params.addr())? {
                    match TcpStream::connect_timeout(&addr, timeout) {
                        Ok(stream) => {
                            o_tcpstream = Some(stream);
                            break;
                        }
                        Err(e) => last_error = Some(e),
                    }
                }
                o_tcpstream.ok_or_else(|| {
                    last_error.unwrap_or_else(|| {
                        std::io::Error::new(
                            std::io::ErrorKind::AddrNotAvailable,
                            "address did not resolve",
                        )
                    })
                })?
            }
            None => TcpStream::connect(params.addr())?,
        };
        tcpstream.set_nodelay(params.tcp_nodelay())?;
        tcpstream.set_read_timeout(params.read_timeout())?;
        if params.tcp_keepalive() {
            socket2::SockRef::from(&tcpstream)
                .set_tcp_keepalive(&socket2::TcpKeepalive::new())?;
        }

        Ok(Self {
            writer: BufWriter::new(tcpstream.try_clone()?),
            reader: BufReader::new(tcpstream),
            params,
        })
    }

    pub fn connect_params(&self) -> &ConnectParams {
        &self.params
    }

    pub fn writer(&mut self) -> &mut dyn std::io::Write {
        &mut self.writer
    }

    pub fn reader(&mut self) -> &mut dyn std::io::Read {
        &mut self.reader
    }
}
