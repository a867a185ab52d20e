use crate::conn::params::{ConnectParams, CredentialRefresh, Credentials, ServerCerts, Tls};
use crate::hdb_error::usage_err;
use crate::HdbResult;
use std::sync::Arc;
use std::time::Duration;

/// A builder for [`ConnectParams`](crate::ConnectParams).
///
/// ```rust
/// use hdbclient::ConnectParams;
/// # fn main() -> hdbclient::HdbResult<()> {
/// let params = ConnectParams::builder()
///     .hostname("abcd123")
///     .port(2222)
///     .dbuser("MEIER")
///     .password("schLau")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConnectParamsBuilder {
    hostname: Option<String>,
    port: Option<u16>,
    dbuser: Option<String>,
    password: Option<String>,
    o_token: Option<String>,
    o_client_cert: Option<(Vec<u8>, Vec<u8>)>,
    o_refresh: Option<Arc<dyn CredentialRefresh>>,
    clientlocale: Option<String>,
    dbname: Option<String>,
    network_group: Option<String>,
    default_schema: Option<String>,
    tls: Tls,
    o_connect_timeout: Option<Duration>,
    o_read_timeout: Option<Duration>,
    tcp_keepalive: bool,
    tcp_nodelay: bool,
}

impl ConnectParamsBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            tcp_nodelay: true,
            ..Self::default()
        }
    }

    /// Sets the hostname.
    pub fn hostname<H: AsRef<str>>(&mut self, hostname: H) -> &mut Self {
        self.hostname = Some(hostname.as_ref().to_owned());
        self
    }

    /// Sets the port.
    pub fn port(&mut self, port: u16) -> &mut Self {
        self.port = Some(port);
        self
    }

    /// Sets the database user.
    pub fn dbuser<D: AsRef<str>>(&mut self, dbuser: D) -> &mut Self {
        self.dbuser = Some(dbuser.as_ref().to_owned());
        self
    }

    /// Sets the password.
    pub fn password<P: AsRef<str>>(&mut self, pw: P) -> &mut Self {
        self.password = Some(pw.as_ref().to_owned());
        self
    }

    /// Sets a JWT token for token-based authentication.
    pub fn token<T: AsRef<str>>(&mut self, token: T) -> &mut Self {
        self.o_token = Some(token.as_ref().to_owned());
        self
    }

    /// Sets a client certificate (PEM) and its unencrypted private key
    /// (PEM) for certificate-based authentication.
    pub fn client_certificate(&mut self, cert_pem: Vec<u8>, key_pem: Vec<u8>) -> &mut Self {
        self.o_client_cert = Some((cert_pem, key_pem));
        self
    }

    /// Registers a callback that provides fresh credential material after
    /// an authentication failure.
    pub fn credential_refresh(&mut self, refresh: Arc<dyn CredentialRefresh>) -> &mut Self {
        self.o_refresh = Some(refresh);
        self
    }

    /// Sets the client locale.
    pub fn clientlocale<P: AsRef<str>>(&mut self, cl: P) -> &mut Self {
        self.clientlocale = Some(cl.as_ref().to_owned());
        self
    }

    /// Sets the client locale from the environment variables `LANG` or
    /// `LC_ALL`.
    pub fn clientlocale_from_env_lang(&mut self) -> &mut Self {
        self.clientlocale = match std::env::var("LC_ALL") {
            Ok(l) => Some(l),
            Err(_) => std::env::var("LANG").ok(),
        };
        self
    }

    /// Sets the (MDC) database name; the driver will resolve it to the
    /// host and port of the database and redirect the connection.
    pub fn dbname<D: AsRef<str>>(&mut self, dbname: D) -> &mut Self {
        self.dbname = Some(dbname.as_ref().to_owned());
        self
    }

    /// Sets the network group.
    pub fn network_group<D: AsRef<str>>(&mut self, network_group: D) -> &mut Self {
        self.network_group = Some(network_group.as_ref().to_owned());
        self
    }

    /// Sets the schema that is activated with `set schema` directly after
    /// the connect.
    pub fn default_schema<D: AsRef<str>>(&mut self, schema: D) -> &mut Self {
        self.default_schema = Some(schema.as_ref().to_owned());
        self
    }

    /// Makes the driver use TLS for the connection to the database, with
    /// server validation against the given certificate source.
    ///
    /// Is cumulative with multiple calls.
    pub fn tls_with(&mut self, server_certs: ServerCerts) -> &mut Self {
        match self.tls {
            Tls::Off | Tls::Insecure => {
                self.tls = Tls::Secure(vec![server_certs]);
            }
            Tls::Secure(ref mut certs) => certs.push(server_certs),
        }
        self
    }

    /// Makes the driver use TLS without server validation. Dangerous.
    pub fn tls_without_server_verification(&mut self) -> &mut Self {
        self.tls = Tls::Insecure;
        self
    }

    /// Sets a timeout for establishing the TCP connection.
    pub fn connect_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.o_connect_timeout = Some(timeout);
        self
    }

    /// Sets a timeout for each socket read; a missing timeout disables
    /// per-operation deadlines.
    pub fn read_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.o_read_timeout = Some(timeout);
        self
    }

    /// Enables TCP keepalive probes on the connection.
    pub fn tcp_keepalive(&mut self, keepalive: bool) -> &mut Self {
        self.tcp_keepalive = keepalive;
        self
    }

    /// Controls Nagle's algorithm on the connection; on by default.
    pub fn tcp_nodelay(&mut self, nodelay: bool) -> &mut Self {
        self.tcp_nodelay = nodelay;
        self
    }

    /// Constructs the `ConnectParams`.
    ///
    /// Fails with a usage error if host, port, or user are missing.
    pub fn build(&self) -> HdbResult<ConnectParams> {
        let host = self
            .hostname
            .clone()
            .ok_or_else(|| usage_err!("hostname is missing"))?;
        let port = self.port.ok_or_else(|| usage_err!("port is missing"))?;
        let dbuser = self
            .dbuser
            .clone()
            .ok_or_else(|| usage_err!("dbuser is missing"))?;

        let mut credentials =
            Credentials::with_password(self.password.as_deref().unwrap_or_default());
        if let Some(token) = &self.o_token {
            credentials = credentials.with_token(token);
        }
        if let Some((cert_pem, key_pem)) = &self.o_client_cert {
            credentials = credentials.with_client_certificate(cert_pem.clone(), key_pem.clone());
        }

        Ok(ConnectParams::new(
            host,
            port,
            dbuser,
            credentials,
            self.o_refresh.clone(),
            self.clientlocale.clone(),
            self.dbname.clone(),
            self.network_group.clone(),
            self.default_schema.clone(),
            self.tls.clone(),
            self.o_connect_timeout,
            self.o_read_timeout,
            self.tcp_keepalive,
            self.tcp_nodelay,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::ConnectParamsBuilder;
    use crate::ServerCerts;

    #[test]
    fn test_builder() {
        let params = ConnectParamsBuilder::new()
            .hostname("abcd123")
            .port(2222)
            .dbuser("MEIER")
            .password("schLau")
            .clientlocale("de_DE")
            .tls_with(ServerCerts::RootCertificates)
            .build()
            .unwrap();

        assert_eq!(params.dbuser(), "MEIER");
        assert_eq!(params.password().unsecure(), "schLau");
        assert_eq!(params.addr(), "abcd123:2222");
        assert_eq!(params.clientlocale(), Some("de_DE"));
        assert!(params.is_tls());
    }

    #[test]
    fn test_missing_host() {
        assert!(ConnectParamsBuilder::new()
            .port(2222)
            .dbuser("MEIER")
            .password("schLau")
            .build()
            .is_err());
    }
}
