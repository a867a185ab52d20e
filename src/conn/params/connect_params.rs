use crate::conn::params::credentials::{ClientCertificate, CredentialStore};
use crate::conn::params::{ConnectParamsBuilder, CredentialRefresh, Credentials, Tls};
use crate::protocol::util;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use secstr::SecUtf8;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// An immutable, repeatedly usable set of connection parameters.
///
/// An instance is best built with the
/// [`ConnectParamsBuilder`](crate::ConnectParamsBuilder):
///
/// ```rust
/// use hdbclient::ConnectParams;
/// # fn main() -> hdbclient::HdbResult<()> {
/// let params = ConnectParams::builder()
///    .hostname("xyz")
///    .port(30013)
///    .dbuser("LEO")
///    .password("a_happy_password")
///    .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ConnectParams {
    host: String,
    addr: String,
    dbuser: String,
    credentials: CredentialStore,
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

impl ConnectParams {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        host: String,
        port: u16,
        dbuser: String,
        credentials: Credentials,
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
    ) -> Self {
        Self {
            addr: format!("{host}:{port}"),
            host,
            dbuser,
            credentials: CredentialStore::new(credentials),
            o_refresh,
            clientlocale,
            dbname,
            network_group,
            default_schema,
            tls,
            o_connect_timeout,
            o_read_timeout,
            tcp_keepalive,
            tcp_nodelay,
        }
    }

    /// Returns a new builder for `ConnectParams`.
    pub fn builder() -> ConnectParamsBuilder {
        ConnectParamsBuilder::new()
    }

    // The same parameters, pointed at the redirect target. The credential
    // store is shared so that refreshes benefit both.
    pub(crate) fn redirect(&self, host: &str, port: u16) -> Self {
        let mut new_params = self.clone();
        new_params.dbname = None;
        new_params.host = host.to_string();
        new_params.addr = format!("{host}:{port}");
        new_params
    }

    /// The database user.
    pub fn dbuser(&self) -> &str {
        &self.dbuser
    }

    pub(crate) fn password(&self) -> SecUtf8 {
        self.credentials.current().0.password().clone()
    }

    pub(crate) fn credentials(&self) -> (Credentials, u64) {
        self.credentials.current()
    }

    pub(crate) fn store_session_cookie(&self, cookie: Vec<u8>) {
        self.credentials.store_session_cookie(cookie);
    }

    pub(crate) fn try_credential_refresh(&self, seen_version: u64) -> bool {
        self.credentials
            .try_refresh(self.o_refresh.as_deref(), seen_version)
    }

    pub(crate) fn client_certificate(&self) -> Option<ClientCertificate> {
        self.credentials.current().0.client_certificate().cloned()
    }

    /// The host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The socket address.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Whether TLS or a plain TCP connection is to be used.
    pub fn is_tls(&self) -> bool {
        !matches!(self.tls, Tls::Off)
    }

    /// The client locale.
    pub fn clientlocale(&self) -> Option<&str> {
        self.clientlocale.as_deref()
    }

    /// The name of the (MDC) database.
    pub fn dbname(&self) -> Option<&str> {
        self.dbname.as_deref()
    }

    /// The name of a network group.
    pub fn network_group(&self) -> Option<&str> {
        self.network_group.as_deref()
    }

    /// The schema that is activated directly after the connect.
    pub fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    /// The configured timeout for establishing the TCP connection.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.o_connect_timeout
    }

    /// The configured timeout for socket reads; None disables per-op
    /// deadlines.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.o_read_timeout
    }

    pub(crate) fn tcp_keepalive(&self) -> bool {
        self.tcp_keepalive
    }
    pub(crate) fn tcp_nodelay(&self) -> bool {
        self.tcp_nodelay
    }

    pub(crate) fn rustls_clientconfig(&self) -> std::io::Result<ClientConfig> {
        match self.tls {
            Tls::Off => Err(util::io_error(
                "rustls_clientconfig called with Tls::Off - \
                    this should have been prevented earlier",
            )),
            Tls::Secure(ref server_certs) => {
                let mut root_store = RootCertStore::empty();
                for server_cert in server_certs {
                    match server_cert {
                        ServerCerts::RootCertificates => {
                            root_store.add_server_trust_anchors(
                                webpki_roots::TLS_SERVER_ROOTS.iter().map(|ta| {
                                    OwnedTrustAnchor::from_subject_spki_name_constraints(
                                        ta.subject,
                                        ta.spki,
                                        ta.name_constraints,
                                    )
                                }),
                            );
                        }
                        ServerCerts::Direct(ref pem) => {
                            let certs = certs_from_pem(pem.as_bytes())?;
                            let (n_ok, n_err) = root_store.add_parsable_certificates(&certs);
                            if n_ok == 0 {
                                info!(
                                    "None of the directly provided server certificates was accepted"
                                );
                            } else if n_err > 0 {
                                info!("Not all directly provided server certificates were accepted");
                            }
                        }
                        ServerCerts::Environment(env_var) => match std::env::var(env_var) {
                            Ok(value) => {
                                let certs = certs_from_pem(value.as_bytes())?;
                                let (n_ok, n_err) = root_store.add_parsable_certificates(&certs);
                                if n_ok == 0 {
                                    info!(
                                        "None of the env-provided server certificates was accepted"
                                    );
                                } else if n_err > 0 {
                                    info!("Not all env-provided server certificates were accepted");
                                }
                            }
                            Err(e) => {
                                return Err(std::io::Error::new(
                                    std::io::ErrorKind::InvalidInput,
                                    format!("Environment variable {env_var} not found, reason: {e}"),
                                ));
                            }
                        },
                        ServerCerts::Directory(trust_anchor_dir) => {
                            let trust_anchor_files: Vec<PathBuf> =
                                std::fs::read_dir(trust_anchor_dir)?
                                    .filter_map(Result::ok)
                                    .filter(|dir_entry| {
                                        matches!(
                                            dir_entry.file_type().map(|ft| ft.is_file()),
                                            Ok(true)
                                        )
                                    })
                                    .filter(|dir_entry| {
                                        let path = dir_entry.path();
                                        let ext = path.extension();
                                        Some(AsRef::<std::ffi::OsStr>::as_ref("pem")) == ext
                                    })
                                    .map(|dir_entry| dir_entry.path())
                                    .collect();

                            let mut t_ok = 0;
                            let mut t_err = 0;
                            for trust_anchor_file in trust_anchor_files {
                                trace!("Trying trust anchor file {trust_anchor_file:?}");
                                let mut buf = Vec::<u8>::new();
                                std::fs::File::open(trust_anchor_file)?.read_to_end(&mut buf)?;
                                let certs = certs_from_pem(&buf)?;
                                let (n_ok, n_err) = root_store.add_parsable_certificates(&certs);
                                t_ok += n_ok;
                                t_err += n_err;
                            }
                            if t_ok == 0 {
                                warn!("None of the server certificates in the directory was accepted");
                            } else if t_err > 0 {
                                warn!("Not all server certificates in the directory were accepted");
                            }
                        }
                    }
                }
                let config = ClientConfig::builder()
                    .with_safe_defaults()
                    .with_root_certificates(root_store)
                    .with_no_client_auth();
                Ok(config)
            }
            Tls::Insecure => {
                let config = ClientConfig::builder()
                    .with_safe_defaults()
                    .with_custom_certificate_verifier(Arc::new(NoCertificateVerification {}))
                    .with_no_client_auth();
                Ok(config)
            }
        }
    }
}

fn certs_from_pem(pem: &[u8]) -> std::io::Result<Vec<Vec<u8>>> {
    rustls_pemfile::certs(&mut std::io::BufReader::new(pem))
}

impl std::fmt::Display for ConnectParams {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ConnectParams {{ addr: {}, dbuser: {}, clientlocale: {:?} }}",
            self.addr, self.dbuser, self.clientlocale,
        )
    }
}

/// Describes a server certificate source for TLS server validation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ServerCerts {
    /// Use the root certificates from <https://mkcert.org/>.
    RootCertificates,
    /// Use the given certificate directly (PEM format).
    Direct(String),
    /// Read the certificate (PEM format) from the given environment
    /// variable.
    Environment(String),
    /// Read all files with extension "pem" from the given directory.
    Directory(String),
}

struct NoCertificateVerification;
impl rustls::client::ServerCertVerifier for NoCertificateVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::Certificate,
        _intermediates: &[rustls::Certificate],
        _server_name: &rustls::ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: std::time::SystemTime,
    ) -> Result<rustls::client::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::ServerCertVerified::assertion())
    }
}
