mod am_conn_core;
mod authentication;
mod connection_configuration;
mod connection_core;
mod connection_statistics;
mod initial_request;
mod params;
mod server_version;
mod session_state;
mod tcp_client;

pub use self::connection_configuration::ConnectionConfiguration;
pub use self::connection_statistics::ConnectionStatistics;
pub use self::server_version::ServerVersion;
pub use self::params::{
    ConnectParams, ConnectParamsBuilder, CredentialRefresh, Credentials, ServerCerts, Tls,
};

pub(crate) use self::am_conn_core::AmConnCore;
pub(crate) use self::connection_core::ConnectionCore;
pub(crate) use self::session_state::SessionState;
pub(crate) use self::tcp_client::TcpClient;
