mod connect_params;
mod connect_params_builder;
mod credentials;
mod tls;

pub use self::connect_params::{ConnectParams, ServerCerts};
pub use self::connect_params_builder::ConnectParamsBuilder;
pub use self::credentials::{CredentialRefresh, Credentials};
pub use self::tls::Tls;

pub(crate) use self::credentials::{ClientCertificate, CredentialStore};

