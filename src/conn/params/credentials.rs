use debug_ignore::DebugIgnore;
use secstr::SecUtf8;
use std::sync::{Arc, Mutex};

/// The credential material of a connection.
///
/// Besides the password, this covers the optional material for the other
/// authentication methods: a JWT token, a client certificate with its
/// private key, and a session cookie received from the server.
#[derive(Clone, Debug)]
pub struct Credentials {
    password: SecUtf8,
    o_token: Option<SecUtf8>,
    o_client_certificate: Option<ClientCertificate>,
    o_session_cookie: Option<DebugIgnore<Vec<u8>>>,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            password: SecUtf8::from(""),
            o_token: None,
            o_client_certificate: None,
            o_session_cookie: None,
        }
    }
}

#[derive(Clone)]
pub(crate) struct ClientCertificate {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}
impl std::fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ClientCertificate {{ ... }}")
    }
}

impl Credentials {
    /// Creates credentials with a password only.
    pub fn with_password<S: AsRef<str>>(password: S) -> Self {
        Self {
            password: SecUtf8::from(password.as_ref()),
            ..Self::default()
        }
    }

    /// Adds a JWT token.
    #[must_use]
    pub fn with_token<S: AsRef<str>>(mut self, token: S) -> Self {
        self.o_token = Some(SecUtf8::from(token.as_ref()));
        self
    }

    /// Adds a client certificate (PEM) with its unencrypted private key
    /// (PEM).
    #[must_use]
    pub fn with_client_certificate(mut self, cert_pem: Vec<u8>, key_pem: Vec<u8>) -> Self {
        self.o_client_certificate = Some(ClientCertificate { cert_pem, key_pem });
        self
    }

    pub(crate) fn password(&self) -> &SecUtf8 {
        &self.password
    }
    pub(crate) fn token(&self) -> Option<&SecUtf8> {
        self.o_token.as_ref()
    }
    pub(crate) fn client_certificate(&self) -> Option<&ClientCertificate> {
        self.o_client_certificate.as_ref()
    }
    pub(crate) fn session_cookie(&self) -> Option<&[u8]> {
        self.o_session_cookie.as_deref().map(Vec::as_slice)
    }
    pub(crate) fn set_session_cookie(&mut self, cookie: Vec<u8>) {
        self.o_session_cookie = Some(DebugIgnore::from(cookie));
    }
}

/// Provides fresh credential material after an authentication failure.
///
/// The connection factory invokes the callback under a lock; when it
/// returns new material the internal version counter is bumped and the
/// connect attempt is repeated. A `None` result ends the retry loop.
pub trait CredentialRefresh: Send + Sync {
    /// Produces fresh credential material, or None when nothing newer is
    /// available.
    fn refresh(&self) -> Option<Credentials>;
}

impl std::fmt::Debug for dyn CredentialRefresh {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "CredentialRefresh {{ ... }}")
    }
}

// Shared, versioned credential cell. Cloned into every redirect target so
// that a refresh benefits all of them.
#[derive(Clone, Debug, Default)]
pub(crate) struct CredentialStore {
    inner: Arc<Mutex<(Credentials, u64)>>,
}

impl CredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            inner: Arc::new(Mutex::new((credentials, 0))),
        }
    }

    pub fn current(&self) -> (Credentials, u64) {
        let guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        (guard.0.clone(), guard.1)
    }

    pub fn store_session_cookie(&self, cookie: Vec<u8>) {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.0.set_session_cookie(cookie);
        guard.1 += 1;
    }

    // Invokes the refresh callback if our view was still current; returns
    // true if newer material is available now.
    pub fn try_refresh(&self, o_refresh: Option<&dyn CredentialRefresh>, seen_version: u64) -> bool {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if guard.1 > seen_version {
            // somebody else refreshed in the meantime
            return true;
        }
        if let Some(refresh) = o_refresh {
            if let Some(new_credentials) = refresh.refresh() {
                guard.0 = new_credentials;
                guard.1 += 1;
                return true;
            }
        }
        false
    }
}
