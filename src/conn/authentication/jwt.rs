use crate::conn::authentication::Authenticator;
use crate::conn::params::Credentials;
use crate::HdbResult;
use secstr::SecUtf8;

// Token-based authentication. The token is sent in the first round; the
// final response is empty. On success the server issues a session cookie
// that is kept for subsequent connects.
pub(crate) struct Jwt {
    token: Vec<u8>,
    o_cookie: Option<Vec<u8>>,
}

impl Jwt {
    pub fn boxed_authenticator(token: &SecUtf8) -> Box<dyn Authenticator + Send + Sync> {
        Box::new(Self {
            token: token.unsecure().as_bytes().to_vec(),
            o_cookie: None,
        })
    }
}

impl Authenticator for Jwt {
    fn name(&self) -> &str {
        "JWT"
    }

    fn name_as_bytes(&self) -> Vec<u8> {
        self.name().as_bytes().to_owned()
    }

    fn client_challenge(&self) -> &[u8] {
        &self.token
    }

    fn client_proof(
        &mut self,
        _server_data: &[u8],
        _credentials: &Credentials,
    ) -> HdbResult<Vec<u8>> {
        // the token was already transferred with the first round
        Ok(Vec::new())
    }

    fn verify_server(&mut self, server_data: &[u8]) -> HdbResult<()> {
        // the server sends the session cookie with the final reply
        if server_data.is_empty() {
            debug!("JWT authentication without session cookie");
        } else {
            self.o_cookie = Some(server_data.to_vec());
        }
        Ok(())
    }

    fn session_cookie(&self) -> Option<&[u8]> {
        self.o_cookie.as_deref()
    }
}
