use crate::conn::authentication::Authenticator;
use crate::conn::params::Credentials;
use crate::HdbResult;

// Authentication with a session cookie from an earlier connect: the cookie
// is sent in the first round, the final response is empty.
pub(crate) struct SessionCookie {
    cookie: Vec<u8>,
}

impl SessionCookie {
    pub fn boxed_authenticator(cookie: Vec<u8>) -> Box<dyn Authenticator + Send + Sync> {
        Box::new(Self { cookie })
    }
}

impl Authenticator for SessionCookie {
    fn name(&self) -> &str {
        "SessionCookie"
    }

    fn name_as_bytes(&self) -> Vec<u8> {
        self.name().as_bytes().to_owned()
    }

    fn client_challenge(&self) -> &[u8] {
        &self.cookie
    }

    fn client_proof(
        &mut self,
        _server_data: &[u8],
        _credentials: &Credentials,
    ) -> HdbResult<Vec<u8>> {
        // the cookie was already transferred with the first round
        Ok(Vec::new())
    }

    fn verify_server(&mut self, _server_data: &[u8]) -> HdbResult<()> {
        Ok(())
    }
}
