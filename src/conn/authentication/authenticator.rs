use crate::conn::params::Credentials;
use crate::hdb_error::impl_err;
use crate::HdbResult;

pub(crate) trait Authenticator {
    fn name(&self) -> &str;

    fn name_as_bytes(&self) -> Vec<u8>;

    // The data sent for this method in the first round: a challenge for
    // the SCRAM variants, the certificate chain for X509, the token for
    // JWT, the cookie for SessionCookie.
    fn client_challenge(&self) -> &[u8];

    fn client_proof(
        &mut self,
        server_challenge_data: &[u8],
        credentials: &Credentials,
    ) -> HdbResult<Vec<u8>>;

    fn verify_server(&mut self, server_proof: &[u8]) -> HdbResult<()>;

    fn evaluate_second_response(&mut self, method: &[u8], server_proof: &[u8]) -> HdbResult<()> {
        if method == self.name().as_bytes() {
            self.verify_server(server_proof)
        } else {
            Err(impl_err!(
                "Wrong method name detected: {}",
                String::from_utf8_lossy(method)
            ))
        }
    }

    // A session cookie issued by the server with the final response.
    fn session_cookie(&self) -> Option<&[u8]> {
        None
    }
}
