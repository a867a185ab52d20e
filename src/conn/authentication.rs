mod auth_requests;
mod authenticator;
mod crypto_util;
mod jwt;
mod scram_pbkdf2_sha256;
mod scram_sha256;
mod session_cookie;
mod x509;

use self::auth_requests::{first_auth_request, second_auth_request, FirstAuthResponse};
use self::authenticator::Authenticator;
use self::jwt::Jwt;
use self::scram_pbkdf2_sha256::ScramPbkdf2Sha256;
use self::scram_sha256::ScramSha256;
use self::session_cookie::SessionCookie;
use self::x509::X509;
use crate::conn::ConnectionCore;
use crate::hdb_error::impl_err;
use crate::protocol::parts::DbConnectInfo;
use crate::HdbResult;

#[must_use]
pub(crate) enum AuthenticationResult {
    Ok,
    Redirect(DbConnectInfo),
}

// Do the authentication.
//
// Propose the methods for which credential material is configured, in the
// client-preferred order, and drive the two-round handshake with the
// method the server selects.
pub(crate) fn authenticate(
    conn_core: &mut ConnectionCore,
    reconnect: bool,
) -> HdbResult<AuthenticationResult> {
    trace!("authenticate()");
    let (credentials, _version) = conn_core.connect_params().credentials();

    let mut authenticators: Vec<Box<dyn Authenticator + Send + Sync>> = Vec::with_capacity(5);
    if let Some(client_certificate) = credentials.client_certificate() {
        authenticators.push(X509::boxed_authenticator(client_certificate.clone())?);
    }
    if let Some(token) = credentials.token() {
        authenticators.push(Jwt::boxed_authenticator(token));
    }
    authenticators.push(ScramPbkdf2Sha256::boxed_authenticator());
    authenticators.push(ScramSha256::boxed_authenticator());
    if let Some(cookie) = credentials.session_cookie() {
        authenticators.push(SessionCookie::boxed_authenticator(cookie.to_vec()));
    }

    // ...with the first request. A server error at this point is an
    // authentication failure and may be answered with refreshed credentials.
    let first_response = first_auth_request(conn_core, &authenticators).map_err(|e| match e {
        e @ crate::HdbError::DbError { .. } => crate::HdbError::Authentication {
            source: Box::new(e),
        },
        e => e,
    })?;
    match first_response {
        FirstAuthResponse::AuthenticatorAndChallenge(selected, server_challenge) => {
            // Find the selected authenticator ...
            let mut authenticator: Box<dyn Authenticator + Send + Sync> = authenticators
                .into_iter()
                .find(|authenticator| authenticator.name() == selected)
                .ok_or_else(|| impl_err!("None of the available authenticators was accepted"))?;
            // ...and use it for the second request
            second_auth_request(conn_core, &mut *authenticator, &server_challenge, reconnect)?;

            // a cookie issued by the server is kept for subsequent connects
            if let Some(cookie) = authenticator.session_cookie() {
                conn_core
                    .connect_params()
                    .store_session_cookie(cookie.to_vec());
            }

            conn_core.set_authenticated();
            trace!("session_id: {}", conn_core.session_id());
            Ok(AuthenticationResult::Ok)
        }
        FirstAuthResponse::RedirectInfo(db_connect_info) => {
            Ok(AuthenticationResult::Redirect(db_connect_info))
        }
    }
}
