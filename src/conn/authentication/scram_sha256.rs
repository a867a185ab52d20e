use crate::conn::authentication::{crypto_util, Authenticator};
use crate::conn::params::Credentials;
use crate::hdb_error::impl_err;
use crate::protocol::parts::AuthFields;
use crate::{HdbError, HdbResult};
use byteorder::{LittleEndian, WriteBytesExt};
use rand::{thread_rng, RngCore};
use std::io::Write;

const CLIENT_PROOF_SIZE: u8 = 32;

pub(crate) struct ScramSha256 {
    client_challenge: Vec<u8>,
    server_proof: Option<Vec<u8>>,
}
impl ScramSha256 {
    pub fn boxed_authenticator() -> Box<dyn Authenticator + Send + Sync> {
        let mut client_challenge = [0_u8; 64];
        let mut rng = thread_rng();
        rng.fill_bytes(&mut client_challenge);
        Box::new(Self {
            client_challenge: client_challenge.to_vec(),
            server_proof: None,
        })
    }
}
impl Authenticator for ScramSha256 {
    fn name(&self) -> &str {
        "SCRAMSHA256"
    }

    fn name_as_bytes(&self) -> Vec<u8> {
        self.name().as_bytes().to_owned()
    }

    fn client_challenge(&self) -> &[u8] {
        &(self.client_challenge)
    }

    fn client_proof(
        &mut self,
        server_data: &[u8],
        credentials: &Credentials,
    ) -> HdbResult<Vec<u8>> {
        const CONTEXT_CLIENT_PROOF: &str = "ClientProof";
        let (salt, server_challenge) = parse_first_server_data(server_data)?;

        let (client_proof, server_proof) = crypto_util::scram_sha256(
            &salt,
            &server_challenge,
            &self.client_challenge,
            credentials.password(),
        )
        .map_err(|_| HdbError::Impl("crypto_common::InvalidLength"))?;

        self.client_challenge.clear();
        self.server_proof = Some(server_proof);

        let mut buf = Vec::<u8>::with_capacity(3 + (CLIENT_PROOF_SIZE as usize));
        buf.write_u16::<LittleEndian>(1_u16)
            .map_err(|_e| HdbError::Impl(CONTEXT_CLIENT_PROOF))?;
        buf.write_u8(CLIENT_PROOF_SIZE)
            .map_err(|_e| HdbError::Impl(CONTEXT_CLIENT_PROOF))?;
        buf.write_all(&client_proof)
            .map_err(|_e| HdbError::Impl(CONTEXT_CLIENT_PROOF))?;

        Ok(buf)
    }

    fn verify_server(&mut self, server_data: &[u8]) -> HdbResult<()> {
        let srv_proof = AuthFields::parse(&mut std::io::Cursor::new(server_data))?
            .pop()
            .ok_or_else(|| impl_err!("expected non-empty list of auth fields"))?;

        if let Some(ref s_p) = self.server_proof {
            if s_p as &[u8] == &srv_proof as &[u8] {
                return Ok(());
            }
        }
        let msg = "SCRAMSHA256: Server proof failed - \
                   this indicates a severe security issue with the server's identity!";
        warn!("{msg}");
        Err(HdbError::Usage(msg))
    }
}

// `server_data` is again an AuthFields; contains salt and server challenge
fn parse_first_server_data(server_data: &[u8]) -> HdbResult<(Vec<u8>, Vec<u8>)> {
    let mut af = AuthFields::parse(&mut std::io::Cursor::new(server_data))?;

    match (af.pop(), af.pop(), af.pop()) {
        (Some(server_challenge), Some(salt), None) => {
            if salt.len() < 16 {
                Err(impl_err!("too little salt: {}", salt.len()))
            } else {
                Ok((salt, server_challenge))
            }
        }
        (_, _, _) => Err(impl_err!("expected 2 auth fields")),
    }
}
