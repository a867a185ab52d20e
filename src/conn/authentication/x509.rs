use crate::conn::authentication::Authenticator;
use crate::conn::params::{ClientCertificate, Credentials};
use crate::hdb_error::impl_err;
use crate::protocol::parts::{length_indicator, AuthFields};
use crate::{HdbError, HdbResult};
use byteorder::{LittleEndian, WriteBytesExt};
use ring::rand::SystemRandom;
use ring::signature::{
    EcdsaKeyPair, Ed25519KeyPair, RsaKeyPair, ECDSA_P256_SHA256_ASN1_SIGNING,
    ECDSA_P384_SHA384_ASN1_SIGNING, RSA_PKCS1_SHA256,
};
use std::io::Write;

// Certificate-based authentication.
//
// The first round transfers the certificate chain; the server answers with
// a challenge that the client signs with the certificate's private key.
// The hash for ECDSA keys is chosen from the curve bit size (P-256 signs
// with SHA-256, P-384 with SHA-384); Ed25519 keys hash internally.
pub(crate) struct X509 {
    chain_field: Vec<u8>,
    signer: Signer,
}

enum Signer {
    Rsa(Box<RsaKeyPair>),
    EcdsaP256(Box<EcdsaKeyPair>),
    EcdsaP384(Box<EcdsaKeyPair>),
    Ed25519(Box<Ed25519KeyPair>),
}

impl X509 {
    pub fn boxed_authenticator(
        client_certificate: ClientCertificate,
    ) -> HdbResult<Box<dyn Authenticator + Send + Sync>> {
        let certs_der = rustls_pemfile::certs(&mut std::io::BufReader::new(
            client_certificate.cert_pem.as_slice(),
        ))?;
        if certs_der.is_empty() {
            return Err(HdbError::CertValidation(
                "no certificate found in the provided PEM material".to_string(),
            ));
        }

        // reject certificates outside their validity window before any
        // wire exchange
        for cert_der in &certs_der {
            let (_rem, cert) = x509_parser::parse_x509_certificate(cert_der)
                .map_err(|e| HdbError::CertValidation(format!("unparseable certificate: {e}")))?;
            if !cert.validity().is_valid() {
                return Err(HdbError::CertValidation(format!(
                    "certificate is outside its validity window ({} - {})",
                    cert.validity().not_before,
                    cert.validity().not_after,
                )));
            }
        }

        let signer = signer_from_pem(&client_certificate.key_pem)?;

        // the chain is transferred as a nested field list
        let mut chain_field = Vec::<u8>::new();
        #[allow(clippy::cast_possible_truncation)]
        chain_field.write_u16::<LittleEndian>(certs_der.len() as u16)?;
        for cert_der in &certs_der {
            length_indicator::emit_auth_field_length(cert_der.len(), &mut chain_field)?;
            chain_field.write_all(cert_der)?;
        }

        Ok(Box::new(Self {
            chain_field,
            signer,
        }))
    }

    fn sign(&self, challenge: &[u8]) -> HdbResult<Vec<u8>> {
        match &self.signer {
            Signer::Rsa(key_pair) => {
                let rng = SystemRandom::new();
                let mut signature = vec![0_u8; key_pair.public_modulus_len()];
                key_pair
                    .sign(&RSA_PKCS1_SHA256, &rng, challenge, &mut signature)
                    .map_err(|_| impl_err!("RSA signing failed"))?;
                Ok(signature)
            }
            Signer::EcdsaP256(key_pair) | Signer::EcdsaP384(key_pair) => {
                let rng = SystemRandom::new();
                let signature = key_pair
                    .sign(&rng, challenge)
                    .map_err(|_| impl_err!("ECDSA signing failed"))?;
                Ok(signature.as_ref().to_vec())
            }
            Signer::Ed25519(key_pair) => Ok(key_pair.sign(challenge).as_ref().to_vec()),
        }
    }
}

impl Authenticator for X509 {
    fn name(&self) -> &str {
        "X509"
    }

    fn name_as_bytes(&self) -> Vec<u8> {
        self.name().as_bytes().to_owned()
    }

    fn client_challenge(&self) -> &[u8] {
        &self.chain_field
    }

    fn client_proof(
        &mut self,
        server_data: &[u8],
        _credentials: &Credentials,
    ) -> HdbResult<Vec<u8>> {
        let challenge = AuthFields::parse(&mut std::io::Cursor::new(server_data))?
            .pop()
            .ok_or_else(|| impl_err!("expected a challenge to sign"))?;

        let signature = self.sign(&challenge)?;

        let mut buf = Vec::<u8>::with_capacity(3 + signature.len());
        buf.write_u16::<LittleEndian>(1_u16)?;
        length_indicator::emit_auth_field_length(signature.len(), &mut buf)?;
        buf.write_all(&signature)?;
        Ok(buf)
    }

    fn verify_server(&mut self, _server_data: &[u8]) -> HdbResult<()> {
        Ok(())
    }
}

fn signer_from_pem(key_pem: &[u8]) -> HdbResult<Signer> {
    let mut rdr = std::io::BufReader::new(key_pem);
    loop {
        match rustls_pemfile::read_one(&mut rdr)? {
            None => {
                return Err(HdbError::CertValidation(
                    "no usable private key found in the provided PEM material".to_string(),
                ));
            }
            Some(rustls_pemfile::Item::PKCS8Key(der)) => {
                if let Ok(key_pair) = Ed25519KeyPair::from_pkcs8_maybe_unchecked(&der) {
                    return Ok(Signer::Ed25519(Box::new(key_pair)));
                }
                if let Ok(key_pair) = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &der)
                {
                    return Ok(Signer::EcdsaP256(Box::new(key_pair)));
                }
                if let Ok(key_pair) = EcdsaKeyPair::from_pkcs8(&ECDSA_P384_SHA384_ASN1_SIGNING, &der)
                {
                    return Ok(Signer::EcdsaP384(Box::new(key_pair)));
                }
                if let Ok(key_pair) = RsaKeyPair::from_pkcs8(&der) {
                    return Ok(Signer::Rsa(Box::new(key_pair)));
                }
                return Err(HdbError::CertValidation(
                    "unsupported PKCS#8 private key".to_string(),
                ));
            }
            Some(rustls_pemfile::Item::RSAKey(der)) => {
                let key_pair = RsaKeyPair::from_der(&der).map_err(|_| {
                    HdbError::CertValidation("unparseable RSA private key".to_string())
                })?;
                return Ok(Signer::Rsa(Box::new(key_pair)));
            }
            Some(rustls_pemfile::Item::ECKey(_der)) => {
                return Err(HdbError::CertValidation(
                    "SEC1 EC keys are not supported, provide the key in PKCS#8 format".to_string(),
                ));
            }
            Some(_other_item) => {}
        }
    }
}
