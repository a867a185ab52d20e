use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2;
use secstr::SecUtf8;
use sha2::{Digest, Sha256};

// key        = sha256(hmac(password, salt))
// sig        = hmac(sha256(key), salt || server_challenge || client_challenge)
// proof      = key XOR sig
// the server proves itself with hmac over the reversed concatenation
pub(crate) fn scram_sha256(
    salt: &[u8],
    server_challenge: &[u8],
    client_challenge: &[u8],
    password: &SecUtf8,
) -> Result<(Vec<u8>, Vec<u8>), crypto_common::InvalidLength> {
    let salted_password = hmac(password.unsecure().as_ref(), salt)?;

    let (s, sc, cc) = (salt.len(), server_challenge.len(), client_challenge.len());
    let mut content = vec![0_u8; s + sc + cc];
    content[0..s].copy_from_slice(salt);
    content[s..(s + sc)].copy_from_slice(server_challenge);
    content[(s + sc)..].copy_from_slice(client_challenge);

    let client_key: Vec<u8> = sha256(&salted_password);
    let sig: Vec<u8> = hmac(&sha256(&client_key), &content)?;

    let client_proof = xor(&sig, &client_key);

    // calculate server proof
    let ck = client_key.len();
    let mut content2 = vec![0_u8; s + sc + ck];
    content2[0..ck].copy_from_slice(&client_key);
    content2[ck..(ck + s)].copy_from_slice(salt);
    content2[(ck + s)..].copy_from_slice(server_challenge);

    let server_verifier = hmac(&salted_password, salt)?;
    let server_proof = hmac(&server_verifier, &content2)?;

    Ok((client_proof, server_proof))
}

// Same frame as scram_sha256, but the salted password comes from
// pbkdf2-hmac-sha256 with the server-provided iteration count.
pub(crate) fn scram_pbkdf2_sha256(
    salt: &[u8],
    server_challenge: &[u8],
    client_challenge: &[u8],
    password: &SecUtf8,
    iterations: u32,
) -> Result<(Vec<u8>, Vec<u8>), crypto_common::InvalidLength> {
    let salted_password = use_pbkdf2(password.unsecure().as_ref(), salt, iterations);

    let server_verifier = hmac(&salted_password, salt)?;

    let client_key = sha256(&salted_password);
    let client_verifier = sha256(&client_key);

    let (s, sc, cc) = (salt.len(), server_challenge.len(), client_challenge.len());
    let mut s_sc_cc = vec![0_u8; s + sc + cc];
    s_sc_cc[0..s].copy_from_slice(salt);
    s_sc_cc[s..(s + sc)].copy_from_slice(server_challenge);
    s_sc_cc[(s + sc)..].copy_from_slice(client_challenge);
    let shared_key: Vec<u8> = hmac(&client_verifier, &s_sc_cc)?;
    let client_proof = xor(&shared_key, &client_key);

    let mut cc_s_sc = vec![0_u8; cc + s + sc];
    cc_s_sc[0..cc].copy_from_slice(client_challenge);
    cc_s_sc[cc..(cc + s)].copy_from_slice(salt);
    cc_s_sc[(cc + s)..].copy_from_slice(server_challenge);
    let server_proof = hmac(&server_verifier, &cc_s_sc)?;

    Ok((client_proof, server_proof))
}

pub(crate) fn use_pbkdf2(key: &[u8], salt: &[u8], it: u32) -> Vec<u8> {
    let mut output = [0_u8; 32];
    pbkdf2::<Hmac<Sha256>>(key, salt, it, &mut output)
        .expect("pbkdf2 with a 32-byte output cannot fail");
    output.to_vec()
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, crypto_common::InvalidLength> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

pub(crate) fn sha256(input: &[u8]) -> Vec<u8> {
    let mut sha = Sha256::new();
    sha.update(input);
    sha.finalize().to_vec()
}

pub(crate) fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    assert_eq!(a.len(), b.len(), "xor needs two equally long parameters");

    let mut bytes = vec![0_u8; a.len()];
    for i in 0..a.len() {
        bytes[i] = a[i] ^ b[i];
    }
    bytes
}

#[cfg(test)]
mod tests {
    use secstr::SecUtf8;

    #[test]
    fn scram_sha256_proof_shape() {
        let salt = hex::decode("d6c7ff765cae5ebec5e1399a9d6d77f5").unwrap();
        let server_challenge = hex::decode(
            "81fd2c2b8b8c1a1e340d6dfa06a76a0c\
             1b565f5c9e7db346d5c465a5103e6b02\
             0c08e5b1e57a244ef0ee67157f15f73e",
        )
        .unwrap();
        let client_challenge = hex::decode(
            "54164bd7152b0c65a609e5b1c1b0e527\
             ab81e2b704e9d0650b86e1d55bc27b33\
             64b0b6b05e0fb4e1f0de5a9c1a2f4706\
             f1ab20c14202cc63e65f64da51eb5014",
        )
        .unwrap();
        let password = SecUtf8::from("Admin1234");

        let (client_proof, server_proof) =
            super::scram_sha256(&salt, &server_challenge, &client_challenge, &password).unwrap();
        assert_eq!(client_proof.len(), 32);
        assert_eq!(server_proof.len(), 32);

        // the proof is deterministic, and reacts on every ingredient
        let (client_proof2, _) =
            super::scram_sha256(&salt, &server_challenge, &client_challenge, &password).unwrap();
        assert_eq!(client_proof, client_proof2);
        let (client_proof3, _) = super::scram_sha256(
            &salt,
            &server_challenge,
            &client_challenge,
            &SecUtf8::from("Toor1234"),
        )
        .unwrap();
        assert_ne!(client_proof, client_proof3);
    }

    #[test]
    fn scram_pbkdf2_sha256_proof_shape() {
        let salt = hex::decode("33b2d5d55c52c2285078c55ba643173f").unwrap();
        let server_challenge = vec![42_u8; 48];
        let client_challenge = vec![7_u8; 64];
        let password = SecUtf8::from("Toor1234");

        let (client_proof, server_proof) = super::scram_pbkdf2_sha256(
            &salt,
            &server_challenge,
            &client_challenge,
            &password,
            15_000,
        )
        .unwrap();
        assert_eq!(client_proof.len(), 32);
        assert_eq!(server_proof.len(), 32);

        // a different iteration count changes the proof
        let (client_proof2, _) = super::scram_pbkdf2_sha256(
            &salt,
            &server_challenge,
            &client_challenge,
            &password,
            15_001,
        )
        .unwrap();
        assert_ne!(client_proof, client_proof2);
    }
}
