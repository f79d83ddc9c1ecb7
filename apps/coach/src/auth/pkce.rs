use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

const VERIFIER_LEN: usize = 64;
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// PKCE code verifier and S256 challenge pair.
#[derive(Debug, Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

/// Random verifier over the unreserved URI characters; the challenge is the
/// base64url (unpadded) SHA-256 of the verifier.
pub fn generate_pkce_pair() -> PkcePair {
    let mut rng = rand::thread_rng();
    let verifier: String = (0..VERIFIER_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    let challenge = challenge_for(&verifier);

    PkcePair {
        verifier,
        challenge,
    }
}

pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc7636_vector() {
        // RFC 7636, appendix B
        assert_eq!(
            challenge_for("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_generated_pair_is_consistent() {
        let pair = generate_pkce_pair();
        assert_eq!(pair.verifier.len(), VERIFIER_LEN);
        assert!(pair.verifier.bytes().all(|b| CHARSET.contains(&b)));
        assert_eq!(pair.challenge, challenge_for(&pair.verifier));
        assert!(!pair.challenge.contains('='));
    }

    #[test]
    fn test_pairs_are_unique() {
        assert_ne!(generate_pkce_pair().verifier, generate_pkce_pair().verifier);
    }
}
