//! Reversible URL obfuscation for `auth` query parameters.
//!
//! Tokens are `base64url(siv || ciphertext)` where `siv` is the first 16 bytes
//! of HMAC-SHA256 over the plaintext URL and the ciphertext is AES-256-CTR
//! keyed with a separate key, using `siv` as the counter block. Encoding is
//! deterministic for a given key, and decoding authenticates the result by
//! recomputing the MAC.

use aes::Aes256;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;
type Aes256Ctr = ctr::Ctr128BE<Aes256>;

const SIV_LEN: usize = 16;

struct CodecKeys {
    cipher: [u8; 32],
    mac: [u8; 32],
}

/// Keyed codec turning absolute URLs into opaque tokens and back.
#[derive(Clone)]
pub struct UrlCodec {
    keys: Arc<CodecKeys>,
}

impl std::fmt::Debug for UrlCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlCodec")
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl UrlCodec {
    /// Derive cipher and MAC keys from a secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            keys: Arc::new(CodecKeys {
                cipher: derive_key(secret, b"tvproxy/url-codec/cipher"),
                mac: derive_key(secret, b"tvproxy/url-codec/mac"),
            }),
        }
    }

    /// Create a codec with a fresh random key. Tokens do not survive a restart.
    pub fn random() -> Self {
        Self::new(rand::random::<[u8; 32]>())
    }

    /// Create from an optional configured secret, warning when falling back to a random key.
    pub fn from_secret(secret: Option<&[u8]>) -> Self {
        match secret {
            Some(secret) => {
                tracing::info!("URL codec keyed from TVPROXY_URL_SECRET");
                Self::new(secret)
            }
            None => {
                tracing::warn!("TVPROXY_URL_SECRET is not set, using a random per-process key");
                tracing::warn!("Rewritten URLs will stop working after a restart");
                Self::random()
            }
        }
    }

    /// Encode an absolute URL into a token.
    pub fn encode(&self, absolute_url: &str) -> Result<String> {
        url::Url::parse(absolute_url)?;

        let siv = self.siv(absolute_url.as_bytes());
        let mut buffer = absolute_url.as_bytes().to_vec();
        self.apply_keystream(&siv, &mut buffer);

        let mut token = Vec::with_capacity(SIV_LEN + buffer.len());
        token.extend_from_slice(&siv);
        token.extend_from_slice(&buffer);
        Ok(URL_SAFE_NO_PAD.encode(token))
    }

    /// Decode a token back into the URL it was produced from.
    pub fn decode(&self, token: &str) -> Result<String> {
        let raw = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| Error::MalformedToken(e.to_string()))?;

        if raw.len() <= SIV_LEN {
            return Err(Error::MalformedToken(format!(
                "token too short: {} bytes",
                raw.len()
            )));
        }

        let (siv, ciphertext) = raw.split_at(SIV_LEN);
        let siv: [u8; SIV_LEN] = siv
            .try_into()
            .map_err(|_| Error::MalformedToken("bad token header".to_string()))?;

        let mut plaintext = ciphertext.to_vec();
        self.apply_keystream(&siv, &mut plaintext);

        let mut mac = self.mac();
        mac.update(&plaintext);
        mac.verify_truncated_left(&siv)
            .map_err(|_| Error::DecodeFailure)?;

        String::from_utf8(plaintext).map_err(|_| Error::DecodeFailure)
    }

    fn siv(&self, plaintext: &[u8]) -> [u8; SIV_LEN] {
        let mut mac = self.mac();
        mac.update(plaintext);
        let digest = mac.finalize().into_bytes();

        let mut siv = [0u8; SIV_LEN];
        siv.copy_from_slice(&digest[..SIV_LEN]);
        siv
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.keys.mac).expect("HMAC can take key of any size")
    }

    fn apply_keystream(&self, siv: &[u8; SIV_LEN], buffer: &mut [u8]) {
        let mut cipher = Aes256Ctr::new(&self.keys.cipher.into(), &(*siv).into());
        cipher.apply_keystream(buffer);
    }
}

fn derive_key(secret: &[u8], label: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(label);

    let mut key = [0u8; 32];
    key.copy_from_slice(&mac.finalize().into_bytes());
    key
}
