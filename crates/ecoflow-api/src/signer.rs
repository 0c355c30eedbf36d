//! Request signing for the EcoFlow open API.
//!
//! Every request carries four headers: `accessKey`, `nonce`, `timestamp` and
//! `sign`. The signature is an HMAC-SHA256 (lowercase hex) over
//!
//! ```text
//! k1=v1&k2=v2&accessKey=<ak>&nonce=<nonce>&timestamp=<ms>
//! ```
//!
//! where the query parameters are sorted by key. Each parameter is followed
//! by `&`, so the parameter prefix keeps its trailing separator. The server
//! recomputes the same string, so the layout is fixed.

use std::fmt;
use std::ops::RangeInclusive;

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Six-digit nonce range.
pub const NONCE_RANGE: RangeInclusive<u32> = 100_000..=999_999;

/// Header names expected by the API.
pub const ACCESS_KEY_HEADER: &str = "accessKey";
pub const NONCE_HEADER: &str = "nonce";
pub const TIMESTAMP_HEADER: &str = "timestamp";
pub const SIGN_HEADER: &str = "sign";

/// The authentication headers for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub access_key: String,
    pub nonce: String,
    pub timestamp: String,
    pub sign: String,
}

impl SignedHeaders {
    /// Attach the headers to an outgoing request.
    pub fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(ACCESS_KEY_HEADER, &self.access_key)
            .header(NONCE_HEADER, &self.nonce)
            .header(TIMESTAMP_HEADER, &self.timestamp)
            .header(SIGN_HEADER, &self.sign)
    }
}

/// Holds the key pair and produces [`SignedHeaders`].
#[derive(Clone)]
pub struct Signer {
    access_key: String,
    secret_key: String,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl Signer {
    /// Create a signer for the given key pair.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// The public access key.
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Sign a request with a fresh nonce and the current time in milliseconds.
    pub fn sign(&self, params: &[(&str, &str)]) -> SignedHeaders {
        let nonce = rand::thread_rng().gen_range(NONCE_RANGE).to_string();
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        self.sign_with(params, &nonce, &timestamp)
    }

    /// Sign a request with a caller-supplied nonce and timestamp.
    ///
    /// Deterministic: identical inputs always give the same signature.
    pub fn sign_with(&self, params: &[(&str, &str)], nonce: &str, timestamp: &str) -> SignedHeaders {
        let payload = format!(
            "{}accessKey={}&nonce={}&timestamp={}",
            param_string(params),
            self.access_key,
            nonce,
            timestamp
        );

        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        let sign = format!("{:x}", mac.finalize().into_bytes());

        SignedHeaders {
            access_key: self.access_key.clone(),
            nonce: nonce.to_string(),
            timestamp: timestamp.to_string(),
            sign,
        }
    }
}

/// Render query parameters as `k=v&` pairs sorted by key.
pub fn param_string(params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    sorted
        .iter()
        .map(|(key, value)| format!("{}={}&", key, value))
        .collect()
}
