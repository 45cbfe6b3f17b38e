//! Token signing.
//!
//! The builder hands its finished claim set to a [`Signer`]. The default
//! [`DigestSigner`] produces `DIGEST:` tokens:
//!
//! ```text
//! DIGEST:base64({"applicationId":"...","digest":"...","token":"<claims json>"})
//! ```
//!
//! where `digest` is the Base64 HMAC-SHA512 of the claims JSON, keyed with
//! `applicationId + secret`.

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha512;

use crate::claims::ClaimSet;
use crate::error::TokenError;

/// Prefix carried by every digest token.
pub const DIGEST_TOKEN_PREFIX: &str = "DIGEST:";

type HmacSha512 = Hmac<Sha512>;

/// Turns `(application id, secret, claims)` into an opaque token string.
///
/// Implementations must be deterministic and must serialize the claims in
/// insertion order. The secret must not be recoverable from the output.
pub trait Signer {
    fn sign_and_encode(
        &self,
        application_id: Option<&str>,
        secret: Option<&str>,
        claims: &ClaimSet,
    ) -> Result<String, TokenError>;
}

impl<S: Signer + ?Sized> Signer for &S {
    fn sign_and_encode(
        &self,
        application_id: Option<&str>,
        secret: Option<&str>,
        claims: &ClaimSet,
    ) -> Result<String, TokenError> {
        (**self).sign_and_encode(application_id, secret, claims)
    }
}

/// HMAC-SHA512 digest token signer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestSigner;

#[derive(Serialize)]
struct DigestEnvelope<'a> {
    #[serde(rename = "applicationId")]
    application_id: &'a str,
    digest: String,
    token: &'a str,
}

impl DigestSigner {
    /// Base64 HMAC-SHA512 of `token`, keyed with `application_id + secret`.
    pub fn calculate_digest(
        application_id: &str,
        secret: &str,
        token: &str,
    ) -> Result<String, TokenError> {
        let key = format!("{application_id}{secret}");
        let mut mac = HmacSha512::new_from_slice(key.as_bytes())
            .map_err(|e| TokenError::SigningFailed(e.to_string()))?;
        mac.update(token.as_bytes());

        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl Signer for DigestSigner {
    fn sign_and_encode(
        &self,
        application_id: Option<&str>,
        secret: Option<&str>,
        claims: &ClaimSet,
    ) -> Result<String, TokenError> {
        let application_id = application_id.ok_or(TokenError::MissingCredential {
            field: "applicationId",
        })?;
        let secret = secret.ok_or(TokenError::MissingCredential { field: "secret" })?;

        let token = claims.to_json()?;
        let digest = Self::calculate_digest(application_id, secret, &token)?;

        let envelope = serde_json::to_string(&DigestEnvelope {
            application_id,
            digest,
            token: &token,
        })?;

        tracing::debug!(
            application_id = %application_id,
            claims = claims.len(),
            "Signed digest token"
        );

        Ok(format!("{DIGEST_TOKEN_PREFIX}{}", STANDARD.encode(envelope)))
    }
}
