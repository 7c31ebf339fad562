//! Signed session tokens.
//!
//! Format: `base64url(json claims) "." hex(hmac-sha256(encoded claims))`.
//! The token is opaque to clients; only this module reads it.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use storekeep_core::UserId;

/// Lifetime of an issued token; matches the dashboard cookie max-age.
pub const TOKEN_TTL_DAYS: i64 = 30;

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur when issuing or verifying a token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The signing key was rejected.
    #[error("invalid signing key")]
    InvalidKey,
    /// The token is not `payload.signature`, or the payload is not valid claims.
    #[error("malformed token")]
    Malformed,
    /// The signature does not match the payload.
    #[error("bad token signature")]
    BadSignature,
    /// The token is past its expiry.
    #[error("token expired")]
    Expired,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The authenticated user.
    pub sub: UserId,
    /// Expiry as a Unix timestamp (seconds).
    pub exp: i64,
}

/// Issues and verifies HMAC-signed session tokens.
#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenSigner {
    /// Create a signer from the configured secret.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if the key cannot initialize HMAC.
    pub fn new(secret: &SecretString) -> Result<Self, TokenError> {
        let mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::InvalidKey)?;

        Ok(Self {
            mac,
            ttl: Duration::days(TOKEN_TTL_DAYS),
        })
    }

    /// Issue a token for a user, valid for [`TOKEN_TTL_DAYS`].
    #[must_use]
    pub fn issue(&self, user_id: &UserId) -> String {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    #[must_use]
    pub fn issue_at(&self, user_id: &UserId, now: DateTime<Utc>) -> String {
        let claims = TokenClaims {
            sub: user_id.clone(),
            exp: (now + self.ttl).timestamp(),
        };

        // Serializing a struct of a string and an integer cannot fail
        let json = serde_json::to_vec(&claims).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = hex::encode(self.sign(payload.as_bytes()));

        format!("{payload}.{signature}")
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the token is malformed, forged, or expired.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the token is malformed, forged, or expired.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: TokenClaims =
            serde_json::from_slice(&json).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signer(secret: &str) -> TokenSigner {
        TokenSigner::new(&SecretString::from(secret)).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let signer = signer("q8R#v2Lm!Zt7@Wc4$Kp9^Hy3&Nd6*Bf1");
        let user = UserId::new("8d3f0a9e-user");

        let token = signer.issue(&user);
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.sub, user);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_token_from_other_key_is_rejected() {
        let token = signer("first-key-0123456789abcdefghijkl").issue(&UserId::new("u1"));
        let result = signer("second-key-0123456789abcdefghijk").verify(&token);
        assert_eq!(result, Err(TokenError::BadSignature));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let signer = signer("q8R#v2Lm!Zt7@Wc4$Kp9^Hy3&Nd6*Bf1");
        let token = signer.issue(&UserId::new("u1"));
        let (_, signature) = token.split_once('.').unwrap();

        let forged_claims = TokenClaims {
            sub: UserId::new("admin"),
            exp: i64::MAX,
        };
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{forged_payload}.{signature}");

        assert_eq!(signer.verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let signer = signer("q8R#v2Lm!Zt7@Wc4$Kp9^Hy3&Nd6*Bf1");
        let issued = Utc::now() - Duration::days(TOKEN_TTL_DAYS + 1);
        let token = signer.issue_at(&UserId::new("u1"), issued);

        assert_eq!(signer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let signer = signer("q8R#v2Lm!Zt7@Wc4$Kp9^Hy3&Nd6*Bf1");
        assert_eq!(signer.verify(""), Err(TokenError::Malformed));
        assert_eq!(signer.verify("no-dot"), Err(TokenError::Malformed));
        assert_eq!(signer.verify("abc.not-hex"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_debug_redacts_key() {
        let output = format!("{:?}", signer("q8R#v2Lm!Zt7@Wc4$Kp9^Hy3&Nd6*Bf1"));
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("q8R#"));
    }
}
