//! # Credential codec
//!
//! Issues and decodes HS256-signed credentials. A credential carries the
//! subject id and the permission list of the role the subject held at
//! issuance; it is never re-checked against the catalog afterwards.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::catalog::{permissions_for, Role};
use crate::config::AuthConfig;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("the signing secret is not configured")]
    MissingSecret,

    #[error("no credential was provided")]
    Missing,

    #[error("{0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("the credential does not carry a valid expiry")]
    BadExpiry,

    #[error("token lifetime must be a positive number of hours, got {0}")]
    InvalidTtl(i64),

    #[error("failed to sign credential: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Claims embedded in the signed token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub authorized: bool,
    pub exp: i64,
    pub user_id: u64,
    pub permissions: Vec<String>,
}

/// A decoded, signature-checked credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub subject_id: u64,
    pub permissions: Vec<String>,
    pub valid_until: DateTime<Utc>,
}

#[derive(Clone)]
pub struct CredentialCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl CredentialCodec {
    pub fn new(config: &AuthConfig) -> Result<Self, CredentialError> {
        if config.secret_key.is_empty() {
            return Err(CredentialError::MissingSecret);
        }

        let ttl = Some(config.token_ttl_hours)
            .filter(|hours| *hours > 0)
            .and_then(Duration::try_hours)
            .ok_or(CredentialError::InvalidTtl(config.token_ttl_hours))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn issue(&self, subject_id: u64, role: Role) -> Result<String, CredentialError> {
        self.issue_at(subject_id, role, Utc::now())
    }

    /// Issue a credential as if it had been issued at `issued_at`.
    pub fn issue_at(
        &self,
        subject_id: u64,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, CredentialError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or(CredentialError::BadExpiry)?;
        let claims = Claims {
            authorized: true,
            exp: expires_at.timestamp(),
            user_id: subject_id,
            permissions: permissions_for(role),
        };

        debug!(
            subject_id,
            role = %role,
            exp = claims.exp,
            "issuing credential"
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(CredentialError::Signing)
    }

    pub fn decode(&self, token: &str) -> Result<Credential, CredentialError> {
        if token.is_empty() {
            return Err(CredentialError::Missing);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            warn!(error = %e, "credential rejected");
            CredentialError::Invalid(e)
        })?;

        let valid_until = Utc
            .timestamp_opt(data.claims.exp, 0)
            .single()
            .ok_or(CredentialError::BadExpiry)?;

        Ok(Credential {
            subject_id: data.claims.user_id,
            permissions: data.claims.permissions,
            valid_until,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> CredentialCodec {
        CredentialCodec::new(&AuthConfig {
            secret_key: secret.to_string(),
            token_ttl_hours: 6,
            bcrypt_cost: 4,
        })
        .unwrap()
    }

    #[test]
    fn decode_returns_what_was_issued() {
        let codec = codec("secret");
        let token = codec.issue(42, Role::Technician).unwrap();
        let credential = codec.decode(&token).unwrap();

        assert_eq!(credential.subject_id, 42);
        assert_eq!(credential.permissions, permissions_for(Role::Technician));
    }

    #[test]
    fn expiry_is_six_hours_after_issuance() {
        let codec = codec("secret");
        let issued_at = Utc::now();
        let token = codec.issue_at(7, Role::Manager, issued_at).unwrap();
        let credential = codec.decode(&token).unwrap();

        assert_eq!(
            credential.valid_until.timestamp(),
            (issued_at + Duration::hours(6)).timestamp()
        );
    }

    #[test]
    fn expired_credential_is_rejected() {
        let codec = codec("secret");
        let token = codec
            .issue_at(7, Role::Manager, Utc::now() - Duration::hours(7))
            .unwrap();

        assert!(matches!(
            codec.decode(&token),
            Err(CredentialError::Invalid(_))
        ));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = codec("secret-a").issue(1, Role::Manager).unwrap();
        assert!(matches!(
            codec("secret-b").decode(&token),
            Err(CredentialError::Invalid(_))
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec("secret");
        let technician = codec.issue(1, Role::Technician).unwrap();
        let manager = codec.issue(1, Role::Manager).unwrap();

        // Splice the manager payload onto the technician signature.
        let t: Vec<&str> = technician.split('.').collect();
        let m: Vec<&str> = manager.split('.').collect();
        let forged = format!("{}.{}.{}", t[0], m[1], t[2]);

        assert!(codec.decode(&forged).is_err());
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let claims = Claims {
            authorized: true,
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            user_id: 1,
            permissions: vec!["list".into()],
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(codec("secret").decode(&token).is_err());
    }

    #[test]
    fn empty_and_malformed_strings_are_rejected() {
        let codec = codec("secret");
        assert!(matches!(codec.decode(""), Err(CredentialError::Missing)));
        assert!(codec.decode("not-a-token").is_err());
        assert!(codec.decode("a.b.c").is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let result = CredentialCodec::new(&AuthConfig {
            secret_key: String::new(),
            token_ttl_hours: 6,
            bcrypt_cost: 4,
        });
        assert!(matches!(result, Err(CredentialError::MissingSecret)));
    }

    #[test]
    fn non_positive_or_oversized_lifetime_is_refused() {
        for hours in [0, -6, i64::MAX] {
            let result = CredentialCodec::new(&AuthConfig {
                secret_key: "secret".into(),
                token_ttl_hours: hours,
                bcrypt_cost: 4,
            });
            assert!(
                matches!(result, Err(CredentialError::InvalidTtl(h)) if h == hours),
                "{hours}"
            );
        }
    }

    #[test]
    fn lifetime_past_the_calendar_is_a_bad_expiry() {
        let codec = CredentialCodec::new(&AuthConfig {
            secret_key: "secret".into(),
            token_ttl_hours: 1,
            bcrypt_cost: 4,
        })
        .unwrap();
        assert!(matches!(
            codec.issue_at(1, Role::Manager, DateTime::<Utc>::MAX_UTC),
            Err(CredentialError::BadExpiry)
        ));
    }
}
