//! HS256 JWT implementation of the `TokenService` port.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{BloodGroup, City, Role, TokenClaims, UserId};

use super::TokenKey;

/// Bearer token lifetime.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireClaims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    blood_group: Option<String>,
    iat: i64,
    exp: i64,
}

impl WireClaims {
    fn into_claims(self) -> Option<TokenClaims> {
        let subject = UserId::new(&self.sub).ok()?;
        let role = self.role.map(|raw| Role::from_str(&raw)).transpose().ok()?;
        let city = self.city.map(City::new).transpose().ok()?;
        let blood_group = self
            .blood_group
            .map(|raw| BloodGroup::parse(&raw))
            .transpose()
            .ok()?;
        Some(TokenClaims {
            subject,
            role,
            city,
            blood_group,
        })
    }
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    pub fn new(key: &TokenKey, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp"]);
        Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            validation,
            clock,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at + Duration::days(TOKEN_TTL_DAYS);
        let wire = WireClaims {
            sub: claims.subject.to_string(),
            role: claims.role.map(|role| role.as_str().to_owned()),
            city: claims.city.as_ref().map(ToString::to_string),
            blood_group: claims.blood_group.map(|group| group.as_str().to_owned()),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &self.validation)
            .map_err(|err| {
                debug!(error = %err, "bearer token rejected");
                TokenError::Invalid
            })?;
        data.claims.into_claims().ok_or(TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, TimeZone, Utc};
    use mockable::DefaultClock;
    use rstest::{fixture, rstest};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[fixture]
    fn key() -> TokenKey {
        TokenKey::from_bytes(vec![7; 32])
    }

    #[fixture]
    fn service(key: TokenKey) -> JwtTokenService {
        JwtTokenService::new(&key, Arc::new(DefaultClock))
    }

    #[rstest]
    fn issued_tokens_verify(service: JwtTokenService) {
        let claims = TokenClaims {
            subject: UserId::random(),
            role: Some(Role::Donor),
            city: Some(City::new("Pune").expect("city")),
            blood_group: Some(BloodGroup::ONegative),
        };

        let token = service.issue(&claims).expect("issue");
        let decoded = service.verify(&token).expect("verify");

        assert_eq!(decoded, claims);
    }

    #[rstest]
    fn subject_only_tokens_verify(service: JwtTokenService) {
        let claims = TokenClaims::for_subject(UserId::random());
        let token = service.issue(&claims).expect("issue");
        assert_eq!(service.verify(&token).expect("verify"), claims);
    }

    #[rstest]
    fn expired_tokens_are_invalid(key: TokenKey) {
        let long_ago = Utc
            .with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp");
        let issuer = JwtTokenService::new(&key, Arc::new(FixedClock(long_ago)));
        let token = issuer
            .issue(&TokenClaims::for_subject(UserId::random()))
            .expect("issue");

        let verifier = JwtTokenService::new(&key, Arc::new(DefaultClock));
        assert!(matches!(verifier.verify(&token), Err(TokenError::Invalid)));
    }

    #[rstest]
    fn tokens_signed_with_another_key_are_invalid(service: JwtTokenService) {
        let other = JwtTokenService::new(
            &TokenKey::from_bytes(vec![9; 32]),
            Arc::new(DefaultClock),
        );
        let token = other
            .issue(&TokenClaims::for_subject(UserId::random()))
            .expect("issue");

        assert!(matches!(service.verify(&token), Err(TokenError::Invalid)));
    }

    #[rstest]
    #[case("")]
    #[case("not-a-jwt")]
    #[case("a.b.c")]
    fn malformed_tokens_are_invalid(service: JwtTokenService, #[case] token: &str) {
        assert!(matches!(service.verify(token), Err(TokenError::Invalid)));
    }
}
