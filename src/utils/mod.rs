pub mod multipart;

use actix_web::{web, FromRequest};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{de::Deserializer, Deserialize, Serialize};
use validator::Validate;

use crate::api::error;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    User,
}

/// Session token claims. Tokens are minted by the portal's session service;
/// this crate only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub org: uuid::Uuid,
    pub iat: u64,
    pub exp: u64,
    pub role: UserRole,
}

impl Claims {
    #[cfg(test)]
    pub fn new(sub: &uuid::Uuid, org: &uuid::Uuid, role: &UserRole, exp: u64) -> Self {
        let now = chrono::Utc::now().timestamp() as u64;
        Claims { sub: *sub, org: *org, iat: now, exp: now + exp, role: role.clone() }
    }

    #[cfg(test)]
    pub fn encode(&self, secret: &[u8]) -> Result<String, error::SystemError> {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, self, &EncodingKey::from_secret(secret))?;
        Ok(token)
    }

    pub fn decode(token: &str, secret: &[u8]) -> Result<Self, error::SystemError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        let token_data = decode::<Self>(token, &DecodingKey::from_secret(secret), &validation)?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Keeps an explicit `null` apart from an absent field: `Some(None)` vs `None`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest for ValidatedJson<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Json::<T>::from_request(req, payload);

        Box::pin(async move {
            let json = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            let model = json.into_inner();
            model.validate().map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            Ok(ValidatedJson(model))
        })
    }
}

pub struct ValidatedQuery<T>(pub T);

impl<T> FromRequest for ValidatedQuery<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Query::<T>::from_request(req, payload);

        Box::pin(async move {
            let query = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            query.validate().map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            Ok(ValidatedQuery(query.into_inner()))
        })
    }
}

/// Path and query extractor failures answer with the JSON error envelope.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| error::Error::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| error::Error::bad_request(err.to_string()).into()),
    );
}

/// Lowercase, dash-separated form of `input` keeping only ASCII alphanumerics.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            dash = false;
        } else if !dash && !slug.is_empty() {
            slug.push('-');
            dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_round_trip_through_hs256() {
        let user = uuid::Uuid::new_v4();
        let org = uuid::Uuid::new_v4();
        let token = Claims::new(&user, &org, &UserRole::Admin, 60).encode(b"secret").unwrap();

        let claims = Claims::decode(&token, b"secret").unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.org, org);
        assert!(claims.is_admin());

        assert!(Claims::decode(&token, b"other-secret").is_err());
    }

    #[test]
    fn expired_claims_are_rejected() {
        let mut claims =
            Claims::new(&uuid::Uuid::new_v4(), &uuid::Uuid::new_v4(), &UserRole::User, 0);
        claims.exp = claims.iat.saturating_sub(3600);
        let token = claims.encode(b"secret").unwrap();
        assert!(Claims::decode(&token, b"secret").is_err());
    }

    #[test]
    fn only_hs256_tokens_are_accepted() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let claims = Claims::new(&uuid::Uuid::new_v4(), &uuid::Uuid::new_v4(), &UserRole::Admin, 60);
        let token =
            encode(&Header::new(Algorithm::HS384), &claims, &EncodingKey::from_secret(b"secret")).unwrap();
        assert!(Claims::decode(&token, b"secret").is_err());
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Brand Logo (Final).PNG"), "brand-logo-final-png");
        assert_eq!(slugify("  --  "), "");
        assert_eq!(slugify("email_footer"), "email-footer");
    }
}
