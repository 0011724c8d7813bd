use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use tracing::debug;

use crate::auth::{AuthError, Claims, Identity, IdentityResolver, JwksCache};
use crate::config::SecurityConfig;

/// Where verification keys come from.
pub enum KeySource {
    /// HS256 with a shared secret.
    Secret(String),
    /// RS256 against a remote key set (e.g. Firebase secure-token keys).
    Jwks(JwksCache),
}

pub struct JwtIdentityResolver {
    keys: KeySource,
    issuer: Option<String>,
    audience: Option<String>,
}

impl JwtIdentityResolver {
    pub fn new(keys: KeySource) -> Self {
        Self {
            keys,
            issuer: None,
            audience: None,
        }
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self::new(KeySource::Secret(secret.into()))
    }

    pub fn with_issuer(mut self, issuer: Option<String>) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn with_audience(mut self, audience: Option<String>) -> Self {
        self.audience = audience;
        self
    }

    /// A configured JWKS URL wins over the shared secret.
    pub fn from_config(security: &SecurityConfig) -> Result<Self, AuthError> {
        let keys = match &security.jwks_url {
            Some(url) => KeySource::Jwks(JwksCache::new(url.clone(), Duration::from_secs(security.jwks_cache_secs))),
            None if !security.jwt_secret.is_empty() => KeySource::Secret(security.jwt_secret.clone()),
            None => return Err(AuthError::NotConfigured),
        };

        Ok(Self::new(keys)
            .with_issuer(security.token_issuer.clone())
            .with_audience(security.token_audience.clone()))
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = match &self.keys {
            KeySource::Secret(secret) => {
                let key = DecodingKey::from_secret(secret.as_bytes());
                decode::<Claims>(token, &key, &self.validation(Algorithm::HS256))?.claims
            }
            KeySource::Jwks(cache) => {
                let header = decode_header(token)?;
                let kid = header
                    .kid
                    .ok_or_else(|| AuthError::InvalidToken("missing key id".to_string()))?;
                let key = cache.key(&kid).await?;
                decode::<Claims>(token, &key, &self.validation(Algorithm::RS256))?.claims
            }
        };

        if claims.sub.trim().is_empty() {
            return Err(AuthError::MissingSubject);
        }

        debug!("Verified token for {}", claims.sub);
        Ok(Identity {
            subject_id: claims.sub,
            email: claims.email,
        })
    }
}
