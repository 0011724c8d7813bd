use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::auth::AuthError;

/// An unknown `kid` triggers a refetch, but never more often than this.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// Remote JSON Web Key Set, cached by key id.
pub struct JwksCache {
    url: String,
    ttl: Duration,
    client: reqwest::Client,
    cached: RwLock<Option<CachedKeys>>,
}

impl JwksCache {
    pub fn new(url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            url: url.into(),
            ttl,
            client: reqwest::Client::new(),
            cached: RwLock::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Decoding key for `kid`, fetching the set when it is stale or the key is unknown.
    pub async fn key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cached = self.cached.read().await;
            if let Some(cached) = cached.as_ref() {
                let age = cached.fetched_at.elapsed();
                if age < self.ttl {
                    if let Some(key) = cached.keys.get(kid) {
                        return Ok(key.clone());
                    }
                    if age < MIN_REFRESH_INTERVAL {
                        return Err(AuthError::InvalidToken(format!("unknown key id {kid}")));
                    }
                }
            }
        }

        self.refresh().await?;

        let cached = self.cached.read().await;
        cached
            .as_ref()
            .and_then(|c| c.keys.get(kid).cloned())
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown key id {kid}")))
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        debug!("Fetching signing keys from {}", self.url);
        let set: JwkSet = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::KeysUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::KeysUnavailable(e.to_string()))?;

        self.install(&set).await;
        Ok(())
    }

    async fn install(&self, set: &JwkSet) {
        let mut keys = HashMap::new();
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(e) => warn!("Skipping unusable signing key {}: {}", kid, e),
            }
        }

        *self.cached.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RSA public key from RFC 7517 appendix A.1.
    const KEY_SET: &str = r#"{"keys":[{"kty":"RSA","kid":"2011-04-29","alg":"RS256","use":"sig",
        "n":"0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw",
        "e":"AQAB"}]}"#;

    #[tokio::test]
    async fn serves_installed_keys_without_fetching() {
        let cache = JwksCache::new("http://127.0.0.1:9/unreachable", Duration::from_secs(3600));
        let set: JwkSet = serde_json::from_str(KEY_SET).unwrap();
        cache.install(&set).await;

        assert!(cache.key("2011-04-29").await.is_ok());
    }

    #[tokio::test]
    async fn unknown_kid_right_after_fetch_is_rejected_without_refetch() {
        let cache = JwksCache::new("http://127.0.0.1:9/unreachable", Duration::from_secs(3600));
        let set: JwkSet = serde_json::from_str(KEY_SET).unwrap();
        cache.install(&set).await;

        let Err(err) = cache.key("rotated-away").await else {
            panic!("unknown kid should be rejected");
        };
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_reports_keys_unavailable() {
        let cache = JwksCache::new("http://127.0.0.1:9/unreachable", Duration::from_secs(3600));
        let Err(err) = cache.key("any").await else {
            panic!("unreachable key set should fail");
        };
        assert!(matches!(err, AuthError::KeysUnavailable(_)));
    }
}
