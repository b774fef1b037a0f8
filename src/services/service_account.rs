// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Service account credentials: custom-token signing and OAuth access tokens
//! for the admin endpoints (token revocation, storage uploads).

use anyhow::Context;
use gcloud_sdk::{GoogleAuthTokenGenerator, TokenSourceType};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::services::token_verifier::now_unix_secs;

/// Audience Firebase expects on custom tokens.
pub const CUSTOM_TOKEN_AUDIENCE: &str =
    "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit";
const OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const TOKEN_LIFETIME_SECS: u64 = 3600;
/// Firebase rejects custom-token uids longer than this.
const MAX_UID_LEN: usize = 128;

/// Fields used from a Google service account key file.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
}

#[derive(Serialize)]
struct CustomTokenClaims<'a, C: Serialize> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    uid: &'a str,
    iat: u64,
    exp: u64,
    claims: &'a C,
}

/// A parsed service account able to mint tokens.
pub struct ServiceAccount {
    client_email: String,
    credential_json: String,
    encoding_key: EncodingKey,
    /// Built on first use; caches and refreshes access tokens itself.
    token_generator: OnceCell<GoogleAuthTokenGenerator>,
}

impl ServiceAccount {
    /// Parse a service account key file's JSON.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let key: ServiceAccountKey =
            serde_json::from_str(json).context("invalid service account JSON")?;

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("invalid service account private key")?;

        tracing::info!(client_email = %key.client_email, "Loaded service account");

        Ok(Self {
            client_email: key.client_email,
            credential_json: json.to_string(),
            encoding_key,
            token_generator: OnceCell::new(),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Sign a Firebase custom token for `uid` carrying developer `claims`.
    ///
    /// The claims reappear at the top level of the ID token obtained by
    /// exchanging this custom token.
    pub fn sign_custom_token<C: Serialize>(&self, uid: &str, claims: &C) -> anyhow::Result<String> {
        if uid.is_empty() || uid.len() > MAX_UID_LEN {
            anyhow::bail!("custom token uid must be 1-{} characters", MAX_UID_LEN);
        }

        let iat = now_unix_secs();
        let body = CustomTokenClaims {
            iss: &self.client_email,
            sub: &self.client_email,
            aud: CUSTOM_TOKEN_AUDIENCE,
            uid,
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
            claims,
        };

        encode(&Header::new(Algorithm::RS256), &body, &self.encoding_key)
            .context("failed signing custom token")
    }

    /// OAuth access token for Google APIs, cached until shortly before expiry.
    pub async fn access_token(&self) -> anyhow::Result<String> {
        let generator = self
            .token_generator
            .get_or_try_init(|| {
                GoogleAuthTokenGenerator::new(
                    TokenSourceType::Json(self.credential_json.clone()),
                    vec![OAUTH_SCOPE.to_string()],
                )
            })
            .await
            .map_err(|e| anyhow::anyhow!("invalid service account token source: {}", e))?;

        let token = generator
            .create_token()
            .await
            .map_err(|e| anyhow::anyhow!("OAuth token request failed: {}", e))?;

        Ok(token.token.as_sensitive_str().to_string())
    }
}
