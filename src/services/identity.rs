// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider: Firebase Auth accounts, session tokens and profile
//! image storage.
//!
//! Services talk to [`IdentityProvider`]; [`FirebaseIdentity`] implements it
//! over the Identity Toolkit REST API plus the storage JSON API.

use crate::config::Config;
use crate::error::{AppError, ErrorCode, Result};
use crate::models::{Credentials, OobCode, OobRequest, SessionClaims, TokenResponse};
use crate::services::service_account::ServiceAccount;
use crate::services::token_verifier::{now_unix_secs, TokenVerifier};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";
const IDENTITY_ADMIN_BASE: &str = "https://identitytoolkit.googleapis.com/v1/projects";
const STORAGE_UPLOAD_BASE: &str = "https://storage.googleapis.com/upload/storage/v1/b";
const DOWNLOAD_BASE: &str = "https://firebasestorage.googleapis.com/v0/b";
const HTTP_TIMEOUT: Duration = Duration::from_secs(50);
const MULTIPART_BOUNDARY: &str = "gympro_upload_boundary";

/// Account, token and storage operations backed by the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an email/password account.
    async fn sign_up(&self, email: &str, password: &str) -> Result<TokenResponse>;

    async fn sign_in_with_password(&self, creds: &Credentials) -> Result<TokenResponse>;

    /// Mint a custom token for `uid` embedding the session claims.
    async fn create_custom_token(&self, uid: &str, claims: &SessionClaims) -> Result<String>;

    /// Trade a custom token for an ID/refresh token pair.
    async fn exchange_custom_token(&self, custom_token: &str) -> Result<TokenResponse>;

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenResponse>;

    /// Validate an ID token and return the session claims inside it.
    async fn verify_id_token(&self, id_token: &str) -> Result<SessionClaims>;

    /// Invalidate every refresh token issued to `uid` so far.
    async fn revoke_refresh_tokens(&self, uid: &str) -> Result<()>;

    /// Delete the account that owns `id_token`.
    async fn delete_account(&self, id_token: &str) -> Result<()>;

    /// Store an image at `object_path` and return its public download URL.
    async fn upload_image(
        &self,
        object_path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;

    /// Send a verification or password-reset email.
    async fn send_oob_code(&self, request: &OobRequest) -> Result<()>;

    /// Apply an out-of-band code from a verification email.
    async fn confirm_oob_code(&self, code: &OobCode) -> Result<()>;
}

/// Firebase Auth + Storage over REST.
pub struct FirebaseIdentity {
    http_client: reqwest::Client,
    host: String,
    api_key: String,
    project_id: String,
    bucket: String,
    service_account: ServiceAccount,
    verifier: TokenVerifier,
}

impl FirebaseIdentity {
    pub fn new(
        config: &Config,
        service_account: ServiceAccount,
        verifier: TokenVerifier,
    ) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            host: config.firebase_host.clone(),
            api_key: config.firebase_key.clone(),
            project_id: config.google_project_id.clone(),
            bucket: config.storage_bucket.clone(),
            service_account,
            verifier,
        })
    }

    fn accounts_url(&self, method: &str) -> String {
        format!(
            "{}:{}?key={}",
            self.host,
            method,
            urlencoding::encode(&self.api_key)
        )
    }

    /// POST a JSON body to an Identity Toolkit `accounts:*` method.
    async fn call_accounts<B, T>(&self, operation: &'static str, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .http_client
            .post(self.accounts_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::from_source(operation, e))?;

        parse_response(operation, response).await
    }

    async fn access_token(&self, operation: &'static str) -> Result<String> {
        self.service_account
            .access_token()
            .await
            .map_err(|e| AppError::internal(operation, format!("{:#}", e)))
    }
}

/// Decode a success body, or map the provider's error body onto an [`AppError`].
async fn parse_response<T>(operation: &'static str, response: reqwest::Response) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| AppError::from_source(operation, e));
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ProviderErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);

    tracing::warn!(operation, status = %status, message = %message, "Identity provider call failed");

    Err(AppError::new(
        operation,
        classify_provider_error(status.as_u16(), &message),
        message,
    ))
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: String,
}

/// Map an Identity Toolkit error message (e.g. `EMAIL_EXISTS`,
/// `INVALID_PASSWORD : ...`) to an API error code.
pub fn classify_provider_error(status: u16, message: &str) -> ErrorCode {
    let code = message.split([' ', ':']).next().unwrap_or_default();
    match code {
        "EMAIL_EXISTS" => ErrorCode::Conflict,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_NOT_FOUND"
        | "USER_DISABLED" | "INVALID_OOB_CODE" | "EXPIRED_OOB_CODE" => ErrorCode::NotFound,
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "INVALID_CUSTOM_TOKEN"
        | "CREDENTIAL_MISMATCH" => ErrorCode::Unauthorized,
        "INVALID_EMAIL" | "WEAK_PASSWORD" | "MISSING_PASSWORD" | "MISSING_EMAIL" => {
            ErrorCode::InvalidInput
        }
        _ if (400..500).contains(&status) => ErrorCode::InvalidInput,
        _ => ErrorCode::InternalError,
    }
}

/// Public download URL for an object carrying a Firebase download token.
pub fn download_url(bucket: &str, object_path: &str, token: &str) -> String {
    format!(
        "{}/{}/o/{}?alt=media&token={}",
        DOWNLOAD_BASE,
        bucket,
        urlencoding::encode(object_path),
        token
    )
}

/// `multipart/related` body: JSON metadata part followed by the media part.
fn multipart_related_body(metadata: &serde_json::Value, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{meta}\r\n--{b}\r\nContent-Type: {ct}\r\n\r\n",
            b = MULTIPART_BOUNDARY,
            meta = metadata,
            ct = content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

/// Snake-case token pair returned by the secure token endpoint.
#[derive(Deserialize)]
struct RefreshedTokens {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: String,
    #[serde(default)]
    user_id: String,
}

impl From<RefreshedTokens> for TokenResponse {
    fn from(t: RefreshedTokens) -> Self {
        TokenResponse {
            id_token: t.id_token,
            refresh_token: t.refresh_token,
            expires_in: t.expires_in,
            local_id: t.user_id,
            ..Default::default()
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        self.call_accounts("auth_service.SignUpWithEmailAndPass", "signUp", &body)
            .await
    }

    async fn sign_in_with_password(&self, creds: &Credentials) -> Result<TokenResponse> {
        let body = serde_json::json!({
            "email": creds.email,
            "password": creds.password,
            "returnSecureToken": true,
        });
        self.call_accounts("auth_service.SignInWithPass", "signInWithPassword", &body)
            .await
    }

    async fn create_custom_token(&self, uid: &str, claims: &SessionClaims) -> Result<String> {
        self.service_account
            .sign_custom_token(uid, claims)
            .map_err(|e| AppError::internal("auth_service.GenerateCustomToken", format!("{:#}", e)))
    }

    async fn exchange_custom_token(&self, custom_token: &str) -> Result<TokenResponse> {
        let body = serde_json::json!({
            "token": custom_token,
            "returnSecureToken": true,
        });
        self.call_accounts("auth_service.SignInWithCustomToken", "signInWithCustomToken", &body)
            .await
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let op = "auth_service.RefreshToken";
        let response = self
            .http_client
            .post(format!(
                "{}?key={}",
                SECURE_TOKEN_URL,
                urlencoding::encode(&self.api_key)
            ))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| AppError::from_source(op, e))?;

        let tokens: RefreshedTokens = parse_response(op, response).await?;
        Ok(tokens.into())
    }

    async fn verify_id_token(&self, id_token: &str) -> Result<SessionClaims> {
        Ok(self.verifier.verify(id_token).await?)
    }

    async fn revoke_refresh_tokens(&self, uid: &str) -> Result<()> {
        let op = "auth_service.RevokeUserTokens";
        let token = self.access_token(op).await?;

        let response = self
            .http_client
            .post(format!("{}/{}/accounts:update", IDENTITY_ADMIN_BASE, self.project_id))
            .bearer_auth(token)
            .json(&serde_json::json!({
                "localId": uid,
                "validSince": now_unix_secs().to_string(),
            }))
            .send()
            .await
            .map_err(|e| AppError::from_source(op, e))?;

        let _: serde_json::Value = parse_response(op, response).await?;
        tracing::debug!(user_id = uid, "Refresh tokens revoked");
        Ok(())
    }

    async fn delete_account(&self, id_token: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call_accounts(
                "auth_service.DeleteAccount",
                "delete",
                &serde_json::json!({ "idToken": id_token }),
            )
            .await?;
        Ok(())
    }

    async fn upload_image(
        &self,
        object_path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let op = "firebase.UploadImage";
        let token = self.access_token(op).await?;
        let download_token = uuid::Uuid::new_v4().to_string();

        let metadata = serde_json::json!({
            "name": object_path,
            "contentType": content_type,
            "metadata": { "firebaseStorageDownloadTokens": download_token },
        });

        let response = self
            .http_client
            .post(format!(
                "{}/{}/o?uploadType=multipart",
                STORAGE_UPLOAD_BASE, self.bucket
            ))
            .bearer_auth(token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(multipart_related_body(&metadata, content_type, &bytes))
            .send()
            .await
            .map_err(|e| AppError::from_source(op, e))?;

        let _: serde_json::Value = parse_response(op, response).await?;

        tracing::info!(object = object_path, size = bytes.len(), "Image uploaded");
        Ok(download_url(&self.bucket, object_path, &download_token))
    }

    async fn send_oob_code(&self, request: &OobRequest) -> Result<()> {
        let body = if request.is_verify_email() {
            serde_json::json!({
                "requestType": request.request_type,
                "idToken": request.email,
            })
        } else {
            serde_json::json!({
                "email": request.email,
                "requestType": request.request_type,
            })
        };

        let _: serde_json::Value = self
            .call_accounts("auth_service.VerifyOrRecoverEmail", "sendOobCode", &body)
            .await?;
        Ok(())
    }

    async fn confirm_oob_code(&self, code: &OobCode) -> Result<()> {
        let _: serde_json::Value = self
            .call_accounts(
                "auth_service.VerifyOobCode",
                "update",
                &serde_json::json!({ "oobCode": code.oob_code }),
            )
            .await?;
        Ok(())
    }
}
