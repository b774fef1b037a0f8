// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User orchestration: signup, the login saga, profile updates and the
//! management listing.

use crate::db::{UserQuery, UserRepository};
use crate::error::{AppError, ErrorCode, Result};
use crate::models::{
    AuthResponse, Credentials, Goals, ModuleGrant, OobCode, OobRequest, Progress, Role,
    SessionClaims, SessionTokens, User, UsersResponse, WeeklyRoutine,
};
use crate::services::identity::IdentityProvider;
use crate::services::nutrition::compute_goals;
use crate::time_utils::{subscription_lapsed, today};
use std::sync::Arc;
use validator::ValidateEmail;

const DEFAULT_IMAGE_TYPE: &str = "image/png";

/// The identity provider compares addresses case-insensitively; profiles are
/// stored and looked up in the same lowercase form.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Orchestrates the identity provider and the user store.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    identity: Arc<dyn IdentityProvider>,
    default_image_url: String,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        identity: Arc<dyn IdentityProvider>,
        default_image_url: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            identity,
            default_image_url: default_image_url.into(),
        }
    }

    /// Register an account with the identity provider, then store its profile.
    ///
    /// A store failure after sign-up leaves an identity account without a
    /// profile; the next login attempt deletes it.
    pub async fn create_user(&self, mut user: User) -> Result<()> {
        let op = "user_service.CreateUser";

        user.email = normalize_email(&user.email);
        if !user.email.validate_email() {
            return Err(AppError::invalid_input(op, "Invalid email address"));
        }

        let account = self.identity.sign_up(&user.email, &user.password).await?;

        user.id = account.local_id;
        user.image_url = self.default_image_url.clone();
        user.subscription = String::new();
        if user.role == Role::Admin {
            user.modules.extend(ModuleGrant::admin_defaults());
        }

        self.repo.add_user(&user).await?;

        tracing::info!(user_id = %user.id, role = ?user.role, "User created");
        Ok(())
    }

    /// Password login.
    ///
    /// Only one session stays valid per user: earlier refresh tokens are
    /// revoked before the new session token is minted.
    pub async fn sign_in_with_pass(&self, creds: &Credentials) -> Result<AuthResponse> {
        let op = "user_service.SignInWithPass";
        let creds = Credentials {
            email: normalize_email(&creds.email),
            password: creds.password.clone(),
        };

        // 1. Authenticate
        let provisional = self
            .identity
            .sign_in_with_password(&creds)
            .await
            .map_err(|e| {
                tracing::error!(step = 1, error = %e, "Failed to sign in with password");
                if e.code == ErrorCode::InternalError {
                    e
                } else {
                    AppError::not_found(op, "Invalid email/password combination")
                }
            })?;

        // 2. Profile lookup; an account without one is an orphan
        let user = match self.repo.get_user_by_email(&creds.email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::error!(step = 2, "Identity account has no user profile, removing it");
                if let Err(e) = self.identity.delete_account(&provisional.id_token).await {
                    tracing::warn!(error = %e, "Failed to remove orphan identity account");
                }
                return Err(AppError::not_found(op, "User not found"));
            }
            Err(e) => {
                tracing::error!(step = 2, error = %e, "Failed to get user by email");
                return Err(e);
            }
        };

        // 3. Single active session
        self.identity
            .revoke_refresh_tokens(&user.id)
            .await
            .inspect_err(|e| tracing::error!(step = 3, error = %e, "Failed to revoke tokens"))?;

        // 4. Claims reflect the stored profile before the subscription check
        let claims = SessionClaims::from_user(&user);

        // 5. Custom token
        let custom_token = self
            .identity
            .create_custom_token(&user.id, &claims)
            .await
            .inspect_err(|e| tracing::error!(step = 5, error = %e, "Failed to create custom token"))?;

        // 6. Session token
        let session = self
            .identity
            .exchange_custom_token(&custom_token)
            .await
            .inspect_err(|e| {
                tracing::error!(step = 6, error = %e, "Failed to exchange custom token")
            })?;

        // 7. Subscription check
        let user = self
            .sync_subscription_modules(user)
            .await
            .inspect_err(|e| tracing::error!(step = 7, error = %e, "Failed to update modules"))?;

        tracing::info!(user_id = %user.id, "User signed in");

        Ok(AuthResponse {
            token: session.id_token,
            refresh_token: session.refresh_token,
            user,
        })
    }

    /// Revoke modules of lapsed members, grant viewer modules to active
    /// members that have none. Admins keep their modules.
    async fn sync_subscription_modules(&self, mut user: User) -> Result<User> {
        let lapsed = subscription_lapsed(&user.subscription, today());

        if lapsed && !user.is_admin() {
            user.modules.clear();
        } else if !lapsed && user.modules.is_empty() {
            user.modules = ModuleGrant::viewer_defaults();
        } else {
            return Ok(user);
        }

        tracing::debug!(
            user_id = %user.id,
            lapsed,
            modules = user.modules.len(),
            "Subscription modules updated"
        );
        self.repo.update_user(&user.id, &user).await?;
        Ok(user)
    }

    /// Trade a refresh token for a new session token pair.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<SessionTokens> {
        if refresh_token.trim().is_empty() {
            return Err(AppError::invalid_input(
                "user_service.RefreshSession",
                "Missing refresh token",
            ));
        }

        let tokens = self.identity.exchange_refresh_token(refresh_token).await?;
        Ok(SessionTokens {
            token: tokens.id_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// Verify a session token, mapping rejections to `Unauthorized`.
    pub async fn verify_token(&self, token: &str) -> Result<SessionClaims> {
        self.identity.verify_id_token(token).await.map_err(|e| {
            if e.code == ErrorCode::InternalError {
                e
            } else {
                tracing::debug!(error = %e, "Session token rejected");
                AppError::unauthorized("authService.VerifyToken", "Invalid session")
            }
        })
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User> {
        self.repo.get_user_by_id(user_id).await?.ok_or_else(|| {
            AppError::not_found("user_service.GetUserByID", format!("User not found: {}", user_id))
        })
    }

    pub async fn get_users(&self, query: UserQuery) -> Result<UsersResponse> {
        let total_items = self.repo.count_users().await?;
        let items = self.repo.list_users(&query).await?;
        Ok(UsersResponse { total_items, items })
    }

    /// Like [`get_users`](Self::get_users), restricted to members whose
    /// subscription has not lapsed.
    pub async fn get_users_active(&self, query: UserQuery) -> Result<UsersResponse> {
        self.get_users(UserQuery {
            active_on: Some(today()),
            ..query
        })
        .await
    }

    /// Replace the profile document.
    pub async fn update_user(&self, user_id: &str, mut user: User) -> Result<()> {
        if !subscription_lapsed(&user.subscription, today()) && user.modules.is_empty() {
            user.modules = ModuleGrant::viewer_defaults();
        }

        self.repo.update_user(user_id, &user).await?;
        tracing::info!(user_id, "User updated");
        Ok(())
    }

    /// Upload a new profile picture and store its URL.
    pub async fn update_image_user(
        &self,
        user_id: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String> {
        if bytes.is_empty() {
            return Err(AppError::invalid_input(
                "user_service.UpdateImageUser",
                "Image is empty",
            ));
        }

        let url = self
            .identity
            .upload_image(
                &format!("users/profile_{}.png", user_id),
                bytes,
                content_type.unwrap_or(DEFAULT_IMAGE_TYPE),
            )
            .await?;

        self.repo.update_user_image(user_id, &url).await?;
        Ok(url)
    }

    /// Store measurements and the goals derived from them.
    ///
    /// Goals are computed first so malformed factors never reach the store.
    pub async fn save_user_progress(&self, user_id: &str, progress: &Progress) -> Result<Goals> {
        let goals = compute_goals(progress)?;

        self.repo.save_user_progress(user_id, progress).await?;
        self.repo.save_user_goals(user_id, &goals).await?;

        tracing::debug!(user_id, calorie_goal = %goals.calorie_goal, "User progress saved");
        Ok(goals)
    }

    pub async fn add_routine_to_user(&self, user_id: &str, routine: &WeeklyRoutine) -> Result<()> {
        self.repo.save_user_routine(user_id, routine).await
    }

    /// Delete a profile on behalf of `requester_id`. Nobody may delete themselves.
    pub async fn delete_user(&self, requester_id: &str, user_id: &str) -> Result<()> {
        if requester_id == user_id {
            return Err(AppError::forbidden(
                "userService.DeleteUser",
                "You can't remove your own user.",
            ));
        }

        self.repo.delete_user(user_id).await
    }

    pub async fn verify_or_recover_email(&self, request: &OobRequest) -> Result<()> {
        self.identity.send_oob_code(request).await.map_err(|e| {
            tracing::warn!(error = %e, request_type = %request.request_type, "Failed to send OOB email");
            AppError::not_found("user_service.VerifyOrRecoverEmail", "Invalid email")
        })
    }

    pub async fn verify_oob_code(&self, code: &OobCode) -> Result<()> {
        self.identity.confirm_oob_code(code).await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to confirm OOB code");
            AppError::not_found("user_service.VerifyOobCode", "Invalid code")
        })
    }
}
