// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use gympro_api::config::Config;
use gympro_api::db::{FirestoreDb, RoutineRepository, UserQuery, UserRepository};
use gympro_api::error::{AppError, Result};
use gympro_api::models::{
    Credentials, Goals, ModuleGrant, OobCode, OobRequest, Progress, Role, Routine, SessionClaims,
    TokenResponse, User, WeeklyRoutine,
};
use gympro_api::routes::create_router;
use gympro_api::services::identity::{download_url, IdentityProvider};
use gympro_api::services::{RoutineService, TokenVerifier, UserService};
use gympro_api::AppState;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

pub const PROJECT_ID: &str = "test-project";
pub const TEST_KID: &str = "test-kid";
pub const TEST_BUCKET: &str = "test-project.appspot.com";
const PRIVATE_KEY: &str = include_str!("../fixtures/test_private_key.pem");
const PUBLIC_KEY: &str = include_str!("../fixtures/test_public_key.pem");

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new(PROJECT_ID, "")
        .await
        .expect("Failed to connect to Firestore emulator")
}

// ─── In-memory user store ────────────────────────────────────

/// User store that keeps documents in memory and records every call.
#[derive(Default)]
pub struct FakeUserRepo {
    pub users: Mutex<HashMap<String, User>>,
    pub calls: Mutex<Vec<&'static str>>,
}

#[allow(dead_code)]
impl FakeUserRepo {
    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }

    pub fn get(&self, id: &str) -> Option<User> {
        self.users.lock().unwrap().get(id).cloned()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn modify(&self, op: &'static str, id: &str, f: impl FnOnce(&mut User)) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(op, format!("no document {}", id)))?;
        f(user);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FakeUserRepo {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>> {
        self.record("get_user_by_id");
        Ok(self.get(user_id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.record("get_user_by_email");
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn add_user(&self, user: &User) -> Result<()> {
        self.record("add_user");
        self.insert(user.clone());
        Ok(())
    }

    async fn update_user(&self, user_id: &str, user: &User) -> Result<()> {
        self.record("update_user");
        let mut stored = user.clone();
        stored.id = user_id.to_string();
        self.insert(stored);
        Ok(())
    }

    async fn update_user_image(&self, user_id: &str, url: &str) -> Result<()> {
        self.record("update_user_image");
        self.modify("fake.UpdateImageUser", user_id, |u| {
            u.image_url = url.to_string()
        })
    }

    async fn save_user_progress(&self, user_id: &str, progress: &Progress) -> Result<()> {
        self.record("save_user_progress");
        self.modify("fake.SaveUserProgress", user_id, |u| {
            u.progress = progress.clone()
        })
    }

    async fn save_user_goals(&self, user_id: &str, goals: &Goals) -> Result<()> {
        self.record("save_user_goals");
        self.modify("fake.SaveUserGoals", user_id, |u| u.goals = goals.clone())
    }

    async fn save_user_routine(&self, user_id: &str, routine: &WeeklyRoutine) -> Result<()> {
        self.record("save_user_routine");
        self.modify("fake.AddRoutineToUser", user_id, |u| {
            u.weekly_routine = routine.clone()
        })
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.record("delete_user");
        self.users.lock().unwrap().remove(user_id);
        Ok(())
    }

    async fn count_users(&self) -> Result<usize> {
        self.record("count_users");
        Ok(self.users.lock().unwrap().len())
    }

    async fn list_users(&self, query: &UserQuery) -> Result<Vec<User>> {
        self.record("list_users");
        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users
            .into_iter()
            .skip(query.page.offset as usize)
            .take(query.page.limit as usize)
            .filter(|u| query.matches(u))
            .collect())
    }
}

// ─── In-memory routine store ─────────────────────────────────

#[derive(Default)]
pub struct FakeRoutineRepo {
    pub routines: Mutex<Vec<Routine>>,
}

#[async_trait]
impl RoutineRepository for FakeRoutineRepo {
    async fn add_routine(&self, routine: &Routine) -> Result<()> {
        self.routines.lock().unwrap().push(routine.clone());
        Ok(())
    }

    async fn update_routine_image(&self, routine_id: &str, url: &str) -> Result<()> {
        let mut routines = self.routines.lock().unwrap();
        let routine = routines
            .iter_mut()
            .find(|r| r.id == routine_id)
            .ok_or_else(|| {
                AppError::not_found("fake.UpdateImageRoutine", "Routine not found")
            })?;
        routine.image_url = url.to_string();
        Ok(())
    }

    async fn list_routines(&self, muscle_group: Option<&str>) -> Result<Vec<Routine>> {
        Ok(self
            .routines
            .lock()
            .unwrap()
            .iter()
            .filter(|r| muscle_group.is_none_or(|g| r.muscle_group == g))
            .cloned()
            .collect())
    }
}

// ─── Fake identity provider ──────────────────────────────────

/// Identity provider keeping accounts in memory.
///
/// Session tokens are verified with the real verifier against the fixture key,
/// so tests mint them with [`session_token`].
pub struct FakeIdentity {
    /// lowercased email -> (uid, password)
    pub accounts: Mutex<HashMap<String, (String, String)>>,
    pub deleted_tokens: Mutex<Vec<String>>,
    pub revoked: Mutex<Vec<String>>,
    pub minted_claims: Mutex<Vec<SessionClaims>>,
    pub uploads: Mutex<Vec<(String, usize, String)>>,
    pub oob_requests: Mutex<Vec<String>>,
    /// Make `delete_account` fail after recording the call.
    pub fail_delete: AtomicBool,
    next_uid: AtomicUsize,
    verifier: TokenVerifier,
}

impl Default for FakeIdentity {
    fn default() -> Self {
        let key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap();
        Self {
            accounts: Mutex::default(),
            deleted_tokens: Mutex::default(),
            revoked: Mutex::default(),
            minted_claims: Mutex::default(),
            uploads: Mutex::default(),
            oob_requests: Mutex::default(),
            fail_delete: AtomicBool::new(false),
            next_uid: AtomicUsize::new(1),
            verifier: TokenVerifier::new_with_static_key(PROJECT_ID, TEST_KID, key).unwrap(),
        }
    }
}

#[allow(dead_code)]
impl FakeIdentity {
    /// Register an account directly, returning its uid.
    pub fn add_account(&self, uid: &str, email: &str, password: &str) {
        self.accounts.lock().unwrap().insert(
            email.to_lowercase(),
            (uid.to_string(), password.to_string()),
        );
    }

    fn tokens(uid: &str, prefix: &str) -> TokenResponse {
        TokenResponse {
            id_token: format!("{}-{}", prefix, uid),
            refresh_token: format!("refresh-{}", uid),
            local_id: uid.to_string(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let email = email.to_lowercase();
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&email) {
            return Err(AppError::conflict(
                "auth_service.SignUpWithEmailAndPass",
                "EMAIL_EXISTS",
            ));
        }
        let uid = format!("uid-{}", self.next_uid.fetch_add(1, Ordering::SeqCst));
        accounts.insert(email, (uid.clone(), password.to_string()));
        Ok(Self::tokens(&uid, "provisional"))
    }

    async fn sign_in_with_password(&self, creds: &Credentials) -> Result<TokenResponse> {
        match self.accounts.lock().unwrap().get(&creds.email.to_lowercase()) {
            Some((uid, password)) if *password == creds.password => {
                Ok(Self::tokens(uid, "provisional"))
            }
            _ => Err(AppError::not_found(
                "auth_service.SignInWithPass",
                "INVALID_LOGIN_CREDENTIALS",
            )),
        }
    }

    async fn create_custom_token(&self, uid: &str, claims: &SessionClaims) -> Result<String> {
        self.minted_claims.lock().unwrap().push(claims.clone());
        Ok(format!("custom-{}", uid))
    }

    async fn exchange_custom_token(&self, custom_token: &str) -> Result<TokenResponse> {
        let uid = custom_token.trim_start_matches("custom-");
        Ok(Self::tokens(uid, "session"))
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        match refresh_token.strip_prefix("refresh-") {
            Some(uid) => Ok(Self::tokens(uid, "session")),
            None => Err(AppError::unauthorized(
                "auth_service.RefreshToken",
                "INVALID_REFRESH_TOKEN",
            )),
        }
    }

    async fn verify_id_token(&self, id_token: &str) -> Result<SessionClaims> {
        Ok(self.verifier.verify(id_token).await?)
    }

    async fn revoke_refresh_tokens(&self, uid: &str) -> Result<()> {
        self.revoked.lock().unwrap().push(uid.to_string());
        Ok(())
    }

    async fn delete_account(&self, id_token: &str) -> Result<()> {
        self.deleted_tokens.lock().unwrap().push(id_token.to_string());
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::internal(
                "auth_service.DeleteAccount",
                "USER_NOT_FOUND",
            ));
        }
        Ok(())
    }

    async fn upload_image(
        &self,
        object_path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        self.uploads.lock().unwrap().push((
            object_path.to_string(),
            bytes.len(),
            content_type.to_string(),
        ));
        Ok(download_url(TEST_BUCKET, object_path, "download-token"))
    }

    async fn send_oob_code(&self, request: &OobRequest) -> Result<()> {
        if request.email == "unknown@example.com" {
            return Err(AppError::not_found(
                "auth_service.VerifyOrRecoverEmail",
                "EMAIL_NOT_FOUND",
            ));
        }
        self.oob_requests
            .lock()
            .unwrap()
            .push(request.request_type.clone());
        Ok(())
    }

    async fn confirm_oob_code(&self, code: &OobCode) -> Result<()> {
        if code.oob_code == "valid-code" {
            Ok(())
        } else {
            Err(AppError::not_found(
                "auth_service.VerifyOobCode",
                "INVALID_OOB_CODE",
            ))
        }
    }
}

// ─── App + tokens ────────────────────────────────────────────

/// Router plus handles on the fakes behind it.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub users: Arc<FakeUserRepo>,
    pub routines: Arc<FakeRoutineRepo>,
    pub identity: Arc<FakeIdentity>,
}

/// Create a test app backed by in-memory fakes.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let config = Config::default();
    let users = Arc::new(FakeUserRepo::default());
    let routines = Arc::new(FakeRoutineRepo::default());
    let identity = Arc::new(FakeIdentity::default());

    let state = Arc::new(AppState {
        users: UserService::new(
            users.clone(),
            identity.clone(),
            config.default_user_image_url.clone(),
        ),
        routines: RoutineService::new(routines.clone(), identity.clone()),
        config,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        users,
        routines,
        identity,
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

#[derive(Serialize)]
struct IdTokenBody<'a> {
    iss: String,
    aud: &'a str,
    sub: &'a str,
    iat: u64,
    exp: u64,
    #[serde(flatten)]
    claims: &'a SessionClaims,
}

/// Sign an ID token the way the identity provider would after login.
#[allow(dead_code)]
pub fn session_token(claims: &SessionClaims) -> String {
    session_token_for(claims, PROJECT_ID)
}

/// Same as [`session_token`] but issued for an arbitrary project.
#[allow(dead_code)]
pub fn session_token_for(claims: &SessionClaims, project: &str) -> String {
    let now = now_secs();
    let body = IdTokenBody {
        iss: format!("https://securetoken.google.com/{}", project),
        aud: project,
        sub: &claims.user_id,
        iat: now,
        exp: now + 3600,
        claims,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());
    encode(
        &header,
        &body,
        &EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap(),
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn member_claims(user_id: &str) -> SessionClaims {
    SessionClaims {
        user_id: user_id.to_string(),
        email: format!("{}@example.com", user_id),
        role: Role::User,
        modules: ModuleGrant::viewer_defaults(),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn admin_claims(user_id: &str) -> SessionClaims {
    SessionClaims {
        role: Role::Admin,
        modules: ModuleGrant::admin_defaults(),
        ..member_claims(user_id)
    }
}

/// A stored user with the given role and subscription expiry.
#[allow(dead_code)]
pub fn stored_user(id: &str, name: &str, role: Role, subscription: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        last_name: "Tester".to_string(),
        email: format!("{}@example.com", id),
        role,
        subscription: subscription.to_string(),
        ..Default::default()
    }
}

/// Build a request with optional bearer token and JSON body.
#[allow(dead_code)]
pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Multipart request carrying one file field.
#[allow(dead_code)]
pub fn multipart_request(uri: &str, token: &str, field: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "test-boundary";
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n",
        b = boundary,
        f = field
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
