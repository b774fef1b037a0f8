// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile, progress, goals, weekly routine)
//! - Routines (catalog of exercises)

use crate::db::{collections, RoutineRepository, UserQuery, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{Goals, Progress, Routine, User, WeeklyRoutine};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::FirestoreWritePrecondition;
use serde::{Deserialize, Serialize};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client authenticated with the given service
    /// account JSON (or application default credentials when it is empty).
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str, credential_json: &str) -> Result<Self> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = if credential_json.trim().is_empty() {
            firestore::FirestoreDb::new(project_id).await
        } else {
            firestore::FirestoreDb::with_options_token_source(
                firestore::FirestoreDbOptions::new(project_id.to_string()),
                gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
                gcloud_sdk::TokenSourceType::Json(credential_json.to_string()),
            )
            .await
        }
        .map_err(|e| {
            AppError::internal(
                "firestoredb.NewClient",
                format!("Failed to connect to Firestore: {}", e),
            )
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let client = firestore::FirestoreDb::with_options_token_source(
            firestore::FirestoreDbOptions::new(project_id.to_string()),
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::internal(
                "firestoredb.NewClient",
                format!("Failed to connect to Firestore Emulator: {}", e),
            )
        })?;

        tracing::info!(project = project_id, "Connected to Firestore (Emulator)");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self, operation: &'static str) -> Result<&firestore::FirestoreDb> {
        self.client.as_ref().ok_or_else(|| {
            AppError::internal(operation, "Database not connected (offline mode)")
        })
    }

    /// Set selected top-level fields of an existing document.
    async fn patch_document<T>(
        &self,
        operation: &'static str,
        collection: &str,
        doc_id: &str,
        field: &str,
        patch: &T,
    ) -> Result<()>
    where
        T: Serialize + for<'de> Deserialize<'de> + Sync + Send,
    {
        let _: () = self
            .get_client(operation)?
            .fluent()
            .update()
            .fields([field])
            .in_col(collection)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(doc_id)
            .object(patch)
            .execute()
            .await
            .map_err(|e| db_error(operation, e))?;
        Ok(())
    }
}

/// Map a Firestore failure onto the API taxonomy.
fn db_error(operation: &'static str, err: FirestoreError) -> AppError {
    match err {
        FirestoreError::DataNotFoundError(e) => AppError::not_found(operation, e.to_string()),
        other => AppError::from_source(operation, other),
    }
}

// Single-field patches; the field name must match the serialized name on User/Routine.

#[derive(Serialize, Deserialize)]
struct ImagePatch {
    url_image: String,
}

#[derive(Serialize, Deserialize)]
struct ProgressPatch {
    #[serde(rename = "userProgress")]
    progress: Progress,
}

#[derive(Serialize, Deserialize)]
struct GoalsPatch {
    #[serde(rename = "userGoals")]
    goals: Goals,
}

#[derive(Serialize, Deserialize)]
struct RoutinePatch {
    #[serde(rename = "userRoutine")]
    routine: WeeklyRoutine,
}

/// Only the Firestore document ID of a query hit.
#[derive(Deserialize)]
struct DocumentRef {
    #[serde(alias = "_firestore_id", default)]
    doc_id: Option<String>,
}

// ─── User Operations ─────────────────────────────────────────

#[async_trait]
impl UserRepository for FirestoreDb {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let op = "firestoredb.GetUserByID";
        let user: Option<User> = self
            .get_client(op)?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| db_error(op, e))?;

        Ok(user.map(|mut u| {
            u.id = user_id.to_string();
            u
        }))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let op = "firestoredb.GetUserByEmail";
        let users: Vec<User> = self
            .get_client(op)?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("email").eq(email)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| db_error(op, e))?;

        Ok(users.into_iter().next())
    }

    async fn add_user(&self, user: &User) -> Result<()> {
        let op = "firestoredb.AddUser";
        if user.id.is_empty() {
            return Err(AppError::internal(op, "User id can't be empty"));
        }

        let _: () = self
            .get_client(op)?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(&user.to_document())
            .execute()
            .await
            .map_err(|e| db_error(op, e))?;

        tracing::debug!(user_id = %user.id, "User document created");
        Ok(())
    }

    async fn update_user(&self, user_id: &str, user: &User) -> Result<()> {
        let op = "firestoredb.UpdateUser";
        let _: () = self
            .get_client(op)?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(&user.to_document())
            .execute()
            .await
            .map_err(|e| db_error(op, e))?;
        Ok(())
    }

    async fn update_user_image(&self, user_id: &str, url: &str) -> Result<()> {
        self.patch_document(
            "firestoredb.UpdateImageUser",
            collections::USERS,
            user_id,
            "url_image",
            &ImagePatch {
                url_image: url.to_string(),
            },
        )
        .await
    }

    async fn save_user_progress(&self, user_id: &str, progress: &Progress) -> Result<()> {
        self.patch_document(
            "firestoredb.SaveUserProgress",
            collections::USERS,
            user_id,
            "userProgress",
            &ProgressPatch {
                progress: progress.clone(),
            },
        )
        .await
    }

    async fn save_user_goals(&self, user_id: &str, goals: &Goals) -> Result<()> {
        self.patch_document(
            "firestoredb.SaveUserGoals",
            collections::USERS,
            user_id,
            "userGoals",
            &GoalsPatch {
                goals: goals.clone(),
            },
        )
        .await
    }

    async fn save_user_routine(&self, user_id: &str, routine: &WeeklyRoutine) -> Result<()> {
        self.patch_document(
            "firestoredb.AddRoutineToUser",
            collections::USERS,
            user_id,
            "userRoutine",
            &RoutinePatch {
                routine: routine.clone(),
            },
        )
        .await
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        let op = "firestoredb.DeleteUser";
        self.get_client(op)?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| db_error(op, e))?;

        tracing::info!(user_id, "User document deleted");
        Ok(())
    }

    async fn count_users(&self) -> Result<usize> {
        let op = "firestoredb.GetAllUsersCount";
        let users: Vec<DocumentRef> = self
            .get_client(op)?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| db_error(op, e))?;
        Ok(users.len())
    }

    async fn list_users(&self, query: &UserQuery) -> Result<Vec<User>> {
        let op = "firestoredb.GetUsersByPage";
        let users: Vec<User> = self
            .get_client(op)?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([("name", firestore::FirestoreQueryDirection::Ascending)])
            .limit(query.page.limit)
            .offset(query.page.offset)
            .obj()
            .query()
            .await
            .map_err(|e| db_error(op, e))?;

        Ok(users.into_iter().filter(|u| query.matches(u)).collect())
    }
}

// ─── Routine Operations ──────────────────────────────────────

#[async_trait]
impl RoutineRepository for FirestoreDb {
    async fn add_routine(&self, routine: &Routine) -> Result<()> {
        let op = "firestoredb.AddRoutine";
        let _: () = self
            .get_client(op)?
            .fluent()
            .update()
            .in_col(collections::ROUTINES)
            .document_id(&routine.id)
            .object(routine)
            .execute()
            .await
            .map_err(|e| db_error(op, e))?;
        Ok(())
    }

    async fn update_routine_image(&self, routine_id: &str, url: &str) -> Result<()> {
        let op = "firestoredb.UpdateImageRoutine";

        let hits: Vec<DocumentRef> = self
            .get_client(op)?
            .fluent()
            .select()
            .from(collections::ROUTINES)
            .filter(|q| q.for_all([q.field("id").eq(routine_id)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| db_error(op, e))?;

        let doc_id = hits
            .into_iter()
            .next()
            .and_then(|hit| hit.doc_id)
            .ok_or_else(|| AppError::not_found(op, format!("Routine not found: {}", routine_id)))?;

        self.patch_document(
            op,
            collections::ROUTINES,
            &doc_id,
            "url_image",
            &ImagePatch {
                url_image: url.to_string(),
            },
        )
        .await
    }

    async fn list_routines(&self, muscle_group: Option<&str>) -> Result<Vec<Routine>> {
        let op = "firestoredb.GetRoutines";
        let query = self
            .get_client(op)?
            .fluent()
            .select()
            .from(collections::ROUTINES);

        let routines = if let Some(group) = muscle_group {
            query
                .filter(|q| q.for_all([q.field("muscle_group").eq(group)]))
                .obj()
                .query()
                .await
        } else {
            query.obj().query().await
        };

        routines.map_err(|e| db_error(op, e))
    }
}
