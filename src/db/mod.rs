// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore).
//!
//! Services depend on the repository traits below rather than on
//! `FirestoreDb`, so tests can swap in an in-memory store.

pub mod firestore;

pub use firestore::FirestoreDb;

use crate::error::Result;
use crate::models::{Goals, Progress, Role, Routine, User, WeeklyRoutine};
use crate::pagination::Page;
use crate::time_utils::subscription_lapsed;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ROUTINES: &str = "routines";
}

/// Listing parameters for the user-management panel.
///
/// The page is taken from users ordered by name; role, text and active
/// filters then narrow that page.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub page: Page,
    pub role: Option<Role>,
    /// Case-insensitive substring over name, email and last name
    pub filter: Option<String>,
    /// Keep only users whose subscription is still valid on this day
    pub active_on: Option<NaiveDate>,
}

impl UserQuery {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(role) = self.role {
            if user.role != role {
                return false;
            }
        }

        if let Some(filter) = self.filter.as_deref() {
            let needle = filter.to_lowercase();
            let hit = [&user.name, &user.email, &user.last_name]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if let Some(day) = self.active_on {
            if subscription_lapsed(&user.subscription, day) {
                return false;
            }
        }

        true
    }
}

/// User document operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Create the document keyed by `user.id`.
    async fn add_user(&self, user: &User) -> Result<()>;

    /// Replace the whole document.
    async fn update_user(&self, user_id: &str, user: &User) -> Result<()>;

    async fn update_user_image(&self, user_id: &str, url: &str) -> Result<()>;

    async fn save_user_progress(&self, user_id: &str, progress: &Progress) -> Result<()>;

    async fn save_user_goals(&self, user_id: &str, goals: &Goals) -> Result<()>;

    async fn save_user_routine(&self, user_id: &str, routine: &WeeklyRoutine) -> Result<()>;

    async fn delete_user(&self, user_id: &str) -> Result<()>;

    async fn count_users(&self) -> Result<usize>;

    async fn list_users(&self, query: &UserQuery) -> Result<Vec<User>>;
}

/// Routine document operations.
#[async_trait]
pub trait RoutineRepository: Send + Sync {
    async fn add_routine(&self, routine: &Routine) -> Result<()>;

    /// Set the image URL of the routine whose `id` field equals `routine_id`.
    ///
    /// The `id` field is not necessarily the document ID, so this resolves the
    /// document by query first. Returns `NotFound` when nothing matches.
    async fn update_routine_image(&self, routine_id: &str, url: &str) -> Result<()>;

    async fn list_routines(&self, muscle_group: Option<&str>) -> Result<Vec<Routine>>;
}
