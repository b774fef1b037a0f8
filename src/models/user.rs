// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.
//!
//! Field names on the wire and in Firestore follow the documents the mobile
//! client already reads (`lastname`, `url_image`, `userProgress`, ...).

use crate::models::routine::Routine;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// A named capability grant, e.g. `{ "name": "personalGoals", "role": "viewer" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct ModuleGrant {
    pub name: String,
    pub role: String,
}

impl ModuleGrant {
    pub fn new(name: &str, role: &str) -> Self {
        Self {
            name: name.to_string(),
            role: role.to_string(),
        }
    }

    /// Grants given to every admin account at signup.
    pub fn admin_defaults() -> Vec<Self> {
        vec![
            Self::new("userManagement", "admin"),
            Self::new("routinesManagement", "admin"),
        ]
    }

    /// Grants given to members with an active subscription.
    pub fn viewer_defaults() -> Vec<Self> {
        vec![
            Self::new("routinesCalendar", "viewer"),
            Self::new("personalGoals", "viewer"),
        ]
    }
}

/// Body measurements submitted by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(default)]
pub struct Progress {
    pub age: u32,
    /// `"hombre"` selects the male BMR constant; anything else the female one
    pub gender: String,
    #[serde(rename = "height")]
    pub height_cm: u32,
    #[serde(rename = "weight")]
    pub weight_kg: f64,
    /// Activity multiplier as sent by the client, e.g. `"1.2"`
    #[serde(rename = "activity")]
    pub activity_factor: String,
    /// Goal multiplier: `"1"`, `"1.21"`, `"0.79"`, `"1.10"` or `"0.9"`
    #[serde(rename = "goal")]
    pub goal_factor: String,
}

/// Nutrition targets derived from [`Progress`]. Every value has two decimals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(default)]
pub struct Goals {
    #[serde(rename = "imc")]
    pub bmi: String,
    pub bmr: String,
    pub tdee: String,
    #[serde(rename = "goal")]
    pub calorie_goal: String,
    #[serde(rename = "protein")]
    pub protein_grams: String,
    #[serde(rename = "carbs")]
    pub carb_grams: String,
    #[serde(rename = "fat")]
    pub fat_grams: String,
}

/// Routines assigned per weekday.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(default)]
pub struct WeeklyRoutine {
    pub monday: Vec<Routine>,
    pub tuesday: Vec<Routine>,
    pub wednesday: Vec<Routine>,
    pub thursday: Vec<Routine>,
    pub friday: Vec<Routine>,
    pub saturday: Vec<Routine>,
}

/// User profile stored in Firestore (`users/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(default)]
pub struct User {
    /// Identity-provider uid, also the document ID. Never written into the body.
    #[serde(alias = "_firestore_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    pub email: String,
    /// Only accepted on signup; never serialized.
    #[serde(skip_serializing)]
    pub password: String,
    pub phone_number: String,
    pub birthday: String,
    /// Subscription expiry (`YYYY-MM-DD`), empty when never subscribed
    pub subscription: String,
    #[serde(rename = "modulesWithPermission")]
    pub modules: Vec<ModuleGrant>,
    #[serde(rename = "url_image")]
    pub image_url: String,
    #[serde(rename = "user_role")]
    pub role: Role,
    #[serde(rename = "userProgress")]
    pub progress: Progress,
    #[serde(rename = "userGoals")]
    pub goals: Goals,
    #[serde(rename = "userRoutine")]
    pub weekly_routine: WeeklyRoutine,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }

    /// Copy suitable for writing as a document body (ID and password stripped).
    pub fn to_document(&self) -> Self {
        Self {
            id: String::new(),
            password: String::new(),
            ..self.clone()
        }
    }
}

/// Paged user listing for the management panel.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub total_items: usize,
    pub items: Vec<User>,
}
