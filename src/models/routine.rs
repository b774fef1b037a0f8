// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout routine model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A single exercise routine (`routines` collection, also embedded per weekday in users).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(default)]
pub struct Routine {
    /// Client-assigned identifier, stored as a field (document IDs may differ)
    pub id: String,
    pub muscle_group: String,
    pub name: String,
    pub description: String,
    pub video_url: String,
    #[serde(rename = "url_image")]
    pub image_url: String,
}
