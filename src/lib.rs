// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GymPro: gym membership backend
//!
//! This crate provides the REST API behind the GymPro apps: Firebase-backed
//! accounts and sessions, subscription-gated modules, nutrition goals and
//! workout routines stored in Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{RoutineService, UserService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub users: UserService,
    pub routines: RoutineService,
}
