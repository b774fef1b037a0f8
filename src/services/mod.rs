// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod identity;
pub mod nutrition;
pub mod routines;
pub mod service_account;
pub mod token_verifier;
pub mod users;

pub use identity::{FirebaseIdentity, IdentityProvider};
pub use nutrition::compute_goals;
pub use routines::RoutineService;
pub use service_account::ServiceAccount;
pub use token_verifier::{TokenError, TokenVerifier};
pub use users::UserService;
