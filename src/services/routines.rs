// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Routine catalog service.

use crate::db::RoutineRepository;
use crate::error::{AppError, Result};
use crate::models::Routine;
use crate::services::identity::IdentityProvider;
use std::sync::Arc;

#[derive(Clone)]
pub struct RoutineService {
    repo: Arc<dyn RoutineRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl RoutineService {
    pub fn new(repo: Arc<dyn RoutineRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { repo, identity }
    }

    /// Store a routine, assigning an id when the client sent none.
    pub async fn add_routine(&self, mut routine: Routine) -> Result<Routine> {
        if routine.id.trim().is_empty() {
            routine.id = uuid::Uuid::new_v4().to_string();
        }

        self.repo.add_routine(&routine).await?;
        tracing::info!(routine_id = %routine.id, muscle_group = %routine.muscle_group, "Routine added");
        Ok(routine)
    }

    /// Upload an image for the routine with the given `id` field and store its URL.
    pub async fn update_routine_image(
        &self,
        routine_id: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String> {
        let op = "routine_service.UpdateRoutineImage";
        if routine_id.trim().is_empty() {
            return Err(AppError::invalid_input(op, "Missing routine id"));
        }
        if bytes.is_empty() {
            return Err(AppError::invalid_input(op, "Image is empty"));
        }

        let url = self
            .identity
            .upload_image(
                &format!("routines/routine_{}.png", routine_id),
                bytes,
                content_type.unwrap_or("image/png"),
            )
            .await?;

        self.repo.update_routine_image(routine_id, &url).await?;
        Ok(url)
    }

    pub async fn get_routines(&self, muscle_group: Option<&str>) -> Result<Vec<Routine>> {
        let group = muscle_group.map(str::trim).filter(|g| !g.is_empty());
        self.repo.list_routines(group).await
    }
}
