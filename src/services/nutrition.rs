// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nutrition targets from body measurements (Mifflin-St Jeor).

use crate::error::{AppError, Result};
use crate::models::{Goals, Progress};

const OPERATION: &str = "user_service.SaveUserProgress";

/// Macro split for a goal preset as (protein, carbs, fat) shares of calories.
fn macro_split(goal_factor: &str) -> Option<(f64, f64, f64)> {
    match goal_factor {
        "1" => Some((0.25, 0.5, 0.25)),     // maintain
        "1.21" => Some((0.35, 0.45, 0.2)),  // gain
        "0.79" => Some((0.45, 0.35, 0.2)),  // lose
        "1.10" => Some((0.30, 0.45, 0.25)), // mild gain
        "0.9" => Some((0.40, 0.35, 0.25)),  // mild loss
        _ => None,
    }
}

/// Round to two decimals the way the stored strings do.
fn two_decimals(value: f64) -> String {
    format!("{:.2}", value)
}

fn parse_factor(raw: &str, field: &str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|_| {
        AppError::invalid_input(OPERATION, format!("Invalid {} factor: {:?}", field, raw))
    })
}

/// Compute BMI, BMR, TDEE, calorie goal and macro grams.
///
/// Each step works from the previous step's two-decimal string, so results
/// match what clients already have stored. Goal factors outside the presets
/// still produce a calorie goal but leave every macro at `0.00`.
pub fn compute_goals(progress: &Progress) -> Result<Goals> {
    if progress.height_cm == 0 {
        return Err(AppError::invalid_input(OPERATION, "Height must be positive"));
    }

    let weight = progress.weight_kg;
    let height = f64::from(progress.height_cm);
    let age = f64::from(progress.age);

    let height_m = height * 0.01;
    let bmi = two_decimals(weight / (height_m * height_m));

    let sex_offset = if progress.gender == "hombre" { 5.0 } else { -161.0 };
    let bmr = two_decimals(10.0 * weight + 6.25 * height - 5.0 * age + sex_offset);

    let activity = parse_factor(&progress.activity_factor, "activity")?;
    let tdee = two_decimals(reparse(&bmr) * activity);

    let goal_factor = parse_factor(&progress.goal_factor, "goal")?;
    let calorie_goal = two_decimals(reparse(&tdee) * goal_factor);
    let calories = reparse(&calorie_goal);

    let (protein, carbs, fat) = macro_split(&progress.goal_factor)
        .map(|(p, c, f)| (calories * p / 4.0, calories * c / 4.0, calories * f / 9.0))
        .unwrap_or_default();

    Ok(Goals {
        bmi,
        bmr,
        tdee,
        calorie_goal,
        protein_grams: two_decimals(protein),
        carb_grams: two_decimals(carbs),
        fat_grams: two_decimals(fat),
    })
}

// Strings produced by two_decimals() always parse.
fn reparse(formatted: &str) -> f64 {
    formatted.parse().unwrap_or_default()
}
