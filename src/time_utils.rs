// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for subscription dates (`YYYY-MM-DD`).

use chrono::{NaiveDate, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current UTC calendar date.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a subscription date, returning `None` for empty or malformed values.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A subscription is lapsed once its expiry day is in the past.
///
/// Missing or unparseable expiries count as lapsed; the expiry day itself is
/// still active.
pub fn subscription_lapsed(expiry: &str, today: NaiveDate) -> bool {
    match parse_date(expiry) {
        Some(date) => date < today,
        None => true,
    }
}
