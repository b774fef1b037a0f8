// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Offset/limit pagination for list endpoints.

const DEFAULT_OFFSET: i64 = 0;
const DEFAULT_LIMIT: i64 = 20;

/// Check that both values are present, numeric, `offset >= 0` and `limit > 0`.
pub fn is_valid_page(offset: &str, limit: &str) -> bool {
    if offset.is_empty() || limit.is_empty() {
        return false;
    }

    let (Ok(offset), Ok(limit)) = (offset.parse::<i64>(), limit.parse::<i64>()) else {
        return false;
    };

    limit > 0 && offset >= 0
}

/// The page used when the client did not ask for a valid one.
pub fn default_page() -> (i64, i64) {
    (DEFAULT_OFFSET, DEFAULT_LIMIT)
}

/// Resolved pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        let (offset, limit) = default_page();
        Self {
            offset: offset as u32,
            limit: limit as u32,
        }
    }
}

impl Page {
    /// Resolve raw query values, falling back to the default page when either
    /// is missing or invalid.
    pub fn resolve(offset: Option<&str>, limit: Option<&str>) -> Self {
        let offset = offset.unwrap_or_default();
        let limit = limit.unwrap_or_default();

        if !is_valid_page(offset, limit) {
            return Self::default();
        }

        // Values larger than u32 are clamped rather than rejected.
        match (offset.parse::<i64>(), limit.parse::<i64>()) {
            (Ok(o), Ok(l)) => Self {
                offset: o.min(u32::MAX as i64) as u32,
                limit: l.min(u32::MAX as i64) as u32,
            },
            _ => Self::default(),
        }
    }
}
