//! Placeholder resolution
//!
//! Symbolic condition values are resolved against the request context and
//! wall-clock time before the column resolver runs. A placeholder the
//! current context cannot satisfy makes the condition inapplicable (the
//! leaf degrades to no constraint), never a hard failure.

use chrono::{DateTime, Duration, Utc};

use crate::auth::RequestContext;
use crate::utils::time::start_of_day;

use super::types::FilterValue;

pub const CURRENT_BRANCH: &str = "__CURRENT_BRANCH__";
pub const CURRENT_USER: &str = "__CURRENT_USER__";
pub const CURRENT_ROLE: &str = "__CURRENT_ROLE__";
pub const TODAY: &str = "__TODAY__";
pub const TOMORROW: &str = "__TOMORROW__";
pub const YESTERDAY: &str = "__YESTERDAY__";

/// A condition value after placeholder substitution
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    /// No placeholder, or a placeholder that rewrote to a plain value
    Plain(FilterValue),
    /// A relative date resolved to a start-of-day instant
    Instant(DateTime<Utc>),
    /// `__CURRENT_BRANCH__` resolved to the context's branch id
    CurrentBranch(i64),
}

/// Resolve placeholders in a condition value
///
/// `now` is the wall-clock instant relative dates are computed from.
/// Returns None when the placeholder cannot be satisfied by the context
/// (no active branch, no role), which the compiler treats as "condition
/// does not apply".
pub fn resolve(
    value: &FilterValue,
    ctx: &RequestContext,
    now: DateTime<Utc>,
) -> Option<ResolvedValue> {
    let FilterValue::Text(text) = value else {
        return Some(ResolvedValue::Plain(value.clone()));
    };

    match text.as_str() {
        CURRENT_BRANCH => ctx.branch_id.map(ResolvedValue::CurrentBranch),
        CURRENT_USER => Some(ResolvedValue::Plain(FilterValue::Text(format!(
            "user-{}",
            ctx.user_id
        )))),
        CURRENT_ROLE => ctx
            .role_id
            .map(|role_id| ResolvedValue::Plain(FilterValue::Text(format!("role-{}", role_id)))),
        TODAY => Some(ResolvedValue::Instant(start_of_day(now))),
        TOMORROW => Some(ResolvedValue::Instant(start_of_day(now + Duration::days(1)))),
        YESTERDAY => Some(ResolvedValue::Instant(start_of_day(now - Duration::days(1)))),
        _ => Some(ResolvedValue::Plain(value.clone())),
    }
}
