//! Constraint evaluation against a parsed siteverify response.

use chrono::{DateTime, Utc};
use warden_common::constants::error_codes;
use warden_common::{Constraints, Response};

/// Stateless constraint evaluator
pub struct ConstraintEngine;

impl ConstraintEngine {
    /// Evaluate every configured constraint against a response.
    ///
    /// Rules run in a fixed order (hostname, apk package name, action,
    /// threshold, challenge age) and never short-circuit; unset constraints
    /// are skipped. `now` is the instant challenge age is measured against.
    pub fn evaluate(
        response: &Response,
        constraints: &Constraints,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let mut errors = Vec::new();

        if mismatch(constraints.hostname.as_deref(), response.hostname()) {
            errors.push(error_codes::HOSTNAME_MISMATCH.to_string());
        }

        if mismatch(
            constraints.apk_package_name.as_deref(),
            response.apk_package_name(),
        ) {
            errors.push(error_codes::APK_PACKAGE_NAME_MISMATCH.to_string());
        }

        if mismatch(constraints.action.as_deref(), response.action()) {
            errors.push(error_codes::ACTION_MISMATCH.to_string());
        }

        if let Some(threshold) = constraints.threshold {
            if !response.score().is_some_and(|score| score >= threshold) {
                errors.push(error_codes::SCORE_THRESHOLD_NOT_MET.to_string());
            }
        }

        if let Some(max_age) = constraints.challenge_ts {
            if !within_age(response.challenge_ts(), max_age, now) {
                errors.push(error_codes::CHALLENGE_TIMEOUT.to_string());
            }
        }

        errors
    }
}

/// An expected value is set and the actual one is absent or different
fn mismatch(expected: Option<&str>, actual: Option<&str>) -> bool {
    match expected {
        Some(expected) => actual != Some(expected),
        None => false,
    }
}

/// The challenge timestamp parses and is at most `max_age` seconds old
fn within_age(challenge_ts: Option<&str>, max_age: u64, now: DateTime<Utc>) -> bool {
    let Some(issued) = challenge_ts.and_then(|ts| DateTime::parse_from_rfc3339(ts).ok()) else {
        return false;
    };

    let elapsed = now.timestamp() - issued.timestamp();
    // Future timestamps (clock skew) count as fresh.
    elapsed <= 0 || (elapsed as u64) <= max_age
}
