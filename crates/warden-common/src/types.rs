//! Core types shared across Warden components.

use serde::{Deserialize, Deserializer, Serialize};

/// Post-verification expectations a siteverify reply must satisfy.
///
/// Every field is opt-in: an unset field is never checked.
/// Serializes with all five keys present, unset keys as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    /// Expected hostname of the site where the challenge was solved
    pub hostname: Option<String>,

    /// Expected Android package name
    pub apk_package_name: Option<String>,

    /// Expected action name (score-based keys)
    pub action: Option<String>,

    /// Minimum acceptable score (inclusive)
    pub threshold: Option<f64>,

    /// Maximum age of the challenge in seconds
    pub challenge_ts: Option<u64>,
}

impl Constraints {
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_apk_package_name(mut self, name: impl Into<String>) -> Self {
        self.apk_package_name = Some(name.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Set the expected action after running it through [`sane_action`]
    pub fn with_sane_action(mut self, action: &str) -> Self {
        self.action = Some(sane_action(action));
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_challenge_ts(mut self, max_age_secs: u64) -> Self {
        self.challenge_ts = Some(max_age_secs);
        self
    }

    /// Returns true if no constraint is set
    pub fn is_empty(&self) -> bool {
        self.hostname.is_none()
            && self.apk_package_name.is_none()
            && self.action.is_none()
            && self.threshold.is_none()
            && self.challenge_ts.is_none()
    }

    /// Look up a single constraint by its serialized name.
    ///
    /// Returns `None` for unknown names, `Some(Value::Null)` for unset ones.
    pub fn get(&self, name: &str) -> Option<serde_json::Value> {
        use serde_json::Value;

        let value = match name {
            "hostname" => self.hostname.clone().map(Value::from),
            "apk_package_name" => self.apk_package_name.clone().map(Value::from),
            "action" => self.action.clone().map(Value::from),
            "threshold" => self.threshold.map(Value::from),
            "challenge_ts" => self.challenge_ts.map(Value::from),
            _ => return None,
        };
        Some(value.unwrap_or(Value::Null))
    }
}

/// Normalise an action name into the charset siteverify accepts.
///
/// Drops any query string or fragment, removes everything outside
/// `[A-Za-z0-9/_-]`, then turns `-` into `_`. Idempotent.
pub fn sane_action(action: &str) -> String {
    let path = action.split(['?', '#']).next().unwrap_or_default();

    path.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-'))
        .map(|c| if c == '-' { '_' } else { c })
        .collect()
}

/// A siteverify reply as it arrives on the wire.
///
/// Only produced by [`crate::codec::parse_reply`]; it never carries
/// constraints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteVerifyReply {
    pub success: bool,

    #[serde(rename = "error-codes")]
    pub error_codes: Vec<String>,

    pub hostname: Option<String>,

    pub challenge_ts: Option<String>,

    pub apk_package_name: Option<String>,

    #[serde(deserialize_with = "coerce_score")]
    pub score: Option<f64>,

    pub action: Option<String>,
}

/// Outcome of a single verification.
///
/// Built once per call and never mutated afterwards; it owns a snapshot of
/// the constraints it was evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    success: bool,

    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,

    #[serde(default)]
    hostname: Option<String>,

    #[serde(default)]
    challenge_ts: Option<String>,

    #[serde(default)]
    apk_package_name: Option<String>,

    #[serde(default, deserialize_with = "coerce_score")]
    score: Option<f64>,

    #[serde(default)]
    action: Option<String>,

    #[serde(default)]
    constraints: Constraints,
}

impl Response {
    /// A failed response carrying a single locally generated error code
    pub fn failure(code: impl Into<String>) -> Self {
        Self {
            success: false,
            error_codes: vec![code.into()],
            ..Default::default()
        }
    }

    /// Build a response from a parsed siteverify reply
    pub fn from_reply(reply: SiteVerifyReply) -> Self {
        Self {
            success: reply.success,
            error_codes: reply.error_codes,
            hostname: reply.hostname,
            challenge_ts: reply.challenge_ts,
            apk_package_name: reply.apk_package_name,
            score: reply.score,
            action: reply.action,
            constraints: Constraints::default(),
        }
    }

    /// Append locally evaluated errors after the existing ones and attach
    /// the constraints snapshot they were computed from.
    pub fn with_evaluation(mut self, errors: Vec<String>, constraints: Constraints) -> Self {
        self.error_codes.extend(errors);
        self.constraints = constraints;
        self
    }

    /// Returns true if the challenge succeeded and no error was reported
    pub fn valid(&self) -> bool {
        self.success && self.error_codes.is_empty()
    }

    pub fn invalid(&self) -> bool {
        !self.valid()
    }

    /// Returns true if every given code is present.
    ///
    /// An empty query never matches.
    pub fn has_error(&self, codes: &[&str]) -> bool {
        !codes.is_empty()
            && codes
                .iter()
                .all(|code| self.error_codes.iter().any(|e| e == code))
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error_codes(&self) -> &[String] {
        &self.error_codes
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn challenge_ts(&self) -> Option<&str> {
        self.challenge_ts.as_deref()
    }

    pub fn apk_package_name(&self) -> Option<&str> {
        self.apk_package_name.as_deref()
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Constraints active when this response was evaluated
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// A single constraint value by name, see [`Constraints::get`]
    pub fn constraint(&self, name: &str) -> Option<serde_json::Value> {
        self.constraints.get(name)
    }
}

/// Accept the score as a JSON number or a numeric string.
///
/// Non-finite values are rejected; they would pass any threshold and do not
/// survive a JSON round-trip.
fn coerce_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Number(f64),
        Text(String),
    }

    let score = match Option::<RawScore>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(RawScore::Number(n)) => n,
        Some(RawScore::Text(s)) => s.trim().parse::<f64>().map_err(serde::de::Error::custom)?,
    };

    if !score.is_finite() {
        return Err(serde::de::Error::custom(format!("score is not finite: {score}")));
    }
    Ok(Some(score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::error_codes;

    fn reply(success: bool, codes: &[&str]) -> SiteVerifyReply {
        SiteVerifyReply {
            success,
            error_codes: codes.iter().map(|c| c.to_string()).collect(),
            hostname: Some("test.local.com".to_string()),
            score: Some(1.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_requires_success_and_no_errors() {
        assert!(Response::from_reply(reply(true, &[])).valid());
        assert!(Response::from_reply(reply(false, &[])).invalid());
        assert!(Response::from_reply(reply(true, &["timeout-or-duplicate"])).invalid());
    }

    #[test]
    fn test_invalid_is_negation_of_valid() {
        for response in [
            Response::from_reply(reply(true, &[])),
            Response::from_reply(reply(false, &["x"])),
            Response::failure(error_codes::INVALID_JSON),
            Response::default(),
        ] {
            assert_eq!(response.invalid(), !response.valid());
        }
    }

    #[test]
    fn test_has_error() {
        let response = Response::from_reply(reply(false, &["a", "b"]));

        assert!(response.has_error(&["a"]));
        assert!(response.has_error(&["a", "b"]));
        assert!(!response.has_error(&["a", "c"]));
        assert!(!response.has_error(&[]));
    }

    #[test]
    fn test_with_evaluation_appends_after_remote_codes() {
        let constraints = Constraints::default().with_hostname("other.com");
        let response = Response::from_reply(reply(false, &["remote"]))
            .with_evaluation(vec!["hostname-mismatch".to_string()], constraints.clone());

        assert_eq!(response.error_codes(), ["remote", "hostname-mismatch"]);
        assert_eq!(response.constraints(), &constraints);
    }

    #[test]
    fn test_constraint_lookup() {
        let constraints = Constraints::default()
            .with_threshold(0.5)
            .with_challenge_ts(120);
        let response = Response::default().with_evaluation(Vec::new(), constraints);

        assert_eq!(response.constraint("threshold"), Some(serde_json::json!(0.5)));
        assert_eq!(response.constraint("challenge_ts"), Some(serde_json::json!(120)));
        assert_eq!(response.constraint("hostname"), Some(serde_json::Value::Null));
        assert_eq!(response.constraint("nope"), None);
    }

    #[test]
    fn test_constraints_builder_and_flush() {
        let constraints = Constraints::default()
            .with_hostname("test_hostname")
            .with_apk_package_name("test_apk_package_name")
            .with_action("test_action")
            .with_threshold(0.7)
            .with_challenge_ts(60);

        assert!(!constraints.is_empty());
        assert_eq!(constraints.hostname.as_deref(), Some("test_hostname"));
        assert_eq!(constraints.challenge_ts, Some(60));
        assert!(Constraints::default().is_empty());
    }

    #[test]
    fn test_sane_action() {
        assert_eq!(
            sane_action("/unsanitized@action/to-test_here?foo=bar&quz=qux"),
            "/unsanitizedaction/to_test_here"
        );
        assert_eq!(sane_action("login#top"), "login");
        assert_eq!(sane_action("héllo wörld"), "hllowrld");
        assert_eq!(sane_action(""), "");
    }

    #[test]
    fn test_with_sane_action() {
        let constraints = Constraints::default().with_sane_action("check-out/step 2");
        assert_eq!(constraints.action.as_deref(), Some("check_out/step2"));
    }
}
