//! Shared constants for Warden components.

/// Default siteverify endpoint
pub const SITE_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Client version identifier sent with every verification request
pub const CLIENT_VERSION: &str = concat!("rust_", env!("CARGO_PKG_VERSION"));

/// Default Warden HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8888";

/// Default upstream request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Content type of the siteverify request body
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Error codes reported inside a verification response.
///
/// Codes returned by the remote service are passed through untouched;
/// these are the ones Warden generates locally.
pub mod error_codes {
    /// The reply body was not a JSON object
    pub const INVALID_JSON: &str = "invalid-json-response";

    /// The reply was JSON but not a recognisable siteverify shape
    pub const UNKNOWN_ERROR: &str = "unknown-error";

    /// The reply hostname differs from the expected one
    pub const HOSTNAME_MISMATCH: &str = "hostname-mismatch";

    /// The reply Android package name differs from the expected one
    pub const APK_PACKAGE_NAME_MISMATCH: &str = "apk-package-name-mismatch";

    /// The reply action differs from the expected one
    pub const ACTION_MISMATCH: &str = "action-mismatch";

    /// The reply score is missing or below the threshold
    pub const SCORE_THRESHOLD_NOT_MET: &str = "score-threshold-not-met";

    /// The challenge is older than the allowed age, or its timestamp is unreadable
    pub const CHALLENGE_TIMEOUT: &str = "challenge-timeout";
}

/// Form field names of the siteverify request
pub mod fields {
    pub const SECRET: &str = "secret";
    pub const RESPONSE: &str = "response";
    pub const REMOTE_IP: &str = "remoteip";
    pub const VERSION: &str = "version";
}

/// Keys of a siteverify reply object
pub mod reply_keys {
    pub const SUCCESS: &str = "success";
    pub const ERROR_CODES: &str = "error-codes";
    pub const HOSTNAME: &str = "hostname";
    pub const CHALLENGE_TS: &str = "challenge_ts";
    pub const APK_PACKAGE_NAME: &str = "apk_package_name";
    pub const SCORE: &str = "score";
    pub const ACTION: &str = "action";

    /// Every key a well-formed reply may carry
    pub const ALL: [&str; 7] = [
        SUCCESS,
        ERROR_CODES,
        HOSTNAME,
        CHALLENGE_TS,
        APK_PACKAGE_NAME,
        SCORE,
        ACTION,
    ];
}

/// HTTP header names
pub mod headers {
    /// Client address as seen by a fronting proxy
    pub const X_FORWARDED_FOR: &str = "X-Forwarded-For";
}
