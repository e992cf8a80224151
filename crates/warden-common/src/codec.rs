//! Pure conversions between [`Response`] and its textual forms.
//!
//! - [`parse_reply`] turns a raw siteverify body into a [`Parsed`] reply.
//! - [`to_json`] / [`from_json`] round-trip a response, constraints included.

use serde_json::Value;

use crate::constants::{error_codes, reply_keys};
use crate::error::WardenError;
use crate::types::{Response, SiteVerifyReply};

/// Outcome of [`parse_reply`]
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// A well-formed reply, ready for constraint evaluation
    Reply(Response),

    /// The body could not be understood. The response carries a single
    /// local code and is never evaluated against constraints.
    Malformed(Response),
}

impl Parsed {
    pub fn into_response(self) -> Response {
        match self {
            Parsed::Reply(response) | Parsed::Malformed(response) => response,
        }
    }
}

/// Parse a siteverify reply body.
///
/// Never fails: a body that cannot be understood yields
/// [`Parsed::Malformed`] carrying `invalid-json-response` or `unknown-error`.
pub fn parse_reply(body: &str) -> Parsed {
    let object = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) if !object.is_empty() => object,
        _ => return Parsed::Malformed(Response::failure(error_codes::INVALID_JSON)),
    };

    if !reply_keys::ALL.iter().any(|key| object.contains_key(*key)) {
        return Parsed::Malformed(Response::failure(error_codes::UNKNOWN_ERROR));
    }

    match serde_json::from_value::<SiteVerifyReply>(Value::Object(object)) {
        Ok(reply) => Parsed::Reply(Response::from_reply(reply)),
        Err(_) => Parsed::Malformed(Response::failure(error_codes::UNKNOWN_ERROR)),
    }
}

/// Serialize a response, including its `constraints` sub-object
pub fn to_json(response: &Response) -> Result<String, WardenError> {
    Ok(serde_json::to_string(response)?)
}

/// Rebuild a response from [`to_json`] output
pub fn from_json(json: &str) -> Result<Response, WardenError> {
    Ok(serde_json::from_str(json)?)
}
