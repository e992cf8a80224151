//! Siteverify request construction.

use warden_common::constants::{CLIENT_VERSION, FORM_CONTENT_TYPE, fields};

/// A form-encoded POST, ready to hand to an [`super::HttpClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl FormRequest {
    /// Build the siteverify request for a token.
    ///
    /// Blank fields are left out of the body rather than sent empty.
    pub fn siteverify(url: &str, secret: &str, token: &str, remote_ip: Option<&str>) -> Self {
        let body = encode_form(&[
            (fields::SECRET, Some(secret)),
            (fields::RESPONSE, Some(token)),
            (fields::REMOTE_IP, remote_ip),
            (fields::VERSION, Some(CLIENT_VERSION)),
        ]);

        Self {
            method: "POST",
            url: url.to_string(),
            headers: vec![("Content-Type", FORM_CONTENT_TYPE.to_string())],
            body,
        }
    }

    /// First header value with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// `application/x-www-form-urlencoded` encoding, skipping absent or empty values
fn encode_form(pairs: &[(&str, Option<&str>)]) -> String {
    pairs
        .iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}={}", urlencoding::encode(key), urlencoding::encode(v)))
        })
        .collect::<Vec<_>>()
        .join("&")
}
