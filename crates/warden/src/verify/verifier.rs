//! Siteverify client.

use chrono::Utc;
use warden_common::codec::{Parsed, parse_reply};
use warden_common::constants::SITE_VERIFY_URL;
use warden_common::{Constraints, Response, WardenError, sane_action};

use super::{FormRequest, HttpClient};
use crate::constraints::ConstraintEngine;

/// Verifies tokens against the siteverify endpoint and applies constraints
pub struct Verifier<C> {
    /// Shared secret for the site key
    secret: String,
    /// Siteverify endpoint
    endpoint: String,
    /// Injected HTTP transport
    client: C,
    /// Constraints applied by [`Verifier::verify`]
    constraints: Constraints,
}

impl<C: HttpClient> Verifier<C> {
    pub fn new(secret: impl Into<String>, client: C) -> Self {
        Self {
            secret: secret.into(),
            endpoint: SITE_VERIFY_URL.to_string(),
            client,
            constraints: Constraints::default(),
        }
    }

    /// Use a different siteverify endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn set_secret(&mut self, secret: impl Into<String>) -> &mut Self {
        self.secret = secret.into();
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn set_client(&mut self, client: C) -> &mut Self {
        self.client = client;
        self
    }

    // === Constraints ===

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn constraints_mut(&mut self) -> &mut Constraints {
        &mut self.constraints
    }

    pub fn set_constraints(&mut self, constraints: Constraints) -> &mut Self {
        self.constraints = constraints;
        self
    }

    /// Reset every constraint to unset
    pub fn flush_constraints(&mut self) -> &mut Self {
        self.constraints = Constraints::default();
        self
    }

    pub fn hostname(&mut self, hostname: impl Into<String>) -> &mut Self {
        self.constraints.hostname = Some(hostname.into());
        self
    }

    pub fn apk_package_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.constraints.apk_package_name = Some(name.into());
        self
    }

    pub fn action(&mut self, action: impl Into<String>) -> &mut Self {
        self.constraints.action = Some(action.into());
        self
    }

    /// Expect an action, normalised the way siteverify reports it
    pub fn sane_action(&mut self, action: &str) -> &mut Self {
        self.constraints.action = Some(sane_action(action));
        self
    }

    /// Minimum acceptable score; a score equal to the threshold passes
    pub fn threshold(&mut self, threshold: f64) -> &mut Self {
        self.constraints.threshold = Some(threshold);
        self
    }

    /// Maximum challenge age in seconds
    pub fn challenge_ts(&mut self, max_age_secs: u64) -> &mut Self {
        self.constraints.challenge_ts = Some(max_age_secs);
        self
    }

    // === Verification ===

    /// Verify a token against the configured constraints.
    ///
    /// Verification failures are reported inside the returned [`Response`];
    /// only transport failures come back as `Err`.
    pub async fn verify(
        &self,
        token: &str,
        remote_ip: Option<&str>,
    ) -> Result<Response, WardenError> {
        self.verify_with(token, remote_ip, &self.constraints).await
    }

    /// Verify a token against explicit constraints instead of the configured ones
    #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint, remote_ip = ?remote_ip))]
    pub async fn verify_with(
        &self,
        token: &str,
        remote_ip: Option<&str>,
        constraints: &Constraints,
    ) -> Result<Response, WardenError> {
        let request = FormRequest::siteverify(&self.endpoint, &self.secret, token, remote_ip);
        let reply = self.client.send(request).await?;

        tracing::debug!(status = reply.status, bytes = reply.body.len(), "Siteverify replied");

        let response = match parse_reply(&reply.body) {
            Parsed::Reply(response) => response,
            Parsed::Malformed(response) => {
                tracing::warn!(
                    status = reply.status,
                    error_codes = ?response.error_codes(),
                    "Unusable siteverify reply"
                );
                return Ok(response);
            }
        };

        let snapshot = constraints.clone();
        let errors = ConstraintEngine::evaluate(&response, &snapshot, Utc::now());
        let response = response.with_evaluation(errors, snapshot);

        if response.valid() {
            tracing::debug!(score = ?response.score(), "Token verified");
        } else {
            tracing::info!(error_codes = ?response.error_codes(), "Token rejected");
        }

        Ok(response)
    }

    /// Like [`Verifier::verify`], but an invalid response becomes
    /// [`WardenError::Failed`]
    pub async fn verify_or_throw(
        &self,
        token: &str,
        remote_ip: Option<&str>,
    ) -> Result<Response, WardenError> {
        let response = self.verify(token, remote_ip).await?;

        if response.invalid() {
            return Err(WardenError::Failed(Box::new(response)));
        }

        Ok(response)
    }
}
