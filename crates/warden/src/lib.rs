//! # Warden
//!
//! Server-side CAPTCHA token verification.
//!
//! A [`Verifier`] posts the client's token to the siteverify service
//! through an injected [`HttpClient`], parses the reply, and runs the
//! configured [`Constraints`] over it with the [`ConstraintEngine`].
//!
//! ```no_run
//! # async fn run() -> Result<(), warden::WardenError> {
//! use std::time::Duration;
//! use warden::{ReqwestClient, Verifier};
//!
//! let mut verifier = Verifier::new("secret", ReqwestClient::new(Duration::from_secs(5))?);
//! verifier.hostname("example.com").threshold(0.5);
//!
//! let response = verifier.verify("token-from-widget", Some("203.0.113.7")).await?;
//! if response.valid() {
//!     // let the request through
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The binary in this crate wraps the same verifier in a small HTTP gateway.

pub mod config;
pub mod constraints;
pub mod routes;
pub mod state;
pub mod verify;

pub use constraints::{ConstraintEngine, sane_action};
pub use verify::{FormRequest, HttpClient, HttpReply, ReqwestClient, Verifier};
pub use warden_common::{Constraints, Response, WardenError, codec, constants};
