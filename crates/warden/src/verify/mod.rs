//! Token verification against the remote siteverify service.
//!
//! ```text
//! Verifier ── FormRequest ──▶ HttpClient ──▶ siteverify
//!    │                             │
//!    ◀──────── HttpReply ──────────┘
//!    └─▶ parse_reply ─▶ ConstraintEngine ─▶ Response
//! ```

mod request;
mod transport;
mod verifier;

pub use request::FormRequest;
pub use transport::{HttpClient, HttpReply, ReqwestClient};
pub use verifier::Verifier;
