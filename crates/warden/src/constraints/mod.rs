//! Post-verification constraint checks.
//!
//! A siteverify reply saying `success: true` only proves a human solved
//! *some* challenge. The engine checks that it was ours: right hostname,
//! right app, right action, good enough score, fresh enough.

mod engine;

pub use engine::ConstraintEngine;
pub use warden_common::sane_action;
