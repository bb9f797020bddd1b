//! # ltk-engine — License Tracker Engines
//!
//! The two engines at the core of the tracker:
//!
//! - [`assignment`] — the assignment lifecycle engine: validated
//!   assign/revoke with capacity enforcement, cascade revocation on
//!   device lifecycle change or deletion, and the expiry maintenance
//!   pass that deactivates lapsed licenses.
//! - [`alerts`] — the alert generation engine: severity-graded,
//!   deduplicated alerts from expiry, capacity, and software-version
//!   sweeps, plus acknowledgement and statistics.
//!
//! Both engines are synchronous and hold no state beyond their store
//! and audit handles; callers (request handlers, schedulers) decide
//! the threading. The acting identity is passed explicitly into every
//! operation — there is no ambient security context.

pub mod alerts;
pub mod assignment;

pub use alerts::{classify_expiry_severity, AlertEngine, AlertStatistics, SweepSummary};
pub use assignment::{AssignmentEngine, AssignmentRequest, ExpirySummary, RevokeRequest};
