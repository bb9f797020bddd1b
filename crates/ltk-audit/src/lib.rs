//! # ltk-audit — Audit Recording Port
//!
//! Records who did what to which record, with a structured JSON
//! payload per event.
//!
//! ## Invariant: Recording Never Fails the Operation
//!
//! [`AuditRecorder::record`] is infallible from the caller's point of
//! view. An assignment that succeeded has succeeded; a broken audit
//! sink must not turn it into an error after the fact. Sinks handle
//! their own failures internally (log and drop).
//!
//! Two sinks ship with the crate: [`TracingRecorder`] emits events as
//! `tracing` records, and [`MemoryAuditTrail`] accumulates them for
//! inspection in tests.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ltk_core::{Actor, AuditAction, EntityType, Timestamp};

// ─── Audit Event ─────────────────────────────────────────────────────

/// One entry in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// User id of the actor, when known.
    pub actor_id: Option<Uuid>,
    /// Display name of the actor.
    pub actor_name: String,
    /// The kind of record acted on.
    pub entity_type: EntityType,
    /// Display form of the record's identifier.
    pub entity_id: String,
    /// What was done.
    pub action: AuditAction,
    /// Structured payload with operation-specific fields.
    pub details: serde_json::Value,
    /// When the event was recorded.
    pub recorded_at: Timestamp,
}

impl AuditEvent {
    /// Create an event stamped with the current time.
    pub fn new(
        actor: &Actor,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        action: AuditAction,
        details: serde_json::Value,
    ) -> Self {
        Self {
            actor_id: actor.id,
            actor_name: actor.name.clone(),
            entity_type,
            entity_id: entity_id.into(),
            action,
            details,
            recorded_at: Timestamp::now(),
        }
    }
}

// ─── Recorder Port ───────────────────────────────────────────────────

/// Sink for audit events.
///
/// Implementations must not panic and must not block for long; the
/// engines call this inline on every mutating operation.
pub trait AuditRecorder: Send + Sync {
    /// Record one event.
    fn record(&self, event: AuditEvent);
}

// ─── Tracing Sink ────────────────────────────────────────────────────

/// Recorder that emits each event as a structured `tracing` record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRecorder;

impl AuditRecorder for TracingRecorder {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            actor = %event.actor_name,
            entity_type = %event.entity_type,
            entity_id = %event.entity_id,
            action = %event.action,
            details = %event.details,
            "audit event"
        );
    }
}

// ─── In-Memory Trail ─────────────────────────────────────────────────

/// Recorder that accumulates events in memory.
///
/// Cheaply cloneable; clones share the same trail. Used as the test
/// fixture throughout the workspace.
#[derive(Clone, Default)]
pub struct MemoryAuditTrail {
    events: Arc<RwLock<Vec<AuditEvent>>>,
}

impl MemoryAuditTrail {
    /// Create an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events, in recording order.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }

    /// Events for one record.
    pub fn events_for_entity(&self, entity_type: EntityType, entity_id: &str) -> Vec<AuditEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
            .cloned()
            .collect()
    }

    /// Events recording one kind of action.
    pub fn events_by_action(&self, action: AuditAction) -> Vec<AuditEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Whether the trail is empty.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl AuditRecorder for MemoryAuditTrail {
    fn record(&self, event: AuditEvent) {
        self.events.write().push(event);
    }
}
