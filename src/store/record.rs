//! Task identifiers, stored records, and caller-facing snapshots.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use uuid::Uuid;

/// Phase of a freshly created task, before any worker touched it.
pub const PHASE_PENDING: &str = "pending";

/// Offset used when rendering creation timestamps (UTC+3, fixed year-round).
const RENDER_OFFSET_SECS: i32 = 3 * 3600;

/// Opaque, globally unique task identifier.
///
/// Generated from a v4 UUID; cheap to clone and hash. IDs are never reused
/// while a record with the same ID is still present in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(Arc<str>);

impl TaskId {
    /// Generates a fresh unique ID.
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4().to_string().into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(Arc::from(s.as_str()))
    }
}

/// Stored task state.
///
/// `phase` is the only field mutated after creation; everything else is
/// written once by `create`.
#[derive(Debug, Clone)]
pub(crate) struct TaskRecord {
    /// Human-readable label, immutable after creation.
    pub name: String,
    /// Free-form progress label, advanced by the assigned worker.
    pub phase: String,
    /// Creation instant, immutable.
    pub created_at: DateTime<Utc>,
    /// Creation instant rendered once in the fixed display offset.
    pub created_at_formatted: String,
}

impl TaskRecord {
    /// Creates a pending record stamped with the current instant.
    pub(crate) fn pending(name: String) -> Self {
        let created_at = Utc::now();
        let created_at_formatted = render_timestamp(created_at);
        Self {
            name,
            phase: PHASE_PENDING.to_string(),
            created_at,
            created_at_formatted,
        }
    }
}

/// Point-in-time copy of a task record returned to callers.
///
/// `elapsed` is derived at read time from `created_at` to now, rendered as
/// `HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    /// The task's ID.
    pub id: TaskId,
    /// Human-readable label, as given at creation.
    pub name: String,
    /// Last phase written by the assigned worker (or `pending`).
    pub phase: String,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Creation instant rendered in the fixed display offset (RFC 3339).
    pub created_at_formatted: String,
    /// Time since creation, `HH:MM:SS`, floored to whole seconds.
    pub elapsed: String,
}

/// Renders an instant in the fixed display offset, RFC 3339, whole seconds.
pub(crate) fn render_timestamp(at: DateTime<Utc>) -> String {
    let offset = FixedOffset::east_opt(RENDER_OFFSET_SECS).expect("offset within +/-24h");
    at.with_timezone(&offset)
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Formats the time since `since` as `HH:MM:SS`, floored to whole seconds.
///
/// Hours are not wrapped: a task alive for five days renders as `120:00:00`.
pub(crate) fn format_elapsed_since(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - since).num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn pending_record_starts_in_pending_phase() {
        let rec = TaskRecord::pending("demo".to_string());
        assert_eq!(rec.phase, PHASE_PENDING);
        assert_eq!(rec.name, "demo");
        assert!(!rec.created_at_formatted.is_empty());
    }

    #[test]
    fn timestamp_rendered_in_fixed_offset() {
        let at = Utc.with_ymd_and_hms(2025, 12, 7, 12, 0, 0).unwrap();
        assert_eq!(render_timestamp(at), "2025-12-07T15:00:00+03:00");
    }

    #[test]
    fn elapsed_pads_each_unit() {
        let since = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 1, 2, 3).unwrap();
        assert_eq!(format_elapsed_since(since, now), "01:02:03");
    }

    #[test]
    fn elapsed_hours_do_not_wrap() {
        let since = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap();
        assert_eq!(format_elapsed_since(since, now), "120:00:00");
    }

    #[test]
    fn elapsed_clamps_clock_skew_to_zero() {
        let since = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_elapsed_since(since, now), "00:00:00");
    }
}
