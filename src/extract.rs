//! Field extraction over raw provider payloads.
//!
//! The provider's payload shape is not under our control and has shifted
//! across API versions, so every interesting field is read through an ordered
//! list of extractor functions tried in sequence - first non-empty match wins.
//! Each precedence rule is a standalone reader so it can be tested in
//! isolation.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

type StringReader = fn(&Value) -> Option<String>;
type DateReader = fn(&Value) -> Option<DateTime<Utc>>;

/// Return the first reader's non-empty result, or None.
fn first_match(payload: &Value, readers: &[StringReader]) -> Option<String> {
    readers.iter().find_map(|read| read(payload))
}

/// Read a top-level string field, rejecting empty/whitespace values.
fn str_field(payload: &Value, key: &str) -> Option<String> {
    non_empty(payload.get(key)?.as_str()?)
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// --- agent identity -------------------------------------------------------

fn read_agent_name(p: &Value) -> Option<String> {
    str_field(p, "agent_name")
}

fn read_nested_agent_name(p: &Value) -> Option<String> {
    let agent = p.get("agent")?;
    str_field(agent, "agent_name").or_else(|| str_field(agent, "name"))
}

fn read_agent_id(p: &Value) -> Option<String> {
    str_field(p, "agent_id")
}

fn read_agent_name_id(p: &Value) -> Option<String> {
    str_field(p, "agent_name_id")
}

fn read_agent_as_string(p: &Value) -> Option<String> {
    non_empty(p.get("agent")?.as_str()?)
}

fn read_nested_agent_id(p: &Value) -> Option<String> {
    str_field(p.get("agent")?, "agent_id")
}

/// Derive the best-effort agent identity used as the link key to a username.
///
/// Pure and total: never panics, returns None when no known field shape
/// carries a usable value.
pub fn agent_name(payload: &Value) -> Option<String> {
    first_match(
        payload,
        &[
            read_agent_name,
            read_nested_agent_name,
            read_agent_id,
            read_agent_name_id,
            read_agent_as_string,
            read_nested_agent_id,
        ],
    )
}

/// Derive the agent id alone (no name fallbacks), used by live filtering
/// where id and name are matched against separate roster columns.
pub fn agent_id(payload: &Value) -> Option<String> {
    first_match(payload, &[read_agent_id, read_nested_agent_id])
}

// --- call id --------------------------------------------------------------

fn read_call_id(p: &Value) -> Option<String> {
    str_field(p, "call_id")
}

fn read_id(p: &Value) -> Option<String> {
    str_field(p, "id")
}

/// Extract the provider's call identifier from a payload.
pub fn call_id(payload: &Value) -> Option<String> {
    first_match(payload, &[read_call_id, read_id])
}

// --- timestamps -----------------------------------------------------------

/// Parse a timestamp value that may be epoch milliseconds (integer) or an
/// RFC 3339 string, both of which the provider has emitted at some point.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(ms) = value.as_i64() {
        return Utc.timestamp_millis_opt(ms).single();
    }
    let s = value.as_str()?;
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn read_created_at(p: &Value) -> Option<DateTime<Utc>> {
    parse_timestamp(p.get("created_at")?)
}

fn read_creation_timestamp(p: &Value) -> Option<DateTime<Utc>> {
    parse_timestamp(p.get("creation_timestamp")?)
}

fn read_start_timestamp(p: &Value) -> Option<DateTime<Utc>> {
    parse_timestamp(p.get("start_timestamp")?)
}

const DATE_READERS: &[DateReader] = &[
    read_created_at,
    read_creation_timestamp,
    read_start_timestamp,
];

/// Single sortable timestamp for a call.
///
/// Provider timestamps win over our own bookkeeping time: the local record
/// may have been created long after the call actually happened (for example
/// during a lazy pagination catch-up). The local record's `created_at` is
/// only a fallback, and the current time an absolute last resort.
pub fn effective_date(
    payload: Option<&Value>,
    record_created_at: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    if let Some(p) = payload {
        if let Some(dt) = DATE_READERS.iter().find_map(|read| read(p)) {
            return dt;
        }
    }
    record_created_at.unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn agent_name_prefers_explicit_field() {
        let p = json!({"agent_name": "alice", "agent": {"name": "bob"}, "agent_id": "ag_1"});
        assert_eq!(agent_name(&p), Some("alice".to_string()));
    }

    #[test]
    fn agent_name_from_nested_object() {
        let p = json!({"agent": {"name": "X"}});
        assert_eq!(agent_name(&p), Some("X".to_string()));
    }

    #[test]
    fn agent_name_falls_back_to_agent_id() {
        let p = json!({"agent_id": "Y"});
        assert_eq!(agent_name(&p), Some("Y".to_string()));
    }

    #[test]
    fn agent_name_from_string_agent_field() {
        let p = json!({"agent": "carol"});
        assert_eq!(agent_name(&p), Some("carol".to_string()));
    }

    #[test]
    fn agent_name_absent() {
        assert_eq!(agent_name(&json!({})), None);
    }

    #[test]
    fn agent_name_rejects_empty_strings() {
        let p = json!({"agent_name": "  ", "agent_id": "real"});
        assert_eq!(agent_name(&p), Some("real".to_string()));
    }

    #[test]
    fn agent_name_never_panics_on_odd_shapes() {
        for p in [
            json!(null),
            json!(42),
            json!({"agent": 42}),
            json!({"agent": {"name": 7}}),
            json!({"agent_name": ["x"]}),
        ] {
            let _ = agent_name(&p);
        }
    }

    #[test]
    fn call_id_prefers_call_id_key() {
        let p = json!({"call_id": "c1", "id": "c2"});
        assert_eq!(call_id(&p), Some("c1".to_string()));
    }

    #[test]
    fn effective_date_creation_beats_start() {
        let p = json!({
            "created_at": 2_000_i64,
            "start_timestamp": 1_000_i64,
        });
        let dt = effective_date(Some(&p), None);
        assert_eq!(dt.timestamp_millis(), 2_000);
    }

    #[test]
    fn effective_date_uses_start_timestamp_when_alone() {
        let p = json!({"start_timestamp": 5_000_i64});
        assert_eq!(effective_date(Some(&p), None).timestamp_millis(), 5_000);
    }

    #[test]
    fn effective_date_parses_rfc3339() {
        let p = json!({"created_at": "2024-03-01T12:00:00Z"});
        let dt = effective_date(Some(&p), None);
        assert_eq!(dt.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[test]
    fn effective_date_falls_back_to_record_created_at() {
        let record_dt = Utc.timestamp_millis_opt(9_000).single().unwrap();
        let dt = effective_date(Some(&json!({})), Some(record_dt));
        assert_eq!(dt, record_dt);
    }

    #[test]
    fn effective_date_last_resort_is_now() {
        let before = Utc::now();
        let dt = effective_date(None, None);
        assert!(dt >= before);
    }
}
