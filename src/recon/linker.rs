//! Ownership-linking strategies.
//!
//! Linking a call to a user is an ordered pipeline of strategies, each
//! returning matched-or-not; the pipeline stops at the first match. Strategy
//! failures are logged and the pipeline continues, so one malformed payload
//! field never blocks the later strategies.

use crate::directory::User;
use crate::extract;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Lookup tables over the user directory, built once per reconciliation pass.
pub struct UserIndex {
    by_username: HashMap<String, User>,
    by_id: HashMap<Uuid, User>,
}

impl UserIndex {
    pub fn build(users: &[User]) -> Self {
        Self {
            by_username: users
                .iter()
                .map(|u| (u.username.clone(), u.clone()))
                .collect(),
            by_id: users.iter().map(|u| (u.id, u.clone())).collect(),
        }
    }

    /// Agent-name-to-username match: the link rule reconciliation uses.
    pub fn match_agent_name(&self, payload: &Value) -> Option<Uuid> {
        let name = extract::agent_name(payload)?;
        self.by_username.get(&name).map(|u| u.id)
    }

    fn match_agent_id(&self, payload: &Value) -> Option<Uuid> {
        let id = extract::agent_id(payload)?;
        self.by_username.get(&id).map(|u| u.id)
    }

    fn contains_id(&self, id: Uuid) -> bool {
        self.by_id.contains_key(&id)
    }
}

#[derive(Error, Debug)]
#[error("{0}")]
pub struct LinkError(pub String);

/// One way of deriving an owner from a payload.
pub trait LinkStrategy: Send + Sync {
    /// Try to resolve an owner.
    ///
    /// # Errors
    ///
    /// Returns Err when the payload carries the relevant field but it is
    /// unusable (for example a malformed user id), which the pipeline logs.
    fn try_link(&self, payload: &Value, users: &UserIndex) -> Result<Option<Uuid>, LinkError>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// Strategy 1: derived agent name equals a username.
struct AgentNameMatch;

impl LinkStrategy for AgentNameMatch {
    fn try_link(&self, payload: &Value, users: &UserIndex) -> Result<Option<Uuid>, LinkError> {
        Ok(users.match_agent_name(payload))
    }

    fn name(&self) -> &'static str {
        "agent_name"
    }
}

/// Strategy 2: raw agent id equals a username (some tenants name accounts
/// after the provider agent id).
struct AgentIdMatch;

impl LinkStrategy for AgentIdMatch {
    fn try_link(&self, payload: &Value, users: &UserIndex) -> Result<Option<Uuid>, LinkError> {
        Ok(users.match_agent_id(payload))
    }

    fn name(&self) -> &'static str {
        "agent_id"
    }
}

/// Strategy 3: the webhook payload's metadata carries an explicit user id.
struct MetadataUserMatch;

impl LinkStrategy for MetadataUserMatch {
    fn try_link(&self, payload: &Value, users: &UserIndex) -> Result<Option<Uuid>, LinkError> {
        let raw = payload
            .get("metadata")
            .and_then(|m| m.get("user_id"))
            .or_else(|| payload.get("user_id"))
            .and_then(Value::as_str);
        let Some(raw) = raw else {
            return Ok(None);
        };
        let id = Uuid::parse_str(raw)
            .map_err(|e| LinkError(format!("malformed user_id '{}': {}", raw, e)))?;
        if users.contains_id(id) {
            Ok(Some(id))
        } else {
            Ok(None)
        }
    }

    fn name(&self) -> &'static str {
        "metadata_user_id"
    }
}

/// A resolved link and the strategy that produced it.
pub struct LinkMatch {
    pub user_id: Uuid,
    pub strategy: &'static str,
}

/// Ordered pipeline of linking strategies.
pub struct LinkPipeline {
    strategies: Vec<Box<dyn LinkStrategy>>,
}

impl LinkPipeline {
    pub fn new(strategies: Vec<Box<dyn LinkStrategy>>) -> Self {
        Self { strategies }
    }

    /// The standard order: agent name, agent id, explicit metadata user id.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(AgentNameMatch),
            Box::new(AgentIdMatch),
            Box::new(MetadataUserMatch),
        ])
    }

    /// Run strategies in order, returning the first match.
    pub fn resolve(&self, payload: &Value, users: &UserIndex) -> Option<LinkMatch> {
        for strategy in &self.strategies {
            match strategy.try_link(payload, users) {
                Ok(Some(user_id)) => {
                    tracing::debug!(strategy = strategy.name(), %user_id, "Linked call to user");
                    return Some(LinkMatch {
                        user_id,
                        strategy: strategy.name(),
                    });
                }
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(
                        strategy = strategy.name(),
                        error = %err,
                        "Link strategy failed, trying next"
                    );
                    continue;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Role;
    use serde_json::json;

    fn index() -> (UserIndex, Uuid, Uuid) {
        let alice = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            role: Role::User,
        };
        let agent_user = User {
            id: Uuid::new_v4(),
            username: "ag_77".to_string(),
            role: Role::User,
        };
        let (a, b) = (alice.id, agent_user.id);
        (UserIndex::build(&[alice, agent_user]), a, b)
    }

    #[test]
    fn pipeline_stops_at_first_match() {
        let (users, alice, _) = index();
        let payload = json!({"agent_name": "alice", "metadata": {"user_id": "not-a-uuid"}});
        let m = LinkPipeline::standard().resolve(&payload, &users).unwrap();
        assert_eq!(m.user_id, alice);
        assert_eq!(m.strategy, "agent_name");
    }

    #[test]
    fn agent_id_strategy_matches_username() {
        let (users, _, agent_user) = index();
        let payload = json!({"agent_id": "ag_77"});
        let m = LinkPipeline::standard().resolve(&payload, &users).unwrap();
        assert_eq!(m.user_id, agent_user);
    }

    #[test]
    fn metadata_user_id_strategy() {
        let (users, alice, _) = index();
        let payload = json!({"agent_name": "nobody", "metadata": {"user_id": alice.to_string()}});
        let m = LinkPipeline::standard().resolve(&payload, &users).unwrap();
        assert_eq!(m.user_id, alice);
        assert_eq!(m.strategy, "metadata_user_id");
    }

    #[test]
    fn malformed_metadata_id_does_not_abort_pipeline() {
        let (users, _, _) = index();
        let payload = json!({"metadata": {"user_id": "garbage"}});
        assert!(LinkPipeline::standard().resolve(&payload, &users).is_none());
    }

    #[test]
    fn unknown_metadata_id_is_not_a_match() {
        let (users, _, _) = index();
        let payload = json!({"metadata": {"user_id": Uuid::new_v4().to_string()}});
        assert!(LinkPipeline::standard().resolve(&payload, &users).is_none());
    }
}
