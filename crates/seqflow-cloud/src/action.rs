//! Planned actions for Seq resources

use crate::apikey::{ApiKeyResource, ApiKeyState};
use crate::state::GlobalState;
use seqflow_core::ApiKeyConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A planned change to one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Resource address (the name given in `seq.kdl`)
    pub address: String,

    pub action_type: ActionType,

    /// Resource type (e.g. "seq_api_key")
    pub resource_type: String,

    pub description: String,

    /// Attribute-level differences, e.g. `title: "old" -> "new"`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<String>,
}

impl Action {
    fn api_key(address: &str, action_type: ActionType, description: String) -> Self {
        Self {
            address: address.to_string(),
            action_type,
            resource_type: ApiKeyResource::TYPE_NAME.to_string(),
            description,
            changes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Create,
    Update,
    Delete,
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Result of applying a plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyResult {
    pub succeeded: Vec<ActionResult>,
    pub failed: Vec<ActionResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,

    /// Stopped early on cancellation; remaining actions were not attempted
    #[serde(default)]
    pub interrupted: bool,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.interrupted
    }

    pub fn add_success(&mut self, address: impl Into<String>, message: impl Into<String>) {
        self.succeeded.push(ActionResult {
            address: address.into(),
            success: true,
            message: message.into(),
            error: None,
        });
    }

    pub fn add_failure(&mut self, address: impl Into<String>, error: impl Into<String>) {
        self.failed.push(ActionResult {
            address: address.into(),
            success: false,
            message: String::new(),
            error: Some(error.into()),
        });
    }
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub address: String,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

/// Ordered list of actions to be applied
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Compare desired API keys against recorded state
    ///
    /// Creates and updates come first in address order, deletes last.
    pub fn build(desired: &BTreeMap<String, ApiKeyConfig>, state: &GlobalState) -> Self {
        let mut actions = Vec::new();

        for (address, config) in desired {
            let action = match state.api_key(address) {
                None => {
                    let mut action = Action::api_key(
                        address,
                        ActionType::Create,
                        format!("Create API key '{}'", config.title),
                    );
                    action.changes = describe_new(config);
                    action
                }
                Some(recorded) => {
                    let changes = diff(config, recorded);
                    if changes.is_empty() {
                        Action::api_key(
                            address,
                            ActionType::NoOp,
                            format!("API key '{}' is up to date", config.title),
                        )
                    } else {
                        let mut action = Action::api_key(
                            address,
                            ActionType::Update,
                            format!("Update API key '{}'", config.title),
                        );
                        action.changes = changes;
                        action
                    }
                }
            };
            actions.push(action);
        }

        for (address, recorded) in &state.api_keys {
            if !desired.contains_key(address) {
                actions.push(delete_action(address, recorded));
            }
        }

        Self::new(actions)
    }

    /// Delete every recorded API key
    pub fn destroy(state: &GlobalState) -> Self {
        Self::new(
            state
                .api_keys
                .iter()
                .map(|(address, recorded)| delete_action(address, recorded))
                .collect(),
        )
    }

    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

fn delete_action(address: &str, recorded: &ApiKeyState) -> Action {
    let target = recorded.recorded_id().unwrap_or("(no id)");
    Action::api_key(
        address,
        ActionType::Delete,
        format!("Delete API key '{}' ({})", recorded.title, target),
    )
}

fn describe_new(config: &ApiKeyConfig) -> Vec<String> {
    let mut changes = vec![format!("title: {:?}", config.title)];
    if let Some(owner) = config.explicit_owner() {
        changes.push(format!("owner_id: {:?}", owner));
    }
    if let Some(permissions) = &config.permissions {
        changes.push(format!("permissions: {:?}", permissions));
    }
    changes
}

/// Differences between desired configuration and recorded state
///
/// Unset owner and unset permissions are left to the server and never
/// count as drift.
fn diff(config: &ApiKeyConfig, recorded: &ApiKeyState) -> Vec<String> {
    let mut changes = Vec::new();

    if config.title != recorded.title {
        changes.push(format!("title: {:?} -> {:?}", recorded.title, config.title));
    }
    if let Some(owner) = config.explicit_owner()
        && recorded.owner_id.as_deref() != Some(owner)
    {
        changes.push(format!(
            "owner_id: {:?} -> {:?}",
            recorded.owner_id.as_deref().unwrap_or(""),
            owner
        ));
    }
    if let Some(permissions) = &config.permissions
        && permissions != &recorded.permissions
    {
        changes.push(format!(
            "permissions: {:?} -> {:?}",
            recorded.permissions, permissions
        ));
    }

    changes
}

/// Counts of planned actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete, {} unchanged",
            self.create, self.update, self.delete, self.no_change
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn recorded(title: &str, permissions: &[&str]) -> ApiKeyState {
        ApiKeyState {
            id: Some(format!("id-{}", title)),
            title: title.to_string(),
            token: Some("tok".to_string()),
            owner_id: Some("user-admin".to_string()),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn desired(entries: &[(&str, ApiKeyConfig)]) -> BTreeMap<String, ApiKeyConfig> {
        entries
            .iter()
            .map(|(address, config)| (address.to_string(), config.clone()))
            .collect()
    }

    #[test]
    fn test_build_create_update_delete() {
        let mut state = GlobalState::new();
        state.set_api_key("reader", recorded("reader", &["Read"]));
        state.set_api_key("old", recorded("old", &[]));
        state.set_api_key("same", recorded("same", &["Ingest"]));

        let plan = Plan::build(
            &desired(&[
                ("ingest", ApiKeyConfig::new("ingest")),
                ("reader", ApiKeyConfig::new("reader v2")),
                ("same", ApiKeyConfig::new("same").with_permissions(["Ingest"])),
            ]),
            &state,
        );

        assert!(plan.has_changes);
        assert_eq!(
            plan.summary(),
            PlanSummary {
                create: 1,
                update: 1,
                delete: 1,
                no_change: 1
            }
        );
        assert_eq!(plan.actions.last().unwrap().address, "old");
        assert_eq!(plan.actions.last().unwrap().action_type, ActionType::Delete);

        let update = plan.actions_by_type(ActionType::Update)[0];
        assert_eq!(update.address, "reader");
        assert_eq!(update.changes, vec![r#"title: "reader" -> "reader v2""#]);
    }

    #[test]
    fn test_unset_fields_are_not_drift() {
        let mut state = GlobalState::new();
        state.set_api_key("reader", recorded("reader", &["Read"]));

        let plan = Plan::build(&desired(&[("reader", ApiKeyConfig::new("reader"))]), &state);
        assert!(!plan.has_changes);

        let plan = Plan::build(
            &desired(&[("reader", ApiKeyConfig::new("reader").with_owner(""))]),
            &state,
        );
        assert!(!plan.has_changes);
    }

    #[test]
    fn test_permission_and_owner_changes() {
        let mut state = GlobalState::new();
        state.set_api_key("reader", recorded("reader", &["Read"]));

        let plan = Plan::build(
            &desired(&[(
                "reader",
                ApiKeyConfig::new("reader")
                    .with_owner("user-2")
                    .with_permissions(Vec::<String>::new()),
            )]),
            &state,
        );

        let update = &plan.actions[0];
        assert_eq!(update.action_type, ActionType::Update);
        assert_eq!(update.changes.len(), 2);
    }

    #[test]
    fn test_permission_order_is_irrelevant() {
        let mut state = GlobalState::new();
        state.set_api_key("rw", recorded("rw", &["Write", "Read"]));

        let plan = Plan::build(
            &desired(&[("rw", ApiKeyConfig::new("rw").with_permissions(["Read", "Write"]))]),
            &state,
        );
        assert!(!plan.has_changes);
        assert_eq!(
            state.api_key("rw").unwrap().permissions,
            BTreeSet::from(["Read".to_string(), "Write".to_string()])
        );
    }

    #[test]
    fn test_destroy_plan() {
        let mut state = GlobalState::new();
        state.set_api_key("a", recorded("a", &[]));
        state.set_api_key("b", ApiKeyState::default());

        let plan = Plan::destroy(&state);
        assert_eq!(plan.summary().delete, 2);
        assert!(plan.actions[1].description.contains("(no id)"));

        assert!(!Plan::destroy(&GlobalState::new()).has_changes);
    }

    #[test]
    fn test_summary_display() {
        let plan = Plan::empty();
        assert_eq!(
            plan.summary().to_string(),
            "0 to create, 0 to update, 0 to delete, 0 unchanged"
        );
    }
}
