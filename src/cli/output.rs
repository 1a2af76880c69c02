//! Output formatting helpers for CLI commands

use crate::recon::CallEntry;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// How a listed call resolved against the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Present,
    Deleted,
    Error,
}

/// View model for call display
#[derive(Debug, Clone, serde::Serialize)]
pub struct CallView {
    pub external_call_id: String,
    pub owner_user_id: Option<String>,
    pub agent: Option<String>,
    pub date: String,
    pub status: CallStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&CallEntry> for CallView {
    fn from(entry: &CallEntry) -> Self {
        let status = if entry.call.is_some() {
            CallStatus::Present
        } else if entry.is_deleted {
            CallStatus::Deleted
        } else {
            CallStatus::Error
        };
        let date = crate::extract::effective_date(
            entry.call.as_ref().map(|c| c.payload()),
            Some(entry.record.created_at),
        );
        Self {
            external_call_id: entry.record.external_call_id.clone(),
            owner_user_id: entry.record.owner_user_id.map(|id| id.to_string()),
            agent: entry.call.as_ref().and_then(|c| c.agent_name()),
            date: date.to_rfc3339(),
            status,
            error: entry.error.clone(),
        }
    }
}

/// Format call entries as a table
pub fn format_calls_table(entries: &[CallEntry]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Call", "Owner", "Agent", "Date", "Status"]);

    for entry in entries {
        let view = CallView::from(entry);
        let status_str = match view.status {
            CallStatus::Present => "Present".green().to_string(),
            CallStatus::Deleted => "Deleted".yellow().to_string(),
            CallStatus::Error => "Error".red().to_string(),
        };

        table.add_row(vec![
            Cell::new(&view.external_call_id),
            Cell::new(view.owner_user_id.as_deref().unwrap_or("-")),
            Cell::new(view.agent.as_deref().unwrap_or("-")),
            Cell::new(&view.date),
            Cell::new(status_str),
        ]);
    }

    table.to_string()
}

/// Format call entries as JSON
pub fn format_calls_json(entries: &[CallEntry]) -> String {
    let views: Vec<CallView> = entries.iter().map(CallView::from).collect();
    serde_json::to_string_pretty(&json!({
        "calls": views
    }))
    .unwrap()
}
