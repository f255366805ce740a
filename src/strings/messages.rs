//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.

use crate::domain::types::{Field, Session};

pub const NO_SUCH_COMMAND: &str = "No such command.";
pub const NO_SUCH_TEMPLATE: &str = "No such template.";
pub const NOTHING_TO_CANCEL: &str = "Nothing to cancel.";
pub const APP_CANCELED: &str = "App canceled.";
pub const NOTHING_TO_SHOW: &str = "Nothing to show.";

pub fn template_chosen(template: &str) -> String {
    format!("Template chosen: `{template}`.")
}

pub fn field_updated(field: Field) -> String {
    format!("{} updated.", field.label())
}

pub fn invalid_field(field: &str) -> String {
    format!("`{field}` is not an app field.")
}

/// Backend or transport failure, shown as-is.
pub fn api_failure(err: &str) -> String {
    format!("{err}.")
}

pub fn app_ready(url: &str, participants: &[String]) -> String {
    format!(
        "**AppBot Application**\nYour application is ready!\n\n[{url}]({url})\n\n**Requested by**: {}",
        participants.join(", ")
    )
}

pub fn draft_status(session: &Session) -> String {
    let config = &session.draft.configuration;
    let mut lines = vec![
        "**AppBot Draft**".to_string(),
        format!(
            "**Template**: {}",
            session.draft.flavor.as_deref().unwrap_or("(none)")
        ),
    ];
    for field in Field::ALL {
        let value = config.get(field);
        if value.is_empty() {
            lines.push(format!("**{}**: _(empty)_", field.label()));
        } else if value.contains('\n') {
            lines.push(format!("**{}**:\n```\n{}\n```", field.label(), value));
        } else {
            lines.push(format!("**{}**: `{}`", field.label(), value));
        }
    }
    lines.push(format!("**Participants**: {}", session.participants.join(", ")));
    lines.join("\n")
}
