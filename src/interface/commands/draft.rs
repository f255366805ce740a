//! # Draft Commands
//!
//! Handles `template`, the per-field setters (`name`, `description`, `color`, `layout`,
//! `style`, `code`, `load`) and `status`.
//! Every setter starts a draft for the room if none exists and records the sender as a participant.

use crate::application::session::{SessionError, SessionStore};
use crate::domain::traits::ChatProvider;
use crate::domain::types::Field;
use crate::strings::messages;
use anyhow::Result;

pub async fn handle_template(
    store: &SessionStore,
    chat: &impl ChatProvider,
    sender: &str,
    args: &str,
) -> Result<()> {
    let reply = match store.set_flavor(&chat.room_id(), sender, args) {
        Ok(template) => messages::template_chosen(&template),
        Err(_) => messages::NO_SUCH_TEMPLATE.to_string(),
    };
    chat.send_message(&reply).await.map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

pub async fn handle_field(
    store: &SessionStore,
    chat: &impl ChatProvider,
    sender: &str,
    name: &str,
    args: &str,
) -> Result<()> {
    let field = match name.parse::<Field>().map_err(SessionError::from) {
        Ok(field) => field,
        Err(e) => {
            tracing::warn!("Rejected field command: {}", e);
            chat.send_notification(&messages::invalid_field(name))
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            return Ok(());
        }
    };

    store.set_field(&chat.room_id(), sender, field, args);
    chat.send_message(&messages::field_updated(field))
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

pub async fn handle_status(store: &SessionStore, chat: &impl ChatProvider) -> Result<()> {
    let reply = match store.get(&chat.room_id()) {
        Some(session) => messages::draft_status(&session),
        None => messages::NOTHING_TO_SHOW.to_string(),
    };
    chat.send_message(&reply).await.map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}
