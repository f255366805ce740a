//! # Cancel Command
//!
//! Handles `cancel`: drops the room's draft without building it.

use crate::application::session::SessionStore;
use crate::domain::traits::ChatProvider;
use crate::strings::messages;
use anyhow::Result;

pub async fn handle_cancel(store: &SessionStore, chat: &impl ChatProvider) -> Result<()> {
    let reply = match store.cancel(&chat.room_id()) {
        Ok(()) => messages::APP_CANCELED,
        Err(_) => messages::NOTHING_TO_CANCEL,
    };
    chat.send_message(reply).await.map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}
