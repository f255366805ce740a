//! # Finish Command
//!
//! Handles `finish`: submits the room's draft to webappify and posts a link to the result.
//! The backend call runs on its own task so the router is free for other messages meanwhile.
//! On failure the draft is kept so the room can fix it and try again.

use crate::application::session::SessionStore;
use crate::domain::traits::ChatProvider;
use crate::domain::types::Session;
use crate::infrastructure::rpc::webappify::WebappifyApi;
use crate::strings::messages;
use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub async fn handle_finish<C>(
    store: &Arc<SessionStore>,
    api: &WebappifyApi,
    apps_url: &str,
    chat: &C,
    sender: &str,
) -> Result<JoinHandle<()>>
where
    C: ChatProvider + Clone + 'static,
{
    let session = store.touch(&chat.room_id(), sender);
    tracing::info!(
        "Submitting draft for {} ({} participant(s))",
        chat.room_id(),
        session.participants.len()
    );

    let store = store.clone();
    let api = api.clone();
    let chat = chat.clone();
    let apps_url = apps_url.to_string();

    Ok(tokio::spawn(async move {
        if let Err(e) = complete(&store, &api, &apps_url, &chat, session).await {
            tracing::error!("Failed to report build result: {}", e);
        }
    }))
}

async fn complete(
    store: &SessionStore,
    api: &WebappifyApi,
    apps_url: &str,
    chat: &impl ChatProvider,
    submitted: Session,
) -> Result<()> {
    let room = chat.room_id();
    match api.create(&submitted.draft).await {
        Ok(app) => {
            // People may have joined in while the backend was building.
            let participants = store
                .get(&room)
                .map(|session| session.participants)
                .unwrap_or(submitted.participants);
            store.end(&room);
            chat.send_message(&messages::app_ready(&app.url(apps_url), &participants))
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        Err(e) => {
            tracing::warn!("Build failed for {}: {}", room, e);
            chat.send_notification(&messages::api_failure(&e.to_string()))
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }
    Ok(())
}
