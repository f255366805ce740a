//! # Command Router
//!
//! Routes incoming messages to the appropriate command handler (in `interface/commands`).
//! A command is a message starting with the configured prefix (`::` by default); the first
//! space-delimited word names the command and everything after that space is its argument, verbatim.

use anyhow::Result;
use std::sync::Arc;

use crate::application::session::SessionStore;
use crate::domain::config::AppConfig;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::rpc::webappify::WebappifyApi;
use crate::interface::commands;

/// Splits `message` into `(command, argument)` if it carries `prefix`.
pub fn parse_command<'a>(prefix: &str, message: &'a str) -> Option<(&'a str, &'a str)> {
    let content = message.strip_prefix(prefix)?;
    Some(content.split_once(' ').unwrap_or((content, "")))
}

pub struct CommandRouter {
    config: AppConfig,
    store: Arc<SessionStore>,
    api: WebappifyApi,
}

impl CommandRouter {
    pub fn new(config: AppConfig, store: Arc<SessionStore>, api: WebappifyApi) -> Self {
        Self { config, store, api }
    }

    pub async fn route<C>(&self, chat: &C, message: &str, sender: &str) -> Result<()>
    where
        C: ChatProvider + Clone + Send + Sync + 'static,
    {
        let Some((cmd, args)) = parse_command(&self.config.bot.prefix, message) else {
            return Ok(());
        };

        tracing::info!(
            "Router dispatching cmd='{}' args='{}' sender='{}'",
            cmd,
            args,
            sender
        );

        match cmd {
            "help" => {
                commands::help::handle_help(&self.config.bot.prefix, self.store.templates(), chat)
                    .await?
            }
            "template" => commands::draft::handle_template(&self.store, chat, sender, args).await?,
            "name" | "description" | "color" | "layout" | "style" | "code" | "load" => {
                commands::draft::handle_field(&self.store, chat, sender, cmd, args).await?
            }
            "status" => commands::draft::handle_status(&self.store, chat).await?,
            "finish" => {
                // Result is reported by the spawned task.
                commands::finish::handle_finish(
                    &self.store,
                    &self.api,
                    &self.config.services.webappify.apps_url(),
                    chat,
                    sender,
                )
                .await?;
            }
            "cancel" => commands::cancel::handle_cancel(&self.store, chat).await?,
            _ => {
                chat.send_message(crate::strings::messages::NO_SUCH_COMMAND)
                    .await
                    .map_err(|e| anyhow::anyhow!(e))?;
            }
        }
        Ok(())
    }
}
