//! # Help Command
//!
//! Handles `help`: lists the commands and the templates currently known.

use crate::application::templates::TemplateRegistry;
use crate::domain::traits::ChatProvider;
use anyhow::Result;

pub async fn handle_help(
    prefix: &str,
    templates: &TemplateRegistry,
    chat: &impl ChatProvider,
) -> Result<()> {
    let text = crate::strings::help::main(prefix, &templates.snapshot());
    chat.send_message(&text).await.map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}
