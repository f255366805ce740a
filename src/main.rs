//! # Main Entry Point
//!
//! Wires the layers together:
//! - Domain: Configuration and Types
//! - Infrastructure: Matrix, webappify RPC
//! - Application: Router, Sessions, Templates
//! - Interface: Command Handlers
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::events::room::{
        member::{MembershipState, StrippedRoomMemberEvent},
        message::{MessageType, SyncRoomMessageEvent},
    },
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;

use crate::application::router::CommandRouter;
use crate::application::session::SessionStore;
use crate::application::templates::{TemplateRegistry, spawn_refresh};
use crate::domain::config::AppConfig;
use crate::infrastructure::matrix::MatrixRoom;
use crate::infrastructure::rpc::RpcClient;
use crate::infrastructure::rpc::http::HttpTransport;
use crate::infrastructure::rpc::webappify::WebappifyApi;
use crate::strings::logs;

#[derive(Debug, Parser)]
#[command(name = "appbot", about = "Build web apps from a Matrix room")]
struct Args {
    /// Path to the YAML configuration
    #[arg(short, long, default_value = "data/config.yaml")]
    config: PathBuf,

    /// Directory for session.log
    #[arg(long, default_value = "data")]
    log_dir: PathBuf,
}

fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    if !log_dir.exists() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Clear previous session log
    let log_path = log_dir.join("session.log");
    if log_path.exists() {
        let _ = fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "session.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn,reqwest=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&args.config)?;

    // 2. Logging Setup
    let _guard = init_logging(&args.log_dir)?;
    tracing::info!("{}", logs::config_loaded(&args.config.display().to_string()));

    // 3. Backend + shared state
    let webappify = &config.services.webappify;
    tracing::info!("{}", logs::backend_endpoint(&webappify.endpoint_url()));
    let transport = HttpTransport::from_config(webappify)?;
    let rpc = RpcClient::new(Arc::new(transport)).with_timeout(webappify.timeout());
    let api = WebappifyApi::new(rpc);

    let templates = TemplateRegistry::new();
    let store = Arc::new(SessionStore::new(templates.clone()));

    let refresh = &config.bot.refresh;
    spawn_refresh(
        api.clone(),
        templates,
        Duration::from_secs(refresh.initial_delay),
        Duration::from_secs(refresh.interval),
    );

    // 4. Matrix Setup
    let matrix = &config.services.matrix;
    let client = Client::builder()
        .homeserver_url(&matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(&matrix.username, &matrix.password)
        .send()
        .await?;

    tracing::info!("{}", logs::logged_in(&matrix.username));

    if let Some(name) = &matrix.display_name {
        tracing::info!("{}", logs::setting_display_name(name));
        if let Err(e) = client.account().set_display_name(Some(name.as_str())).await {
            tracing::warn!("{}", logs::set_display_name_fail(&e.to_string()));
        }
    }

    // 5. Event Loop
    let start_time = std::time::SystemTime::now();
    let router = Arc::new(CommandRouter::new(config, store, api));

    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let router = router.clone();

        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };

            // Ignore events older than start_time
            let ts = ev.origin_server_ts();
            let event_time = std::time::UNIX_EPOCH + Duration::from_millis(ts.get().into());
            if event_time < start_time {
                return;
            }

            if let MessageType::Text(text_content) = &original_msg.content.msgtype {
                if original_msg.sender == room.own_user_id() {
                    return;
                }
                let body = &text_content.body;
                tracing::debug!("Received message from {}: {}", original_msg.sender, body);

                let chat = MatrixRoom::new(room);
                if let Err(e) = router
                    .route(&chat, body, original_msg.sender.as_str())
                    .await
                {
                    tracing::error!("{}", logs::route_failed(&e.to_string()));
                }
            }
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            tracing::info!("{}", logs::invite_received(room.room_id().as_str()));
            if let Err(e) = room.join().await {
                tracing::warn!(
                    "{}",
                    logs::invite_join_fail(room.room_id().as_str(), &e.to_string())
                );
            }
        }
    });

    // 6. Sync until the process is stopped
    tracing::info!("{}", logs::SYNC_LOOP_START);
    if let Err(e) = client.sync(SyncSettings::default()).await {
        tracing::error!("{}", logs::sync_loop_fail(&e.to_string()));
    }

    Ok(())
}
