use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::runtime::Handle;

use shield_chat::config::{self, AppConfig};
use shield_chat::network::{HttpTransport, SyncEngine};
use shield_chat::ui::app::WINDOW_TITLE;
use shield_chat::ui::{ChatApp, ChatController, ViewSettings};

#[derive(Parser)]
#[command(
    name = "shield_chat",
    version,
    about = "Chat window that polls a message endpoint"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Message endpoint used for both polling and sending
    #[arg(long, env = "CHAT_ENDPOINT", value_name = "URL")]
    endpoint: Option<String>,
    /// Milliseconds between polls of the message endpoint
    #[arg(long, value_name = "MS")]
    poll_interval_ms: Option<u64>,
    /// Display name used as the sender of outgoing messages
    #[arg(long, value_name = "NAME")]
    user: Option<String>,
    /// Show sent messages before the server returns them
    #[arg(long)]
    local_echo: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint_base_url = endpoint.clone();
        }
        if let Some(poll_interval_ms) = self.poll_interval_ms {
            config.poll_interval_ms = poll_interval_ms;
        }
        if let Some(user) = &self.user {
            config.current_user = user.clone();
        }
        if self.local_echo {
            config.local_echo = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    cli.apply(&mut app_config);

    let transport = HttpTransport::new(&app_config.endpoint_base_url, app_config.request_timeout())?;
    log::info!(
        "Chatting as {} via {}",
        app_config.current_user,
        transport.endpoint()
    );

    let engine = Arc::new(SyncEngine::new(
        Arc::new(transport),
        app_config.sync_config(),
    ));
    engine.start();

    run_ui(Arc::clone(&engine), app_config.view_settings())?;

    engine.stop();
    Ok(())
}

fn run_ui(engine: Arc<SyncEngine>, settings: ViewSettings) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([520.0, 760.0]),
        ..Default::default()
    };
    let runtime = Handle::current();

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            let controller = ChatController::new(Arc::clone(&engine), settings, runtime);
            Ok(Box::new(ChatApp::new(cc, engine, controller)))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_config_file() {
        let cli = Cli::parse_from([
            "shield_chat",
            "--endpoint",
            "http://chat.local/message",
            "--poll-interval-ms",
            "500",
            "--user",
            "Ada",
            "--local-echo",
        ]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.endpoint_base_url, "http://chat.local/message");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.current_user, "Ada");
        assert!(config.local_echo);
    }

    #[test]
    fn every_flag_has_help_text() {
        use clap::CommandFactory;

        let command = Cli::command();
        let undocumented: Vec<_> = command
            .get_arguments()
            .filter(|arg| arg.get_help().is_none())
            .map(|arg| arg.get_id().to_string())
            .collect();
        assert!(undocumented.is_empty(), "undocumented flags: {undocumented:?}");
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let cli = Cli::parse_from(["shield_chat", "--config", "elsewhere.json"]);
        let mut config = AppConfig {
            current_user: "Grace".into(),
            ..AppConfig::default()
        };
        cli.apply(&mut config);

        assert_eq!(cli.config, "elsewhere.json");
        assert_eq!(config.current_user, "Grace");
        assert!(!config.local_echo);
    }
}
