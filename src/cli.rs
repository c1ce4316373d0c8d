use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "tablechat",
    about = "Terminal chat for restaurant tables and the staff that serves them"
)]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Open the customer chat for a table
    Chat(ChatArgs),
    /// Watch and answer one customer conversation as restaurant staff
    Monitor(MonitorArgs),
    /// Turn the assistant on or off for one conversation
    ToggleAi(ToggleAiArgs),
    /// Forget the persisted client identifier
    ResetIdentity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct ChatArgs {
    /// Restaurant to talk to (falls back to [chat].restaurant_id)
    #[arg(long)]
    pub restaurant_id: Option<String>,

    /// Table the QR code belongs to (falls back to [chat].table_id)
    #[arg(long)]
    pub table_id: Option<String>,

    /// Use the in-process backend instead of the HTTP service
    #[arg(long)]
    pub offline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct MonitorArgs {
    /// Customer conversation to watch
    #[arg(long)]
    pub client_id: String,

    #[arg(long)]
    pub restaurant_id: Option<String>,

    #[arg(long)]
    pub offline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ToggleAiArgs {
    #[arg(long)]
    pub client_id: String,

    #[arg(long, action = clap::ArgAction::Set)]
    pub enabled: bool,

    #[arg(long)]
    pub restaurant_id: Option<String>,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Chat(ChatArgs::default()))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_to_chat_when_command_is_missing() {
        let cli = Cli::parse_from(["tablechat"]);

        assert_eq!(cli.command_or_default(), Command::Chat(ChatArgs::default()));
    }

    #[test]
    fn parses_chat_with_context_and_config() {
        let cli = Cli::parse_from([
            "tablechat",
            "chat",
            "--restaurant-id",
            "r1",
            "--table-id",
            "7",
            "--offline",
            "--config",
            "custom.toml",
        ]);

        assert_eq!(
            cli.command_or_default(),
            Command::Chat(ChatArgs {
                restaurant_id: Some("r1".to_owned()),
                table_id: Some("7".to_owned()),
                offline: true,
            })
        );
        assert_eq!(
            cli.config
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("custom.toml".to_owned())
        );
    }

    #[test]
    fn monitor_requires_client_id() {
        assert!(Cli::try_parse_from(["tablechat", "monitor"]).is_err());

        let cli = Cli::parse_from(["tablechat", "monitor", "--client-id", "c9"]);
        assert!(matches!(
            cli.command_or_default(),
            Command::Monitor(MonitorArgs { ref client_id, offline: false, .. }) if client_id == "c9"
        ));
    }

    #[test]
    fn toggle_ai_takes_explicit_flag_value() {
        let cli = Cli::parse_from([
            "tablechat",
            "toggle-ai",
            "--client-id",
            "c9",
            "--enabled",
            "false",
        ]);

        assert_eq!(
            cli.command_or_default(),
            Command::ToggleAi(ToggleAiArgs {
                client_id: "c9".to_owned(),
                enabled: false,
                restaurant_id: None,
            })
        );
    }

    #[test]
    fn parses_reset_identity() {
        let cli = Cli::parse_from(["tablechat", "reset-identity"]);

        assert_eq!(cli.command_or_default(), Command::ResetIdentity);
    }
}
