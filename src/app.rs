use anyhow::{anyhow, Result};

use crate::{
    cli::{ChatArgs, Cli, Command},
    domain::conversation::{ConversationContext, MissingContext, Perspective},
    infra::{
        config::{AppConfig, ACCESS_TOKEN_ENV},
        contracts::IdentityStore,
        error::AppError,
        identity::FileIdentityStore,
        storage_layout::StorageLayout,
    },
    ui,
    usecases::{assistant_status::toggle_assistant, bootstrap, context::AppContext},
};

const CONFIGURATION_INCOMPLETE: &str = "CONFIGURATION_INCOMPLETE";

const CHAT_USAGE: &str = "tablechat chat --restaurant-id <ID> --table-id <TABLE>";
const MONITOR_USAGE: &str = "tablechat monitor --client-id <CLIENT> --restaurant-id <ID>";
const TOGGLE_USAGE: &str =
    "tablechat toggle-ai --client-id <CLIENT> --enabled <true|false> --restaurant-id <ID>";

pub fn run(cli: Cli) -> Result<()> {
    match cli.command_or_default() {
        Command::Chat(args) => {
            let context = bootstrap::bootstrap(cli.config.as_deref())?;
            let client_id = bootstrap::identity_store(&context.layout, None).load_or_create()?;
            let conversation = chat_context(&args, &context.config, &client_id)
                .map_err(|missing| report_missing_context(missing, CHAT_USAGE))?;

            run_shell(&context, conversation, Perspective::Customer, args.offline)?;
        }
        Command::Monitor(args) => {
            let context = bootstrap::bootstrap(cli.config.as_deref())?;
            let client_id = bootstrap::identity_store(&context.layout, Some(&args.client_id))
                .load_or_create()?;
            let conversation =
                staff_context(&client_id, args.restaurant_id.as_deref(), &context.config)
                    .map_err(|missing| report_missing_context(missing, MONITOR_USAGE))?;

            run_shell(&context, conversation, Perspective::Staff, args.offline)?;
        }
        Command::ToggleAi(args) => {
            let context = bootstrap::bootstrap(cli.config.as_deref())?;
            let conversation =
                staff_context(&args.client_id, args.restaurant_id.as_deref(), &context.config)
                    .map_err(|missing| report_missing_context(missing, TOGGLE_USAGE))?;

            run_toggle(&context, &conversation, args.enabled)?;
            println!(
                "AI assistant {} for client {} at restaurant {}.",
                if args.enabled { "enabled" } else { "disabled" },
                conversation.client_id(),
                conversation.restaurant_id()
            );
        }
        Command::ResetIdentity => {
            let layout = StorageLayout::resolve()?;
            let removed = FileIdentityStore::new(layout.client_id_file()).clear()?;
            println!("{}", reset_identity_message(removed));
        }
    }

    Ok(())
}

fn chat_context(
    args: &ChatArgs,
    config: &AppConfig,
    client_id: &str,
) -> Result<ConversationContext, MissingContext> {
    ConversationContext::for_perspective(
        Perspective::Customer,
        args.restaurant_id
            .as_deref()
            .or(config.chat.restaurant_id.as_deref()),
        Some(client_id),
        args.table_id.as_deref().or(config.chat.table_id.as_deref()),
    )
}

/// Staff commands name the conversation explicitly and never need a table.
fn staff_context(
    client_id: &str,
    restaurant_id: Option<&str>,
    config: &AppConfig,
) -> Result<ConversationContext, MissingContext> {
    ConversationContext::for_perspective(
        Perspective::Staff,
        restaurant_id.or(config.chat.restaurant_id.as_deref()),
        Some(client_id),
        None,
    )
}

fn run_shell(
    context: &AppContext,
    conversation: ConversationContext,
    perspective: Perspective,
    offline: bool,
) -> Result<()> {
    let runtime = build_runtime()?;
    let backend = bootstrap::build_backend(&context.config.backend, offline)?;

    let mut shell = bootstrap::compose_shell(
        runtime.handle(),
        &context.config,
        backend,
        conversation,
        perspective,
    );
    let mut event_source = ui::CrosstermEventSource::new(shell.backend_events);

    ui::shell::start(
        context,
        &shell.polls,
        &mut event_source,
        &mut shell.orchestrator,
    )
}

fn run_toggle(
    context: &AppContext,
    conversation: &ConversationContext,
    enabled: bool,
) -> Result<()> {
    let runtime = build_runtime()?;
    let backend = bootstrap::build_backend(&context.config.backend, false)?;

    runtime
        .block_on(toggle_assistant(backend.as_ref(), conversation, enabled))
        .map_err(|error| {
            anyhow!(
                "could not update the assistant flag ({:?}); check the backend URL and {}",
                error.failure(),
                ACCESS_TOKEN_ENV
            )
        })
}

fn build_runtime() -> Result<tokio::runtime::Runtime, AppError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(AppError::RuntimeStart)
}

fn report_missing_context(missing: MissingContext, usage: &str) -> anyhow::Error {
    tracing::error!(
        code = CONFIGURATION_INCOMPLETE,
        field = missing.field,
        "conversation context is incomplete"
    );

    for line in missing_context_lines(&missing, usage) {
        eprintln!("{line}");
    }

    AppError::from(missing).into()
}

fn missing_context_lines(missing: &MissingContext, usage: &str) -> [String; 2] {
    [
        format!("Configuration error: {} is required.", missing.field),
        format!("Expected: {usage} (or set it under [chat] in config.toml)"),
    ]
}

fn reset_identity_message(removed: bool) -> &'static str {
    if removed {
        "Client identity removed. A new one will be created on the next chat."
    } else {
        "No client identity was stored."
    }
}
