use std::{
    path::Path,
    sync::{
        mpsc::{self, Receiver},
        Arc,
    },
    time::Duration,
};

use tokio::runtime::Handle;

use crate::{
    backend::{
        dispatcher::BackendDispatcher,
        http::HttpChatBackend,
        memory::InMemoryChatBackend,
        poller::{PollIntervals, PollSchedule},
    },
    domain::{
        conversation::{ConversationContext, Perspective},
        events::AppEvent,
    },
    infra::{
        self,
        config::{AppConfig, BackendConfig},
        contracts::IdentityStore,
        error::AppError,
        identity::FileIdentityStore,
        storage_layout::StorageLayout,
        stubs::InMemoryIdentityStore,
    },
    usecases::{
        chat_session::{ChatSession, SessionSettings},
        context::AppContext,
        contracts::ChatBackend,
        shell::DefaultShellOrchestrator,
    },
};

/// Loads configuration, prepares the storage directories and starts file logging.
pub fn bootstrap(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let mut context = build_context(config_path)?;
    context.layout.ensure_dirs()?;

    let guard = infra::logging::init(&context.config.logging, &context.layout.logs_dir)?;
    context.attach_log_guard(guard);

    Ok(context)
}

fn build_context(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let config = infra::config::load(config_path)?;
    let layout = StorageLayout::resolve()?;

    Ok(AppContext::new(config, layout))
}

pub fn build_backend(
    config: &BackendConfig,
    offline: bool,
) -> Result<Arc<dyn ChatBackend>, AppError> {
    if offline {
        tracing::info!(code = "BACKEND_OFFLINE", "using the in-memory backend");
        return Ok(Arc::new(InMemoryChatBackend::default()));
    }

    Ok(Arc::new(HttpChatBackend::new(config)?))
}

/// Staff panels name the customer explicitly; the customer widget keeps its own persisted id.
pub fn identity_store(layout: &StorageLayout, client_id: Option<&str>) -> Box<dyn IdentityStore> {
    match client_id {
        Some(id) => Box::new(InMemoryIdentityStore::with_id(id)),
        None => Box::new(FileIdentityStore::new(layout.client_id_file())),
    }
}

pub fn session_settings(config: &AppConfig, perspective: Perspective) -> SessionSettings {
    SessionSettings {
        welcome_text: perspective
            .shows_greeting()
            .then(|| config.chat.welcome_text.clone()),
        follow_up_refresh: Duration::from_millis(config.polling.follow_up_refresh_ms),
    }
}

pub fn poll_intervals(config: &AppConfig, perspective: Perspective) -> PollIntervals {
    let conversation_ms = match perspective {
        Perspective::Customer => config.polling.conversation_interval_ms,
        Perspective::Staff => config.polling.monitor_interval_ms,
    };

    PollIntervals::from_millis(conversation_ms, config.polling.status_interval_ms)
}

pub struct ShellComposition {
    pub orchestrator: DefaultShellOrchestrator<BackendDispatcher>,
    /// Completions posted by the dispatcher and the poll timers.
    pub backend_events: Receiver<AppEvent>,
    pub polls: PollSchedule,
}

pub fn compose_shell(
    runtime: &Handle,
    config: &AppConfig,
    backend: Arc<dyn ChatBackend>,
    conversation: ConversationContext,
    perspective: Perspective,
) -> ShellComposition {
    let (event_tx, backend_events) = mpsc::channel();

    let dispatcher = BackendDispatcher::new(runtime.clone(), backend, event_tx.clone());
    let session = ChatSession::new(
        dispatcher,
        conversation,
        perspective,
        session_settings(config, perspective),
    );

    ShellComposition {
        orchestrator: DefaultShellOrchestrator::new(session),
        backend_events,
        polls: PollSchedule::new(
            runtime.clone(),
            poll_intervals(config, perspective),
            event_tx,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::events::BackendEvent, test_support::env_lock,
        usecases::contracts::ShellOrchestrator,
    };

    #[test]
    fn builds_context_with_default_config_when_file_is_missing() {
        let _guard = env_lock();

        let context = build_context(Some(Path::new("./missing-config.toml")))
            .expect("context should build from defaults");

        assert_eq!(context.config, AppConfig::default());
    }

    #[test]
    fn staff_polls_on_the_monitor_interval() {
        let config = AppConfig::default();

        let customer = poll_intervals(&config, Perspective::Customer);
        let staff = poll_intervals(&config, Perspective::Staff);

        assert_eq!(customer.conversation, Duration::from_secs(3));
        assert_eq!(staff.conversation, Duration::from_secs(5));
        assert_eq!(staff.status, Some(Duration::from_secs(6)));
    }

    #[test]
    fn only_customers_get_a_welcome_line() {
        let config = AppConfig::default();

        assert!(session_settings(&config, Perspective::Customer)
            .welcome_text
            .is_some());
        assert_eq!(
            session_settings(&config, Perspective::Staff).welcome_text,
            None
        );
    }

    #[test]
    fn explicit_client_id_bypasses_the_identity_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let layout = StorageLayout::under(dir.path().to_path_buf());

        let store = identity_store(&layout, Some("c-42"));

        assert_eq!(store.load_or_create().expect("identity"), "c-42");
        assert!(!layout.client_id_file().exists());
    }

    #[tokio::test]
    async fn composed_shell_reports_backend_completions() {
        let config = AppConfig::default();
        let backend = build_backend(&config.backend, true).expect("offline backend");
        let conversation =
            ConversationContext::new(Some("r1"), Some("c1"), Some("3")).expect("valid context");

        let mut shell = compose_shell(
            &Handle::current(),
            &config,
            backend,
            conversation,
            Perspective::Customer,
        );
        let view = shell.orchestrator.start();

        let mut health = None;
        for _ in 0..200 {
            if let Ok(AppEvent::Backend(BackendEvent::HealthChecked { view, healthy })) =
                shell.backend_events.try_recv()
            {
                health = Some((view, healthy));
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(health, Some((view, true)));
    }
}
