use std::{future::Future, sync::mpsc::Sender, sync::Arc, time::Duration};

use tokio::runtime::Handle;

use crate::{
    domain::{
        conversation::{ConversationContext, RefreshMode, ViewId},
        events::{AppEvent, BackendEvent},
    },
    usecases::{
        assistant_status::{check_assistant_status, is_backend_healthy, toggle_assistant},
        contracts::{ChatBackend, ChatCommands},
        load_conversation::load_conversation,
        send_message::{send_message, SendMessageCommand},
    },
};

const DISPATCH_RECEIVER_GONE: &str = "DISPATCH_RECEIVER_GONE";

/// Runs backend requests on the async runtime and posts completions to the UI thread.
#[derive(Clone)]
pub struct BackendDispatcher {
    runtime: Handle,
    backend: Arc<dyn ChatBackend>,
    event_tx: Sender<AppEvent>,
}

impl BackendDispatcher {
    pub fn new(runtime: Handle, backend: Arc<dyn ChatBackend>, event_tx: Sender<AppEvent>) -> Self {
        Self {
            runtime,
            backend,
            event_tx,
        }
    }

    fn spawn<F, Fut>(&self, work: F)
    where
        F: FnOnce(Arc<dyn ChatBackend>) -> Fut,
        Fut: Future<Output = BackendEvent> + Send + 'static,
    {
        let event_tx = self.event_tx.clone();
        let request = work(Arc::clone(&self.backend));

        self.runtime.spawn(async move {
            let event = request.await;
            if event_tx.send(AppEvent::Backend(event)).is_err() {
                tracing::debug!(
                    code = DISPATCH_RECEIVER_GONE,
                    "event receiver closed; dropping backend completion"
                );
            }
        });
    }
}

impl ChatCommands for BackendDispatcher {
    fn fetch_conversation(&self, view: ViewId, context: &ConversationContext, mode: RefreshMode) {
        let context = context.clone();
        self.spawn(move |backend| async move {
            let result = load_conversation(backend.as_ref(), &context)
                .await
                .map_err(|error| error.failure());
            BackendEvent::ConversationLoaded { view, mode, result }
        });
    }

    fn send_message(&self, view: ViewId, command: SendMessageCommand) {
        self.spawn(move |backend| async move {
            let result = send_message(backend.as_ref(), &command)
                .await
                .map_err(|error| error.failure());
            BackendEvent::MessageSent { view, result }
        });
    }

    fn check_assistant_status(&self, view: ViewId, context: &ConversationContext) {
        let context = context.clone();
        self.spawn(move |backend| async move {
            let result = check_assistant_status(backend.as_ref(), &context)
                .await
                .map_err(|error| error.failure());
            BackendEvent::AssistantStatusChecked { view, result }
        });
    }

    fn check_health(&self, view: ViewId) {
        self.spawn(move |backend| async move {
            let healthy = is_backend_healthy(backend.as_ref()).await;
            BackendEvent::HealthChecked { view, healthy }
        });
    }

    fn toggle_assistant(&self, view: ViewId, context: &ConversationContext, enabled: bool) {
        let context = context.clone();
        self.spawn(move |backend| async move {
            let result = toggle_assistant(backend.as_ref(), &context, enabled)
                .await
                .map_err(|error| error.failure());
            BackendEvent::AssistantToggled {
                view,
                enabled,
                result,
            }
        });
    }

    fn schedule_refresh(&self, view: ViewId, context: &ConversationContext, delay: Duration) {
        let context = context.clone();
        self.spawn(move |backend| async move {
            tokio::time::sleep(delay).await;
            let result = load_conversation(backend.as_ref(), &context)
                .await
                .map_err(|error| error.failure());
            BackendEvent::ConversationLoaded {
                view,
                mode: RefreshMode::Silent,
                result,
            }
        });
    }
}
