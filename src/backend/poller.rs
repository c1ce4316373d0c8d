use std::{sync::mpsc::Sender, time::Duration};

use tokio::{
    runtime::Handle,
    sync::watch,
    time::{interval_at, Instant, MissedTickBehavior},
};

use crate::domain::{
    conversation::ViewId,
    events::{AppEvent, BackendEvent, PollTarget},
};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(250);

const POLLER_STARTED: &str = "POLLER_STARTED";
const POLLER_STOPPED: &str = "POLLER_STOPPED";
const POLLER_STOP_SIGNAL_SENT: &str = "POLLER_STOP_SIGNAL_SENT";
const POLLER_RECEIVER_GONE: &str = "POLLER_RECEIVER_GONE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub conversation: Duration,
    /// `None` disables the assistant status timer.
    pub status: Option<Duration>,
}

impl PollIntervals {
    pub fn from_millis(conversation_ms: u64, status_ms: u64) -> Self {
        Self {
            conversation: Duration::from_millis(conversation_ms),
            status: (status_ms > 0).then(|| Duration::from_millis(status_ms)),
        }
    }
}

/// Everything needed to start timers once a view is mounted.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    runtime: Handle,
    intervals: PollIntervals,
    event_tx: Sender<AppEvent>,
}

impl PollSchedule {
    pub fn new(runtime: Handle, intervals: PollIntervals, event_tx: Sender<AppEvent>) -> Self {
        Self {
            runtime,
            intervals,
            event_tx,
        }
    }

    pub fn intervals(&self) -> PollIntervals {
        self.intervals
    }

    pub fn start(&self, view: ViewId) -> ConversationPoller {
        ConversationPoller::start(&self.runtime, view, self.intervals, self.event_tx.clone())
    }
}

/// Timer guard for one mounted view. Both timers stop when the guard is dropped.
#[derive(Debug)]
pub struct ConversationPoller {
    stop_tx: Option<watch::Sender<bool>>,
}

impl ConversationPoller {
    pub fn start(
        runtime: &Handle,
        view: ViewId,
        intervals: PollIntervals,
        event_tx: Sender<AppEvent>,
    ) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);

        runtime.spawn(run_timer(
            view,
            PollTarget::Conversation,
            clamp(intervals.conversation),
            event_tx.clone(),
            stop_rx.clone(),
        ));

        if let Some(status) = intervals.status {
            runtime.spawn(run_timer(
                view,
                PollTarget::AssistantStatus,
                clamp(status),
                event_tx,
                stop_rx,
            ));
        }

        tracing::info!(
            code = POLLER_STARTED,
            view = view.get(),
            conversation_ms = clamp(intervals.conversation).as_millis() as u64,
            status_enabled = intervals.status.is_some(),
            "conversation poller started"
        );

        Self {
            stop_tx: Some(stop_tx),
        }
    }
}

impl Drop for ConversationPoller {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
            tracing::info!(code = POLLER_STOP_SIGNAL_SENT, "conversation poller stop signal sent");
        }
    }
}

fn clamp(period: Duration) -> Duration {
    period.max(MIN_POLL_INTERVAL)
}

/// Ticks are fire-and-forget: a slow request never delays the next tick.
async fn run_timer(
    view: ViewId,
    target: PollTarget,
    period: Duration,
    event_tx: Sender<AppEvent>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    tracing::debug!(code = POLLER_STOPPED, ?target, "poll timer stopped");
                    return;
                }
            }
            _ = ticker.tick() => {
                let event = AppEvent::Backend(BackendEvent::PollDue { view, target });
                if event_tx.send(event).is_err() {
                    tracing::debug!(code = POLLER_RECEIVER_GONE, ?target, "event receiver closed");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, Receiver};

    use super::*;

    fn due(receiver: &Receiver<AppEvent>, wanted: PollTarget) -> usize {
        receiver
            .try_iter()
            .filter(|event| {
                matches!(
                    event,
                    AppEvent::Backend(BackendEvent::PollDue { target, .. }) if *target == wanted
                )
            })
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_at_fixed_interval_until_dropped() {
        let (tx, rx) = mpsc::channel();
        let poller = ConversationPoller::start(
            &Handle::current(),
            ViewId::first(),
            PollIntervals::from_millis(3_000, 0),
            tx,
        );

        tokio::time::sleep(Duration::from_millis(9_100)).await;
        assert_eq!(due(&rx, PollTarget::Conversation), 3);

        drop(poller);
        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(due(&rx, PollTarget::Conversation), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn status_timer_runs_independently() {
        let (tx, rx) = mpsc::channel();
        let _poller = ConversationPoller::start(
            &Handle::current(),
            ViewId::first(),
            PollIntervals::from_millis(3_000, 6_000),
            tx,
        );

        tokio::time::sleep(Duration::from_millis(12_100)).await;
        let events: Vec<AppEvent> = rx.try_iter().collect();

        let status = events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    AppEvent::Backend(BackendEvent::PollDue {
                        target: PollTarget::AssistantStatus,
                        ..
                    })
                )
            })
            .count();
        assert_eq!(status, 2);
        assert_eq!(events.len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn tiny_intervals_are_clamped() {
        let (tx, rx) = mpsc::channel();
        let _poller = ConversationPoller::start(
            &Handle::current(),
            ViewId::first(),
            PollIntervals::from_millis(10, 0),
            tx,
        );

        tokio::time::sleep(Duration::from_millis(1_010)).await;

        assert_eq!(due(&rx, PollTarget::Conversation), 4);
    }

    #[test]
    fn zero_status_interval_disables_status_timer() {
        assert_eq!(PollIntervals::from_millis(3_000, 0).status, None);
        assert_eq!(
            PollIntervals::from_millis(3_000, 6_000).status,
            Some(Duration::from_secs(6))
        );
    }
}
