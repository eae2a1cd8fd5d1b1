//! Countdown controller background task
//!
//! The controller owns the authoritative [`TimerState`]. Views talk to it only
//! through [`ControllerHandle`]: intents go in over an mpsc channel, events come
//! back over a broadcast channel, and the persisted record is rewritten after
//! every state change.

use std::{future::pending, pin::Pin, sync::Arc, time::Duration};
use tokio::{
    sync::{broadcast, mpsc},
    time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep},
};
use tracing::{debug, info, warn};

use crate::{
    error::ControllerError,
    services::{
        load_or_default, save_best_effort, Notifier, Storage, NOTIFICATION_MESSAGE,
        NOTIFICATION_TITLE,
    },
    state::{clamp_time_left, Event, Intent, TimerState, TOTAL_DURATION},
};

/// Name of the fallback alarm that forces cycle completion
pub const ALARM_NAME: &str = "gtdTimer";

/// Seconds the fallback alarm waits past the expected end of the countdown
pub const ALARM_GRACE_SECS: u64 = 2;

const TICK_PERIOD: Duration = Duration::from_secs(1);
const EVENT_CAPACITY: usize = 64;

/// Cloneable entry point to a running controller
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    intents: mpsc::UnboundedSender<Intent>,
    alarms: mpsc::UnboundedSender<String>,
    events: broadcast::Sender<Event>,
}

impl ControllerHandle {
    /// Send an intent; there is no reply
    pub fn send(&self, intent: Intent) -> Result<(), ControllerError> {
        self.intents.send(intent).map_err(|_| ControllerError::Closed)
    }

    /// Deliver a named alarm to the controller
    pub fn fire_alarm(&self, name: &str) -> Result<(), ControllerError> {
        self.alarms
            .send(name.to_string())
            .map_err(|_| ControllerError::Closed)
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}

/// Inbound side of a controller, consumed by [`TimerController::run`]
#[derive(Debug)]
pub struct ControllerInbox {
    intents: mpsc::UnboundedReceiver<Intent>,
    alarms: mpsc::UnboundedReceiver<String>,
}

impl ControllerInbox {
    #[cfg(test)]
    pub(crate) fn try_recv_intent(&mut self) -> Result<Intent, mpsc::error::TryRecvError> {
        self.intents.try_recv()
    }
}

/// Create the channels connecting views to a controller
pub fn controller_channel() -> (ControllerHandle, ControllerInbox, broadcast::Sender<Event>) {
    let (intent_tx, intent_rx) = mpsc::unbounded_channel();
    let (alarm_tx, alarm_rx) = mpsc::unbounded_channel();
    let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

    let handle = ControllerHandle {
        intents: intent_tx,
        alarms: alarm_tx,
        events: event_tx.clone(),
    };
    let inbox = ControllerInbox {
        intents: intent_rx,
        alarms: alarm_rx,
    };
    (handle, inbox, event_tx)
}

/// Owner of the countdown, its tick loop and its fallback alarm
pub struct TimerController {
    state: TimerState,
    ticker: Option<Interval>,
    alarm: Option<Pin<Box<Sleep>>>,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    events: broadcast::Sender<Event>,
}

impl TimerController {
    /// Restore the persisted state and resume an interrupted countdown.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
        events: broadcast::Sender<Event>,
    ) -> Self {
        let mut state = load_or_default(storage.as_ref());
        let resume = state.is_resumable();
        let stale_running = state.is_running && !resume;
        if stale_running {
            debug!("Persisted state was running at zero, marking stopped");
            state.is_running = false;
        }

        let mut controller = Self {
            state,
            ticker: None,
            alarm: None,
            storage,
            notifier,
            events,
        };

        info!(
            "Timer controller restored: time_left={}s running={} cycles={}",
            state.time_left, state.is_running, state.completed_cycles
        );
        if stale_running {
            controller.persist();
        }
        if resume {
            info!("Resuming countdown from {}s", state.time_left);
            controller.start_loop();
        }
        controller
    }

    /// Current authoritative state
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Whether a tick loop is currently scheduled
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn handle_intent(&mut self, intent: Intent) {
        debug!("Controller received intent: {:?}", intent);
        match intent {
            Intent::Start { time_left } => self.request_start(time_left),
            Intent::Stop => self.request_stop(),
            Intent::Reset => self.request_reset(),
        }
    }

    /// Seed the countdown and start the loop unless one is already active
    pub fn request_start(&mut self, time_left: i64) {
        self.state.time_left = clamp_time_left(time_left);
        if self.ticker.is_some() {
            debug!("Tick loop already active, re-seeded to {}s", self.state.time_left);
            self.arm_alarm();
            return;
        }
        if self.state.time_left > 0 {
            info!("Starting countdown from {}s", self.state.time_left);
            self.start_loop();
            self.persist();
        }
    }

    pub fn request_stop(&mut self) {
        if !self.state.is_running {
            return;
        }
        info!("Stopping countdown at {}s", self.state.time_left);
        self.state.is_running = false;
        self.clear_loop();
        self.persist();
        self.emit(Event::Stopped {
            time_left: self.state.time_left,
        });
    }

    pub fn request_reset(&mut self) {
        info!("Resetting timer");
        self.clear_loop();
        self.state = TimerState::new();
        self.persist();
        self.emit(Event::Reset);
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) {
        self.state.time_left = self.state.time_left.saturating_sub(1);
        debug!("Timer tick, time_left={}", self.state.time_left);
        self.persist();
        self.emit(Event::Tick {
            time_left: self.state.time_left,
        });

        if self.state.time_left == 0 {
            self.complete();
        }
    }

    /// Finish the current cycle and arm the next one, stopped
    pub fn complete(&mut self) {
        self.state.completed_cycles += 1;
        self.state.is_running = false;
        self.clear_loop();
        info!("Cycle complete, completed_cycles={}", self.state.completed_cycles);

        self.notifier.notify(NOTIFICATION_TITLE, NOTIFICATION_MESSAGE);

        self.state.time_left = TOTAL_DURATION;
        self.persist();
        self.emit(Event::Complete {
            completed_cycles: self.state.completed_cycles,
        });
    }

    /// Handle a named alarm; only the timer's own alarm completes the cycle
    pub fn on_alarm(&mut self, name: &str) {
        if name != ALARM_NAME {
            debug!("Ignoring unrelated alarm: {}", name);
            return;
        }
        info!("Fallback alarm fired, completing cycle");
        self.complete();
    }

    /// Process intents, alarms and ticks until every handle is dropped
    pub async fn run(mut self, inbox: ControllerInbox) {
        info!("Starting timer controller task");
        let ControllerInbox {
            mut intents,
            mut alarms,
        } = inbox;

        loop {
            tokio::select! {
                intent = intents.recv() => match intent {
                    Some(intent) => self.handle_intent(intent),
                    None => break,
                },
                Some(name) = alarms.recv() => self.on_alarm(&name),
                _ = next_tick(&mut self.ticker) => self.tick(),
                _ = alarm_elapsed(&mut self.alarm) => {
                    warn!("Tick loop fell behind, fallback alarm elapsed");
                    self.on_alarm(ALARM_NAME);
                }
            }
        }

        info!("All controller handles dropped, timer controller exiting");
    }

    fn start_loop(&mut self) {
        self.state.is_running = true;
        let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);
        self.arm_alarm();
    }

    fn arm_alarm(&mut self) {
        let secs = u64::from(self.state.time_left) + ALARM_GRACE_SECS;
        self.alarm = Some(Box::pin(sleep(Duration::from_secs(secs))));
    }

    fn clear_loop(&mut self) {
        self.ticker = None;
        self.alarm = None;
    }

    fn persist(&self) {
        save_best_effort(self.storage.as_ref(), &self.state);
    }

    fn emit(&self, event: Event) {
        // No attached view is the normal case while the popup is closed.
        if self.events.send(event).is_err() {
            debug!("No view attached, event dropped");
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending().await,
    }
}

async fn alarm_elapsed(alarm: &mut Option<Pin<Box<Sleep>>>) {
    match alarm {
        Some(alarm) => alarm.as_mut().await,
        None => pending().await,
    }
}

/// Build a controller from storage and spawn it, returning its handle
pub fn spawn_controller(
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
) -> ControllerHandle {
    let (handle, inbox, events) = controller_channel();
    let controller = TimerController::new(storage, notifier, events);
    tokio::spawn(controller.run(inbox));
    handle
}
