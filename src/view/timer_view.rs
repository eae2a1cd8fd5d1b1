//! Transient timer view
//!
//! A view keeps a cached copy of the timer state, refreshed only from the
//! persisted record and from controller events. It never ticks on its own.

use std::sync::Arc;
use tracing::debug;

use super::render::Display;
use crate::{
    services::{load_or_default, save_best_effort, Storage},
    state::{Event, Intent, TimerState, TOTAL_DURATION},
    tasks::ControllerHandle,
};

/// Drawing target for a view
pub trait Surface {
    /// Replace whatever is shown with this display
    fn show(&mut self, display: &Display);

    /// Toggle the running affordance (pause vs. play control)
    fn set_running(&mut self, running: bool);
}

pub struct TimerView<S: Surface> {
    state: TimerState,
    controller: ControllerHandle,
    storage: Arc<dyn Storage>,
    surface: S,
}

impl<S: Surface> TimerView<S> {
    /// Attach a view: read the persisted state and draw it
    pub fn attach(controller: ControllerHandle, storage: Arc<dyn Storage>, surface: S) -> Self {
        let state = load_or_default(storage.as_ref());
        let mut view = Self {
            state,
            controller,
            storage,
            surface,
        };
        view.redraw();
        view.surface.set_running(view.state.is_running);
        view
    }

    /// The view's cached copy of the timer state
    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Start or stop, updating the local state optimistically
    pub fn toggle(&mut self) {
        if self.state.is_running {
            self.stop();
        } else {
            self.send(Intent::Start {
                time_left: i64::from(self.state.time_left),
            });
            self.set_running(true);
        }
    }

    /// Stop and return to a full, zero-cycle timer
    pub fn reset(&mut self) {
        self.stop();
        self.state.time_left = TOTAL_DURATION;
        self.state.completed_cycles = 0;
        self.redraw();
        save_best_effort(self.storage.as_ref(), &self.state);
        self.send(Intent::Reset);
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Tick { time_left } => {
                self.state.time_left = time_left;
            }
            Event::Complete { completed_cycles } => {
                self.state.completed_cycles = completed_cycles;
                self.state.time_left = TOTAL_DURATION;
                self.set_running(false);
            }
            Event::Stopped { time_left } => {
                self.set_running(false);
                self.state.time_left = time_left;
            }
            Event::Reset => {
                self.state = TimerState::new();
                self.set_running(false);
            }
        }
        self.redraw();
    }

    /// Re-read the persisted state after events may have been missed
    pub fn reload(&mut self) {
        self.state = load_or_default(self.storage.as_ref());
        self.surface.set_running(self.state.is_running);
        self.redraw();
    }

    fn stop(&mut self) {
        if self.state.is_running {
            self.set_running(false);
            self.send(Intent::Stop);
        }
    }

    fn set_running(&mut self, running: bool) {
        self.state.is_running = running;
        self.surface.set_running(running);
    }

    fn redraw(&mut self) {
        let display = Display::render(
            self.state.time_left,
            TOTAL_DURATION,
            self.state.completed_cycles,
        );
        self.surface.show(&display);
    }

    fn send(&self, intent: Intent) {
        if let Err(e) = self.controller.send(intent) {
            debug!("Intent not delivered: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::MemoryStorage,
        state::StoredState,
        tasks::{controller_channel, ControllerInbox},
    };

    #[derive(Default)]
    struct RecordingSurface {
        shown: Vec<Display>,
        running: Option<bool>,
    }

    impl Surface for RecordingSurface {
        fn show(&mut self, display: &Display) {
            self.shown.push(display.clone());
        }

        fn set_running(&mut self, running: bool) {
            self.running = Some(running);
        }
    }

    impl RecordingSurface {
        fn last_readout(&self) -> &str {
            &self.shown.last().expect("nothing shown").readout
        }
    }

    fn attach(
        record: StoredState,
    ) -> (TimerView<RecordingSurface>, ControllerInbox, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::with_record(record));
        let (handle, inbox, _events) = controller_channel();
        let view = TimerView::attach(handle, storage.clone(), RecordingSurface::default());
        (view, inbox, storage)
    }

    fn sent(inbox: &mut ControllerInbox) -> Vec<Intent> {
        let mut out = Vec::new();
        while let Ok(intent) = inbox.try_recv_intent() {
            out.push(intent);
        }
        out
    }

    #[test]
    fn attach_renders_persisted_state() {
        let (view, _inbox, _storage) = attach(StoredState {
            time_left: Some(61),
            is_running: Some(true),
            completed_cycles: Some(1),
        });
        assert_eq!(view.surface().last_readout(), "1:01");
        assert_eq!(view.surface().running, Some(true));
        assert_eq!(
            view.surface().shown[0].cycle_badge.as_deref(),
            Some("🔄 1")
        );
    }

    #[test]
    fn toggle_sends_start_then_stop() {
        let (mut view, mut inbox, _storage) = attach(StoredState {
            time_left: Some(44),
            ..StoredState::default()
        });

        view.toggle();
        assert!(view.state().is_running);
        assert_eq!(view.surface().running, Some(true));

        view.toggle();
        assert!(!view.state().is_running);
        assert_eq!(view.surface().running, Some(false));

        assert_eq!(
            sent(&mut inbox),
            vec![Intent::Start { time_left: 44 }, Intent::Stop]
        );
    }

    #[test]
    fn events_update_cached_state() {
        let (mut view, _inbox, _storage) = attach(StoredState::default());
        view.toggle();

        view.handle_event(Event::Tick { time_left: 100 });
        assert_eq!(view.surface().last_readout(), "1:40");

        view.handle_event(Event::Stopped { time_left: 99 });
        assert!(!view.state().is_running);
        assert_eq!(view.surface().last_readout(), "1:39");

        view.handle_event(Event::Complete { completed_cycles: 4 });
        assert_eq!(view.state().time_left, TOTAL_DURATION);
        assert_eq!(view.state().completed_cycles, 4);
        assert_eq!(
            view.surface().shown.last().unwrap().cycle_badge.as_deref(),
            Some("🔄 4")
        );
    }

    #[test]
    fn toggle_after_completion_starts_next_cycle() {
        let (mut view, mut inbox, _storage) = attach(StoredState::default());
        view.toggle();
        view.handle_event(Event::Complete { completed_cycles: 1 });
        view.toggle();
        assert_eq!(
            sent(&mut inbox),
            vec![
                Intent::Start { time_left: 120 },
                Intent::Start { time_left: 120 },
            ]
        );
    }

    #[test]
    fn reset_always_yields_defaults() {
        let (mut view, mut inbox, storage) = attach(StoredState {
            time_left: Some(12),
            is_running: Some(true),
            completed_cycles: Some(5),
        });

        view.reset();

        assert_eq!(view.state(), TimerState::new());
        assert_eq!(view.surface().last_readout(), "2:00");
        assert_eq!(view.surface().running, Some(false));
        assert_eq!(load_or_default(storage.as_ref()), TimerState::new());
        assert_eq!(sent(&mut inbox), vec![Intent::Stop, Intent::Reset]);
    }

    #[test]
    fn reset_when_stopped_skips_stop_intent() {
        let (mut view, mut inbox, _storage) = attach(StoredState {
            completed_cycles: Some(2),
            ..StoredState::default()
        });
        view.reset();
        assert_eq!(sent(&mut inbox), vec![Intent::Reset]);
    }

    #[test]
    fn reload_picks_up_persisted_changes() {
        let (mut view, _inbox, storage) = attach(StoredState::default());
        storage
            .save(&TimerState {
                time_left: 3,
                is_running: true,
                completed_cycles: 8,
            })
            .unwrap();
        view.reload();
        assert_eq!(view.surface().last_readout(), "0:03");
        assert_eq!(view.surface().running, Some(true));
    }

    #[test]
    fn closed_controller_does_not_panic() {
        let (mut view, inbox, _storage) = attach(StoredState::default());
        drop(inbox);
        view.toggle();
        assert!(view.state().is_running);
    }
}
