//! Pause prompt: save-and-quit or resume.
use crate::GameStorage;
use crate::clock::Clock;
use crate::constants::{MSG_PAUSED, MSG_RESUMED};
use crate::input::Input;

use super::{EngineState, GameplayEngine, TickEvent};

impl<S, C> GameplayEngine<S, C>
where
    S: GameStorage,
    C: Clock,
{
    pub(super) fn pause(&mut self, events: &mut Vec<TickEvent>) {
        self.pause_started = Some(self.clock.now());
        self.state = EngineState::Paused;
        self.push_message(MSG_PAUSED);
        events.push(TickEvent::Paused);
    }

    pub(super) fn handle_pause(&mut self, input: Input, events: &mut Vec<TickEvent>) {
        match input {
            Input::Yes => self.save_and_quit(events),
            Input::No | Input::Escape => self.resume_play(events),
            _ => {}
        }
    }

    fn resume_play(&mut self, events: &mut Vec<TickEvent>) {
        let now = self.clock.now();
        let paused_for = self
            .pause_started
            .take()
            .map(|started| now.saturating_duration_since(started))
            .unwrap_or_default();
        self.world.round.exclude_pause(paused_for);
        self.state = EngineState::AwaitingInput;
        self.push_message(MSG_RESUMED);
        events.push(TickEvent::Resumed { paused_for });
    }

    fn save_and_quit(&mut self, events: &mut Vec<TickEvent>) {
        let save = self.save_state();
        match self.storage.save_session(&save) {
            Ok(()) => {
                log::info!(
                    "saved round {} with score {}",
                    save.round_number,
                    save.total_score
                );
                events.push(TickEvent::Saved);
            }
            Err(err) => {
                log::warn!("failed to save session, returning to menu anyway: {err}");
                events.push(TickEvent::SaveFailed);
            }
        }
        self.pause_started = None;
        self.state = EngineState::ReturnToMenu;
    }
}
