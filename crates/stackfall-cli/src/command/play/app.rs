use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Text,
};
use stackfall_assistant::{
    AssistantConfig, AssistantHandle, CommitError, PlacementDiagnostic, commit_proposal,
};
use stackfall_engine::{GameSession, Intent, IntentState, PieceId, SessionState};

use crate::{
    tui::{App, TimerId, Tui},
    ui::widgets::{AssistantState, AssistantStatus, SessionDisplay},
};

const CLOCK_INTERVAL: Duration = Duration::from_secs(1);
const PUMP_INTERVAL: Duration = Duration::from_millis(50);
const REPEAT_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
struct Timers {
    gravity: TimerId,
    clock: TimerId,
    pump: Option<TimerId>,
    /// Only set when the terminal reports key releases.
    repeat: Option<TimerId>,
}

/// Play screen: keyboard input on one side, an optional assistant on the other.
///
/// The session lives on the UI thread. The assistant only ever sees snapshots,
/// and its proposals are re-validated here before they touch the session.
#[derive(Debug)]
pub(super) struct PlayApp {
    session: GameSession,
    intents: IntentState,
    assistant: Option<AssistantHandle>,
    observed_piece: Option<PieceId>,
    diagnostics: Vec<PlacementDiagnostic>,
    timers: Timers,
    is_exiting: bool,
}

impl PlayApp {
    pub(super) fn manual(tui: &mut Tui, session: GameSession, gravity: Duration) -> Self {
        let timers = Timers {
            gravity: tui.add_timer(gravity),
            clock: tui.add_timer(CLOCK_INTERVAL),
            pump: None,
            repeat: None,
        };
        Self {
            session,
            intents: IntentState::new(),
            assistant: None,
            observed_piece: None,
            diagnostics: vec![],
            timers,
            is_exiting: false,
        }
    }

    pub(super) fn auto(
        tui: &mut Tui,
        session: GameSession,
        gravity: Duration,
        config: AssistantConfig,
    ) -> Self {
        let mut this = Self::manual(tui, session, gravity);
        this.timers.pump = Some(tui.add_timer(PUMP_INTERVAL));
        this.assistant = Some(AssistantHandle::spawn(config));
        this.sync_assistant();
        this
    }

    pub(super) fn diagnostics(&self) -> &[PlacementDiagnostic] {
        &self.diagnostics
    }

    fn assistant_status(&self) -> Option<AssistantStatus> {
        let assistant = self.assistant.as_ref()?;
        let state = if assistant.is_stopped() {
            AssistantState::Stopped
        } else if self.session.session_state().is_paused() {
            AssistantState::Paused
        } else {
            AssistantState::Active
        };
        Some(AssistantStatus {
            state,
            rejected: self.diagnostics.len(),
        })
    }

    fn toggle_pause(&mut self) {
        self.session.toggle_pause();
        self.intents.reset();
        if let Some(assistant) = &self.assistant {
            match self.session.session_state() {
                SessionState::Running => assistant.resume(),
                SessionState::Paused => assistant.pause(),
                SessionState::GameOver => {}
            }
        }
    }

    fn handle_intent_key(&mut self, intent: Intent, kind: KeyEventKind) {
        if self.timers.repeat.is_none() {
            // No release events: the terminal's own key repeat stands in for holding.
            if kind != KeyEventKind::Release {
                self.session.handle_intent(intent);
            }
            return;
        }
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if self.intents.press(intent) {
                    self.session.handle_intent(intent);
                }
            }
            KeyEventKind::Release => self.intents.release(intent),
        }
    }

    fn repeat_held_intents(&mut self) {
        for intent in self.intents.held() {
            self.session.handle_intent(intent);
        }
    }

    fn pump_proposals(&mut self) {
        let Some(assistant) = &self.assistant else {
            return;
        };
        while let Some(proposal) = assistant.try_recv_proposal() {
            match commit_proposal(&mut self.session, &proposal) {
                Ok(()) | Err(CommitError::NotRunning | CommitError::StalePiece { .. }) => {}
                Err(CommitError::InvalidPlacement { diagnostic }) => {
                    self.diagnostics.push(*diagnostic);
                }
            }
        }
    }

    /// Publishes a snapshot whenever a new piece spawns, and stops the worker at game over.
    fn sync_assistant(&mut self) {
        let Some(assistant) = &mut self.assistant else {
            return;
        };
        if self.session.session_state().is_game_over() {
            assistant.stop();
            return;
        }
        let current = self.session.falling_piece().id();
        if self.observed_piece != Some(current) {
            assistant.observe(self.session.snapshot());
            self.observed_piece = Some(current);
        }
    }
}

fn intent_for(code: KeyCode) -> Option<Intent> {
    match code {
        KeyCode::Left => Some(Intent::MoveLeft),
        KeyCode::Right => Some(Intent::MoveRight),
        KeyCode::Up => Some(Intent::Rotate),
        KeyCode::Down => Some(Intent::SoftDrop),
        _ => None,
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        if tui.reports_key_release() {
            self.timers.repeat = Some(tui.add_timer(REPEAT_INTERVAL));
        }
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        let is_press = key.kind == KeyEventKind::Press;
        match key.code {
            KeyCode::Char('q') if is_press => self.is_exiting = true,
            KeyCode::Char('p') if is_press => self.toggle_pause(),
            code => {
                if let Some(intent) = intent_for(code) {
                    self.handle_intent_key(intent, key.kind);
                }
            }
        }
        self.sync_assistant();
    }

    fn draw(&self, frame: &mut Frame) {
        let mut session_display = SessionDisplay::new(&self.session);
        if let Some(status) = self.assistant_status() {
            session_display = session_display.assistant(status);
        }
        let help_text = match self.session.session_state() {
            SessionState::Running => {
                "Controls: ← → (Move) | ↑ (Rotate) | ↓ (Soft Drop) | P (Pause) | Q (Quit)"
            }
            SessionState::Paused => "Controls: P (Resume) | Q (Quit)",
            SessionState::GameOver => "Controls: Q (Quit)",
        };
        let help_text = Text::from(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .centered();

        let [main_area, help_area] = Layout::vertical([
            Constraint::Length(session_display.height()),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        frame.render_widget(session_display, main_area);
        frame.render_widget(help_text, help_area);
    }

    fn on_timer(&mut self, _tui: &mut Tui, timer: TimerId) {
        if timer == self.timers.gravity {
            _ = self.session.gravity_tick();
        } else if timer == self.timers.clock {
            self.session.tick_clock();
        } else if Some(timer) == self.timers.pump {
            self.pump_proposals();
        } else if Some(timer) == self.timers.repeat {
            self.repeat_held_intents();
        }
        self.sync_assistant();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        thread,
        time::{Duration, Instant},
    };

    use crossterm::event::{KeyEvent, KeyModifiers};
    use stackfall_engine::PieceSeed;

    use super::*;

    fn seed() -> PieceSeed {
        "0000000000000000000000000000beef".parse().unwrap()
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind))
    }

    fn manual_app(tui: &mut Tui) -> PlayApp {
        PlayApp::manual(tui, GameSession::with_seed(seed()), Duration::from_secs(60))
    }

    /// A manual app as set up on a terminal that reports key releases.
    fn held_key_app(tui: &mut Tui) -> PlayApp {
        let mut app = manual_app(tui);
        app.timers.repeat = Some(tui.add_timer(REPEAT_INTERVAL));
        app
    }

    #[test]
    fn test_arrow_keys_drive_the_piece() {
        let mut tui = Tui::new();
        let mut app = manual_app(&mut tui);
        let start = app.session.falling_piece().position();

        app.handle_event(&mut tui, key(KeyCode::Left, KeyEventKind::Press));
        assert_eq!(app.session.falling_piece().x(), start.x() - 1);
        assert!(!app.intents.is_held(Intent::MoveLeft));

        app.handle_event(&mut tui, key(KeyCode::Left, KeyEventKind::Repeat));
        assert_eq!(app.session.falling_piece().x(), start.x() - 2);

        app.handle_event(&mut tui, key(KeyCode::Left, KeyEventKind::Release));
        assert_eq!(app.session.falling_piece().x(), start.x() - 2);

        app.handle_event(&mut tui, key(KeyCode::Down, KeyEventKind::Press));
        assert_eq!(app.session.falling_piece().y(), start.y() + 1);
    }

    #[test]
    fn test_held_key_repeats_until_released() {
        let mut tui = Tui::new();
        let mut app = held_key_app(&mut tui);
        let repeat = app.timers.repeat.unwrap();
        let start = app.session.falling_piece().position();

        app.handle_event(&mut tui, key(KeyCode::Right, KeyEventKind::Press));
        assert_eq!(app.session.falling_piece().x(), start.x() + 1);
        assert!(app.intents.is_held(Intent::MoveRight));

        // Terminal repeats are ignored; the repeat timer drives held keys.
        app.handle_event(&mut tui, key(KeyCode::Right, KeyEventKind::Repeat));
        assert_eq!(app.session.falling_piece().x(), start.x() + 1);
        app.on_timer(&mut tui, repeat);
        assert_eq!(app.session.falling_piece().x(), start.x() + 2);

        app.handle_event(&mut tui, key(KeyCode::Right, KeyEventKind::Release));
        app.on_timer(&mut tui, repeat);
        assert_eq!(app.session.falling_piece().x(), start.x() + 2);
        assert_eq!(app.intents.held().count(), 0);
    }

    #[test]
    fn test_pause_freezes_input_and_timers() {
        let mut tui = Tui::new();
        let mut app = held_key_app(&mut tui);
        app.handle_event(&mut tui, key(KeyCode::Right, KeyEventKind::Press));
        app.handle_event(&mut tui, key(KeyCode::Char('p'), KeyEventKind::Press));
        assert!(app.session.session_state().is_paused());
        assert_eq!(app.intents.held().count(), 0);

        let position = app.session.falling_piece().position();
        app.handle_event(&mut tui, key(KeyCode::Right, KeyEventKind::Press));
        app.on_timer(&mut tui, app.timers.repeat.unwrap());
        app.on_timer(&mut tui, app.timers.gravity);
        app.on_timer(&mut tui, app.timers.clock);
        assert_eq!(app.session.falling_piece().position(), position);
        assert_eq!(app.session.elapsed(), Duration::ZERO);

        app.handle_event(&mut tui, key(KeyCode::Right, KeyEventKind::Release));
        app.handle_event(&mut tui, key(KeyCode::Char('p'), KeyEventKind::Press));
        app.on_timer(&mut tui, app.timers.gravity);
        app.on_timer(&mut tui, app.timers.clock);
        assert_eq!(app.session.falling_piece().position().x(), position.x());
        assert_eq!(app.session.falling_piece().y(), position.y() + 1);
        assert_eq!(app.session.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn test_quit_key() {
        let mut tui = Tui::new();
        let mut app = manual_app(&mut tui);
        assert!(!app.should_exit());
        app.handle_event(&mut tui, key(KeyCode::Char('q'), KeyEventKind::Release));
        assert!(!app.should_exit());
        app.handle_event(&mut tui, key(KeyCode::Char('q'), KeyEventKind::Press));
        assert!(app.should_exit());
    }

    #[test]
    fn test_manual_play_has_no_assistant() {
        let mut tui = Tui::new();
        let app = manual_app(&mut tui);
        assert!(app.assistant_status().is_none());
        assert!(app.timers.pump.is_none());
    }

    #[test]
    fn test_assistant_proposal_is_committed() {
        let mut tui = Tui::new();
        let config = AssistantConfig {
            poll_interval: Duration::from_millis(5),
        };
        let mut app = PlayApp::auto(
            &mut tui,
            GameSession::with_seed(seed()),
            Duration::from_secs(60),
            config,
        );
        let pump = app.timers.pump.unwrap();
        let first_piece = app.session.falling_piece().id();
        assert_eq!(app.observed_piece, Some(first_piece));

        // Empty board: the piece is moved straight down to the floor.
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.session.falling_piece().y() == 0 && Instant::now() < deadline {
            app.on_timer(&mut tui, pump);
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(app.session.falling_piece().id(), first_piece);
        assert_eq!(app.session.falling_piece().y(), 18);
        assert!(app.diagnostics().is_empty());
        assert_eq!(
            app.assistant_status().map(|status| status.state),
            Some(AssistantState::Active)
        );
    }

    #[test]
    fn test_assistant_stops_at_game_over() {
        let mut tui = Tui::new();
        let board = "##########\n".repeat(20).parse().unwrap();
        let session = GameSession::with_board(board, seed());
        let app = PlayApp::auto(
            &mut tui,
            session,
            Duration::from_secs(60),
            AssistantConfig::default(),
        );
        assert_eq!(
            app.assistant_status().map(|status| status.state),
            Some(AssistantState::Stopped)
        );
    }
}
