use crossterm::event::Event;
use ratatui::Frame;

use crate::tui::{TimerId, Tui};

/// Trait for TUI applications.
///
/// Applications executed by `Tui::run()` must implement this trait.
pub trait App {
    /// Initializes the application.
    ///
    /// Called at the start of `Tui::run()`, once the terminal is set up.
    fn init(&mut self, tui: &mut Tui);

    /// Returns whether the application should exit.
    fn should_exit(&self) -> bool;

    /// Handles terminal events (key input, mouse, resize, etc.).
    fn handle_event(&mut self, tui: &mut Tui, event: Event);

    /// Draws the screen (called on each `TuiEvent::Render`).
    fn draw(&self, frame: &mut Frame);

    /// Called each time a timer registered with `Tui::add_timer()` fires.
    fn on_timer(&mut self, tui: &mut Tui, timer: TimerId);
}
