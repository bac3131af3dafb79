use std::{io, time::Duration};

use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::supports_keyboard_enhancement,
};
use ratatui::DefaultTerminal;

use crate::tui::{
    App,
    event::TuiEvent,
    event_loop::{EventLoop, TimerId},
};

/// TUI application runtime.
///
/// Manages the event loop and executes applications that implement the `App` trait.
#[derive(Default, Debug)]
pub struct Tui {
    events: EventLoop,
    reports_key_release: bool,
}

impl Tui {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a timer; `App::on_timer()` receives the returned id each time it fires.
    pub fn add_timer(&mut self, interval: Duration) -> TimerId {
        self.events.add_timer(interval)
    }

    /// Whether the terminal sends `KeyEventKind::Release` events.
    ///
    /// Only known once `run()` has set up the terminal, so read it from `App::init()`.
    pub fn reports_key_release(&self) -> bool {
        self.reports_key_release
    }

    /// Runs the application.
    ///
    /// 1. Enables key release reporting if the terminal supports it
    /// 2. Calls `app.init()` for initialization
    /// 3. Runs the event loop until `app.should_exit()` returns true
    ///    - `TuiEvent::Timer`: calls `app.on_timer()`
    ///    - `TuiEvent::Render`: calls `app.draw()`
    ///    - `TuiEvent::Crossterm`: calls `app.handle_event()`
    pub fn run<A>(mut self, app: &mut A) -> anyhow::Result<()>
    where
        A: App,
    {
        ratatui::run(|terminal| {
            self.reports_key_release = supports_keyboard_enhancement().unwrap_or(false);
            if self.reports_key_release {
                execute!(
                    io::stdout(),
                    PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
                )?;
            }
            app.init(&mut self);

            let result = self.drive(terminal, app);
            if self.reports_key_release {
                execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
            }
            result
        })
    }

    fn drive<A>(&mut self, terminal: &mut DefaultTerminal, app: &mut A) -> anyhow::Result<()>
    where
        A: App,
    {
        while !app.should_exit() {
            match self.events.next()? {
                TuiEvent::Timer(timer) => {
                    app.on_timer(self, timer);
                }
                TuiEvent::Render => {
                    terminal.draw(|f| app.draw(f))?;
                }
                TuiEvent::Crossterm(event) => {
                    app.handle_event(self, event);
                }
            }
        }
        Ok(())
    }
}
