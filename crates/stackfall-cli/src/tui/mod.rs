mod app;
mod event;
mod event_loop;
mod runner;

pub use self::{app::App, event_loop::TimerId, runner::Tui};
