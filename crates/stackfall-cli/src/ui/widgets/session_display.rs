use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};
use stackfall_engine::{GameSession, SessionState};

use crate::ui::widgets::{AssistantStatus, BoardDisplay, StatsDisplay, color, style};

/// Stats panel and board side by side, with a banner over the board while
/// paused or after game over.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    session: &'a GameSession,
    assistant: Option<AssistantStatus>,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(session: &'a GameSession) -> Self {
        Self {
            session,
            assistant: None,
        }
    }

    pub fn assistant(self, assistant: AssistantStatus) -> Self {
        Self {
            assistant: Some(assistant),
            ..self
        }
    }

    /// Rows needed to show the whole session.
    pub fn height(&self) -> u16 {
        let board = self.board_panel(color::WHITE);
        let stats = self.stats_panel(color::WHITE);
        board.height().max(stats.height())
    }

    /// Frame color: cyan while the assistant plays along, otherwise by session state.
    fn border_color(&self) -> Color {
        match self.session.session_state() {
            SessionState::Running if self.assistant.is_some() => color::CYAN,
            SessionState::Running => color::WHITE,
            SessionState::Paused => color::YELLOW,
            SessionState::GameOver => color::RED,
        }
    }

    fn board_panel(&self, border: Color) -> BoardDisplay<'a> {
        BoardDisplay::new(self.session.board())
            .falling_piece(self.session.falling_piece())
            .block(Block::bordered().border_style(border).style(style::DEFAULT))
    }

    fn stats_panel(&self, border: Color) -> StatsDisplay<'a> {
        StatsDisplay::new(self.session)
            .assistant(self.assistant)
            .block(
                Block::bordered()
                    .title(Line::from("STATS").centered())
                    .padding(Padding::horizontal(1))
                    .border_style(border)
                    .style(style::DEFAULT),
            )
    }

    fn banner(&self) -> Option<(&'static str, Style)> {
        match self.session.session_state() {
            SessionState::Running => None,
            SessionState::Paused => {
                Some(("PAUSED", Style::new().fg(color::BLACK).bg(color::YELLOW)))
            }
            SessionState::GameOver => {
                Some(("GAME OVER!!", Style::new().fg(color::WHITE).bg(color::RED)))
            }
        }
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = self.border_color();
        let board = self.board_panel(border);
        let stats = self.stats_panel(border);

        let [stats_column, board_column] = Layout::horizontal([
            Constraint::Length(stats.width()),
            Constraint::Length(board.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);
        let stats_area = stats_column.intersection(Rect {
            height: stats.height(),
            ..stats_column
        });
        let board_area = board_column.intersection(Rect {
            height: board.height(),
            ..board_column
        });

        stats.render(stats_area, buf);
        board.render(board_area, buf);

        if let Some((text, style)) = self.banner() {
            let banner_area = board_area.centered_vertically(Constraint::Length(3));
            Clear.render(banner_area, buf);
            Block::new().style(style).render(banner_area, buf);
            Text::styled(text, style)
                .centered()
                .render(banner_area.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
