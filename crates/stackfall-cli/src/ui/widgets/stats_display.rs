use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use stackfall_engine::GameSession;

use crate::ui::widgets::{block_margins, style, to_u16};

/// What the stats panel shows about the background assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssistantStatus {
    pub state: AssistantState,
    /// Number of proposals that failed validation when committed.
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantState {
    Active,
    Paused,
    Stopped,
}

pub struct StatsDisplay<'a> {
    session: &'a GameSession,
    assistant: Option<AssistantStatus>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> StatsDisplay<'a> {
    pub fn new(session: &'a GameSession) -> Self {
        Self {
            session,
            assistant: None,
            block: None,
        }
    }

    pub fn assistant(self, assistant: Option<AssistantStatus>) -> Self {
        Self { assistant, ..self }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        let (margin, _) = block_margins(self.block.as_ref());
        20 + margin
    }

    pub fn height(&self) -> u16 {
        let (_, margin) = block_margins(self.block.as_ref());
        to_u16(self.rows().count()) + margin
    }

    fn rows(&self) -> impl Iterator<Item = Row> + use<> {
        let assistant_rows = if self.assistant.is_some() {
            ASSISTANT_ROWS
        } else {
            &[]
        };
        SESSION_ROWS.iter().chain(assistant_rows).copied()
    }
}

struct Source<'a> {
    session: &'a GameSession,
    assistant: Option<AssistantStatus>,
}

#[derive(Clone, Copy)]
enum Row {
    Empty,
    FullLabel(&'static str),
    FullValue(&'static dyn Fn(&Source) -> String),
    LabelValue(&'static str, &'static dyn Fn(&Source) -> String),
}

const SESSION_ROWS: &[Row] = &[
    Row::FullLabel("SCORE:"),
    Row::FullValue(&|src| src.session.stats().score().to_string()),
    Row::FullLabel("TIME:"),
    Row::FullValue(&|src| format!("{}s", src.session.elapsed().as_secs())),
    Row::Empty,
    Row::LabelValue("LINES:", &|src| {
        src.session.stats().cleared_lines().to_string()
    }),
    Row::LabelValue("PIECES:", &|src| {
        src.session.stats().locked_pieces().to_string()
    }),
    Row::Empty,
    Row::LabelValue("SINGLES:", &|src| {
        src.session.stats().line_cleared_counter()[1].to_string()
    }),
    Row::LabelValue("DOUBLES:", &|src| {
        src.session.stats().line_cleared_counter()[2].to_string()
    }),
    Row::LabelValue("TRIPLES:", &|src| {
        src.session.stats().line_cleared_counter()[3].to_string()
    }),
    Row::LabelValue("TETRIS:", &|src| {
        src.session.stats().line_cleared_counter()[4].to_string()
    }),
];

const ASSISTANT_ROWS: &[Row] = &[
    Row::Empty,
    Row::LabelValue("ASSIST:", &|src| {
        let state = match src.assistant.map(|status| status.state) {
            Some(AssistantState::Active) => "ON",
            Some(AssistantState::Paused) => "PAUSED",
            Some(AssistantState::Stopped) | None => "OFF",
        };
        state.to_owned()
    }),
    Row::LabelValue("REJECTED:", &|src| {
        src.assistant
            .map_or(0, |status| status.rejected)
            .to_string()
    }),
];

impl Widget for StatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let style = style::DEFAULT;
        let source = Source {
            session: self.session,
            assistant: self.assistant,
        };
        let rows: Vec<Row> = self.rows().collect();

        let rows_areas =
            Layout::vertical((0..rows.len()).map(|_| Constraint::Length(1))).split(area);

        for (row, area) in iter::zip(rows, rows_areas[..].iter().copied()) {
            match row {
                Row::Empty => {}
                Row::FullLabel(label) => {
                    Line::styled(label, style).left_aligned().render(area, buf);
                }
                Row::FullValue(value) => {
                    Line::styled(value(&source), style)
                        .right_aligned()
                        .render(area, buf);
                }
                Row::LabelValue(label, value) => {
                    let [label_area, value_area] = area.layout(&Layout::horizontal([
                        Constraint::Fill(1),
                        Constraint::Fill(1),
                    ]));
                    Line::styled(label, style)
                        .left_aligned()
                        .render(label_area, buf);
                    Line::styled(value(&source), style)
                        .right_aligned()
                        .render(value_area, buf);
                }
            }
        }
    }
}
