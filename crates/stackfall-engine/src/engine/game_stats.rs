/// Points awarded per cleared line.
pub const SCORE_PER_LINE: usize = 100;

/// Game statistics tracking score, lines cleared, and piece count.
///
/// Scoring is flat: every cleared line is worth [`SCORE_PER_LINE`] points,
/// whether it was cleared alone or together with others.
///
/// # Example
///
/// ```
/// use stackfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.record_lock(4);
///
/// assert_eq!(stats.score(), 400);
/// assert_eq!(stats.cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStats {
    score: usize,
    locked_pieces: usize,
    cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            locked_pieces: 0,
            cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Returns the total number of pieces locked onto the board.
    #[must_use]
    pub const fn locked_pieces(&self) -> usize {
        self.locked_pieces
    }

    #[must_use]
    pub const fn cleared_lines(&self) -> usize {
        self.cleared_lines
    }

    /// Returns how many locks cleared 0, 1, 2, 3 and 4 lines.
    ///
    /// Clears of more than four lines, only possible with custom shapes, are
    /// counted in the totals but not in the histogram.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Updates statistics after a piece lock that cleared `cleared_lines` lines.
    pub const fn record_lock(&mut self, cleared_lines: usize) {
        self.locked_pieces += 1;
        self.cleared_lines += cleared_lines;
        if cleared_lines < self.line_cleared_counter.len() {
            self.line_cleared_counter[cleared_lines] += 1;
        }
        self.score += cleared_lines * SCORE_PER_LINE;
    }
}
