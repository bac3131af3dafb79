/// A player action on the falling piece, independent of the key that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
}

impl Intent {
    pub const ALL: [Self; 4] = [Self::MoveLeft, Self::MoveRight, Self::Rotate, Self::SoftDrop];

    const fn index(self) -> usize {
        match self {
            Self::MoveLeft => 0,
            Self::MoveRight => 1,
            Self::Rotate => 2,
            Self::SoftDrop => 3,
        }
    }
}

/// Which intents are currently held down.
///
/// Press and release edges come from the input collaborator. While an intent
/// is held, [`Self::held`] reports it on every poll, so holding a key keeps
/// repeating the action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentState {
    held: [bool; 4],
}

impl IntentState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a press edge. Returns `true` if the intent was not already held.
    pub fn press(&mut self, intent: Intent) -> bool {
        !std::mem::replace(&mut self.held[intent.index()], true)
    }

    pub fn release(&mut self, intent: Intent) {
        self.held[intent.index()] = false;
    }

    #[must_use]
    pub fn is_held(&self, intent: Intent) -> bool {
        self.held[intent.index()]
    }

    /// Iterates over the held intents in [`Intent::ALL`] order.
    pub fn held(&self) -> impl Iterator<Item = Intent> + '_ {
        Intent::ALL
            .into_iter()
            .filter(|&intent| self.is_held(intent))
    }

    /// Releases everything, e.g. when the session is paused.
    pub fn reset(&mut self) {
        self.held = [false; 4];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release() {
        let mut state = IntentState::new();
        assert!(state.press(Intent::MoveLeft));
        assert!(!state.press(Intent::MoveLeft));
        assert!(state.press(Intent::SoftDrop));
        assert_eq!(
            state.held().collect::<Vec<_>>(),
            [Intent::MoveLeft, Intent::SoftDrop]
        );

        state.release(Intent::MoveLeft);
        assert!(!state.is_held(Intent::MoveLeft));
        assert!(state.is_held(Intent::SoftDrop));
    }

    #[test]
    fn test_reset_releases_all() {
        let mut state = IntentState::new();
        for intent in Intent::ALL {
            state.press(intent);
        }
        state.reset();
        assert_eq!(state.held().count(), 0);
        assert_eq!(state, IntentState::default());
    }
}
