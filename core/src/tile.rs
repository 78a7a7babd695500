use serde::{Deserialize, Serialize};

/// Player annotation on an unrevealed cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkState {
    #[default]
    None,
    Flag,
    Question,
}

impl MarkState {
    /// Next mark in the right-click cycle; the question mark is skipped unless enabled.
    pub const fn cycle(self, question_marks: bool) -> Self {
        match self {
            Self::None => Self::Flag,
            Self::Flag if question_marks => Self::Question,
            Self::Flag | Self::Question => Self::None,
        }
    }

    pub const fn is_flag(self) -> bool {
        matches!(self, Self::Flag)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Left,
    Right,
}
