//! Link URL entry.
//!
//! The link button needs a URL from the user. The surface asks through
//! this seam; a frontend would show a modal, tests and the demo binary use
//! canned answers. A `None` or empty answer means the user backed out and
//! the whole operation is a silent no-op.

use std::collections::VecDeque;

use smol_str::SmolStr;

/// Asks the user for a link URL.
pub trait LinkPrompt {
    /// None means the prompt was dismissed.
    fn prompt_url(&mut self) -> Option<SmolStr>;
}

/// Canned prompt answers, consumed in order; exhausted means dismissed.
#[derive(Debug, Clone, Default)]
pub struct StaticPrompt {
    answers: VecDeque<Option<SmolStr>>,
}

impl StaticPrompt {
    /// A prompt the user always dismisses.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answers<I>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<SmolStr>>,
    {
        Self {
            answers: answers.into_iter().collect(),
        }
    }

    pub fn push(&mut self, answer: Option<SmolStr>) {
        self.answers.push_back(answer);
    }
}

impl LinkPrompt for StaticPrompt {
    fn prompt_url(&mut self) -> Option<SmolStr> {
        self.answers.pop_front().flatten()
    }
}
