// file: src/pipeline/stage.rs
// description: pipeline state machine states and transitions

use serde::Serialize;
use std::fmt;

/// States of a single publishing run.
///
/// A run only ever moves forward through the working stages. `Failed` and
/// `Done` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Fetching,
    Filtering,
    Publishing,
    Verifying,
    Done,
    Failed,
}

impl Stage {
    pub const WORKING: [Stage; 4] = [
        Stage::Fetching,
        Stage::Filtering,
        Stage::Publishing,
        Stage::Verifying,
    ];

    /// The state entered after this one succeeds.
    pub fn next(self) -> Stage {
        match self {
            Stage::Fetching => Stage::Filtering,
            Stage::Filtering => Stage::Publishing,
            Stage::Publishing => Stage::Verifying,
            Stage::Verifying => Stage::Done,
            Stage::Done => Stage::Done,
            Stage::Failed => Stage::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    /// 1-based position among the working stages, used for `[n/4]` narration.
    pub fn step(self) -> Option<usize> {
        Self::WORKING
            .iter()
            .position(|stage| *stage == self)
            .map(|idx| idx + 1)
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Fetching => "fetch",
            Stage::Filtering => "filter",
            Stage::Publishing => "publish",
            Stage::Verifying => "verify",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
