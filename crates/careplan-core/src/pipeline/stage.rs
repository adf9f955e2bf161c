//! Pipeline stage tracking.

use std::fmt;

use tracing::debug;

/// Where a pipeline run currently is.
///
/// ```text
/// Idle -> Prompting -> Invoking -> Annotating -> Done
///  |                      |
///  +-------> Failed <-----+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Idle,
    Prompting,
    Invoking,
    Annotating,
    Done,
    Failed,
}

impl PipelineStage {
    /// Check whether `self -> to` is an edge of the stage graph.
    pub fn can_transition_to(self, to: PipelineStage) -> bool {
        matches!(
            (self, to),
            (Self::Idle, Self::Prompting)
                | (Self::Idle, Self::Failed)
                | (Self::Prompting, Self::Invoking)
                | (Self::Invoking, Self::Annotating)
                | (Self::Invoking, Self::Failed)
                | (Self::Annotating, Self::Done)
        )
    }

    /// `true` for `Done` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Prompting => "prompting",
            Self::Invoking => "invoking",
            Self::Annotating => "annotating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Move to `next`, logging the transition.
    pub(crate) fn advance(&mut self, next: PipelineStage) {
        debug_assert!(
            self.can_transition_to(next),
            "invalid pipeline transition {self} -> {next}"
        );
        debug!(from = self.as_str(), to = next.as_str(), "pipeline stage");
        *self = next;
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineStage::*;

    const ALL: [PipelineStage; 6] = [Idle, Prompting, Invoking, Annotating, Done, Failed];

    #[test]
    fn happy_path_is_valid() {
        let path = [Idle, Prompting, Invoking, Annotating, Done];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn failure_edges() {
        assert!(Idle.can_transition_to(Failed));
        assert!(Invoking.can_transition_to(Failed));
        assert!(!Prompting.can_transition_to(Failed));
        assert!(!Annotating.can_transition_to(Failed));
    }

    #[test]
    fn terminal_stages_have_no_exits() {
        for from in [Done, Failed] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} should be invalid");
            }
        }
    }

    #[test]
    fn no_skipping_stages() {
        assert!(!Idle.can_transition_to(Invoking));
        assert!(!Prompting.can_transition_to(Annotating));
        assert!(!Invoking.can_transition_to(Done));
    }

    #[test]
    fn advance_updates_stage() {
        let mut stage = Idle;
        stage.advance(Prompting);
        stage.advance(Invoking);
        assert_eq!(stage, Invoking);
        assert!(!stage.is_terminal());
    }

    #[test]
    fn display_names() {
        assert_eq!(Annotating.to_string(), "annotating");
        assert_eq!(Failed.as_str(), "failed");
    }
}
