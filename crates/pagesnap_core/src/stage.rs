use std::fmt;

/// Lifecycle of a single capture request.
///
/// `Received → Fetching → Extracting → Persisting → Done`; any non-terminal
/// stage may move to `Failed`. There is no retry edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureStage {
    Received,
    Fetching,
    Extracting,
    Persisting,
    Done,
    Failed,
}

impl CaptureStage {
    /// Successor on the success path, `None` once terminal.
    pub fn next(self) -> Option<CaptureStage> {
        match self {
            CaptureStage::Received => Some(CaptureStage::Fetching),
            CaptureStage::Fetching => Some(CaptureStage::Extracting),
            CaptureStage::Extracting => Some(CaptureStage::Persisting),
            CaptureStage::Persisting => Some(CaptureStage::Done),
            CaptureStage::Done | CaptureStage::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CaptureStage::Done | CaptureStage::Failed)
    }

    pub fn can_transition_to(self, to: CaptureStage) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == CaptureStage::Failed || self.next() == Some(to)
    }
}

impl fmt::Display for CaptureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaptureStage::Received => "received",
            CaptureStage::Fetching => "fetching",
            CaptureStage::Extracting => "extracting",
            CaptureStage::Persisting => "persisting",
            CaptureStage::Done => "done",
            CaptureStage::Failed => "failed",
        };
        f.write_str(name)
    }
}
