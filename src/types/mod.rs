//! Shared data structures for swing analysis
//!
//! - `pose`: Landmark, Frame, PoseSequence (smoother input/output)
//! - `faults`: SwingMetrics, RankedFault, RankingReport (ranker input/output)

mod pose;
mod faults;

pub use pose::*;
pub use faults::*;
