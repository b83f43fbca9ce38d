//! The three sorting engines and their shared merge step.

pub mod distributed;
pub mod merging;
pub mod parallel;
pub mod sequential;
