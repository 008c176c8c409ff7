//! ホールドアウト評価と層化分割。
pub mod metrics;
pub mod split;

pub use metrics::{ClassScores, ClassificationReport, ConfusionMatrix};
pub use split::{StratifiedSplit, stratified_split};
