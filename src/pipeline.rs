//! コーパス正規化・学習・推論の各段階。
pub mod inference;
pub mod normalize;
pub mod train;

pub use inference::{CorpusAccuracy, InferenceEngine, ModelKind, Verdict};
pub use normalize::{CorpusNormalizer, NormalizeSummary};
pub use train::{Trainer, TrainingOptions, TrainingOutcome};
