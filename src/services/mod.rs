pub mod answer_policy;
pub mod division_warmup;
pub mod problem_generator;
pub mod progress_store;
pub mod recorder;

pub use answer_policy::{policy_for, AnswerPolicy, ExactAnswer, ForceCorrect};
pub use division_warmup::{DivisionWarmupTracker, WarmupStep};
pub use problem_generator::{ProblemGenerator, DIVISION_TIMED_PHASE};
pub use progress_store::{Progress, ProgressStore, TopicStats};
pub use recorder::{MemoryRecorder, RecordedCall, SessionRecorder};
