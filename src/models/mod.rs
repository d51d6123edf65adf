pub mod difficulty;
pub mod loaders;
pub mod problem;
pub mod session;
pub mod topic;

pub use difficulty::{lookup_budget, table_for, DifficultyTier, DIVISION_TIERS, STANDARD_TIERS};
pub use loaders::load_catalog;
pub use problem::{Operation, Problem};
pub use session::{
    DivisionWarmupState, EndKind, EndReason, Lifecycle, SessionEvent, SessionState,
};
pub use topic::{Catalog, ChallengeType, Grade, Topic};
