pub mod challenge_flow;
pub mod session_ctx;

pub use challenge_flow::{ChallengeStateMachine, Effect};
pub use session_ctx::SessionCtx;
