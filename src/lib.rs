//! # Speed Challenge
//!
//! 一个终端里的计时速算挑战
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（运行时句柄），只暴露能力
//! - `CountdownScheduler` - 唯一派生计时任务的地方
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ProblemGenerator` - 出题能力
//! - `AnswerPolicy` - 判题能力
//! - `SessionRecorder` / `ProgressStore` - 记录连胜和通关
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一轮挑战"的状态转换
//! - `SessionCtx` - 上下文封装（topic_id + operation）
//! - `ChallengeStateMachine` - 开始 → 热身 → 计时 → 结束
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/challenge_session` - 加锁、计时、发布事件
//! - `orchestrator/app` - 终端前端
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{ChallengeRules, Config};
pub use error::{AppError, AppResult};
pub use infrastructure::CountdownScheduler;
pub use models::{Operation, Problem, SessionEvent, SessionState};
pub use orchestrator::{App, ChallengeSession};
pub use workflow::{ChallengeStateMachine, SessionCtx};
