//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责资源调度和并发协调，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `challenge_session` - 会话控制器
//! - 独占状态机（加锁），串行处理作答、计时、重置
//! - 持有倒计时句柄，用代数（generation）丢弃过期的回调
//! - 通过 broadcast 通道向外发布 `SessionEvent`
//!
//! ### `app` - 终端前端
//! - 管理应用生命周期（初始化、运行）
//! - 加载话题目录、打开进度文件
//! - 同时等待键盘输入和会话事件
//!
//! ## 层次关系
//!
//! ```text
//! app (终端输入/输出)
//!     ↓
//! challenge_session (锁 + 计时 + 事件)
//!     ↓
//! workflow::ChallengeStateMachine (纯状态转换)
//!     ↓
//! services (能力层：出题 / 判题 / 记录)
//!     ↓
//! infrastructure (基础设施：CountdownScheduler)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层持有运行时句柄和计时任务
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **无业务逻辑**：规则判断都在状态机里

pub mod app;
pub mod challenge_session;

pub use app::{App, Command};
pub use challenge_session::ChallengeSession;
