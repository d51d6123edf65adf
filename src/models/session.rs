//! 挑战会话的状态数据

use serde::{Deserialize, Serialize};

use crate::models::problem::Problem;

/// 会话生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// 空闲，等待选择普通/捣蛋模式
    Start,
    /// 热身（不计时）
    Warmup,
    /// 计时挑战
    Playing,
    /// 本轮结束
    End,
}

impl Lifecycle {
    pub fn name(self) -> &'static str {
        match self {
            Lifecycle::Start => "待开始",
            Lifecycle::Warmup => "热身",
            Lifecycle::Playing => "计时",
            Lifecycle::End => "结束",
        }
    }

    /// 是否接受作答
    pub fn accepts_answers(self) -> bool {
        matches!(self, Lifecycle::Warmup | Lifecycle::Playing)
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 除法热身进度
///
/// `phase` 只在 1..=3 之间，`progress` 只在 0..10 之间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionWarmupState {
    pub phase: u8,
    pub progress: u8,
}

impl DivisionWarmupState {
    pub const INITIAL: Self = Self {
        phase: 1,
        progress: 0,
    };

    /// 当前阶段的说明文字
    pub fn description(&self) -> &'static str {
        match self.phase {
            1 => "一位数除以 2",
            2 => "两位数除以 2",
            3 => "两位数除以 3",
            _ => "",
        }
    }
}

impl Default for DivisionWarmupState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// 结束原因类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndKind {
    /// 达到获胜分数
    Win,
    /// 答错
    Incorrect,
    /// 超时
    Timeout,
}

/// 结束快照
///
/// 只在终止的那一刻创建一次，之后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndReason {
    pub kind: EndKind,
    pub score_at_end: u32,
    pub streak_at_end: u32,
    pub was_warming_up: bool,
    pub division_phase_at_end: Option<u8>,
    pub division_progress_at_end: Option<u8>,
}

/// 会话状态聚合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub lifecycle: Lifecycle,
    pub score: u32,
    pub troll_mode: bool,
    pub time_left_ms: u64,
    pub time_budget_ms: u64,
    /// `None` 表示还没有测到（即 ∞）
    pub fastest_response_ms: Option<u64>,
    pub current_problem: Option<Problem>,
    pub division_warmup: Option<DivisionWarmupState>,
    pub end_reason: Option<EndReason>,
}

impl SessionState {
    /// 空闲状态，`time_budget_ms` 是进入计时前展示用的默认限时
    pub fn idle(default_budget_ms: u64) -> Self {
        Self {
            lifecycle: Lifecycle::Start,
            score: 0,
            troll_mode: false,
            time_left_ms: default_budget_ms,
            time_budget_ms: default_budget_ms,
            fastest_response_ms: None,
            current_problem: None,
            division_warmup: None,
            end_reason: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.lifecycle == Lifecycle::Playing
    }
}

/// 推送给表现层的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// 生命周期切换
    LifecycleChanged(Lifecycle),
    /// 换题
    NewProblem(Problem),
    /// 除法热身进度变化
    DivisionPhase { phase: u8, progress: u8 },
    /// 捣蛋模式下的超快作答，表现层据此播放一次短暂特效
    TrollEffect { elapsed_ms: u64 },
    /// 本轮结束
    Ended(EndReason),
}
