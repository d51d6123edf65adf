//! 挑战状态机 - 流程层
//!
//! 核心职责：定义"一轮速算挑战"的完整状态迁移
//!
//! 状态顺序：
//! 1. start → warmup（`start_game`）
//! 2. warmup → playing（热身完成）
//! 3. playing → end（获胜 / 答错 / 超时）
//!
//! 状态机本身是同步、纯内存的，不持有计时器：
//! 需要开始或停止倒计时的时候，通过返回的 [`Effect`] 告诉调用方。

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ChallengeRules;
use crate::error::AppResult;
use crate::models::difficulty::{lookup_budget, table_for};
use crate::models::session::{
    DivisionWarmupState, EndKind, EndReason, Lifecycle, SessionEvent, SessionState,
};
use crate::services::answer_policy::AnswerPolicy;
use crate::services::division_warmup::{DivisionWarmupTracker, WarmupStep};
use crate::services::problem_generator::ProblemGenerator;
use crate::services::recorder::SessionRecorder;
use crate::workflow::session_ctx::SessionCtx;

/// 状态迁移产生的副作用，由持有计时器的调用方执行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// 取消旧倒计时，按新限时重新开始
    ArmCountdown { budget_ms: u64 },
    /// 停止倒计时
    CancelCountdown,
    /// 推送给表现层
    Notify(SessionEvent),
}

/// 挑战状态机
///
/// - 独占 `SessionState`，所有修改都经过这里的方法
/// - 不持有计时器，只产出 `Effect`
/// - 成绩通过 `SessionRecorder` 交给外部持久化
pub struct ChallengeStateMachine<R: SessionRecorder> {
    ctx: SessionCtx,
    rules: ChallengeRules,
    generator: ProblemGenerator,
    policy: Box<dyn AnswerPolicy>,
    recorder: R,
    state: SessionState,
    division: DivisionWarmupTracker,
    last_answer_at: Option<Instant>,
}

impl<R: SessionRecorder> ChallengeStateMachine<R> {
    /// 创建新的状态机，初始处于 `start`
    pub fn new(
        ctx: SessionCtx,
        rules: ChallengeRules,
        generator: ProblemGenerator,
        policy: Box<dyn AnswerPolicy>,
        recorder: R,
    ) -> Self {
        Self {
            division: DivisionWarmupTracker::new(rules.division_phase_length),
            state: SessionState::idle(rules.idle_budget_ms()),
            ctx,
            rules,
            generator,
            policy,
            recorder,
            last_answer_at: None,
        }
    }

    pub fn ctx(&self) -> &SessionCtx {
        &self.ctx
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    fn is_division(&self) -> bool {
        self.ctx.operation.is_division()
    }

    // ========== 对外操作 ==========

    /// 开始一轮新挑战
    ///
    /// 任何状态下都可以调用，旧的一轮（连同倒计时）直接作废
    pub fn start_game(&mut self, troll_mode: bool, now: Instant) -> Vec<Effect> {
        let mut effects = vec![Effect::CancelCountdown];

        self.state = SessionState::idle(self.rules.idle_budget_ms());
        self.state.troll_mode = troll_mode;
        self.state.lifecycle = Lifecycle::Warmup;
        self.division.reset();
        self.last_answer_at = Some(now);

        if self.is_division() {
            let warmup = self.division.state();
            self.state.division_warmup = Some(warmup);
            effects.push(Effect::Notify(SessionEvent::DivisionPhase {
                phase: warmup.phase,
                progress: warmup.progress,
            }));
        }

        let first = self
            .generator
            .generate(self.ctx.operation, None, self.division.problem_phase());
        self.state.current_problem = Some(first);

        info!(
            "{} 🚀 开始挑战（{}）",
            self.ctx,
            if troll_mode { "捣蛋模式" } else { "普通模式" }
        );

        effects.push(Effect::Notify(SessionEvent::LifecycleChanged(Lifecycle::Warmup)));
        effects.push(Effect::Notify(SessionEvent::NewProblem(first)));
        effects
    }

    /// 提交答案
    ///
    /// 只在 `warmup` / `playing` 中生效，其他状态直接忽略
    pub fn submit_answer(&mut self, value: i64, now: Instant) -> Vec<Effect> {
        if !self.state.lifecycle.accepts_answers() {
            debug!(
                "{} 忽略作答 {}：当前状态为 {}",
                self.ctx, value, self.state.lifecycle
            );
            return Vec::new();
        }

        let Some(problem) = self.state.current_problem else {
            debug!("{} 忽略作答 {}：没有当前题目", self.ctx, value);
            return Vec::new();
        };

        if self.policy.is_accepted(value, &problem) {
            self.handle_correct(now)
        } else {
            debug!(
                "{} ✗ {} 的答案是 {}，作答 {}",
                self.ctx,
                problem.display(self.ctx.operation),
                problem.answer,
                value
            );
            self.handle_incorrect()
        }
    }

    /// 倒计时走一格
    ///
    /// 不在 `playing` 时返回 `None`，调用方应停止计时
    pub fn tick(&mut self, quantum_ms: u64) -> Option<Vec<Effect>> {
        if !self.state.is_playing() {
            return None;
        }

        self.state.time_left_ms = self.state.time_left_ms.saturating_sub(quantum_ms);
        if self.state.time_left_ms == 0 {
            return Some(self.on_timer_expired());
        }
        Some(Vec::new())
    }

    /// 倒计时到点
    ///
    /// 在到点的这一刻检查状态：已经离开 `playing` 就什么也不做
    pub fn on_timer_expired(&mut self) -> Vec<Effect> {
        if !self.state.is_playing() {
            debug!(
                "{} 过期的倒计时被忽略（当前状态 {}）",
                self.ctx, self.state.lifecycle
            );
            return Vec::new();
        }

        self.state.time_left_ms = 0;
        info!("{} ⏰ 超时，得分 {}", self.ctx, self.state.score);
        self.end(EndKind::Timeout)
    }

    /// 回到 `start`，清空得分、题目、计时和最快记录
    pub fn reset(&mut self) -> Vec<Effect> {
        let was = self.state.lifecycle;

        self.state = SessionState::idle(self.rules.idle_budget_ms());
        self.division.reset();
        self.last_answer_at = None;

        let mut effects = vec![Effect::CancelCountdown];
        if was != Lifecycle::Start {
            info!("{} 🔄 重置", self.ctx);
            effects.push(Effect::Notify(SessionEvent::LifecycleChanged(Lifecycle::Start)));
        }
        effects
    }

    // ========== 答对 / 答错 ==========

    fn handle_correct(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();

        let result = self.recorder.increment_streak();
        self.log_recorder_error("增加连胜", result);

        if self.state.troll_mode {
            self.measure_response(now, &mut effects);
        }
        self.last_answer_at = Some(now);

        match self.state.lifecycle {
            Lifecycle::Warmup if self.is_division() => {
                self.division_warmup_step(now, &mut effects)
            }
            Lifecycle::Warmup => {
                self.state.score += 1;
                if self.state.score >= self.rules.warmup_count {
                    let budget = self.playing_budget(0);
                    self.enter_playing(budget, now, &mut effects);
                } else {
                    self.next_problem(&mut effects);
                }
            }
            Lifecycle::Playing => {
                let new_score = self.state.score + 1;
                self.state.score = new_score;

                if !self.state.troll_mode
                    && !self.is_division()
                    && new_score >= self.rules.winning_score
                {
                    info!("{} 🏆 挑战成功，得分 {}", self.ctx, new_score);
                    effects.extend(self.end(EndKind::Win));
                    return effects;
                }

                let budget = self.playing_budget(new_score);
                self.state.time_budget_ms = budget;
                self.state.time_left_ms = budget;
                self.next_problem(&mut effects);
                effects.push(Effect::ArmCountdown { budget_ms: budget });
            }
            Lifecycle::Start | Lifecycle::End => {}
        }

        effects
    }

    fn handle_incorrect(&mut self) -> Vec<Effect> {
        let result = self.recorder.reset_streak();
        self.log_recorder_error("重置连胜", result);
        info!(
            "{} ❌ 答错，{}得分 {}",
            self.ctx, self.state.lifecycle, self.state.score
        );
        self.end(EndKind::Incorrect)
    }

    /// 捣蛋模式：测量距上次答对的用时
    fn measure_response(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        let Some(last) = self.last_answer_at else {
            return;
        };
        let elapsed_ms = now.saturating_duration_since(last).as_millis() as u64;

        let fastest = self
            .state
            .fastest_response_ms
            .map_or(elapsed_ms, |f| f.min(elapsed_ms));
        self.state.fastest_response_ms = Some(fastest);

        if elapsed_ms < self.rules.troll_threshold_ms {
            debug!("{} 😈 {}ms 超快作答", self.ctx, elapsed_ms);
            effects.push(Effect::Notify(SessionEvent::TrollEffect { elapsed_ms }));
        }
    }

    fn division_warmup_step(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        self.state.score += 1;

        match self.division.advance() {
            WarmupStep::Progressed(warmup) => {
                self.publish_division(warmup, effects);
                self.next_problem(effects);
            }
            WarmupStep::PhaseAdvanced(warmup) => {
                info!("{} 📈 进入除法热身第 {}/3 阶段", self.ctx, warmup.phase);
                self.publish_division(warmup, effects);
                self.next_problem(effects);
            }
            WarmupStep::Completed => {
                // 捣蛋模式也从 30 秒开始，之后的题目才用捣蛋限时
                self.enter_playing(self.rules.division_initial_budget_ms, now, effects);
            }
        }
    }

    fn publish_division(&mut self, warmup: DivisionWarmupState, effects: &mut Vec<Effect>) {
        self.state.division_warmup = Some(warmup);
        effects.push(Effect::Notify(SessionEvent::DivisionPhase {
            phase: warmup.phase,
            progress: warmup.progress,
        }));
    }

    // ========== 状态迁移 ==========

    fn enter_playing(&mut self, budget_ms: u64, now: Instant, effects: &mut Vec<Effect>) {
        self.state.lifecycle = Lifecycle::Playing;
        self.state.score = 0;
        self.state.time_budget_ms = budget_ms;
        self.state.time_left_ms = budget_ms;
        self.state.division_warmup = None;
        self.last_answer_at = Some(now);

        info!("{} ⏱️ 热身完成，进入计时挑战（限时 {}ms）", self.ctx, budget_ms);

        effects.push(Effect::Notify(SessionEvent::LifecycleChanged(Lifecycle::Playing)));
        self.next_problem(effects);
        effects.push(Effect::ArmCountdown { budget_ms });
    }

    fn end(&mut self, kind: EndKind) -> Vec<Effect> {
        let was_warming_up = self.state.lifecycle == Lifecycle::Warmup;
        let (division_phase_at_end, division_progress_at_end) = if self.is_division() {
            let progress = was_warming_up.then(|| self.division.state().progress);
            (Some(self.division.problem_phase()), progress)
        } else {
            (None, None)
        };

        let reason = EndReason {
            kind,
            score_at_end: self.state.score,
            streak_at_end: self.recorder.streak(),
            was_warming_up,
            division_phase_at_end,
            division_progress_at_end,
        };

        self.state.lifecycle = Lifecycle::End;
        self.state.end_reason = Some(reason.clone());

        match kind {
            EndKind::Win => {
                let result = self.recorder.record_completion(
                    &self.ctx.topic_id,
                    &[],
                    reason.streak_at_end,
                    None,
                );
                self.log_recorder_error("记录通关", result);
            }
            EndKind::Incorrect | EndKind::Timeout => {
                let fastest = if self.state.troll_mode {
                    self.state.fastest_response_ms
                } else {
                    None
                };
                let result = self.recorder.record_failed_challenge(
                    &self.ctx.topic_id,
                    reason.streak_at_end,
                    fastest,
                );
                self.log_recorder_error("记录失败", result);
            }
        }

        vec![
            Effect::CancelCountdown,
            Effect::Notify(SessionEvent::LifecycleChanged(Lifecycle::End)),
            Effect::Notify(SessionEvent::Ended(reason)),
        ]
    }

    // ========== 辅助方法 ==========

    fn playing_budget(&self, score: u32) -> u64 {
        if self.state.troll_mode {
            self.rules.troll_budget_ms
        } else {
            lookup_budget(table_for(self.ctx.operation), score)
        }
    }

    fn next_problem(&mut self, effects: &mut Vec<Effect>) {
        let next = self.generator.generate(
            self.ctx.operation,
            self.state.current_problem.as_ref(),
            self.division.problem_phase(),
        );
        self.state.current_problem = Some(next);
        effects.push(Effect::Notify(SessionEvent::NewProblem(next)));
    }

    fn log_recorder_error(&self, action: &str, result: AppResult<()>) {
        if let Err(e) = result {
            warn!("{} ⚠️ {}失败: {}", self.ctx, action, e);
        }
    }
}

/// 测试辅助：给定题目的正确答案
#[cfg(test)]
pub(crate) fn answer_of(problem: Option<crate::models::problem::Problem>) -> i64 {
    problem.map(|p| p.answer).unwrap_or(i64::MIN)
}
