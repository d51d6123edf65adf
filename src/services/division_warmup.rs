//! 除法热身进度 - 业务能力层
//!
//! 三个准备阶段，每阶段答对固定题数后进入下一阶段，
//! 第三阶段完成后通知调用方进入计时。

use crate::models::session::DivisionWarmupState;

const LAST_PHASE: u8 = 3;

/// 一次 `advance` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmupStep {
    /// 同一阶段内前进
    Progressed(DivisionWarmupState),
    /// 进入下一阶段，进度清零
    PhaseAdvanced(DivisionWarmupState),
    /// 三个阶段全部完成
    Completed,
}

/// 除法热身追踪器
#[derive(Debug, Clone)]
pub struct DivisionWarmupTracker {
    state: DivisionWarmupState,
    phase_length: u8,
    completed: bool,
}

impl DivisionWarmupTracker {
    pub fn new(phase_length: u8) -> Self {
        Self {
            state: DivisionWarmupState::INITIAL,
            phase_length: phase_length.max(1),
            completed: false,
        }
    }

    pub fn state(&self) -> DivisionWarmupState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// 出题用的阶段号，热身完成后为计时阶段
    pub fn problem_phase(&self) -> u8 {
        if self.completed {
            crate::services::problem_generator::DIVISION_TIMED_PHASE
        } else {
            self.state.phase
        }
    }

    /// 答对一题
    pub fn advance(&mut self) -> WarmupStep {
        if self.completed {
            return WarmupStep::Completed;
        }

        let progress = self.state.progress + 1;
        if progress < self.phase_length {
            self.state.progress = progress;
            return WarmupStep::Progressed(self.state);
        }

        let phase = self.state.phase + 1;
        if phase > LAST_PHASE {
            // 状态停在最后一刻，phase 永远不会越过 3
            self.completed = true;
            return WarmupStep::Completed;
        }

        self.state = DivisionWarmupState { phase, progress: 0 };
        WarmupStep::PhaseAdvanced(self.state)
    }

    pub fn reset(&mut self) {
        self.state = DivisionWarmupState::INITIAL;
        self.completed = false;
    }
}

impl Default for DivisionWarmupTracker {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_answers_advance_phase() {
        let mut tracker = DivisionWarmupTracker::default();
        for i in 1..10 {
            assert_eq!(
                tracker.advance(),
                WarmupStep::Progressed(DivisionWarmupState { phase: 1, progress: i })
            );
        }
        assert_eq!(
            tracker.advance(),
            WarmupStep::PhaseAdvanced(DivisionWarmupState { phase: 2, progress: 0 })
        );
        assert_eq!(tracker.problem_phase(), 2);
    }

    #[test]
    fn test_thirty_answers_complete() {
        let mut tracker = DivisionWarmupTracker::default();
        let mut last = None;
        for _ in 0..30 {
            let state = tracker.state();
            assert!((1..=3).contains(&state.phase));
            assert!(state.progress < 10);
            last = Some(tracker.advance());
        }
        assert_eq!(last, Some(WarmupStep::Completed));
        assert!(tracker.is_completed());
        assert_eq!(tracker.problem_phase(), 4);
        assert_eq!(tracker.state().phase, 3);
    }

    #[test]
    fn test_reset() {
        let mut tracker = DivisionWarmupTracker::default();
        for _ in 0..30 {
            tracker.advance();
        }
        tracker.reset();
        assert!(!tracker.is_completed());
        assert_eq!(tracker.state(), DivisionWarmupState::INITIAL);
    }
}
