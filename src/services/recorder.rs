//! 成绩记录接口
//!
//! 连胜计数和完成/失败记录都由外部协作者持久化，引擎只通过这个接口调用

use std::collections::HashMap;

use crate::error::AppResult;

/// 成绩记录器
///
/// 写入失败只会被记录到日志，不会改变会话结果
pub trait SessionRecorder: Send {
    /// 答对一题
    fn increment_streak(&mut self) -> AppResult<()>;

    /// 答错一题
    fn reset_streak(&mut self) -> AppResult<()>;

    /// 当前连胜
    fn streak(&self) -> u32;

    /// 获胜时调用一次
    fn record_completion(
        &mut self,
        topic_id: &str,
        cleared_exercise_ids: &[String],
        final_streak: u32,
        elapsed_ms: Option<u64>,
    ) -> AppResult<()>;

    /// 答错或超时结束时调用一次
    ///
    /// `fastest_response_ms` 只有捣蛋模式才会提供
    fn record_failed_challenge(
        &mut self,
        topic_id: &str,
        final_streak: u32,
        fastest_response_ms: Option<u64>,
    ) -> AppResult<()>;

    /// 该话题是否曾经通关（决定是否开放捣蛋模式）
    fn has_completed(&self, topic_id: &str) -> bool;
}

/// 记录器收到的调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Completion {
        topic_id: String,
        final_streak: u32,
        elapsed_ms: Option<u64>,
    },
    Failure {
        topic_id: String,
        final_streak: u32,
        fastest_response_ms: Option<u64>,
    },
}

/// 内存记录器，不落盘
#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    pub streak: u32,
    pub calls: Vec<RecordedCall>,
    completions: HashMap<String, u32>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completion_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RecordedCall::Completion { .. }))
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RecordedCall::Failure { .. }))
            .count()
    }
}

impl SessionRecorder for MemoryRecorder {
    fn increment_streak(&mut self) -> AppResult<()> {
        self.streak += 1;
        Ok(())
    }

    fn reset_streak(&mut self) -> AppResult<()> {
        self.streak = 0;
        Ok(())
    }

    fn streak(&self) -> u32 {
        self.streak
    }

    fn record_completion(
        &mut self,
        topic_id: &str,
        _cleared_exercise_ids: &[String],
        final_streak: u32,
        elapsed_ms: Option<u64>,
    ) -> AppResult<()> {
        *self.completions.entry(topic_id.to_string()).or_default() += 1;
        self.calls.push(RecordedCall::Completion {
            topic_id: topic_id.to_string(),
            final_streak,
            elapsed_ms,
        });
        Ok(())
    }

    fn record_failed_challenge(
        &mut self,
        topic_id: &str,
        final_streak: u32,
        fastest_response_ms: Option<u64>,
    ) -> AppResult<()> {
        self.calls.push(RecordedCall::Failure {
            topic_id: topic_id.to_string(),
            final_streak,
            fastest_response_ms,
        });
        Ok(())
    }

    fn has_completed(&self, topic_id: &str) -> bool {
        self.completions.get(topic_id).copied().unwrap_or(0) > 0
    }
}
