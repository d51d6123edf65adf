//! 进度存储服务 - 业务能力层
//!
//! 把连胜、各话题通关次数、最佳用时写进一个 JSON 文件。
//! 每次修改都整体重写文件。

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AppError, AppResult, FileError};
use crate::services::recorder::SessionRecorder;

/// 单个话题的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicStats {
    pub completions: u32,
    #[serde(default)]
    pub failures: u32,
    pub longest_streak: u32,
    /// 计时挑战的最佳用时（毫秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time_ms: Option<u64>,
}

impl TopicStats {
    fn merge_best_time(&mut self, time_ms: Option<u64>) {
        if let Some(t) = time_ms {
            self.best_time_ms = Some(self.best_time_ms.map_or(t, |best| best.min(t)));
        }
    }
}

/// 持久化的数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub streak: u32,
    #[serde(default)]
    pub topic_stats: BTreeMap<String, TopicStats>,
    #[serde(default)]
    pub completed_exercises: BTreeSet<String>,
}

/// 进度存储
///
/// 职责：
/// - 实现 `SessionRecorder`
/// - 只管读写文件，不关心会话流程
pub struct ProgressStore {
    path: PathBuf,
    progress: Progress,
}

impl ProgressStore {
    /// 打开进度文件，不存在则从空进度开始
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let progress = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
            serde_json::from_str(&content).map_err(|e| {
                AppError::File(FileError::JsonParseFailed {
                    path: path.display().to_string(),
                    source: Box::new(e),
                })
            })?
        } else {
            Progress::default()
        };

        debug!("进度文件 {} 已打开", path.display());
        Ok(Self { path, progress })
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn topic_stats(&self, topic_id: &str) -> Option<&TopicStats> {
        self.progress.topic_stats.get(topic_id)
    }

    fn stats_mut(&mut self, topic_id: &str) -> &mut TopicStats {
        self.progress
            .topic_stats
            .entry(topic_id.to_string())
            .or_default()
    }

    fn save(&self) -> AppResult<()> {
        let json = serde_json::to_string_pretty(&self.progress).map_err(|e| {
            AppError::File(FileError::JsonParseFailed {
                path: self.path.display().to_string(),
                source: Box::new(e),
            })
        })?;
        fs::write(&self.path, json)
            .map_err(|e| AppError::file_write_failed(self.path.display().to_string(), e))?;
        Ok(())
    }
}

impl SessionRecorder for ProgressStore {
    fn increment_streak(&mut self) -> AppResult<()> {
        self.progress.streak += 1;
        self.save()
    }

    fn reset_streak(&mut self) -> AppResult<()> {
        self.progress.streak = 0;
        self.save()
    }

    fn streak(&self) -> u32 {
        self.progress.streak
    }

    fn record_completion(
        &mut self,
        topic_id: &str,
        cleared_exercise_ids: &[String],
        final_streak: u32,
        elapsed_ms: Option<u64>,
    ) -> AppResult<()> {
        let stats = self.stats_mut(topic_id);
        stats.completions += 1;
        stats.longest_streak = stats.longest_streak.max(final_streak);
        stats.merge_best_time(elapsed_ms);

        for id in cleared_exercise_ids {
            self.progress.completed_exercises.remove(id);
        }

        debug!("话题 {} 通关记录已更新", topic_id);
        self.save()
    }

    fn record_failed_challenge(
        &mut self,
        topic_id: &str,
        final_streak: u32,
        fastest_response_ms: Option<u64>,
    ) -> AppResult<()> {
        let stats = self.stats_mut(topic_id);
        stats.failures += 1;
        stats.longest_streak = stats.longest_streak.max(final_streak);
        stats.merge_best_time(fastest_response_ms);

        debug!("话题 {} 失败记录已更新", topic_id);
        self.save()
    }

    fn has_completed(&self, topic_id: &str) -> bool {
        self.topic_stats(topic_id)
            .map(|s| s.completions > 0)
            .unwrap_or(false)
    }
}
