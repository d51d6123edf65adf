use crate::error::{AppError, AppResult};
use crate::models::difficulty::{lookup_budget, STANDARD_TIERS};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 话题目录（TOML 文件）
    pub catalog_path: String,
    /// 要挑战的话题
    pub topic_id: String,
    /// 是否以捣蛋模式开局
    pub troll_mode: bool,
    /// 测试模式：所有作答都算对
    pub test_mode: bool,
    /// 进度文件（JSON）
    pub progress_file: String,
    /// 倒计时步长（毫秒）
    pub tick_ms: u64,
    /// 热身题数
    pub warmup_count: u32,
    /// 获胜分数
    pub winning_score: u32,
    /// 捣蛋模式"超快作答"阈值（毫秒）
    pub troll_threshold_ms: u64,
    /// 捣蛋模式固定限时（毫秒）
    pub troll_budget_ms: u64,
    /// 随机种子，不设置则使用系统熵
    pub rng_seed: Option<u64>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: "data/catalog.toml".to_string(),
            topic_id: "timed-subtraction-challenge".to_string(),
            troll_mode: false,
            test_mode: false,
            progress_file: "progress.json".to_string(),
            tick_ms: 10,
            warmup_count: 20,
            winning_score: 70,
            troll_threshold_ms: 500,
            troll_budget_ms: 2_000,
            rng_seed: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            catalog_path: std::env::var("CATALOG_PATH").unwrap_or(default.catalog_path),
            topic_id: std::env::var("TOPIC_ID").unwrap_or(default.topic_id),
            troll_mode: std::env::var("TROLL_MODE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.troll_mode),
            test_mode: std::env::var("TEST_MODE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.test_mode),
            progress_file: std::env::var("PROGRESS_FILE").unwrap_or(default.progress_file),
            tick_ms: std::env::var("TICK_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.tick_ms),
            warmup_count: std::env::var("WARMUP_COUNT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.warmup_count),
            winning_score: std::env::var("WINNING_SCORE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.winning_score),
            troll_threshold_ms: std::env::var("TROLL_THRESHOLD_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.troll_threshold_ms),
            troll_budget_ms: std::env::var("TROLL_BUDGET_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.troll_budget_ms),
            rng_seed: std::env::var("RNG_SEED").ok().and_then(|v| v.parse().ok()),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 检查会让状态机失去意义的取值
    pub fn validate(&self) -> AppResult<()> {
        if self.tick_ms == 0 {
            return Err(AppError::invalid_config("tick_ms", self.tick_ms));
        }
        if self.warmup_count == 0 {
            return Err(AppError::invalid_config("warmup_count", self.warmup_count));
        }
        if self.winning_score == 0 {
            return Err(AppError::invalid_config("winning_score", self.winning_score));
        }
        if self.troll_budget_ms == 0 {
            return Err(AppError::invalid_config("troll_budget_ms", self.troll_budget_ms));
        }
        Ok(())
    }

    /// 提取玩法常量
    pub fn rules(&self) -> ChallengeRules {
        ChallengeRules {
            warmup_count: self.warmup_count,
            winning_score: self.winning_score,
            troll_threshold_ms: self.troll_threshold_ms,
            troll_budget_ms: self.troll_budget_ms,
            tick_ms: self.tick_ms,
            ..ChallengeRules::default()
        }
    }
}

/// 玩法常量
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChallengeRules {
    pub warmup_count: u32,
    pub winning_score: u32,
    pub troll_threshold_ms: u64,
    pub troll_budget_ms: u64,
    pub tick_ms: u64,
    /// 除法热身每个阶段的题数
    pub division_phase_length: u8,
    /// 除法进入计时阶段时的初始限时
    pub division_initial_budget_ms: u64,
}

impl Default for ChallengeRules {
    fn default() -> Self {
        Self {
            warmup_count: 20,
            winning_score: 70,
            troll_threshold_ms: 500,
            troll_budget_ms: 2_000,
            tick_ms: 10,
            division_phase_length: 10,
            division_initial_budget_ms: 30_000,
        }
    }
}

impl ChallengeRules {
    /// 开局前展示用的默认限时
    pub fn idle_budget_ms(&self) -> u64 {
        lookup_budget(&STANDARD_TIERS, 0)
    }
}
