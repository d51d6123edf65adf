//! 难度曲线：累计得分 → 每题限时
//!
//! 两张静态表，按阈值升序排列。查表时取"阈值不超过得分的最大一档"。

use crate::models::problem::Operation;

/// 难度档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyTier {
    pub score_threshold: u32,
    pub time_budget_ms: u64,
}

const fn tier(score_threshold: u32, time_budget_ms: u64) -> DifficultyTier {
    DifficultyTier {
        score_threshold,
        time_budget_ms,
    }
}

/// 加/减/乘 共用的标准曲线
pub static STANDARD_TIERS: [DifficultyTier; 7] = [
    tier(0, 20_000),
    tier(10, 18_000),
    tier(20, 14_000),
    tier(30, 10_000),
    tier(40, 6_000),
    tier(50, 2_000),
    tier(60, 1_000),
];

/// 除法专用曲线：阈值 5·i，限时 max(5000, 30000 - 1000·i)，i ∈ [0, 25]
pub static DIVISION_TIERS: [DifficultyTier; 26] = division_tiers();

const fn division_tiers() -> [DifficultyTier; 26] {
    let mut tiers = [tier(0, 0); 26];
    let mut i = 0;
    while i < 26 {
        let raw = 30_000 - 1_000 * i as u64;
        let budget = if raw < 5_000 { 5_000 } else { raw };
        tiers[i] = tier(5 * i as u32, budget);
        i += 1;
    }
    tiers
}

/// 运算类型对应的难度表
pub fn table_for(operation: Operation) -> &'static [DifficultyTier] {
    if operation.is_division() {
        &DIVISION_TIERS
    } else {
        &STANDARD_TIERS
    }
}

/// 查找得分对应的限时
///
/// 表非空且必含阈值 0，所以总能命中
pub fn lookup_budget(table: &[DifficultyTier], score: u32) -> u64 {
    table
        .iter()
        .rev()
        .find(|t| score >= t.score_threshold)
        .or_else(|| table.first())
        .map(|t| t.time_budget_ms)
        .unwrap_or(0)
}
