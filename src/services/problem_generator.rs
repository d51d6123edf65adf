//! 出题服务 - 业务能力层
//!
//! 只负责"给出下一道题"，不关心会话流程。
//! 同一会话中相邻两题的操作数一定不同（抽到重复就重抽）。

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::problem::{Operation, Problem};

/// 计时阶段使用的除法"阶段号"，热身只有 1..=3
pub const DIVISION_TIMED_PHASE: u8 = 4;

const DIVISION_PHASE1_DIVIDENDS: [i64; 4] = [2, 4, 6, 8];

/// 出题器
///
/// 随机源可注入，测试里用固定种子
pub struct ProblemGenerator<R = StdRng> {
    rng: R,
}

impl ProblemGenerator<StdRng> {
    /// 使用系统熵创建
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// 使用固定种子创建
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// 有种子用种子，没有就用系统熵
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> ProblemGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// 生成下一道题
    ///
    /// # 参数
    /// - `operation`: 运算类型
    /// - `previous`: 上一道题，提供时保证新题操作数与之不同
    /// - `division_phase`: 除法阶段，1..=3 为热身，4 及以上为计时阶段；其他运算忽略
    pub fn generate(
        &mut self,
        operation: Operation,
        previous: Option<&Problem>,
        division_phase: u8,
    ) -> Problem {
        loop {
            let candidate = self.draw(operation, division_phase);
            match previous {
                Some(prev) if prev.same_operands(&candidate) => continue,
                _ => return candidate,
            }
        }
    }

    fn draw(&mut self, operation: Operation, division_phase: u8) -> Problem {
        let rng = &mut self.rng;
        let (a, b) = match operation {
            Operation::Addition => {
                // 和不超过 9
                let a = rng.gen_range(1..=8);
                let b = rng.gen_range(1..=9 - a);
                (a, b)
            }
            Operation::Subtraction => {
                let a = rng.gen_range(1..=9);
                let b = rng.gen_range(0..a);
                (a, b)
            }
            Operation::Multiplication => (rng.gen_range(1..=9), rng.gen_range(1..=9)),
            Operation::Division => match division_phase {
                0 | 1 => {
                    let a = *DIVISION_PHASE1_DIVIDENDS.choose(rng).unwrap_or(&2);
                    (a, 2)
                }
                // 10..=98 的偶数
                2 => (rng.gen_range(5..=49) * 2, 2),
                // 12..=99 的 3 的倍数
                3 => (rng.gen_range(4..=33) * 3, 3),
                _ => {
                    // 被除数 = 除数 × 商，构造即整除
                    let b = rng.gen_range(2..=9);
                    let multiplier = rng.gen_range(1..=99 / b);
                    (b * multiplier, b)
                }
            },
        };
        Problem::new(operation, a, b)
    }
}

impl Default for ProblemGenerator<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}
