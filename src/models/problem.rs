//! 题目与运算类型

use serde::{Deserialize, Serialize};

/// 运算类型
///
/// 一次挑战的整个生命周期内固定不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// 加法
    Addition,
    /// 减法
    Subtraction,
    /// 乘法
    Multiplication,
    /// 除法
    Division,
}

impl Operation {
    /// 运算符号
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Addition => "+",
            Operation::Subtraction => "-",
            Operation::Multiplication => "×",
            Operation::Division => "÷",
        }
    }

    /// 标准名称
    pub fn name(self) -> &'static str {
        match self {
            Operation::Addition => "加法",
            Operation::Subtraction => "减法",
            Operation::Multiplication => "乘法",
            Operation::Division => "除法",
        }
    }

    /// 计算 `a op b`
    ///
    /// 除法只在整除时有意义，调用方保证 `b != 0`
    pub fn apply(self, a: i64, b: i64) -> i64 {
        match self {
            Operation::Addition => a + b,
            Operation::Subtraction => a - b,
            Operation::Multiplication => a * b,
            Operation::Division => a / b,
        }
    }

    pub fn is_division(self) -> bool {
        matches!(self, Operation::Division)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 一道算术题
///
/// 不可变的值类型，每次换题都重新生成
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Problem {
    pub a: i64,
    pub b: i64,
    pub answer: i64,
}

impl Problem {
    /// 按运算类型构造题目，答案由运算直接算出
    pub fn new(operation: Operation, a: i64, b: i64) -> Self {
        Self {
            a,
            b,
            answer: operation.apply(a, b),
        }
    }

    /// 两道题的操作数是否相同
    pub fn same_operands(&self, other: &Problem) -> bool {
        self.a == other.a && self.b == other.b
    }

    /// 题面，例如 `7 × 8`
    pub fn display(&self, operation: Operation) -> String {
        format!("{} {} {}", self.a, operation.symbol(), self.b)
    }
}
