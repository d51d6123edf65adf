//! 会话上下文
//!
//! 封装"我在挑战哪个话题的哪种运算"这一信息，主要用作日志前缀

use std::fmt::Display;

use crate::models::problem::Operation;

/// 会话上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCtx {
    /// 话题ID，成绩按它记录
    pub topic_id: String,

    /// 运算类型
    pub operation: Operation,
}

impl SessionCtx {
    /// 创建新的会话上下文
    pub fn new(topic_id: impl Into<String>, operation: Operation) -> Self {
        Self {
            topic_id: topic_id.into(),
            operation,
        }
    }
}

impl Display for SessionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[话题 {} | {}]", self.topic_id, self.operation)
    }
}
