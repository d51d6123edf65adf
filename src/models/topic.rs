use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, CatalogError};
use crate::models::problem::Operation;

/// 挑战类型
///
/// 目录文件里写作 `timed-addition` 之类的字符串
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChallengeType {
    TimedAddition,
    TimedSubtraction,
    TimedMultiplication,
    TimedDivision,
}

impl ChallengeType {
    /// 从字符串解析，未知值按减法处理
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "timed-addition" => ChallengeType::TimedAddition,
            "timed-multiplication" => ChallengeType::TimedMultiplication,
            "timed-division" => ChallengeType::TimedDivision,
            _ => ChallengeType::TimedSubtraction,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeType::TimedAddition => "timed-addition",
            ChallengeType::TimedSubtraction => "timed-subtraction",
            ChallengeType::TimedMultiplication => "timed-multiplication",
            ChallengeType::TimedDivision => "timed-division",
        }
    }
}

impl From<String> for ChallengeType {
    fn from(s: String) -> Self {
        Self::from_str_lossy(&s)
    }
}

impl From<ChallengeType> for String {
    fn from(kind: ChallengeType) -> Self {
        kind.as_str().to_string()
    }
}

impl From<ChallengeType> for Operation {
    fn from(kind: ChallengeType) -> Self {
        match kind {
            ChallengeType::TimedAddition => Operation::Addition,
            ChallengeType::TimedSubtraction => Operation::Subtraction,
            ChallengeType::TimedMultiplication => Operation::Multiplication,
            ChallengeType::TimedDivision => Operation::Division,
        }
    }
}

/// 话题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub challenge_type: Option<ChallengeType>,
}

impl Topic {
    /// 话题对应的运算类型，普通练习话题没有
    pub fn operation(&self) -> Option<Operation> {
        self.challenge_type.map(Operation::from)
    }
}

/// 年级
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: String,
    pub level: u8,
    pub name: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// 话题目录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub grades: Vec<Grade>,
}

impl Catalog {
    /// 按 id 在所有年级中查找话题
    pub fn find_topic(&self, topic_id: &str) -> Option<&Topic> {
        self.grades
            .iter()
            .flat_map(|g| g.topics.iter())
            .find(|t| t.id == topic_id)
    }

    /// 查找计时挑战话题并返回其运算类型
    pub fn challenge(&self, topic_id: &str) -> AppResult<(&Topic, Operation)> {
        let topic = self.find_topic(topic_id).ok_or_else(|| {
            AppError::Catalog(CatalogError::TopicNotFound {
                topic_id: topic_id.to_string(),
            })
        })?;
        let operation = topic.operation().ok_or_else(|| {
            AppError::Catalog(CatalogError::NotAChallenge {
                topic_id: topic_id.to_string(),
            })
        })?;
        Ok((topic, operation))
    }

    /// 所有计时挑战话题
    pub fn challenges(&self) -> impl Iterator<Item = &Topic> {
        self.grades
            .iter()
            .flat_map(|g| g.topics.iter())
            .filter(|t| t.challenge_type.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog {
            grades: vec![Grade {
                id: "grade-3".to_string(),
                level: 3,
                name: "三年级".to_string(),
                topics: vec![
                    Topic {
                        id: "timed-division-challenge".to_string(),
                        name: "除法速算".to_string(),
                        icon: None,
                        challenge_type: Some(ChallengeType::TimedDivision),
                    },
                    Topic {
                        id: "decomposition-addition".to_string(),
                        name: "分解加法".to_string(),
                        icon: None,
                        challenge_type: None,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_challenge_lookup() {
        let catalog = sample();
        let (topic, op) = catalog.challenge("timed-division-challenge").unwrap();
        assert_eq!(topic.name, "除法速算");
        assert_eq!(op, Operation::Division);
        assert_eq!(catalog.challenges().count(), 1);
    }

    #[test]
    fn test_challenge_errors() {
        let catalog = sample();
        assert!(matches!(
            catalog.challenge("missing"),
            Err(AppError::Catalog(CatalogError::TopicNotFound { .. }))
        ));
        assert!(matches!(
            catalog.challenge("decomposition-addition"),
            Err(AppError::Catalog(CatalogError::NotAChallenge { .. }))
        ));
    }

    #[test]
    fn test_from_str_lossy_defaults_to_subtraction() {
        assert_eq!(
            ChallengeType::from_str_lossy("timed-addition"),
            ChallengeType::TimedAddition
        );
        assert_eq!(
            ChallengeType::from_str_lossy("whatever"),
            ChallengeType::TimedSubtraction
        );
    }
}
