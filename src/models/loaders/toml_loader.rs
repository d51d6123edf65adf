use crate::error::{AppError, AppResult, FileError};
use crate::models::topic::Catalog;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载话题目录
pub async fn load_catalog(toml_file_path: &Path) -> AppResult<Catalog> {
    if !toml_file_path.exists() {
        return Err(AppError::File(FileError::NotFound {
            path: toml_file_path.display().to_string(),
        }));
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(toml_file_path.display().to_string(), e))?;

    let catalog: Catalog = toml::from_str(&content).map_err(|e| {
        AppError::File(FileError::TomlParseFailed {
            path: toml_file_path.display().to_string(),
            source: Box::new(e),
        })
    })?;

    tracing::debug!(
        "目录 {} 加载完成: {} 个年级",
        toml_file_path.display(),
        catalog.grades.len()
    );

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::problem::Operation;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"
[[grades]]
id = "grade-3"
level = 3
name = "三年级"

[[grades.topics]]
id = "timed-multiplication-challenge"
name = "乘法速算"
icon = "✖️"
challenge_type = "timed-multiplication"

[[grades.topics]]
id = "decomposition-addition"
name = "分解加法"
"#;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "speed_challenge_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_catalog() {
        let dir = temp_dir("load_catalog");
        let path = dir.join("catalog.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let catalog = load_catalog(&path).await.unwrap();
        assert_eq!(catalog.grades.len(), 1);
        let (_, op) = catalog.challenge("timed-multiplication-challenge").unwrap();
        assert_eq!(op, Operation::Multiplication);
        assert!(catalog.find_topic("decomposition-addition").is_some());
    }

    #[tokio::test]
    async fn test_load_catalog_missing_file() {
        let result = load_catalog(Path::new("/definitely/not/here.toml")).await;
        assert!(matches!(
            result,
            Err(AppError::File(FileError::NotFound { .. }))
        ));
    }
}
