use anyhow::{Context, Result};
use speed_challenge::utils::logging;
use speed_challenge::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config)
        .await
        .context("初始化失败")?
        .run()
        .await?;

    Ok(())
}
