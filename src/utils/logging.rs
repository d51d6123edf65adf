/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::session::{EndKind, EndReason};
use crate::workflow::session_ctx::SessionCtx;

/// 初始化 tracing
///
/// `RUST_LOG` 优先；否则默认 `info`，详细模式下 `debug`。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 速算挑战启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📚 话题: {}", config.topic_id);
    info!("⏱️ 计时步长: {}ms", config.tick_ms);
    if config.test_mode {
        info!("🧪 测试模式：所有作答都算对");
    }
    info!("{}", "=".repeat(60));
}

/// 记录一轮挑战的结束信息
pub fn log_session_end(ctx: &SessionCtx, reason: &EndReason, fastest_response_ms: Option<u64>) {
    info!("\n{}", "─".repeat(60));
    match reason.kind {
        EndKind::Win => info!("{} 🏆 挑战成功", ctx),
        EndKind::Incorrect => info!("{} ❌ 答错结束", ctx),
        EndKind::Timeout => info!("{} ⏰ 超时结束", ctx),
    }
    info!(
        "{} 得分: {} | 连胜: {} | 热身中: {}",
        ctx, reason.score_at_end, reason.streak_at_end, reason.was_warming_up
    );
    if let Some(phase) = reason.division_phase_at_end {
        info!(
            "{} 除法阶段: {} (进度 {:?})",
            ctx, phase, reason.division_progress_at_end
        );
    }
    if let Some(fastest) = fastest_response_ms {
        info!("{} 😈 最快作答: {}ms", ctx, fastest);
    }
    info!(
        "结束时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "─".repeat(60));
}
