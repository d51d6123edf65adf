//! 终端前端 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：校验配置、加载话题目录
//! 2. **资源管理**：打开进度文件，创建 `ChallengeSession`
//! 3. **输入循环**：逐行读取答案，同时监听会话事件，超时不必等输入
//! 4. **结果展示**：本轮结束后输出总结，询问是否再来一局

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::loaders::load_catalog;
use crate::models::problem::{Operation, Problem};
use crate::models::session::{EndKind, EndReason, Lifecycle, SessionEvent};
use crate::models::topic::Catalog;
use crate::orchestrator::challenge_session::ChallengeSession;
use crate::services::progress_store::ProgressStore;
use crate::services::recorder::SessionRecorder;
use crate::utils::logging::{log_session_end, log_startup};
use crate::workflow::session_ctx::SessionCtx;

/// 一行输入的含义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 作答
    Answer(i64),
    /// 再来一局，`troll` 表示想玩捣蛋模式
    Restart { troll: bool },
    /// 回到开始
    Reset,
    /// 退出
    Quit,
    /// 无法识别
    Unknown,
}

impl Command {
    /// 按当前状态解析输入
    pub fn parse(line: &str, lifecycle: Lifecycle) -> Self {
        match line.trim() {
            "q" | "quit" => Command::Quit,
            "r" | "reset" => Command::Reset,
            "" | "y" if !lifecycle.accepts_answers() => Command::Restart { troll: false },
            "t" if !lifecycle.accepts_answers() => Command::Restart { troll: true },
            other => other
                .parse::<i64>()
                .map(Command::Answer)
                .unwrap_or(Command::Unknown),
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    catalog: Catalog,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        log_startup(&config);

        let catalog = load_catalog(Path::new(&config.catalog_path))
            .await
            .with_context(|| format!("无法加载话题目录: {}", config.catalog_path))?;

        info!("✓ 目录中共有 {} 个计时挑战", catalog.challenges().count());

        Ok(Self { config, catalog })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let (topic, operation) = self.catalog.challenge(&self.config.topic_id)?;

        let store = ProgressStore::open(&self.config.progress_file)
            .with_context(|| format!("无法打开进度文件: {}", self.config.progress_file))?;
        let troll_mode = troll_mode_allowed(
            self.config.troll_mode,
            operation,
            store.has_completed(&topic.id),
        );

        let ctx = SessionCtx::new(&topic.id, operation);
        let session = ChallengeSession::from_config(&self.config, ctx.clone(), store)?;
        let mut events = session.subscribe();

        print_intro(&topic.name, operation, troll_mode);
        session.start_game(troll_mode);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("读取输入失败")? else {
                        break;
                    };
                    let lifecycle = session.snapshot().lifecycle;
                    match Command::parse(&line, lifecycle) {
                        Command::Answer(value) => session.submit_answer(value),
                        Command::Restart { troll } => {
                            // 进度可能在本次运行中变化，每局重新判断
                            let completed = session.with_recorder(|s| s.has_completed(&topic.id));
                            session.start_game(troll_mode_allowed(troll, operation, completed));
                        }
                        Command::Reset => {
                            session.reset();
                            println!("已重置，回车开始新一局，t 捣蛋模式，q 退出");
                        }
                        Command::Quit => break,
                        Command::Unknown => println!("请输入一个整数（q 退出，r 重置）"),
                    }
                }
                event = events.recv() => {
                    match event {
                        Ok(event) => self.on_event(&session, &ctx, operation, event),
                        Err(RecvError::Lagged(n)) => warn!("{} 事件积压，丢弃 {} 条", ctx, n),
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        }

        info!("👋 已退出");
        Ok(())
    }

    fn on_event<R: SessionRecorder + 'static>(
        &self,
        session: &ChallengeSession<R>,
        ctx: &SessionCtx,
        operation: Operation,
        event: SessionEvent,
    ) {
        match event {
            SessionEvent::LifecycleChanged(Lifecycle::Playing) => {
                println!("\n⏱️ 热身结束，开始计时！");
            }
            SessionEvent::LifecycleChanged(_) => {}
            SessionEvent::DivisionPhase { phase, progress } => {
                if progress == 0 {
                    let state = session.snapshot();
                    if let Some(warmup) = state.division_warmup {
                        println!("\n阶段 {}/3: {}", phase, warmup.description());
                    }
                }
            }
            SessionEvent::NewProblem(problem) => print_problem(session, operation, &problem),
            SessionEvent::TrollEffect { elapsed_ms } => println!("😈 捣蛋！{}ms", elapsed_ms),
            SessionEvent::Ended(reason) => {
                let state = session.snapshot();
                let fastest = if state.troll_mode {
                    state.fastest_response_ms
                } else {
                    None
                };
                log_session_end(ctx, &reason, fastest);
                print_summary(&reason, fastest);
            }
        }
    }
}

/// 捣蛋模式只对通关过的非除法话题开放
pub fn troll_mode_allowed(requested: bool, operation: Operation, completed: bool) -> bool {
    if !requested {
        return false;
    }
    if operation.is_division() {
        warn!("⚠️ 除法挑战没有捣蛋模式，按普通模式开始");
        return false;
    }
    if !completed {
        warn!("⚠️ 先通关一次普通模式才能解锁捣蛋模式");
        return false;
    }
    true
}

// ========== 输出辅助函数 ==========

fn print_intro(topic_name: &str, operation: Operation, troll_mode: bool) {
    println!("{}", "=".repeat(40));
    println!("{}", topic_name);
    if operation.is_division() {
        println!("计时之前有三个热身阶段，证明你是除法之王！");
    } else {
        println!("准备好速算挑战，尽快算出每道{}题！", operation);
    }
    if troll_mode {
        println!("😈 捣蛋模式：试试在 500ms 内作答！");
    }
    println!("{}", "=".repeat(40));
}

fn print_problem<R: SessionRecorder + 'static>(
    session: &ChallengeSession<R>,
    operation: Operation,
    problem: &Problem,
) {
    let state = session.snapshot();
    let status = match state.lifecycle {
        Lifecycle::Warmup => match state.division_warmup {
            Some(w) => format!("热身 {}/3 · {}/10", w.phase, w.progress),
            None => format!("热身 {}", state.score),
        },
        Lifecycle::Playing => format!(
            "得分 {} · 限时 {:.1}s",
            state.score,
            state.time_budget_ms as f64 / 1000.0
        ),
        _ => return,
    };
    println!("[{}] {} = ?", status, problem.display(operation));
}

fn print_summary(reason: &EndReason, fastest_response_ms: Option<u64>) {
    println!();
    match reason.kind {
        EndKind::Win => println!("🏆 挑战成功！"),
        EndKind::Incorrect => println!("❌ 答错了，游戏结束"),
        EndKind::Timeout => println!("⏰ 时间到，游戏结束"),
    }
    println!("你的得分: {}", reason.score_at_end);
    match (reason.division_phase_at_end, reason.division_progress_at_end) {
        (Some(phase), Some(progress)) => println!("热身停在第 {}/3 阶段，第 {}/10 题", phase, progress),
        (Some(_), None) => println!("已进入计时阶段"),
        _ => {}
    }
    if let Some(fastest) = fastest_response_ms {
        println!("最快作答: {}ms", fastest);
    }
    println!("回车再来一局，t 捣蛋模式，q 退出");
}
