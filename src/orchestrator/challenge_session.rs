//! 挑战会话控制器 - 编排层
//!
//! ## 职责
//!
//! 把纯状态机和倒计时拼在一起，是表现层唯一需要接触的对象。
//!
//! ## 并发模型
//!
//! - 状态机放在一把互斥锁后面，作答和倒计时回调都必须先拿锁
//! - 每次布置倒计时都会递增 `generation`，回调拿到锁后先核对代号，
//!   代号不符（已被取消或重新布置）就直接退出
//! - 回调再交给状态机检查是否仍在 `playing`，两道检查都在到点时进行
//! - 离开 `playing` 的迁移都会带出 `CancelCountdown`，在释放锁之前执行

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::{ChallengeRules, Config};
use crate::error::AppResult;
use crate::infrastructure::countdown::{CountdownHandle, CountdownScheduler, TickControl};
use crate::models::session::{SessionEvent, SessionState};
use crate::services::answer_policy::{policy_for, AnswerPolicy};
use crate::services::problem_generator::ProblemGenerator;
use crate::services::recorder::SessionRecorder;
use crate::workflow::challenge_flow::{ChallengeStateMachine, Effect};
use crate::workflow::session_ctx::SessionCtx;

const EVENT_CAPACITY: usize = 256;

struct SessionInner<R: SessionRecorder> {
    machine: ChallengeStateMachine<R>,
    countdown: Option<CountdownHandle>,
    generation: u64,
}

struct Shared<R: SessionRecorder> {
    inner: Mutex<SessionInner<R>>,
    events: broadcast::Sender<SessionEvent>,
    scheduler: CountdownScheduler,
    tick_ms: u64,
}

impl<R: SessionRecorder> Shared<R> {
    fn lock(&self) -> MutexGuard<'_, SessionInner<R>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 挑战会话
///
/// 每个会话独占自己的状态和倒计时，会话之间不共享任何东西。
/// drop 时倒计时随之取消。
pub struct ChallengeSession<R: SessionRecorder + 'static> {
    shared: Arc<Shared<R>>,
}

impl<R: SessionRecorder + 'static> ChallengeSession<R> {
    /// 创建会话，必须在 tokio 运行时内调用
    pub fn new(
        ctx: SessionCtx,
        rules: ChallengeRules,
        generator: ProblemGenerator,
        policy: Box<dyn AnswerPolicy>,
        recorder: R,
    ) -> AppResult<Self> {
        let scheduler = CountdownScheduler::new(Duration::from_millis(rules.tick_ms))?;
        let machine = ChallengeStateMachine::new(ctx, rules, generator, policy, recorder);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(SessionInner {
                    machine,
                    countdown: None,
                    generation: 0,
                }),
                events,
                scheduler,
                tick_ms: rules.tick_ms,
            }),
        })
    }

    /// 按配置创建会话
    pub fn from_config(config: &Config, ctx: SessionCtx, recorder: R) -> AppResult<Self> {
        config.validate()?;
        Self::new(
            ctx,
            config.rules(),
            ProblemGenerator::from_seed_option(config.rng_seed),
            policy_for(config.test_mode),
            recorder,
        )
    }

    /// 订阅会话事件
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    /// 开始新一轮
    pub fn start_game(&self, troll_mode: bool) {
        let mut inner = self.shared.lock();
        let effects = inner.machine.start_game(troll_mode, Instant::now());
        apply_effects(&self.shared, &mut inner, effects);
    }

    /// 提交一个完整的答案
    pub fn submit_answer(&self, value: i64) {
        let mut inner = self.shared.lock();
        let effects = inner.machine.submit_answer(value, Instant::now());
        apply_effects(&self.shared, &mut inner, effects);
    }

    /// 回到 `start`
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        let effects = inner.machine.reset();
        apply_effects(&self.shared, &mut inner, effects);
    }

    /// 当前状态的快照
    pub fn snapshot(&self) -> SessionState {
        self.shared.lock().machine.state().clone()
    }

    pub fn ctx(&self) -> SessionCtx {
        self.shared.lock().machine.ctx().clone()
    }

    /// 是否有正在运行的倒计时
    pub fn has_active_countdown(&self) -> bool {
        self.shared
            .lock()
            .countdown
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// 在锁内访问记录器
    pub fn with_recorder<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(self.shared.lock().machine.recorder())
    }
}

/// 执行状态机产出的副作用，调用方必须持有锁
fn apply_effects<R: SessionRecorder + 'static>(
    shared: &Arc<Shared<R>>,
    inner: &mut SessionInner<R>,
    effects: Vec<Effect>,
) {
    for effect in effects {
        match effect {
            Effect::ArmCountdown { budget_ms } => {
                inner.generation += 1;
                // 先取消旧的，保证任一时刻最多一个倒计时
                inner.countdown.take();

                let generation = inner.generation;
                let weak = Arc::downgrade(shared);
                let handle = shared
                    .scheduler
                    .arm(move || on_countdown_tick(&weak, generation));
                inner.countdown = Some(handle);

                debug!(
                    "{} 倒计时 #{} 已布置: {}ms",
                    inner.machine.ctx(),
                    generation,
                    budget_ms
                );
            }
            Effect::CancelCountdown => {
                inner.generation += 1;
                if inner.countdown.take().is_some() {
                    debug!("{} 倒计时已取消", inner.machine.ctx());
                }
            }
            Effect::Notify(event) => {
                // 没有订阅者时发送失败，忽略即可
                let _ = shared.events.send(event);
            }
        }
    }
}

fn on_countdown_tick<R: SessionRecorder + 'static>(
    weak: &Weak<Shared<R>>,
    generation: u64,
) -> TickControl {
    let Some(shared) = weak.upgrade() else {
        return TickControl::Stop;
    };
    let mut inner = shared.lock();

    if inner.generation != generation {
        trace!("倒计时 #{} 已失效", generation);
        return TickControl::Stop;
    }

    match inner.machine.tick(shared.tick_ms) {
        None => TickControl::Stop,
        Some(effects) => {
            apply_effects(&shared, &mut inner, effects);
            if inner.machine.state().is_playing() {
                TickControl::Continue
            } else {
                TickControl::Stop
            }
        }
    }
}
