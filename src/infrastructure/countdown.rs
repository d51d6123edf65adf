//! 倒计时调度器 - 基础设施层
//!
//! 持有 tokio 运行时句柄，只暴露"按固定步长重复回调"的能力。
//! 不认识会话、题目，回调返回 `Stop` 就自行结束。

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

use crate::error::{AppError, AppResult};

/// 回调的返回值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// 倒计时调度器
///
/// 职责：
/// - 持有运行时句柄，负责派生计时任务
/// - 每个 `arm` 产生一个独立任务，由返回的 `CountdownHandle` 管理生命周期
#[derive(Clone, Debug)]
pub struct CountdownScheduler {
    runtime: Handle,
    quantum: Duration,
}

impl CountdownScheduler {
    /// 在当前 tokio 运行时上创建
    pub fn new(quantum: Duration) -> AppResult<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| AppError::Runtime(format!("倒计时需要 tokio 运行时: {}", e)))?;
        Ok(Self::with_handle(runtime, quantum))
    }

    pub fn with_handle(runtime: Handle, quantum: Duration) -> Self {
        Self { runtime, quantum }
    }

    /// 启动一个重复计时任务
    ///
    /// 第一次回调发生在一个步长之后
    pub fn arm<F>(&self, mut on_tick: F) -> CountdownHandle
    where
        F: FnMut() -> TickControl + Send + 'static,
    {
        let quantum = self.quantum;
        let task = self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + quantum, quantum);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                ticker.tick().await;
                if on_tick() == TickControl::Stop {
                    trace!("倒计时任务结束");
                    break;
                }
            }
        });
        CountdownHandle { task }
    }
}

/// 计时任务句柄
///
/// drop 即取消，保证离开作用域后任务不会再回调
#[derive(Debug)]
pub struct CountdownHandle {
    task: JoinHandle<()>,
}

impl CountdownHandle {
    /// 显式取消
    pub fn cancel(self) {
        // Drop 负责 abort
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_until_stop() {
        let scheduler = CountdownScheduler::new(Duration::from_millis(10)).unwrap();
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();

        let handle = scheduler.arm(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= 5 {
                TickControl::Stop
            } else {
                TickControl::Continue
            }
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 5);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let scheduler = CountdownScheduler::new(Duration::from_millis(10)).unwrap();
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();

        let handle = scheduler.arm(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            TickControl::Continue
        });

        tokio::time::sleep(Duration::from_millis(35)).await;
        handle.cancel();
        let seen = count.load(Ordering::SeqCst);
        assert_eq!(seen, 3);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        assert!(matches!(
            CountdownScheduler::new(Duration::from_millis(10)),
            Err(AppError::Runtime(_))
        ));
    }
}
