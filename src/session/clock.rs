//! 时钟
//!
//! 每个会话操作开始时读取一次时间；计时是相邻操作之间的差值累加，
//! 没有后台计时器。测试中用 [`ManualClock`] 模拟时间流逝。

use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 时间来源
pub trait Clock: Send + Sync {
    /// 单调时间，用于计时
    fn now(&self) -> Instant;

    /// 墙上时间，只用于记录开始时刻
    fn wall_now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 手动推进的时钟
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    /// 推进时间
    pub fn advance(&self, by: Duration) {
        self.offset_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    /// 推进若干秒
    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    /// 自创建以来经过的模拟时间
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}
