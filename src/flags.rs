use std::sync::atomic::{AtomicBool, Ordering};

/// 到达标志：接收上下文置位，前台处理后清除。
#[derive(Debug, Default)]
pub struct ArrivalFlag(AtomicBool);

impl ArrivalFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// 置位；返回 `true` 表示上一帧尚未处理（被覆盖）。
    pub fn raise(&self) -> bool {
        self.0.swap(true, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}
