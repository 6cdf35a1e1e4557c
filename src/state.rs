use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::buffer::FrameBuffer;
use crate::config::{I2C_BUFFER_SIZE, UART_BUFFER_SIZE};
use crate::console;
use crate::flags::ArrivalFlag;

/// 调试时打印的 I2C 帧尾字节数（含 CRC）。
const I2C_TAIL_LOG_LEN: usize = 5;

/// 外设角色：接收完成回调按角色分派，配置时确定。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeripheralRole {
    Uart,
    I2c,
}

impl PeripheralRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeripheralRole::Uart => "UART",
            PeripheralRole::I2c => "I2C",
        }
    }
}

/// 一次接收交付的结果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deposit {
    pub stored: usize,
    /// 上一帧尚未处理即被覆盖。
    pub overrun: bool,
}

/// 单方向通道：固定缓冲 + 到达标志，单槽位，后写覆盖。
pub struct Channel<const N: usize> {
    buffer: Mutex<FrameBuffer<N>>,
    flag: ArrivalFlag,
    overruns: AtomicU32,
}

impl<const N: usize> Channel<N> {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(FrameBuffer::new()),
            flag: ArrivalFlag::new(),
            overruns: AtomicU32::new(0),
        }
    }

    /// 接收上下文：写入缓冲后置位标志。
    pub fn deposit(&self, data: &[u8]) -> Deposit {
        let mut buffer = self.lock();
        let stored = buffer.store(data);
        let overrun = self.flag.raise();
        if overrun {
            self.overruns.fetch_add(1, Ordering::Relaxed);
        }
        Deposit { stored, overrun }
    }

    /// 前台：标志置位时取出缓冲快照，随后清零整个缓冲并清除标志。
    pub fn take(&self) -> Option<FrameBuffer<N>> {
        let mut buffer = self.lock();
        if !self.flag.is_raised() {
            return None;
        }
        let snapshot = buffer.clone();
        buffer.clear();
        self.flag.clear();
        Some(snapshot)
    }

    pub fn is_pending(&self) -> bool {
        self.flag.is_raised()
    }

    /// 标志已清除且缓冲全零。
    pub fn is_idle(&self) -> bool {
        !self.flag.is_raised() && self.lock().is_clear()
    }

    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, FrameBuffer<N>> {
        // 缓冲内容在每次写入时整体覆盖，中毒后继续使用是安全的
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<const N: usize> Default for Channel<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// 桥接共享状态：每个方向各一个通道，两方向之间不共享任何资源。
#[derive(Default)]
pub struct BridgeState {
    pub uart: Channel<UART_BUFFER_SIZE>,
    pub i2c: Channel<I2C_BUFFER_SIZE>,
}

impl BridgeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接收完成回调（替代按外设实例比较的中断分派）。
    pub fn on_receive_complete(&self, role: PeripheralRole, data: &[u8]) -> Deposit {
        let deposit = match role {
            PeripheralRole::Uart => self.uart.deposit(data),
            PeripheralRole::I2c => {
                console::log_bytes("I2C RX tail:", console::tail(data, I2C_TAIL_LOG_LEN));
                self.i2c.deposit(data)
            }
        };
        if deposit.stored < data.len() {
            log::warn!(
                "{} reception truncated to {} of {} bytes",
                role.as_str(),
                deposit.stored,
                data.len()
            );
        }
        if deposit.overrun {
            log::warn!(
                "{} frame overwritten before processing (previous frame dropped)",
                role.as_str()
            );
        }
        deposit
    }

    pub fn is_idle(&self) -> bool {
        self.uart.is_idle() && self.i2c.is_idle()
    }
}
