//! 前台处理：观察到达标志，校验并转发帧。
//!
//! UART→I2C：扫描 → 追加 CRC → 预备从机接收应答 → 主机发送到对端。
//! I2C→UART：扫描 → 去掉 CRC 转发到 UART（CR-LF 包裹）→ 校验 CRC。
//! 两个方向的每次处理结束时，对应标志已清除、缓冲已全部清零。

use std::sync::Arc;

use crate::codec::{self, CRC_LEN};
use crate::config::{BridgeConfig, UART_BUFFER_SIZE};
use crate::console;
use crate::error::{BridgeError, Result, TransportError};
use crate::state::BridgeState;
use crate::stats::BridgeStats;
use crate::transport::{I2cPort, LivenessIndicator, UartPort};

/// 帧长度不超过该值视为无数据。
const MIN_FRAME_LEN: usize = 2;
const LINE_END: &[u8] = b"\r\n";

/// 一次轮询的结果；`None` 表示该方向没有待处理的到达。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PollReport {
    pub uart: Option<Result<usize>>,
    pub i2c: Option<Result<usize>>,
}

impl PollReport {
    pub fn is_idle(&self) -> bool {
        self.uart.is_none() && self.i2c.is_none()
    }
}

/// 双向桥接器，持有两侧外设能力与共享状态。
pub struct Bridge<U, I, L> {
    state: Arc<BridgeState>,
    uart: U,
    i2c: I,
    led: L,
    config: BridgeConfig,
    stats: BridgeStats,
}

impl<U, I, L> Bridge<U, I, L>
where
    U: UartPort,
    I: I2cPort,
    L: LivenessIndicator,
{
    pub fn new(state: Arc<BridgeState>, uart: U, i2c: I, led: L, config: BridgeConfig) -> Self {
        Self {
            state,
            uart,
            i2c,
            led,
            config,
            stats: BridgeStats::default(),
        }
    }

    pub fn state(&self) -> &Arc<BridgeState> {
        &self.state
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn uart(&self) -> &U {
        &self.uart
    }

    pub fn i2c(&self) -> &I {
        &self.i2c
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    /// 当前统计快照（含接收侧的覆盖计数）。
    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            uart_overruns: self.state.uart.overruns(),
            i2c_overruns: self.state.i2c.overruns(),
            ..self.stats.clone()
        }
    }

    /// I2C 消息序号：每处理一帧加一，不论成败。
    pub fn message_count(&self) -> u32 {
        self.stats.i2c_frames
    }

    /// 两个方向各处理一次。
    pub fn poll(&mut self) -> PollReport {
        PollReport {
            uart: self.process_uart_arrival(),
            i2c: self.process_i2c_arrival(),
        }
    }

    /// UART 帧到达：追加 CRC 后经 I2C 发往对端，返回发送字节数。
    pub fn process_uart_arrival(&mut self) -> Option<Result<usize>> {
        let buffer = self.state.uart.take()?;
        self.stats.uart_frames = self.stats.uart_frames.wrapping_add(1);

        let len = buffer.frame_len();
        let result = if len <= MIN_FRAME_LEN {
            log::info!("UART: no data to send ({} bytes before delimiter)", len);
            Err(BridgeError::NoData)
        } else {
            self.forward_to_i2c(&buffer.as_slice()[..len])
        };

        match &result {
            Ok(_) => self.stats.i2c_sent = self.stats.i2c_sent.wrapping_add(1),
            Err(err) => self.stats.record_error(err),
        }
        self.led.toggle();
        Some(result)
    }

    /// I2C 帧到达：载荷转发到 UART 后校验 CRC，返回载荷字节数。
    pub fn process_i2c_arrival(&mut self) -> Option<Result<usize>> {
        let buffer = self.state.i2c.take()?;
        self.stats.i2c_frames = self.stats.i2c_frames.wrapping_add(1);
        let seq = self.stats.i2c_frames;

        let len = buffer.frame_len();
        if len <= MIN_FRAME_LEN {
            log::warn!("I2C #{}: frame too short for payload and crc ({} bytes)", seq, len);
            self.stats.record_error(&BridgeError::NoData);
            return Some(Err(BridgeError::NoData));
        }

        let frame = &buffer.as_slice()[..len];
        console::log_bytes("I2C RX:", frame);
        let payload = &frame[..len - CRC_LEN];
        self.forward_to_uart(payload);

        let computed = codec::crc16(payload);
        let result = codec::extract_crc(frame, len)
            .ok_or(BridgeError::NoData)
            .and_then(|received| {
                if received == computed {
                    Ok(payload.len())
                } else {
                    Err(BridgeError::CrcMismatch { computed, received })
                }
            });

        match &result {
            Ok(_) => {
                log::info!("I2C #{}: crc OK ({:#06X})", seq, computed);
                self.stats.crc_ok = self.stats.crc_ok.wrapping_add(1);
            }
            Err(err) => {
                log::warn!("I2C #{}: {}", seq, err);
                self.stats.record_error(err);
            }
        }
        Some(result)
    }

    fn forward_to_i2c(&mut self, frame: &[u8]) -> Result<usize> {
        let mut scratch = [0u8; UART_BUFFER_SIZE + CRC_LEN];
        let len = frame.len();
        if len > UART_BUFFER_SIZE {
            return Err(BridgeError::FrameTooLong {
                len,
                capacity: scratch.len(),
            });
        }
        scratch[..len].copy_from_slice(frame);
        let total = codec::frame_with_crc(&mut scratch, len)?;
        let framed = &scratch[..total];
        log::debug!("UART: crc {:#06X} over {} bytes", codec::crc16(frame), len);
        console::log_bytes("I2C TX:", framed);

        // 应答可能很快返回，必须先预备从机接收再发送
        self.i2c.arm_slave_receive(total);
        let address = self.config.peer_address;
        match self.i2c.master_transmit(address, framed, self.config.bus_timeout) {
            Ok(()) => {
                log::info!("I2C: sent {} bytes to {:#04X}", total, address);
                Ok(total)
            }
            Err(err) => {
                match err {
                    TransportError::Bus => {
                        log::warn!("I2C: bus error sending to {:#04X}, check wiring", address)
                    }
                    TransportError::Busy => log::warn!("I2C: bus or peripheral busy"),
                    TransportError::Timeout => {
                        log::warn!("I2C: timed out after {:?}", self.config.bus_timeout)
                    }
                }
                Err(err.into())
            }
        }
    }

    fn forward_to_uart(&mut self, payload: &[u8]) {
        let timeout = self.config.bus_timeout;
        for part in [LINE_END, payload, LINE_END] {
            if let Err(err) = self.uart.transmit(part, timeout) {
                log::warn!("UART TX error: {}", err);
                self.stats.uart_write_failures = self.stats.uart_write_failures.wrapping_add(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PeripheralRole;
    use std::time::Duration;

    #[derive(Default)]
    struct NullUart;

    impl UartPort for NullUart {
        fn transmit(&mut self, _bytes: &[u8], _timeout: Duration) -> std::result::Result<(), TransportError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FailingI2c {
        armed: Vec<usize>,
    }

    impl I2cPort for FailingI2c {
        fn master_transmit(
            &mut self,
            _address: u8,
            _bytes: &[u8],
            _timeout: Duration,
        ) -> std::result::Result<(), TransportError> {
            Err(TransportError::Busy)
        }

        fn arm_slave_receive(&mut self, expected_len: usize) {
            self.armed.push(expected_len);
        }
    }

    #[derive(Default)]
    struct Blink(u32);

    impl LivenessIndicator for Blink {
        fn toggle(&mut self) {
            self.0 += 1;
        }
    }

    fn bridge() -> Bridge<NullUart, FailingI2c, Blink> {
        Bridge::new(
            Arc::new(BridgeState::new()),
            NullUart,
            FailingI2c::default(),
            Blink::default(),
            BridgeConfig::default(),
        )
    }

    #[test]
    fn idle_poll_does_nothing() {
        let mut bridge = bridge();
        assert!(bridge.poll().is_idle());
        assert_eq!(bridge.led().0, 0);
        assert_eq!(bridge.stats(), BridgeStats::default());
    }

    #[test]
    fn transport_failure_is_reported_not_retried() {
        let mut bridge = bridge();
        bridge
            .state()
            .on_receive_complete(PeripheralRole::Uart, b"PING\r\n");
        assert_eq!(bridge.process_uart_arrival(), Some(Err(BridgeError::Busy)));
        assert_eq!(bridge.i2c().armed, vec![6]);
        assert_eq!(bridge.stats().busy, 1);
        assert_eq!(bridge.led().0, 1);
        assert!(bridge.state().uart.is_idle());
        // 不自动重试
        assert_eq!(bridge.process_uart_arrival(), None);
    }

    #[test]
    fn uart_failure_leaves_i2c_direction_untouched() {
        let mut bridge = bridge();
        bridge
            .state()
            .on_receive_complete(PeripheralRole::I2c, b"PING\x27\x64");
        bridge
            .state()
            .on_receive_complete(PeripheralRole::Uart, b"STATUS?\r\n");
        let report = bridge.poll();
        assert_eq!(report.uart, Some(Err(BridgeError::Busy)));
        assert_eq!(report.i2c, Some(Ok(4)));
        assert_eq!(bridge.message_count(), 1);
    }

    #[test]
    fn overruns_show_in_stats() {
        let bridge = bridge();
        bridge
            .state()
            .on_receive_complete(PeripheralRole::Uart, b"FIRST\r\n");
        bridge
            .state()
            .on_receive_complete(PeripheralRole::Uart, b"SECOND\r\n");
        assert_eq!(bridge.stats().uart_overruns, 1);
        assert_eq!(bridge.stats().i2c_overruns, 0);
    }
}
