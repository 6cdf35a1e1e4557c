use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::{BridgeError, TransportError};

/// 诊断计数（周期性以 JSON 输出到日志）。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BridgeStats {
    /// 已处理的 UART 帧（含无数据与失败）。
    pub uart_frames: u32,
    /// 已处理的 I2C 帧，即消息序号。
    pub i2c_frames: u32,
    pub i2c_sent: u32,
    pub crc_ok: u32,
    pub crc_failures: u32,
    pub no_data: u32,
    pub bus_errors: u32,
    pub busy: u32,
    pub timeouts: u32,
    pub uart_write_failures: u32,
    pub uart_overruns: u32,
    pub i2c_overruns: u32,
}

impl BridgeStats {
    /// 按错误类型计数。
    pub fn record_error(&mut self, err: &BridgeError) {
        let counter = match err {
            BridgeError::NoData => &mut self.no_data,
            BridgeError::CrcMismatch { .. } => &mut self.crc_failures,
            BridgeError::Bus | BridgeError::FrameTooLong { .. } => &mut self.bus_errors,
            BridgeError::Busy => &mut self.busy,
            BridgeError::Timeout => &mut self.timeouts,
        };
        *counter = counter.wrapping_add(1);
    }

    pub fn record_transport(&mut self, err: TransportError) {
        self.record_error(&BridgeError::from(err));
    }

    /// 序列化为 JSON 字符串。
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// 定期输出统计：到达间隔且内容有变化时才输出。
pub struct StatsReporter {
    interval: Duration,
    last_at: Option<Instant>,
    last: BridgeStats,
}

impl StatsReporter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_at: None,
            last: BridgeStats::default(),
        }
    }

    /// 返回本次是否输出了日志。
    pub fn maybe_report(&mut self, now: Instant, stats: &BridgeStats) -> bool {
        if let Some(last_at) = self.last_at {
            if now.saturating_duration_since(last_at) < self.interval {
                return false;
            }
        }
        self.last_at = Some(now);
        if *stats == self.last {
            return false;
        }
        self.last = stats.clone();
        log::info!("bridge stats: {}", stats.to_json_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_land_in_their_counters() {
        let mut stats = BridgeStats::default();
        stats.record_error(&BridgeError::NoData);
        stats.record_error(&BridgeError::CrcMismatch {
            computed: 1,
            received: 2,
        });
        stats.record_transport(TransportError::Busy);
        stats.record_transport(TransportError::Timeout);
        stats.record_transport(TransportError::Timeout);
        assert_eq!(stats.no_data, 1);
        assert_eq!(stats.crc_failures, 1);
        assert_eq!(stats.busy, 1);
        assert_eq!(stats.timeouts, 2);
        assert_eq!(stats.bus_errors, 0);
    }

    #[test]
    fn json_uses_field_names() {
        let stats = BridgeStats {
            i2c_frames: 3,
            ..BridgeStats::default()
        };
        let value: serde_json::Value = serde_json::from_str(&stats.to_json_string()).unwrap();
        assert_eq!(value["i2c_frames"], 3);
        assert_eq!(value["crc_failures"], 0);
    }

    #[test]
    fn reporter_waits_for_interval_and_change() {
        let mut reporter = StatsReporter::new(Duration::from_secs(30));
        let start = Instant::now();
        let mut stats = BridgeStats::default();
        // 首次无变化不输出
        assert!(!reporter.maybe_report(start, &stats));
        stats.uart_frames = 1;
        assert!(!reporter.maybe_report(start + Duration::from_secs(10), &stats));
        assert!(reporter.maybe_report(start + Duration::from_secs(31), &stats));
        assert!(!reporter.maybe_report(start + Duration::from_secs(62), &stats));
    }
}
