use std::time::Duration;

/// UART 接收缓冲容量。
pub const UART_BUFFER_SIZE: usize = 64;
/// I2C 从机接收缓冲容量。
pub const I2C_BUFFER_SIZE: usize = 64;
/// 固定 I2C 对端地址。
pub const DEFAULT_PEER_ADDRESS: u8 = 68;
/// 总线收发超时（ms）。
pub const DEFAULT_BUS_TIMEOUT_MS: u64 = 1000;
/// UART 累计到该字节数即触发一次到达。
pub const UART_RX_THRESHOLD: usize = 10;

const I2C_MAX_ADDRESS: u8 = 0x7F;

/// 桥接运行参数（编译期可由 .env 覆盖）。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    /// UART→I2C 主机发送的目标地址。
    pub peer_address: u8,
    /// 本机 I2C 从机地址；默认接线下主机口回环到本机从机口，与对端地址相同。
    pub slave_address: u8,
    pub bus_timeout: Duration,
    pub uart_rx_threshold: usize,
    /// UART 空闲多久视为一次接收结束。
    pub uart_idle_timeout: Duration,
    pub uart_baudrate: u32,
    pub i2c_frequency_hz: u32,
    pub poll_interval: Duration,
    pub stats_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            peer_address: DEFAULT_PEER_ADDRESS,
            slave_address: DEFAULT_PEER_ADDRESS,
            bus_timeout: Duration::from_millis(DEFAULT_BUS_TIMEOUT_MS),
            uart_rx_threshold: UART_RX_THRESHOLD,
            uart_idle_timeout: Duration::from_millis(20),
            uart_baudrate: 115_200,
            i2c_frequency_hz: 100_000,
            poll_interval: Duration::from_millis(5),
            stats_interval: Duration::from_secs(30),
        }
    }
}

impl BridgeConfig {
    /// 读取 build.rs 注入的编译期覆盖项。
    pub fn from_build_env() -> Self {
        Self::default().with_overrides([
            ("BRIDGE_PEER_ADDR", option_env!("BRIDGE_PEER_ADDR")),
            ("BRIDGE_SLAVE_ADDR", option_env!("BRIDGE_SLAVE_ADDR")),
            ("BRIDGE_UART_BAUD", option_env!("BRIDGE_UART_BAUD")),
            ("BRIDGE_I2C_FREQ_HZ", option_env!("BRIDGE_I2C_FREQ_HZ")),
            ("BRIDGE_BUS_TIMEOUT_MS", option_env!("BRIDGE_BUS_TIMEOUT_MS")),
        ])
    }

    /// 逐项应用覆盖；非法值保留默认并告警。
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        for (key, value) in overrides {
            let Some(value) = value else {
                continue;
            };
            if !self.apply(key, value.trim()) {
                log::warn!("Ignoring invalid {}={:?}, keeping default", key, value);
            }
        }
        self
    }

    fn apply(&mut self, key: &str, value: &str) -> bool {
        let applied = match key {
            "BRIDGE_PEER_ADDR" => parse_address(value).map(|addr| self.peer_address = addr),
            "BRIDGE_SLAVE_ADDR" => parse_address(value).map(|addr| self.slave_address = addr),
            "BRIDGE_UART_BAUD" => parse_nonzero(value).map(|baud| self.uart_baudrate = baud),
            "BRIDGE_I2C_FREQ_HZ" => parse_nonzero(value).map(|hz| self.i2c_frequency_hz = hz),
            "BRIDGE_BUS_TIMEOUT_MS" => parse_nonzero(value)
                .map(|ms| self.bus_timeout = Duration::from_millis(u64::from(ms))),
            _ => None,
        };
        applied.is_some()
    }
}

/// 7 位地址，支持十进制或 0x 前缀十六进制。
fn parse_address(value: &str) -> Option<u8> {
    let addr = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok()?,
        None => value.parse::<u8>().ok()?,
    };
    (addr <= I2C_MAX_ADDRESS).then_some(addr)
}

fn parse_nonzero(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_wiring() {
        let config = BridgeConfig::default();
        assert_eq!(config.peer_address, 68);
        assert_eq!(config.bus_timeout, Duration::from_millis(1000));
        assert_eq!(config.uart_rx_threshold, 10);
    }

    #[test]
    fn overrides_apply_valid_values() {
        let config = BridgeConfig::default().with_overrides([
            ("BRIDGE_PEER_ADDR", Some("0x2A")),
            ("BRIDGE_SLAVE_ADDR", Some("17")),
            ("BRIDGE_UART_BAUD", Some("9600")),
            ("BRIDGE_BUS_TIMEOUT_MS", Some(" 250 ")),
            ("BRIDGE_I2C_FREQ_HZ", None),
        ]);
        assert_eq!(config.peer_address, 0x2A);
        assert_eq!(config.slave_address, 17);
        assert_eq!(config.uart_baudrate, 9600);
        assert_eq!(config.bus_timeout, Duration::from_millis(250));
        assert_eq!(config.i2c_frequency_hz, 100_000);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = BridgeConfig::default().with_overrides([
            ("BRIDGE_PEER_ADDR", Some("0x80")),
            ("BRIDGE_UART_BAUD", Some("fast")),
            ("BRIDGE_BUS_TIMEOUT_MS", Some("0")),
            ("UNKNOWN_KEY", Some("1")),
        ]);
        assert_eq!(config, BridgeConfig::default());
    }
}
