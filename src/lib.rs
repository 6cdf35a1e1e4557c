//! UART ⇄ I2C 帧桥接核心：分隔符扫描、CRC16 帧编解码、到达标志与双向转发。
//!
//! 硬件相关部分（ESP-IDF 驱动、灯带）位于二进制 crate，本库只依赖
//! `transport` 中的能力 trait，可在主机上直接测试。

pub mod bridge;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod console;
pub mod error;
pub mod flags;
pub mod rx;
pub mod scanner;
pub mod state;
pub mod stats;
pub mod transport;

pub use bridge::{Bridge, PollReport};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result, TransportError};
pub use state::{BridgeState, PeripheralRole};
pub use stats::BridgeStats;
pub use transport::{I2cPort, LivenessIndicator, UartPort};
