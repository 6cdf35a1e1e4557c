use std::sync::Arc;
use std::thread;
use std::time::Duration;

use esp_idf_hal::uart::{UartRxDriver, UartTxDriver};

use uart_i2c_bridge::console;
use uart_i2c_bridge::rx::RxAccumulator;
use uart_i2c_bridge::{BridgeConfig, BridgeState, PeripheralRole, TransportError, UartPort};

use crate::i2c_link::{ticks, transport_error};

/// 主机侧 UART 输出口。
pub struct EspUart {
    tx: UartTxDriver<'static>,
}

impl EspUart {
    pub fn new(tx: UartTxDriver<'static>) -> Self {
        Self { tx }
    }
}

impl UartPort for EspUart {
    fn transmit(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), TransportError> {
        let mut written = 0;
        while written < bytes.len() {
            written += self.tx.write(&bytes[written..]).map_err(transport_error)?;
        }
        self.tx.wait_done(ticks(timeout)).map_err(transport_error)
    }
}

/// 启动 UART 接收线程：满阈值或空闲即交付一次到达，然后立即继续接收。
pub fn spawn_uart_rx_task(
    rx: UartRxDriver<'static>,
    state: Arc<BridgeState>,
    config: &BridgeConfig,
) -> thread::JoinHandle<()> {
    let threshold = config.uart_rx_threshold;
    let idle = ticks(config.uart_idle_timeout);
    thread::spawn(move || {
        let mut acc = RxAccumulator::new(threshold);
        let mut buf = [0u8; 64];
        loop {
            match rx.read(&mut buf, idle) {
                Ok(count) if count > 0 => {
                    for &byte in &buf[..count] {
                        if let Some(block) = acc.push(byte) {
                            deliver(&state, &block);
                        }
                    }
                }
                Ok(_) => {
                    if let Some(block) = acc.flush_idle() {
                        deliver(&state, &block);
                    }
                }
                Err(err) => match transport_error(err) {
                    TransportError::Timeout => {
                        if let Some(block) = acc.flush_idle() {
                            deliver(&state, &block);
                        }
                    }
                    _ => log::warn!("UART RX error: {:?}", err),
                },
            }
        }
    })
}

fn deliver(state: &BridgeState, block: &[u8]) {
    console::log_bytes("UART RX:", block);
    state.on_receive_complete(PeripheralRole::Uart, block);
}
