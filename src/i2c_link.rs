use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use esp_idf_hal::delay::TickType;
use esp_idf_hal::i2c::{I2cDriver, I2cSlaveDriver};
use esp_idf_hal::sys::{EspError, TickType_t, ESP_ERR_INVALID_STATE, ESP_ERR_TIMEOUT};

use uart_i2c_bridge::config::I2C_BUFFER_SIZE;
use uart_i2c_bridge::{BridgeState, I2cPort, PeripheralRole, TransportError};

// 从机读取的单次等待，也是未预备时的轮询间隔。
const SLAVE_POLL_MS: u64 = 10;

/// ESP-IDF 错误码映射到传输错误。
pub fn transport_error(err: EspError) -> TransportError {
    let code = err.code();
    if code == ESP_ERR_TIMEOUT as i32 {
        TransportError::Timeout
    } else if code == ESP_ERR_INVALID_STATE as i32 {
        TransportError::Busy
    } else {
        TransportError::Bus
    }
}

pub fn ticks(timeout: Duration) -> TickType_t {
    TickType::new_millis(timeout.as_millis() as u64).ticks()
}

/// 从机接收预备长度（0 表示未预备），由主机侧写入、接收线程读取。
#[derive(Clone, Default)]
pub struct SlaveArm(Arc<AtomicUsize>);

impl SlaveArm {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, expected_len: usize) {
        self.0.store(expected_len, Ordering::Release);
    }

    fn expected(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    /// 仅当仍是同一次预备时解除。
    fn complete(&self, expected_len: usize) -> bool {
        self.0
            .compare_exchange(expected_len, 0, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// I2C 主机发送口 + 从机接收预备。
pub struct EspI2c {
    master: I2cDriver<'static>,
    arm: SlaveArm,
}

impl EspI2c {
    pub fn new(master: I2cDriver<'static>, arm: SlaveArm) -> Self {
        Self { master, arm }
    }
}

impl I2cPort for EspI2c {
    fn master_transmit(
        &mut self,
        address: u8,
        bytes: &[u8],
        timeout: Duration,
    ) -> Result<(), TransportError> {
        self.master
            .write(address, bytes, ticks(timeout))
            .map_err(transport_error)
    }

    fn arm_slave_receive(&mut self, expected_len: usize) {
        self.arm.set(expected_len.min(I2C_BUFFER_SIZE));
    }
}

/// 启动 I2C 从机接收线程：收满预备长度后交付一次到达并解除预备。
pub fn spawn_slave_rx_task(
    mut slave: I2cSlaveDriver<'static>,
    arm: SlaveArm,
    state: Arc<BridgeState>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut frame = [0u8; I2C_BUFFER_SIZE];
        let mut received = 0;
        let mut armed_for = 0;
        let wait = ticks(Duration::from_millis(SLAVE_POLL_MS));
        loop {
            let expected = arm.expected();
            if expected == 0 {
                received = 0;
                thread::sleep(Duration::from_millis(SLAVE_POLL_MS));
                continue;
            }
            if expected != armed_for {
                // 重新预备：丢弃未完成的部分
                armed_for = expected;
                received = 0;
            }
            match slave.read(&mut frame[received..expected], wait) {
                Ok(count) => received += count,
                Err(err) => match transport_error(err) {
                    TransportError::Timeout => {}
                    _ => log::warn!("I2C slave RX error: {:?}", err),
                },
            }
            if received >= expected && arm.complete(expected) {
                state.on_receive_complete(PeripheralRole::I2c, &frame[..expected]);
                received = 0;
                armed_for = 0;
            }
        }
    })
}
