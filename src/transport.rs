//! 桥接所需的外设能力；ESP-IDF 实现见固件 crate，测试中用记录型 mock。

use std::time::Duration;

use crate::error::TransportError;

/// UART 输出口。
pub trait UartPort {
    /// 阻塞发送，最长等待 `timeout`。
    fn transmit(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), TransportError>;
}

/// I2C 主机发送 + 从机接收。
pub trait I2cPort {
    /// 向 7 位地址 `address` 发送 `bytes`，最长等待 `timeout`。
    fn master_transmit(
        &mut self,
        address: u8,
        bytes: &[u8],
        timeout: Duration,
    ) -> Result<(), TransportError>;

    /// 预备从机接收恰好 `expected_len` 字节；完成后接收上下文
    /// 调用 `BridgeState::on_receive_complete(PeripheralRole::I2c, ..)`。
    fn arm_slave_receive(&mut self, expected_len: usize);
}

/// 存活指示（LED），每个 UART 周期翻转一次。
pub trait LivenessIndicator {
    fn toggle(&mut self);
}

impl<T: UartPort + ?Sized> UartPort for &mut T {
    fn transmit(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), TransportError> {
        (**self).transmit(bytes, timeout)
    }
}

impl<T: I2cPort + ?Sized> I2cPort for &mut T {
    fn master_transmit(
        &mut self,
        address: u8,
        bytes: &[u8],
        timeout: Duration,
    ) -> Result<(), TransportError> {
        (**self).master_transmit(address, bytes, timeout)
    }

    fn arm_slave_receive(&mut self, expected_len: usize) {
        (**self).arm_slave_receive(expected_len)
    }
}

impl<T: LivenessIndicator + ?Sized> LivenessIndicator for &mut T {
    fn toggle(&mut self) {
        (**self).toggle()
    }
}
