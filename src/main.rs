// 固件入口：UART（主机）⇄ I2C（对端）帧桥接
#[cfg(target_os = "espidf")]
mod i2c_link;
#[cfg(target_os = "espidf")]
mod smart_led;
#[cfg(target_os = "espidf")]
mod uart_link;

#[cfg(target_os = "espidf")]
fn main() {
    use std::sync::Arc;
    use std::time::Instant;

    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver, I2cSlaveConfig, I2cSlaveDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_hal::uart;
    use uart_i2c_bridge::config::I2C_BUFFER_SIZE;
    use uart_i2c_bridge::stats::StatsReporter;
    use uart_i2c_bridge::{Bridge, BridgeConfig, BridgeState};

    // ESP-IDF 运行时初始化（链接补丁 & 日志）
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let config = BridgeConfig::from_build_env();
    log::info!(
        "UART/I2C bridge booting: peer {:#04X}, slave {:#04X}, bus timeout {:?}",
        config.peer_address,
        config.slave_address,
        config.bus_timeout
    );

    // 外设：UART1 接主机，I2C0 主机口，I2C1 从机口，RMT 驱动心跳灯
    let peripherals = Peripherals::take().unwrap();
    let pins = peripherals.pins;
    let uart_config = uart::config::Config::new().baudrate(Hertz(config.uart_baudrate));
    let uart = uart::UartDriver::new(
        peripherals.uart1,
        pins.gpio17,
        pins.gpio18,
        AnyInputPin::none(),
        AnyOutputPin::none(),
        &uart_config,
    )
    .unwrap();
    let (uart_tx, uart_rx) = uart.into_split();

    let master_config = I2cConfig::new().baudrate(Hertz(config.i2c_frequency_hz));
    let master = I2cDriver::new(peripherals.i2c0, pins.gpio8, pins.gpio9, &master_config).unwrap();
    let slave_config = I2cSlaveConfig::new()
        .rx_buffer_length(I2C_BUFFER_SIZE * 2)
        .tx_buffer_length(I2C_BUFFER_SIZE);
    let slave = I2cSlaveDriver::new(
        peripherals.i2c1,
        pins.gpio4,
        pins.gpio5,
        config.slave_address,
        &slave_config,
    )
    .unwrap();
    let led = smart_led::LivenessLed::new(peripherals.rmt.channel0, pins.gpio48);

    // 接收线程只写缓冲和标志，校验与转发都在前台循环
    let state = Arc::new(BridgeState::new());
    let arm = i2c_link::SlaveArm::new();
    let _uart_rx_handle = uart_link::spawn_uart_rx_task(uart_rx, state.clone(), &config);
    let _i2c_rx_handle = i2c_link::spawn_slave_rx_task(slave, arm.clone(), state.clone());

    let poll_ms = config.poll_interval.as_millis() as u32;
    let mut reporter = StatsReporter::new(config.stats_interval);
    let mut bridge = Bridge::new(
        state,
        uart_link::EspUart::new(uart_tx),
        i2c_link::EspI2c::new(master, arm),
        led,
        config,
    );

    loop {
        let _ = bridge.poll();
        reporter.maybe_report(Instant::now(), &bridge.stats());
        FreeRtos::delay_ms(poll_ms);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("uart-i2c-bridge: firmware image targets ESP-IDF; nothing to run on this host");
}
