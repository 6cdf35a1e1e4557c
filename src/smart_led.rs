use std::time::Duration;

use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::rmt::{config::TransmitConfig, FixedLengthSignal, PinState, Pulse, TxRmtDriver};
use esp_idf_hal::sys::EspError;
use esp_idf_hal::{peripheral::Peripheral, rmt::RmtChannel};
use smart_leds::{SmartLedsWrite, RGB8};

use uart_i2c_bridge::LivenessIndicator;

// 亮度缩放（约 10%），仅作心跳指示。
const BRIGHTNESS_SCALE: u16 = 26;
const HEARTBEAT_COLOR: RGB8 = RGB8 { r: 0, g: 255, b: 0 };

/// WS2812 单灯（RMT 发送 GRB 24bit）。
pub struct Ws2812<'d> {
    tx: TxRmtDriver<'d>,
}

impl<'d> Ws2812<'d> {
    pub fn new<C, P, Ch, Pin>(channel: C, pin: P) -> Result<Self, EspError>
    where
        C: Peripheral<P = Ch> + 'd,
        P: Peripheral<P = Pin> + 'd,
        Ch: RmtChannel,
        Pin: OutputPin,
    {
        let config = TransmitConfig::new().clock_divider(1);
        let tx = TxRmtDriver::new(channel, pin, &config)?;
        Ok(Self { tx })
    }

    fn signal(&self, color: RGB8) -> Result<FixedLengthSignal<24>, EspError> {
        let scale = |v: u8| ((v as u16 * BRIGHTNESS_SCALE) / 255) as u32;
        let grb = (scale(color.g) << 16) | (scale(color.r) << 8) | scale(color.b);
        let hz = self.tx.counter_clock()?;
        let zero = (
            Pulse::new_with_duration(hz, PinState::High, &Duration::from_nanos(350))?,
            Pulse::new_with_duration(hz, PinState::Low, &Duration::from_nanos(800))?,
        );
        let one = (
            Pulse::new_with_duration(hz, PinState::High, &Duration::from_nanos(700))?,
            Pulse::new_with_duration(hz, PinState::Low, &Duration::from_nanos(600))?,
        );
        let mut signal = FixedLengthSignal::<24>::new();
        for bit in 0..24usize {
            let set = grb & (1 << (23 - bit)) != 0;
            signal.set(bit, if set { &one } else { &zero })?;
        }
        Ok(signal)
    }
}

impl SmartLedsWrite for Ws2812<'_> {
    type Color = RGB8;
    type Error = EspError;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let color = iterator
            .into_iter()
            .next()
            .map(Into::into)
            .unwrap_or_default();
        let signal = self.signal(color)?;
        self.tx.start_blocking(&signal)
    }
}

/// 心跳灯：每个 UART 处理周期翻转一次；初始化失败时静默降级。
pub struct LivenessLed {
    led: Option<Ws2812<'static>>,
    lit: bool,
}

impl LivenessLed {
    pub fn new<C, P, Ch, Pin>(channel: C, pin: P) -> Self
    where
        C: Peripheral<P = Ch> + 'static,
        P: Peripheral<P = Pin> + 'static,
        Ch: RmtChannel,
        Pin: OutputPin,
    {
        let led = match Ws2812::new(channel, pin) {
            Ok(mut led) => {
                if let Err(err) = led.write([RGB8::default()]) {
                    log::warn!("Liveness LED reset failed: {:?}", err);
                }
                Some(led)
            }
            Err(err) => {
                log::warn!("Liveness LED init failed: {:?}", err);
                None
            }
        };
        Self { led, lit: false }
    }
}

impl LivenessIndicator for LivenessLed {
    fn toggle(&mut self) {
        let Some(led) = self.led.as_mut() else {
            return;
        };
        self.lit = !self.lit;
        let color = if self.lit { HEARTBEAT_COLOR } else { RGB8::default() };
        if let Err(err) = led.write([color]) {
            log::warn!("Liveness LED update failed: {:?}", err);
        }
    }
}
