/// 传输层失败（原样来自总线驱动）。
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("bus error")]
    Bus,
    #[error("bus or peripheral busy")]
    Busy,
    #[error("operation timed out")]
    Timeout,
}

/// 单次处理周期内的错误（只记录，不重试）。
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// 帧太短，不含有效载荷。
    #[error("no data in frame")]
    NoData,

    #[error("crc mismatch (computed {computed:#06X}, received {received:#06X})")]
    CrcMismatch { computed: u16, received: u16 },

    /// 载荷加 CRC 超出缓冲容量。
    #[error("frame too long ({len} bytes + crc, capacity {capacity})")]
    FrameTooLong { len: usize, capacity: usize },

    #[error("bus error")]
    Bus,
    #[error("bus or peripheral busy")]
    Busy,
    #[error("bus operation timed out")]
    Timeout,
}

impl BridgeError {
    /// 是否为传输层错误。
    pub fn is_transport(&self) -> bool {
        matches!(self, BridgeError::Bus | BridgeError::Busy | BridgeError::Timeout)
    }
}

impl From<TransportError> for BridgeError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Bus => BridgeError::Bus,
            TransportError::Busy => BridgeError::Busy,
            TransportError::Timeout => BridgeError::Timeout,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
