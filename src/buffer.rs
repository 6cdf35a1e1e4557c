use crate::scanner;

/// 固定容量接收缓冲；逻辑长度由扫描得出，未使用的尾部恒为 0。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> FrameBuffer<N> {
    pub const CAPACITY: usize = N;

    pub const fn new() -> Self {
        Self { bytes: [0; N] }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// 覆盖写入接收数据并清零尾部；超出容量的部分丢弃，返回实际写入长度。
    pub fn store(&mut self, data: &[u8]) -> usize {
        let len = data.len().min(N);
        self.bytes[..len].copy_from_slice(&data[..len]);
        self.bytes[len..].fill(0);
        len
    }

    /// 清零整个容量（不只是帧长度）。
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    pub fn is_clear(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }

    /// 按分隔符规则得到的帧长度。
    pub fn frame_len(&self) -> usize {
        scanner::frame_len(&self.bytes, N)
    }
}

impl<const N: usize> Default for FrameBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
