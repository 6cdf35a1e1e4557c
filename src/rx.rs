/// UART 接收累计器：逐字节组装，满阈值或线路空闲时交付一次接收。
pub struct RxAccumulator {
    buffer: Vec<u8>,
    threshold: usize,
}

impl RxAccumulator {
    /// `threshold` 至少为 1。
    pub fn new(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            buffer: Vec::with_capacity(threshold),
            threshold,
        }
    }

    /// 推入一个字节，累计满阈值时返回该批数据。
    pub fn push(&mut self, byte: u8) -> Option<Vec<u8>> {
        self.buffer.push(byte);
        if self.buffer.len() >= self.threshold {
            return Some(self.take());
        }
        None
    }

    /// 线路空闲：交付未满阈值的残留数据。
    pub fn flush_idle(&mut self) -> Option<Vec<u8>> {
        if self.buffer.is_empty() {
            return None;
        }
        Some(self.take())
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn take(&mut self) -> Vec<u8> {
        std::mem::replace(&mut self.buffer, Vec::with_capacity(self.threshold))
    }
}
