use std::fmt::Write as _;

/// 格式化为 `prefix AA BB CC` 的十六进制行。
pub fn hex_line(prefix: &str, bytes: &[u8]) -> String {
    let mut line = String::with_capacity(prefix.len() + bytes.len() * 3 + 1);
    line.push_str(prefix);
    for byte in bytes {
        let _ = write!(line, " {:02X}", byte);
    }
    line
}

/// 调试级别输出帧内容；空数据不输出。
pub fn log_bytes(prefix: &str, bytes: &[u8]) {
    if bytes.is_empty() || !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!("{}", hex_line(prefix, bytes));
}

/// 末尾最多 `count` 个字节（帧尾含 CRC，便于排查）。
pub fn tail(bytes: &[u8], count: usize) -> &[u8] {
    &bytes[bytes.len().saturating_sub(count)..]
}
