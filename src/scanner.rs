//! 帧分隔符扫描：CR-LF 或第一个 0 字节，先出现者为帧尾。

/// 查找帧尾偏移；扫描范围内没有分隔符时返回 `None`。
///
/// 扫描不超过 `min(max, buf.len())` 个位置。CR 后的 LF 检查会读取
/// 下一个字节，但越界时视为不匹配。
pub fn find_delimiter(buf: &[u8], max: usize) -> Option<usize> {
    let limit = max.min(buf.len());
    (0..limit).find(|&idx| {
        let byte = buf[idx];
        byte == 0 || (byte == b'\r' && buf.get(idx + 1) == Some(&b'\n'))
    })
}

/// 帧长度；未找到分隔符时返回 0，与“偏移 0 处的空帧”相同。
///
/// 调用方的 `<= 2` 判断会把两种情况都当作无数据。
pub fn frame_len(buf: &[u8], max: usize) -> usize {
    find_delimiter(buf, max).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_ends_frame() {
        assert_eq!(find_delimiter(b"HELLO\r\n\0\0", 9), Some(5));
        assert_eq!(frame_len(b"AB\r\n", 4), 2);
    }

    #[test]
    fn zero_byte_ends_frame() {
        assert_eq!(frame_len(b"PING\0\0\0\0", 8), 4);
        assert_eq!(find_delimiter(b"\0ABC", 4), Some(0));
    }

    #[test]
    fn first_delimiter_wins() {
        assert_eq!(frame_len(b"AB\0CD\r\n", 7), 2);
        assert_eq!(frame_len(b"AB\r\nCD\0", 7), 2);
    }

    #[test]
    fn lone_cr_is_payload() {
        assert_eq!(frame_len(b"A\rB\r\n", 5), 3);
        assert_eq!(find_delimiter(b"AB\rC", 4), None);
    }

    #[test]
    fn missing_delimiter_is_zero() {
        assert_eq!(find_delimiter(b"0123456789", 10), None);
        assert_eq!(frame_len(b"0123456789", 10), 0);
    }

    #[test]
    fn scan_limit_is_respected() {
        // 分隔符位于扫描范围之外
        assert_eq!(find_delimiter(b"ABCD\0", 4), None);
        // max 大于缓冲长度时按缓冲长度截断
        assert_eq!(find_delimiter(b"ABC", 64), None);
        assert_eq!(find_delimiter(b"ABC\0", 64), Some(3));
    }

    #[test]
    fn trailing_cr_without_lf_is_not_a_delimiter() {
        // 最后一个可扫描位置的 CR，需要下一个字节是 LF 才算分隔符
        assert_eq!(find_delimiter(b"AB\r", 3), None);
        assert_eq!(find_delimiter(b"AB\r\n", 3), Some(2));
    }
}
