//! CRC16 帧编解码：`[payload][crc 低字节][crc 高字节]`。
//!
//! 算法为 CRC-16/IBM-3740（多项式 0x1021，初值 0xFFFF），须与 I2C 对端一致。

use crc::{Crc, CRC_16_IBM_3740};

use crate::error::{BridgeError, Result};

/// 帧尾 CRC 字节数。
pub const CRC_LEN: usize = 2;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// 计算 CRC16。
pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// 对 `buf[..len]` 计算 CRC 并写到其后两个字节，返回新的帧长度 `len + 2`。
pub fn frame_with_crc(buf: &mut [u8], len: usize) -> Result<usize> {
    let total = len + CRC_LEN;
    if total > buf.len() {
        return Err(BridgeError::FrameTooLong {
            len,
            capacity: buf.len(),
        });
    }
    let crc = crc16(&buf[..len]);
    buf[len..total].copy_from_slice(&crc.to_le_bytes());
    Ok(total)
}

/// 读取帧尾 `buf[len-2..len]` 中声明的 CRC。
pub fn extract_crc(buf: &[u8], len: usize) -> Option<u16> {
    if len < CRC_LEN || len > buf.len() {
        return None;
    }
    Some(u16::from_le_bytes([buf[len - 2], buf[len - 1]]))
}

/// 校验帧：对 `buf[..len-2]` 重新计算 CRC 并与帧尾比较。
pub fn verify(buf: &[u8], len: usize) -> bool {
    match extract_crc(buf, len) {
        Some(received) => crc16(&buf[..len - CRC_LEN]) == received,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value_matches_ccitt_false() {
        assert_eq!(crc16(b"123456789"), 0x29B1);
        assert_eq!(crc16(b""), 0xFFFF);
    }

    #[test]
    fn frame_appends_little_endian_crc() {
        let mut buf = [0u8; 16];
        buf[..5].copy_from_slice(b"HELLO");
        let total = frame_with_crc(&mut buf, 5).unwrap();
        assert_eq!(total, 7);
        assert_eq!(&buf[..7], &[b'H', b'E', b'L', b'L', b'O', 0xD6, 0x49]);
        assert_eq!(extract_crc(&buf, total), Some(0x49D6));
        assert!(verify(&buf, total));
    }

    #[test]
    fn frame_fills_buffer_exactly() {
        let mut buf = *b"PING\0\0";
        assert_eq!(frame_with_crc(&mut buf, 4), Ok(6));
        assert!(verify(&buf, 6));
    }

    #[test]
    fn frame_rejects_overflow() {
        let mut buf = *b"PING\0";
        assert_eq!(
            frame_with_crc(&mut buf, 4),
            Err(BridgeError::FrameTooLong { len: 4, capacity: 5 })
        );
        // 失败时不改动缓冲
        assert_eq!(&buf, b"PING\0");
    }

    #[test]
    fn any_single_byte_corruption_fails_verification() {
        let mut framed = [0u8; 11];
        framed[..9].copy_from_slice(b"TEMP=21.5");
        let total = frame_with_crc(&mut framed, 9).unwrap();
        for idx in 0..total {
            for flip in [0x01u8, 0x80, 0xFF] {
                let mut corrupted = framed;
                corrupted[idx] ^= flip;
                assert!(!verify(&corrupted, total), "byte {} flip {:#04X}", idx, flip);
            }
        }
    }

    #[test]
    fn malformed_lengths_do_not_verify() {
        let buf = [0xFFu8, 0xFF];
        assert_eq!(extract_crc(&buf, 1), None);
        assert_eq!(extract_crc(&buf, 3), None);
        assert!(!verify(&buf, 1));
        // 空载荷的 CRC 即初值 0xFFFF
        assert!(verify(&buf, 2));
    }
}
