//! Alignment probing used to split a slice into prefix, body and tail.

use std::mem::size_of;

/// Number of leading bytes to consume before `addr` sits on `boundary`.
///
/// `boundary` must be a power of two. The result is in `[0, boundary)`.
#[inline]
pub const fn alignment_offset(addr: usize, boundary: usize) -> usize {
    debug_assert!(boundary.is_power_of_two());
    boundary.wrapping_sub(addr) & (boundary - 1)
}

/// Number of leading elements of `data` to process before the remaining
/// slice starts on `boundary`.
///
/// Returns `None` when the byte offset is not a whole number of elements,
/// in which case no element split can reach the boundary.
#[inline]
pub fn prefix_elements<T>(data: &[T], boundary: usize) -> Option<usize> {
    let size = size_of::<T>();
    let offset = alignment_offset(data.as_ptr() as usize, boundary);
    if size == 0 || offset % size != 0 {
        return None;
    }
    Some(offset / size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_offset() {
        assert_eq!(alignment_offset(0, 16), 0);
        assert_eq!(alignment_offset(1, 16), 15);
        assert_eq!(alignment_offset(15, 16), 1);
        assert_eq!(alignment_offset(16, 16), 0);
        assert_eq!(alignment_offset(33, 32), 31);
        assert_eq!(alignment_offset(0x1000_0004, 64), 60);
    }

    #[test]
    fn test_offset_is_in_range() {
        for boundary in [16usize, 32, 64] {
            for addr in 0..256usize {
                let offset = alignment_offset(addr, boundary);
                assert!(offset < boundary);
                assert_eq!((addr + offset) % boundary, 0);
            }
        }
    }

    #[test]
    fn test_prefix_elements_reaches_boundary() {
        let data = vec![0u16; 100];
        for start in 0..16 {
            let slice = &data[start..];
            let prefix = prefix_elements(slice, 16).unwrap();
            assert!(prefix < 8);
            let body = slice[prefix..].as_ptr() as usize;
            assert_eq!(body % 16, 0);
        }
    }

    #[test]
    fn test_prefix_elements_rejects_split_element() {
        let bytes = [0u8; 64];
        let base = alignment_offset(bytes.as_ptr() as usize, 16);
        // Three-byte elements only reach the boundary when the gap divides by 3.
        let start = base + 1;
        let odd: &[[u8; 3]] = unsafe {
            std::slice::from_raw_parts(bytes.as_ptr().add(start) as *const [u8; 3], 10)
        };
        assert_eq!(prefix_elements(odd, 16), Some(5));
        let odd: &[[u8; 3]] = unsafe {
            std::slice::from_raw_parts(bytes.as_ptr().add(base + 2) as *const [u8; 3], 10)
        };
        assert_eq!(prefix_elements(odd, 16), None);
    }
}
