//! Bounds-checked little-endian reads shared by the header and table decoders.

use crate::error::{FormatError, Result};

/// Returns `bytes[offset..offset + len]`, or [`FormatError::Truncated`].
pub(crate) fn region<'a>(
    bytes: &'a [u8],
    offset: usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8]> {
    let end = offset
        .checked_add(len)
        .ok_or(FormatError::OffsetOverflow { what })?;
    bytes.get(offset..end).ok_or(FormatError::Truncated {
        what,
        offset,
        len,
        available: bytes.len(),
    })
}

/// Resolves an offset stored relative to the structure starting at `base`.
pub(crate) fn resolve(base: usize, relative: u32, what: &'static str) -> Result<usize> {
    base.checked_add(relative as usize)
        .ok_or(FormatError::OffsetOverflow { what })
}

/// Byte length of `count` entries of `stride` bytes.
pub(crate) fn table_len(count: u32, stride: usize, what: &'static str) -> Result<usize> {
    (count as usize)
        .checked_mul(stride)
        .ok_or(FormatError::OffsetOverflow { what })
}

pub(crate) fn read_array<const N: usize>(
    bytes: &[u8],
    offset: usize,
    what: &'static str,
) -> Result<[u8; N]> {
    let slice = region(bytes, offset, N, what)?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

pub(crate) fn read_u32_le(bytes: &[u8], offset: usize, what: &'static str) -> Result<u32> {
    read_array::<4>(bytes, offset, what).map(u32::from_le_bytes)
}

/// Reads a NUL-terminated UTF-8 string starting at `offset` within `table`.
pub(crate) fn read_cstring(table: &[u8], offset: u32) -> Result<&str> {
    let tail = table
        .get(offset as usize..)
        .filter(|tail| !tail.is_empty())
        .ok_or(FormatError::InvalidSymbol {
            offset,
            reason: "offset is outside the symbol table",
        })?;
    let nul = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(FormatError::InvalidSymbol {
            offset,
            reason: "missing null terminator",
        })?;
    core::str::from_utf8(&tail[..nul]).map_err(|_| FormatError::InvalidSymbol {
        offset,
        reason: "name is not valid UTF-8",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_reports_truncation() {
        let bytes = [0u8; 8];
        assert_eq!(region(&bytes, 4, 4, "x").unwrap().len(), 4);
        assert_eq!(
            region(&bytes, 6, 4, "x"),
            Err(FormatError::Truncated {
                what: "x",
                offset: 6,
                len: 4,
                available: 8,
            })
        );
        assert_eq!(
            region(&bytes, usize::MAX, 4, "x"),
            Err(FormatError::OffsetOverflow { what: "x" })
        );
    }

    #[test]
    fn cstrings() {
        let table = b"main\0tex\0bad";
        assert_eq!(read_cstring(table, 0), Ok("main"));
        assert_eq!(read_cstring(table, 5), Ok("tex"));
        assert_eq!(read_cstring(table, 6), Ok("ex"));
        assert!(matches!(
            read_cstring(table, 9),
            Err(FormatError::InvalidSymbol { offset: 9, .. })
        ));
        assert!(matches!(
            read_cstring(table, 12),
            Err(FormatError::InvalidSymbol { offset: 12, .. })
        ));
    }
}
