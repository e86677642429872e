//! Text decoding for delimited uploads.
//! Spreadsheet exports on Portuguese-locale desktops are often Windows-1252 rather than UTF-8.

use encoding_rs::UTF_8;
use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;

/// Decodes bytes as UTF-8 (BOM stripped), falling back to Windows-1252
/// when the bytes are not valid UTF-8.
pub(crate) fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if !had_errors {
        return text;
    }
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8() {
        assert_eq!(decode_text("Função".as_bytes()), "Função");
    }

    #[test]
    fn strips_byte_order_mark() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFColaborador"), "Colaborador");
    }

    #[test]
    fn falls_back_to_windows_1252() {
        assert_eq!(decode_text(b"Fun\xE7\xE3o"), "Função");
    }
}
