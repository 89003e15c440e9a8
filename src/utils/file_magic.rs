/// 检查文件开头的魔术字节是否与声明的 MIME 类型一致
///
/// 没有固定签名的类型（纯文本等）直接放行；已知签名不匹配或内容为空时返回 `false`。
pub fn validate_magic_bytes(data: &[u8], content_type: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "image/png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
        "image/jpeg" | "image/jpg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        "image/gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
        "image/webp" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",

        "application/pdf" => data.starts_with(b"%PDF"),
        // OLE 复合文档
        "application/msword" | "application/vnd.ms-excel" | "application/vnd.ms-powerpoint" => {
            data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        }
        // OOXML 与 zip 同一签名
        "application/zip"
        | "application/x-zip-compressed"
        | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        | "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
            data.starts_with(&[0x50, 0x4B, 0x03, 0x04])
        }
        "application/x-rar-compressed" | "application/vnd.rar" => data.starts_with(b"Rar!"),
        "application/x-7z-compressed" => {
            data.starts_with(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C])
        }
        "application/gzip" | "application/x-gzip" => data.starts_with(&[0x1F, 0x8B]),

        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_magic() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(validate_magic_bytes(&png_header, "image/png"));
        assert!(validate_magic_bytes(&png_header, "IMAGE/PNG"));
        assert!(!validate_magic_bytes(&png_header, "image/jpeg"));
    }

    #[test]
    fn test_pdf_magic() {
        assert!(validate_magic_bytes(b"%PDF-1.7\n", "application/pdf"));
        assert!(validate_magic_bytes(b"%PDF-1.7\n", "application/pdf; charset=binary"));
        assert!(!validate_magic_bytes(b"hello", "application/pdf"));
    }

    #[test]
    fn test_docx_magic() {
        let zip = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
        assert!(validate_magic_bytes(
            &zip,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        ));
        assert!(!validate_magic_bytes(&zip, "application/msword"));
    }

    #[test]
    fn test_text_passes() {
        assert!(validate_magic_bytes(b"Hello, World!", "text/plain"));
    }

    #[test]
    fn test_empty_data() {
        assert!(!validate_magic_bytes(&[], "image/png"));
        assert!(!validate_magic_bytes(&[], "text/plain"));
    }
}
