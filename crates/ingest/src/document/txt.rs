use super::{ExtractionError, PageText};

/// Plain text reads as a single unpaged page. Invalid UTF-8 sequences are
/// replaced rather than rejected; the cleaner drops the replacement chars
/// along with everything else outside printable ASCII.
pub fn extract_txt(bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError> {
    Ok(vec![PageText {
        page_number: 1,
        text: String::from_utf8_lossy(bytes).trim().to_string(),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_whole_file_as_one_page() {
        let pages = extract_txt(b"Hello, world!\nSecond line.").unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].text, "Hello, world!\nSecond line.");
    }

    #[test]
    fn empty_file_yields_an_empty_page() {
        let pages = extract_txt(b"").unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].text.is_empty());
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let pages = extract_txt(b"ok \xff\xfe bytes").unwrap();
        assert!(pages[0].text.starts_with("ok"));
        assert!(pages[0].text.ends_with("bytes"));
    }
}
