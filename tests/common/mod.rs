//! A minimal multipart decoder, only good enough to check what the writer
//! produced.

#![allow(dead_code)]

pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

#[derive(Debug, PartialEq)]
pub struct DecodedPart {
    pub header_lines: Vec<String>,
    pub body: Vec<u8>,
}

impl DecodedPart {
    fn from_bytes(bs: &[u8]) -> Self {
        match twoway::find_bytes(bs, b"\r\n\r\n") {
            None => panic!("part without header/body separator: {:?}", bs),
            Some(i) => DecodedPart {
                header_lines: bs[..i]
                    .split(|b| *b == b'\n')
                    .map(|line| String::from_utf8_lossy(line).trim().to_string())
                    .collect(),
                body: bs[i + 4..].to_vec(),
            },
        }
    }

    /// The value of a `Content-Disposition` parameter such as `name`.
    pub fn disposition_param(&self, param: &str) -> Option<String> {
        let line = self
            .header_lines
            .iter()
            .find(|l| l.starts_with("Content-Disposition:"))?;

        let key = format!("{}=\"", param);
        line.split("; ")
            .find(|p| p.starts_with(&key))
            .map(|p| p[key.len()..p.len() - 1].to_string())
    }

    pub fn content_type(&self) -> Option<String> {
        self.header_lines
            .iter()
            .find(|l| l.starts_with("Content-Type:"))
            .map(|l| l["Content-Type:".len()..].trim().to_string())
    }
}

/// Splits a complete body into its parts. Panics on anything malformed.
pub fn decode(body: &[u8], boundary: &str) -> Vec<DecodedPart> {
    let delimiter = format!("--{}", boundary);
    let delimiter = delimiter.as_bytes();

    assert!(body.starts_with(delimiter), "body must open with a delimiter");

    let mut parts = Vec::new();
    let mut rest = &body[delimiter.len()..];

    loop {
        match &rest[..2] {
            b"\r\n" => rest = &rest[2..],
            b"--" => {
                assert_eq!(b"--\r\n", rest, "close delimiter must end the body");
                return parts;
            }
            slice => panic!("delimiter followed by {:?}", slice),
        }

        // Each part ends with CRLF, which belongs to the next delimiter.
        let mut needle = b"\r\n".to_vec();
        needle.extend_from_slice(delimiter);

        let end = twoway::find_bytes(rest, &needle).expect("unterminated part");
        parts.push(DecodedPart::from_bytes(&rest[..end]));
        rest = &rest[end + needle.len()..];
    }
}

pub fn read_file(path: &std::path::Path) -> Vec<u8> {
    std::fs::read(path).expect("read body")
}
