use bytes::{BufMut, BytesMut};

use crate::Boundary;

const CRLF: &[u8] = b"\r\n";

/// The file part of a body: its form field name, the filename announced to
/// the server and the declared content type.
///
/// All three are written verbatim, nothing is escaped or validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub name: String,
    pub filename: String,
    pub mime_type: String,
}

impl FilePart {
    pub fn new<N, F, M>(name: N, filename: F, mime_type: M) -> Self
    where
        N: Into<String>,
        F: Into<String>,
        M: Into<String>,
    {
        let part = FilePart {
            name: name.into(),
            filename: filename.into(),
            mime_type: mime_type.into(),
        };

        if part.mime_type.parse::<mime::Mime>().is_err() {
            log::warn!(
                "Content-Type {:?} for {:?} is not a valid MIME type, writing it as is",
                part.mime_type,
                part.filename
            );
        }

        part
    }

    /// Delimiter and headers up to and including the blank line preceding
    /// the file bytes.
    pub(crate) fn head(&self, boundary: &Boundary) -> BytesMut {
        let mut buf = BytesMut::with_capacity(
            128 + boundary.as_str().len()
                + self.name.len()
                + self.filename.len()
                + self.mime_type.len(),
        );

        put_delimiter(&mut buf, boundary);
        buf.put_slice(b"Content-Disposition: form-data; name=\"");
        buf.put_slice(self.name.as_bytes());
        buf.put_slice(b"\"; filename=\"");
        buf.put_slice(self.filename.as_bytes());
        buf.put_slice(b"\"");
        buf.put_slice(CRLF);
        buf.put_slice(b"Content-Type: ");
        buf.put_slice(self.mime_type.as_bytes());
        buf.put_slice(CRLF);
        buf.put_slice(CRLF);
        buf
    }
}

/// A complete text field part, including the CRLF ending its value.
pub(crate) fn field(boundary: &Boundary, name: &str, value: &str) -> BytesMut {
    let mut buf =
        BytesMut::with_capacity(64 + boundary.as_str().len() + name.len() + value.len());

    put_delimiter(&mut buf, boundary);
    buf.put_slice(b"Content-Disposition: form-data; name=\"");
    buf.put_slice(name.as_bytes());
    buf.put_slice(b"\"");
    buf.put_slice(CRLF);
    buf.put_slice(CRLF);
    buf.put_slice(value.as_bytes());
    buf.put_slice(CRLF);
    buf
}

/// CRLF ending the file bytes followed by the close delimiter.
pub(crate) fn trailer(boundary: &Boundary) -> BytesMut {
    let close = boundary.close_delimiter();
    let mut buf = BytesMut::with_capacity(close.len() + 4);
    buf.put_slice(CRLF);
    buf.put_slice(close.as_bytes());
    buf.put_slice(CRLF);
    buf
}

fn put_delimiter(buf: &mut BytesMut, boundary: &Boundary) {
    buf.put_slice(b"--");
    buf.put_slice(boundary.as_str().as_bytes());
    buf.put_slice(CRLF);
}

#[cfg(test)]
mod tests {

    use super::*;

    fn boundary() -> Boundary {
        Boundary::new("BOUND123").expect("valid boundary")
    }

    #[test]
    fn field_framing() {
        let exp = "--BOUND123\r
Content-Disposition: form-data; name=\"user\"\r
\r
alice\r
";
        assert_eq!(exp.as_bytes(), &field(&boundary(), "user", "alice")[..]);
    }

    #[test]
    fn empty_field_value() {
        let exp = "--BOUND123\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\n\r\n";
        assert_eq!(exp.as_bytes(), &field(&boundary(), "note", "")[..]);
    }

    #[test]
    fn file_head_framing() {
        let part = FilePart::new("avatar", "photo.jpg", "image/jpeg");
        let exp = "--BOUND123\r
Content-Disposition: form-data; name=\"avatar\"; filename=\"photo.jpg\"\r
Content-Type: image/jpeg\r
\r
";
        assert_eq!(exp.as_bytes(), &part.head(&boundary())[..]);
    }

    #[test]
    fn invalid_mime_is_written_through() {
        let part = FilePart::new("doc", "a.bin", "not a mime");
        let head = part.head(&boundary());
        assert!(twoway::find_bytes(&head, b"Content-Type: not a mime\r\n").is_some());
    }

    #[test]
    fn trailer_framing() {
        assert_eq!(&b"\r\n--BOUND123--\r\n"[..], &trailer(&boundary())[..]);
    }
}
