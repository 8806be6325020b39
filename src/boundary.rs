use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use http::header::HeaderValue;
use rand::{rngs::OsRng, RngCore};

use crate::{Error, Result};

const PREFIX: &str = "Boundary+";

/// RFC 2046 caps a boundary at 70 characters.
pub const MAX_BOUNDARY_LEN: usize = 70;

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A delimiter token separating the parts of a multipart body.
///
/// The same token must be used for the body and for the `Content-Type`
/// header announcing it, see [`content_type`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boundary(String);

impl Boundary {
    /// Validates `token` against the RFC 2046 boundary grammar.
    pub fn new<S: Into<String>>(token: S) -> Result<Self> {
        let token = token.into();

        if is_valid(&token) {
            Ok(Boundary(token))
        } else {
            Err(Error::InvalidBoundary(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The line opening every part: `--<token>`.
    pub fn delimiter(&self) -> String {
        format!("--{}", self.0)
    }

    /// The line closing the body: `--<token>--`.
    pub fn close_delimiter(&self) -> String {
        format!("--{}--", self.0)
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Boundary {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Boundary {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Boundary::new(s)
    }
}

fn is_bchar(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"'()+_,-./:=? ".contains(&b)
}

fn is_valid(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_BOUNDARY_LEN
        && !token.ends_with(' ')
        && token.bytes().all(is_bchar)
}

/// Generates a fresh boundary of the form `Boundary+` followed by
/// 16 upper-case hex digits.
///
/// Never fails. When the OS entropy source is unavailable the digits are
/// derived from a process wide counter and the current time instead.
pub fn generate_boundary() -> Boundary {
    let mut bytes = [0u8; 8];

    if let Err(e) = OsRng.try_fill_bytes(&mut bytes) {
        log::warn!("OS entropy unavailable, using counter boundary: {}", e);
        bytes = fallback_bytes();
    }

    Boundary(format!("{}{}", PREFIX, hex::encode_upper(bytes)))
}

fn fallback_bytes() -> [u8; 8] {
    let count = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);

    ((count << 32) | u64::from(nanos)).to_be_bytes()
}

/// Header `token` characters; any other boundary character forces a quoted
/// parameter value.
fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// Renders `multipart/form-data; boundary=<token>` for the request carrying
/// a body written with `boundary`. The token is quoted when it holds
/// characters such as space, `:` or `=`.
pub fn content_type(boundary: &Boundary) -> Result<HeaderValue> {
    let value = if boundary.0.bytes().all(is_tchar) {
        format!("{}; boundary={}", mime::MULTIPART_FORM_DATA, boundary)
    } else {
        format!("{}; boundary=\"{}\"", mime::MULTIPART_FORM_DATA, boundary)
    };
    HeaderValue::from_str(&value).map_err(|_| Error::InvalidBoundary(boundary.0.clone()))
}
