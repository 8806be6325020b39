//! Streaming `multipart/form-data` bodies for file uploads.
//!
//! A body is written to disk next to the file it embeds, so it can be handed
//! to an HTTP client as a streamed request body:
//!
//! ```no_run
//! use multipart_body::{content_type, generate_boundary, write_multipart_body};
//!
//! let boundary = generate_boundary();
//! let len = write_multipart_body(
//!     "photo.jpg",
//!     "photo.body",
//!     "avatar",
//!     "photo.jpg",
//!     "image/jpeg",
//!     &boundary,
//!     vec![("user", "alice")],
//! )?;
//!
//! // Content-Type: multipart/form-data; boundary=...
//! let header = content_type(&boundary)?;
//! # let _ = (len, header);
//! # Ok::<(), multipart_body::Error>(())
//! ```

mod error;
pub use error::{Error, Result};

mod boundary;
pub use boundary::{content_type, generate_boundary, Boundary, MAX_BOUNDARY_LEN};

mod part;
pub use part::FilePart;

mod writer;
pub use writer::{write_multipart_body, MultipartWriter, DEFAULT_CHUNK_SIZE};
