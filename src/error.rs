use std::{
    error::Error as StdError,
    fmt, io,
    path::{Path, PathBuf},
};

#[derive(Debug)]
pub enum Error {
    /// The file to embed could not be opened.
    InputUnreadable { path: PathBuf, source: io::Error },
    /// The destination could not be created, written or flushed. `path` is
    /// `None` when encoding into a caller supplied writer.
    OutputUnwritable {
        path: Option<PathBuf>,
        source: io::Error,
    },
    /// Reading or writing failed while streaming the file bytes.
    Copy(io::Error),
    InvalidBoundary(String),
}

impl Error {
    pub(crate) fn input<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Error::InputUnreadable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn output(path: Option<&Path>, source: io::Error) -> Self {
        Error::OutputUnwritable {
            path: path.map(Path::to_path_buf),
            source,
        }
    }

    /// The underlying platform error, if this error came from the filesystem.
    pub fn io_error(&self) -> Option<&io::Error> {
        match *self {
            Error::InputUnreadable { ref source, .. } => Some(source),
            Error::OutputUnwritable { ref source, .. } => Some(source),
            Error::Copy(ref e) => Some(e),
            Error::InvalidBoundary(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InputUnreadable {
                ref path,
                ref source,
            } => write!(f, "Input file {} unreadable: {}", path.display(), source),
            Error::OutputUnwritable {
                path: Some(ref path),
                ref source,
            } => write!(f, "Output file {} unwritable: {}", path.display(), source),
            Error::OutputUnwritable {
                path: None,
                ref source,
            } => write!(f, "Output unwritable: {}", source),
            Error::Copy(ref e) => write!(f, "I/O failure while streaming file part: {}", e),
            Error::InvalidBoundary(ref token) => {
                write!(f, "Invalid multipart boundary: {:?}", token)
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::InputUnreadable { ref source, .. } => Some(source),
            Error::OutputUnwritable { ref source, .. } => Some(source),
            Error::Copy(ref e) => Some(e),
            Error::InvalidBoundary(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
