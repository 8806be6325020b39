use bytes::BytesMut;
use std::{
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use crate::{part, Boundary, Error, FilePart, Result};

/// Default size of the buffer the file bytes are streamed through.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Writes `multipart/form-data` bodies holding any number of text fields and
/// exactly one file.
///
/// Text fields are written in the order they were added, before the file
/// part. The file is never held in memory as a whole, it is copied through
/// a buffer of `chunk_size` bytes.
#[derive(Debug, Clone)]
pub struct MultipartWriter {
    boundary: Boundary,
    fields: Vec<(String, String)>,
    chunk_size: usize,
}

impl MultipartWriter {
    pub fn new(boundary: Boundary) -> Self {
        Self {
            boundary,
            fields: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Appends a text field.
    pub fn field<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Appends text fields in iteration order. Pass a `BTreeMap` to get them
    /// sorted by name.
    pub fn fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Streams a complete body into `output`, reading the file bytes from
    /// `input`. Returns the number of bytes written.
    pub fn encode<R, W>(&self, file: &FilePart, input: R, mut output: W) -> Result<u64>
    where
        R: Read,
        W: Write,
    {
        self.write_body(file, || Ok(input), &mut output, None)
    }

    /// Like [`encode`](Self::encode) but into a file at `output`, which is
    /// truncated first and removed again if anything fails.
    pub fn write_from_reader<R, P>(&self, file: &FilePart, input: R, output: P) -> Result<u64>
    where
        R: Read,
        P: AsRef<Path>,
    {
        self.write_to_path(file, || Ok(input), output.as_ref())
    }

    /// Embeds the file at `input` into a body written to `output`.
    ///
    /// On error no file is left at `output`.
    pub fn write_file<P, Q>(&self, file: &FilePart, input: P, output: Q) -> Result<u64>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let input = input.as_ref();
        let output = output.as_ref();

        // Catches symlinks and hard links; creating the output would
        // truncate the input.
        if let Ok(true) = same_file::is_same_file(input, output) {
            return Err(Error::output(
                Some(output),
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "output location is the input file",
                ),
            ));
        }

        self.write_to_path(file, || open_input(input), output)
    }

    fn write_to_path<R, F>(&self, file: &FilePart, open: F, output: &Path) -> Result<u64>
    where
        R: Read,
        F: FnOnce() -> Result<R>,
    {
        log::debug!(
            "Writing multipart body to {} with boundary {:?}",
            output.display(),
            self.boundary.as_str()
        );

        let out = File::create(output).map_err(|e| Error::output(Some(output), e))?;

        // Declared before the writer so the handle is closed before removal.
        let mut guard = PartialOutput::new(output);
        let mut out = BufWriter::with_capacity(self.chunk_size, out);

        let written = self.write_body(file, open, &mut out, Some(output))?;

        // Late write errors only surface on sync, they still void the body.
        let out = out
            .into_inner()
            .map_err(|e| Error::output(Some(output), e.into_error()))?;
        out.sync_all()
            .map_err(|e| Error::output(Some(output), e))?;
        drop(out);
        guard.keep();

        log::debug!("Wrote {} bytes to {}", written, output.display());
        Ok(written)
    }

    fn write_body<R, W, F>(
        &self,
        file: &FilePart,
        open: F,
        out: &mut W,
        out_path: Option<&Path>,
    ) -> Result<u64>
    where
        R: Read,
        W: Write,
        F: FnOnce() -> Result<R>,
    {
        let unwritable = |e| Error::output(out_path, e);
        let mut written = 0u64;

        for (name, value) in &self.fields {
            let bs = part::field(&self.boundary, name, value);
            out.write_all(&bs).map_err(unwritable)?;
            written += bs.len() as u64;
        }

        let mut input = open()?;

        let head = file.head(&self.boundary);
        out.write_all(&head).map_err(unwritable)?;
        written += head.len() as u64;

        written += self.copy_chunks(&mut input, out)?;

        let trailer = part::trailer(&self.boundary);
        out.write_all(&trailer).map_err(unwritable)?;
        written += trailer.len() as u64;

        out.flush().map_err(unwritable)?;
        Ok(written)
    }

    fn copy_chunks<R: Read, W: Write>(&self, input: &mut R, out: &mut W) -> Result<u64> {
        let mut buf = BytesMut::zeroed(self.chunk_size);
        let mut copied = 0u64;

        loop {
            let n = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Copy(e)),
            };

            out.write_all(&buf[..n]).map_err(Error::Copy)?;
            copied += n as u64;
            log::trace!("Streamed {} bytes, {} so far", n, copied);
        }

        Ok(copied)
    }
}

fn open_input(path: &Path) -> Result<File> {
    let file = File::open(path).map_err(|e| Error::input(path, e))?;
    let meta = file.metadata().map_err(|e| Error::input(path, e))?;

    if meta.is_dir() {
        return Err(Error::input(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "input is a directory"),
        ));
    }

    Ok(file)
}

/// Removes a partially written body unless told to keep it.
struct PartialOutput<'a> {
    path: &'a Path,
    keep: bool,
}

impl<'a> PartialOutput<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, keep: false }
    }

    fn keep(&mut self) {
        self.keep = true;
    }
}

impl Drop for PartialOutput<'_> {
    fn drop(&mut self) {
        if self.keep {
            return;
        }

        match fs::remove_file(self.path) {
            Ok(()) => log::debug!("Removed partial body {}", self.path.display()),
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to remove partial body {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Writes a body embedding the file at `input_file` into `output_file`,
/// with `additional_parts` written as text fields ahead of it in iteration
/// order. Returns the body length in bytes.
///
/// The caller announces the body with
/// `Content-Type: multipart/form-data; boundary=<boundary>`, see
/// [`content_type`](crate::content_type).
pub fn write_multipart_body<P, Q, I, K, V>(
    input_file: P,
    output_file: Q,
    field_name: &str,
    filename: &str,
    mime_type: &str,
    boundary: &Boundary,
    additional_parts: I,
) -> Result<u64>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let file = FilePart::new(field_name, filename, mime_type);

    MultipartWriter::new(boundary.clone())
        .fields(additional_parts)
        .write_file(&file, input_file, output_file)
}
