//! Output sinks for the text renderers.

use std::io;

use crate::core::error::{TvgError, TvgResult};

/// Destination for rendered chunks.
///
/// `write` returns how many bytes of `chunk` were accepted. Anything less
/// than the whole chunk aborts the render with an I/O error.
pub trait Sink {
    fn write(&mut self, chunk: &[u8]) -> io::Result<usize>;
}

impl Sink for Vec<u8> {
    fn write(&mut self, chunk: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(chunk);
        Ok(chunk.len())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write(&mut self, chunk: &[u8]) -> io::Result<usize> {
        (**self).write(chunk)
    }
}

/// Adapts any [`io::Write`] into a [`Sink`].
///
/// Each chunk is written in full with `write_all`.
#[derive(Debug)]
pub struct WriteSink<W: io::Write> {
    inner: W,
}

impl<W: io::Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        WriteSink { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> Sink for WriteSink<W> {
    fn write(&mut self, chunk: &[u8]) -> io::Result<usize> {
        self.inner.write_all(chunk)?;
        Ok(chunk.len())
    }
}

/// Pushes `chunk` into `sink`, failing on errors and short writes.
pub(crate) fn write_chunk<S: Sink + ?Sized>(sink: &mut S, chunk: &[u8]) -> TvgResult<()> {
    let written = sink.write(chunk)?;
    if written < chunk.len() {
        return Err(TvgError::Io(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("sink accepted {} of {} bytes", written, chunk.len()),
        )));
    }
    Ok(())
}
