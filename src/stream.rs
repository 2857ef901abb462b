//! Stream adapters composed with a property bag.
//!
//! Each adapter is a thin pass-through over `std::io` (and, with the `tokio`
//! feature, over `tokio::io`) that additionally carries a [`PropertyBag`]:
//!
//! | Adapter | Wraps | Implements |
//! |---|---|---|
//! | [`Readable`] | `R` | `Read` |
//! | [`Writable`] | `W` | `Write` |
//! | [`Transform`] | `R` + `FnMut(&mut [u8])` | `Read`, mapping each chunk |
//! | [`PassThrough`] | in-memory FIFO | `Read` + `Write` |
//! | [`Duplex`] | `R` + `W` | `Read` + `Write`, independently |
//!
//! Independent of the error core.

use crate::object::{PropertyBag, ToJson};
use serde_json::Value;
use std::collections::VecDeque;
use std::io::{self, Read, Write};

macro_rules! impl_properties {
    ($($ty:ident<$($param:ident),*>),+ $(,)?) => {
        $(
            impl<$($param),*> $ty<$($param),*> {
                /// The adapter's properties.
                #[inline]
                pub fn properties(&self) -> &PropertyBag {
                    &self.properties
                }

                /// Mutable access to the adapter's properties.
                #[inline]
                pub fn properties_mut(&mut self) -> &mut PropertyBag {
                    &mut self.properties
                }
            }

            impl<$($param),*> ToJson for $ty<$($param),*> {
                type Output = Value;

                fn to_json(&self) -> Value {
                    self.properties.to_json()
                }
            }
        )+
    };
}

// ============================================================================
// Readable / Writable
// ============================================================================

/// Readable side pass-through.
#[derive(Debug)]
pub struct Readable<R> {
    inner: R,
    properties: PropertyBag,
}

impl<R> Readable<R> {
    /// Wrap a reader.
    pub fn new(inner: R, properties: PropertyBag) -> Self {
        Self { inner, properties }
    }

    /// Unwrap the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for Readable<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Writable side pass-through.
#[derive(Debug)]
pub struct Writable<W> {
    inner: W,
    properties: PropertyBag,
}

impl<W> Writable<W> {
    /// Wrap a writer.
    pub fn new(inner: W, properties: PropertyBag) -> Self {
        Self { inner, properties }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for Writable<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ============================================================================
// Transform
// ============================================================================

/// Reader that rewrites each chunk in place as it is read.
pub struct Transform<R, F> {
    inner: R,
    transform: F,
    properties: PropertyBag,
}

impl<R, F> Transform<R, F>
where
    F: FnMut(&mut [u8]),
{
    /// Wrap a reader with a chunk transform.
    pub fn new(inner: R, transform: F, properties: PropertyBag) -> Self {
        Self {
            inner,
            transform,
            properties,
        }
    }
}

impl<R, F> Transform<R, F> {
    /// Unwrap the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read, F: FnMut(&mut [u8])> Read for Transform<R, F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        (self.transform)(&mut buf[..n]);
        Ok(n)
    }
}

// ============================================================================
// PassThrough / Duplex
// ============================================================================

/// In-memory FIFO: bytes written become readable in order.
#[derive(Debug, Default)]
pub struct PassThrough {
    buffer: VecDeque<u8>,
    properties: PropertyBag,
}

impl PassThrough {
    /// Create an empty pass-through.
    pub fn new(properties: PropertyBag) -> Self {
        Self {
            buffer: VecDeque::new(),
            properties,
        }
    }

    /// Bytes written but not yet read.
    #[inline]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// The adapter's properties.
    #[inline]
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    /// Mutable access to the adapter's properties.
    #[inline]
    pub fn properties_mut(&mut self) -> &mut PropertyBag {
        &mut self.properties
    }
}

impl ToJson for PassThrough {
    type Output = Value;

    fn to_json(&self) -> Value {
        self.properties.to_json()
    }
}

impl Read for PassThrough {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.buffer.read(buf)
    }
}

impl Write for PassThrough {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Independent readable and writable halves behind one handle.
#[derive(Debug)]
pub struct Duplex<R, W> {
    reader: R,
    writer: W,
    properties: PropertyBag,
}

impl<R, W> Duplex<R, W> {
    /// Pair a reader and a writer.
    pub fn new(reader: R, writer: W, properties: PropertyBag) -> Self {
        Self {
            reader,
            writer,
            properties,
        }
    }

    /// Split back into the reader and the writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: Read, W> Read for Duplex<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<R, W: Write> Write for Duplex<R, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl_properties!(Readable<R>, Writable<W>, Transform<R, F>, Duplex<R, W>);

// ============================================================================
// Async pass-throughs
// ============================================================================

#[cfg(feature = "tokio")]
mod async_io {
    use super::{Duplex, Readable, Writable};
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

    impl<R: AsyncRead + Unpin> AsyncRead for Readable<R> {
        fn poll_read(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
        }
    }

    impl<W: AsyncWrite + Unpin> AsyncWrite for Writable<W> {
        fn poll_write(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
        }

        fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Pin::new(&mut self.get_mut().inner).poll_flush(cx)
        }

        fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
        }
    }

    impl<R: AsyncRead + Unpin, W: Unpin> AsyncRead for Duplex<R, W> {
        fn poll_read(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Pin::new(&mut self.get_mut().reader).poll_read(cx, buf)
        }
    }

    impl<R: Unpin, W: AsyncWrite + Unpin> AsyncWrite for Duplex<R, W> {
        fn poll_write(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Pin::new(&mut self.get_mut().writer).poll_write(cx, buf)
        }

        fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Pin::new(&mut self.get_mut().writer).poll_flush(cx)
        }

        fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Pin::new(&mut self.get_mut().writer).poll_shutdown(cx)
        }
    }

}
