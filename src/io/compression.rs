//! Pluggable output compression for file-backed tables.
//!
//! Tables opened from a path are compressed transparently when the file
//! extension names a registered codec.
//!
//! ## Built-in Codecs
//!
//! When enabled via feature flags, the following codecs are available:
//! - **Gzip** (`.gz`) - via `flate2` crate (feature: `compression-gzip`)
//! - **Zstd** (`.zst`) - via `zstd` crate (feature: `compression-zstd`)
//! - **Bzip2** (`.bz2`) - via `bzip2` crate (feature: `compression-bzip2`)
//! - **Xz** (`.xz`) - via `xz2` crate (feature: `compression-xz`)
//!
//! ## Custom Codecs
//! ```
//! use tablewriter::io::compression::{register_codec, CompressionCodec, OutputSink};
//! use std::io::Result;
//! use std::sync::Arc;
//!
//! struct Passthrough;
//!
//! impl CompressionCodec for Passthrough {
//!     fn name(&self) -> &str { "passthrough" }
//!
//!     fn extensions(&self) -> &[&str] { &[".plain"] }
//!
//!     fn wrap_writer_dyn(&self, writer: OutputSink) -> Result<OutputSink> {
//!         Ok(writer)
//!     }
//! }
//!
//! register_codec(Arc::new(Passthrough));
//! ```
//!
//! ## Closing
//!
//! Encoders are closed explicitly through [`FinishWrite`]: the trailer is
//! written, the buffered file writer is flushed, and any error on the way is
//! returned. A [`CsvWriter`](crate::CsvWriter) opened from a path does this in
//! [`finish`](crate::TableWriter::finish).

use anyhow::{Context, Result};
use std::io::{self, BufWriter, IntoInnerError, Write};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

#[cfg(feature = "compression-gzip")]
use flate2::write::GzEncoder;
#[cfg(feature = "compression-zstd")]
use zstd::stream::write::Encoder as ZstdEncoder;
#[cfg(feature = "compression-bzip2")]
use bzip2::write::BzEncoder;
#[cfg(feature = "compression-xz")]
use xz2::write::XzEncoder;

/// A [`Write`] sink with an explicit, fallible close step.
pub trait FinishWrite: Write {
    /// Write any trailer, flush everything down to the underlying sink, and
    /// close it.
    ///
    /// # Errors
    /// Returns the first error raised while finishing this layer or any layer
    /// below it.
    fn finish_write(self: Box<Self>) -> io::Result<()>;
}

/// A boxed, closable output as produced by [`auto_detect_writer`].
pub type OutputSink = Box<dyn FinishWrite>;

impl<W: Write> FinishWrite for BufWriter<W> {
    fn finish_write(self: Box<Self>) -> io::Result<()> {
        let mut inner = (*self).into_inner().map_err(IntoInnerError::into_error)?;
        inner.flush()
    }
}

/// Global codec registry.
static CODEC_REGISTRY: RwLock<Option<Vec<Arc<dyn CompressionCodec>>>> = RwLock::new(None);

fn init_registry() -> Vec<Arc<dyn CompressionCodec>> {
    vec![
        #[cfg(feature = "compression-gzip")]
        Arc::new(GzipCodec),
        #[cfg(feature = "compression-zstd")]
        Arc::new(ZstdCodec),
        #[cfg(feature = "compression-bzip2")]
        Arc::new(Bzip2Codec),
        #[cfg(feature = "compression-xz")]
        Arc::new(XzCodec),
    ]
}

fn get_registry() -> Vec<Arc<dyn CompressionCodec>> {
    let mut lock = CODEC_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    lock.get_or_insert_with(init_registry).clone()
}

/// Register a custom compression codec globally.
///
/// Codecs registered later are consulted after the built-in ones.
pub fn register_codec(codec: Arc<dyn CompressionCodec>) {
    let mut lock = CODEC_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    lock.get_or_insert_with(init_registry).push(codec);
}

/// An output compression algorithm.
///
/// Implementations must be `Send + Sync` as they're stored in a global
/// registry.
pub trait CompressionCodec: Send + Sync {
    /// Human-readable codec name (e.g., "gzip", "zstd").
    fn name(&self) -> &str;

    /// File extensions associated with this codec (e.g., `&[".gz", ".gzip"]`).
    ///
    /// Extensions should include the leading dot and be lowercase.
    fn extensions(&self) -> &[&str];

    /// Wrap a writer with compression.
    ///
    /// Finishing the returned sink must finish the encoder and then `writer`.
    fn wrap_writer_dyn(&self, writer: OutputSink) -> io::Result<OutputSink>;
}

/// Find the registered codec for `path`, matching its extension
/// case-insensitively.
pub fn codec_for_path(path: impl AsRef<Path>) -> Option<Arc<dyn CompressionCodec>> {
    let path_str = path.as_ref().to_string_lossy().to_lowercase();
    get_registry()
        .into_iter()
        .find(|codec| codec.extensions().iter().any(|ext| path_str.ends_with(ext)))
}

/// Wrap `writer` in a `BufWriter` and then with the codec matching
/// `path_hint`, if any.
///
/// # Errors
/// Returns an error if the codec fails to initialize.
pub fn auto_detect_writer<W: Write + 'static>(
    writer: W,
    path_hint: impl AsRef<Path>,
) -> Result<OutputSink> {
    let buffered: OutputSink = Box::new(BufWriter::new(writer));
    if let Some(codec) = codec_for_path(&path_hint) {
        tracing::debug!(codec = codec.name(), "compressing table output");
        return codec
            .wrap_writer_dyn(buffered)
            .with_context(|| format!("wrap writer with {} codec", codec.name()));
    }
    Ok(buffered)
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn wrap_writer_dyn(&self, writer: OutputSink) -> io::Result<OutputSink> {
        use flate2::Compression;
        Ok(Box::new(GzEncoder::new(writer, Compression::default())))
    }
}

#[cfg(feature = "compression-gzip")]
impl FinishWrite for GzEncoder<OutputSink> {
    fn finish_write(self: Box<Self>) -> io::Result<()> {
        (*self).finish()?.finish_write()
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &str {
        "zstd"
    }

    fn extensions(&self) -> &[&str] {
        &[".zst", ".zstd"]
    }

    fn wrap_writer_dyn(&self, writer: OutputSink) -> io::Result<OutputSink> {
        ZstdEncoder::new(writer, 3).map(|e| Box::new(e) as OutputSink)
    }
}

#[cfg(feature = "compression-zstd")]
impl FinishWrite for ZstdEncoder<'static, OutputSink> {
    fn finish_write(self: Box<Self>) -> io::Result<()> {
        (*self).finish()?.finish_write()
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl CompressionCodec for Bzip2Codec {
    fn name(&self) -> &str {
        "bzip2"
    }

    fn extensions(&self) -> &[&str] {
        &[".bz2", ".bzip2"]
    }

    fn wrap_writer_dyn(&self, writer: OutputSink) -> io::Result<OutputSink> {
        use bzip2::Compression;
        Ok(Box::new(BzEncoder::new(writer, Compression::default())))
    }
}

#[cfg(feature = "compression-bzip2")]
impl FinishWrite for BzEncoder<OutputSink> {
    fn finish_write(self: Box<Self>) -> io::Result<()> {
        (*self).finish()?.finish_write()
    }
}

#[cfg(feature = "compression-xz")]
struct XzCodec;

#[cfg(feature = "compression-xz")]
impl CompressionCodec for XzCodec {
    fn name(&self) -> &str {
        "xz"
    }

    fn extensions(&self) -> &[&str] {
        &[".xz"]
    }

    fn wrap_writer_dyn(&self, writer: OutputSink) -> io::Result<OutputSink> {
        Ok(Box::new(XzEncoder::new(writer, 6)))
    }
}

#[cfg(feature = "compression-xz")]
impl FinishWrite for XzEncoder<OutputSink> {
    fn finish_write(self: Box<Self>) -> io::Result<()> {
        (*self).finish()?.finish_write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_have_no_codec() {
        assert!(codec_for_path("results.csv").is_none());
    }

    #[test]
    fn buffered_sink_is_flushed_on_finish() {
        let buf = crate::testing::SharedBuffer::new();
        let mut sink: OutputSink = Box::new(BufWriter::new(buf.clone()));
        sink.write_all(b"a,b\n").unwrap();
        assert!(buf.is_empty());
        sink.finish_write().unwrap();
        assert_eq!(buf.contents(), "a,b\n");
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn extension_match_ignores_case() {
        let codec = codec_for_path("RESULTS.CSV.GZ").map(|c| c.name().to_owned());
        assert_eq!(codec.as_deref(), Some("gzip"));
    }
}
