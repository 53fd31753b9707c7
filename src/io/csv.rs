//! Streaming CSV table writer.
//!
//! This module provides:
//! - **[`CsvWriter`]**, a [`TableWriter`] that writes one CSV line per row and
//!   flushes after every line
//! - **[`QuotePolicy`]** and [`quote_field`], the escaping rules for text cells
//! - **[`CsvWriterBuilder`]** and [`open_csv`] for configuring writers and
//!   opening file-backed (optionally compressed) outputs
//!
//! # Design notes
//! - The header is written and flushed on construction. Column names are
//!   written as given, without quoting.
//! - Only the row in progress is held in memory. Each finished row costs one
//!   `write_all` and one `flush` on the sink.
//! - Closing a sink means flushing it and dropping it. File-backed writers
//!   close through [`FinishWrite`], so a failing compressor trailer or final
//!   flush is reported by [`finish`](TableWriter::finish).
//! - [`QuotePolicy::Necessary`] fields are escaped by the `csv` crate;
//!   [`QuotePolicy::Legacy`] keeps its own narrower rule.

use crate::error::{TableError, TableResult};
use crate::io::compression::{auto_detect_writer, FinishWrite, OutputSink};
use crate::table_writer::TableWriter;
use crate::value::Value;
use anyhow::{Context, Result};
use ::csv::{QuoteStyle, WriterBuilder};
use std::fs::{create_dir_all, File};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, trace, warn};

/// How text cells are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuotePolicy {
    /// Quote a field only when the *whole* field is a single `\r`, `\n`, `,`
    /// or `"`.
    ///
    /// Longer fields are written verbatim even if they contain those
    /// characters, so such output is not valid CSV in general. This is the
    /// historical behavior and stays the default because existing consumers
    /// of these tables depend on it.
    #[default]
    Legacy,
    /// Quote any field that contains `\r`, `\n`, `,` or `"` (RFC 4180 style).
    Necessary,
}

fn is_special(c: char) -> bool {
    matches!(c, '\r' | '\n' | ',' | '"')
}

/// Escape one text field under `policy`.
///
/// A quoted field is wrapped in `"` with every embedded `"` doubled. An
/// empty field is never quoted.
///
/// # Examples
/// ```
/// use tablewriter::io::csv::{quote_field, QuotePolicy};
/// # fn main() -> tablewriter::TableResult<()> {
///
/// assert_eq!(quote_field(",", QuotePolicy::Legacy)?, "\",\"");
/// assert_eq!(quote_field("a,b", QuotePolicy::Legacy)?, "a,b");
/// assert_eq!(quote_field("a,b", QuotePolicy::Necessary)?, "\"a,b\"");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// [`TableError::Io`] if the `csv` encoder fails.
pub fn quote_field(value: &str, policy: QuotePolicy) -> TableResult<String> {
    match policy {
        QuotePolicy::Legacy => {
            let mut chars = value.chars();
            if matches!((chars.next(), chars.next()), (Some(c), None) if is_special(c)) {
                Ok(format!("\"{}\"", value.replace('"', "\"\"")))
            } else {
                Ok(value.to_owned())
            }
        }
        QuotePolicy::Necessary => necessary_field(value),
    }
}

/// Escape one field with `csv`'s `QuoteStyle::Necessary`.
///
/// Only the field is written, never a record terminator, so an empty value
/// stays empty instead of becoming `""`.
fn necessary_field(value: &str) -> TableResult<String> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Necessary)
        .buffer_capacity(value.len() * 2 + 2)
        .from_writer(Vec::new());
    wtr.write_field(value).map_err(io::Error::from)?;
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// Builds [`CsvWriter`]s with a given configuration.
///
/// ```
/// use tablewriter::{CsvWriterBuilder, QuotePolicy, TableWriter};
/// # fn main() -> anyhow::Result<()> {
///
/// let mut out = Vec::<u8>::new();
/// let mut w = CsvWriterBuilder::new()
///     .quote_policy(QuotePolicy::Necessary)
///     .from_writer(&mut out, ["name", "note"])?;
/// w.write_row(["ada", "likes, commas"])?;
/// w.finish()?;
/// drop(w);
/// assert_eq!(String::from_utf8(out)?, "name,note\nada,\"likes, commas\"\n");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvWriterBuilder {
    quote_policy: QuotePolicy,
}

impl CsvWriterBuilder {
    /// A builder with default settings ([`QuotePolicy::Legacy`]).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the escaping rule for text cells.
    pub fn quote_policy(mut self, policy: QuotePolicy) -> Self {
        self.quote_policy = policy;
        self
    }

    /// Create a writer over `sink` and write the header line.
    ///
    /// # Errors
    /// [`TableError::EmptySchema`] for an empty column list,
    /// [`TableError::Io`] if the header cannot be written.
    pub fn from_writer<W, I>(&self, sink: W, columns: I) -> TableResult<CsvWriter<W>>
    where
        W: Write,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.open(sink, columns, flush_sink::<W>)
    }

    /// Create a writer over a closable sink and write the header line.
    ///
    /// [`finish`](TableWriter::finish) closes the sink with
    /// [`FinishWrite::finish_write`] and reports its error, which for a
    /// compressed sink covers the trailer.
    ///
    /// # Errors
    /// Same as [`from_writer`](Self::from_writer).
    pub fn from_output<I>(
        &self,
        sink: OutputSink,
        columns: I,
    ) -> TableResult<CsvWriter<OutputSink>>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.open(sink, columns, finish_output)
    }

    fn open<W, I>(
        &self,
        mut sink: W,
        columns: I,
        close: fn(W) -> io::Result<()>,
    ) -> TableResult<CsvWriter<W>>
    where
        W: Write,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let columns: Box<[String]> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(TableError::EmptySchema);
        }
        let mut header = columns.join(",");
        header.push('\n');
        sink.write_all(header.as_bytes())?;
        sink.flush()?;
        debug!(
            columns = columns.len(),
            policy = ?self.quote_policy,
            "opened table writer"
        );
        Ok(CsvWriter {
            sink: Some(sink),
            columns,
            row: None,
            quote_policy: self.quote_policy,
            rows_written: 0,
            close,
        })
    }

    /// Create the file at `path` (and its parent directories) and open a
    /// writer over it.
    ///
    /// **Compression**: the output is compressed when the file extension
    /// names a registered codec (e.g. `.gz`, `.zst`).
    ///
    /// # Errors
    /// Returns an error if the directories or file cannot be created, or if
    /// the header cannot be written.
    pub fn from_path<I>(
        &self,
        path: impl AsRef<Path>,
        columns: I,
    ) -> Result<CsvWriter<OutputSink>>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
        }
        let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let w = auto_detect_writer(f, path)
            .with_context(|| format!("setup compression for {}", path.display()))?;
        self.from_output(w, columns)
            .with_context(|| format!("write header to {}", path.display()))
    }
}

/// Open a CSV table at `path` with default settings.
///
/// Equivalent to `CsvWriterBuilder::new().from_path(path, columns)`.
///
/// # Errors
/// See [`CsvWriterBuilder::from_path`].
pub fn open_csv<I>(path: impl AsRef<Path>, columns: I) -> Result<CsvWriter<OutputSink>>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    CsvWriterBuilder::new().from_path(path, columns)
}

/// A [`TableWriter`] that writes CSV to a [`Write`] sink.
///
/// Create one with [`CsvWriter::new`], [`CsvWriterBuilder`] or [`open_csv`].
/// Call [`finish`](TableWriter::finish) when done; a writer dropped while
/// still open finishes itself on a best-effort basis and logs a warning.
pub struct CsvWriter<W: Write> {
    sink: Option<W>,
    columns: Box<[String]>,
    row: Option<Vec<Option<String>>>,
    quote_policy: QuotePolicy,
    rows_written: u64,
    close: fn(W) -> io::Result<()>,
}

fn flush_sink<W: Write>(mut sink: W) -> io::Result<()> {
    sink.flush()
}

fn finish_output(sink: OutputSink) -> io::Result<()> {
    sink.finish_write()
}

impl<W: Write> CsvWriter<W> {
    /// Create a writer with default settings and write the header line.
    ///
    /// # Errors
    /// See [`CsvWriterBuilder::from_writer`].
    pub fn new<I>(sink: W, columns: I) -> TableResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        CsvWriterBuilder::new().from_writer(sink, columns)
    }

    /// Number of data rows emitted so far (the header is not counted).
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// The escaping rule applied to text cells.
    pub fn quote_policy(&self) -> QuotePolicy {
        self.quote_policy
    }

    /// Whether [`finish`](TableWriter::finish) has been called.
    pub fn is_closed(&self) -> bool {
        self.sink.is_none()
    }

    /// Finish any active row, flush, and return the sink without closing it.
    ///
    /// The caller then owns closing; an [`OutputSink`] is closed with
    /// [`FinishWrite::finish_write`].
    ///
    /// # Errors
    /// [`TableError::Closed`] if the writer was already finished, or any
    /// error from emitting the last row.
    pub fn into_inner(mut self) -> TableResult<W> {
        let pending = self.row.as_ref().map(|_| self.render_row());
        let mut sink = self.sink.take().ok_or(TableError::Closed)?;
        if let Some(line) = pending {
            sink.write_all(line.as_bytes())?;
            self.row = None;
            self.rows_written += 1;
        }
        sink.flush()?;
        Ok(sink)
    }

    fn sink_mut(&mut self) -> TableResult<&mut W> {
        self.sink.as_mut().ok_or(TableError::Closed)
    }

    fn render_row(&self) -> String {
        let mut line = String::new();
        if let Some(values) = &self.row {
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    line.push(',');
                }
                if let Some(v) = v {
                    line.push_str(v);
                }
            }
        } else {
            line.push_str(&",".repeat(self.columns.len() - 1));
        }
        line.push('\n');
        line
    }
}

impl<W: Write> TableWriter for CsvWriter<W> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn has_active_row(&self) -> bool {
        self.row.is_some()
    }

    fn set_value(&mut self, column: usize, value: Value) -> TableResult<()> {
        if self.is_closed() {
            return Err(TableError::Closed);
        }
        let columns = self.columns.len();
        if column >= columns {
            return Err(TableError::ColumnOutOfRange {
                index: column,
                columns,
            });
        }
        let text = value.render(self.quote_policy)?;
        let row = self.row.get_or_insert_with(|| vec![None; columns]);
        row[column] = text;
        Ok(())
    }

    fn finish_row(&mut self) -> TableResult<()> {
        let line = self.render_row();
        let sink = self.sink_mut()?;
        sink.write_all(line.as_bytes())?;
        sink.flush()?;
        self.row = None;
        self.rows_written += 1;
        trace!(row = self.rows_written, "wrote table row");
        Ok(())
    }

    fn finish(&mut self) -> TableResult<()> {
        if self.is_closed() {
            return Err(TableError::Closed);
        }
        let pending = if self.row.is_some() {
            self.finish_row()
        } else {
            Ok(())
        };
        // The sink is closed even if the last row failed; there is no retry.
        let closed = match self.sink.take() {
            Some(sink) => (self.close)(sink),
            None => Ok(()),
        };
        pending?;
        closed?;
        debug!(rows = self.rows_written, "finished table writer");
        Ok(())
    }
}

impl<W: Write> Drop for CsvWriter<W> {
    fn drop(&mut self) {
        if self.is_closed() {
            return;
        }
        warn!(
            rows = self.rows_written,
            pending = self.row.is_some(),
            "table writer dropped without finish"
        );
        if let Err(e) = self.finish() {
            warn!(error = %e, "failed to finish table writer on drop");
        }
    }
}
