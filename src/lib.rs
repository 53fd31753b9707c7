//! # tablewriter
//!
//! A **streaming table writer** for reporting and evaluation pipelines.
//! Rows of named, fixed-width columns are serialized to CSV one at a time and
//! flushed as they are finished, so a result set never has to be held in
//! memory.
//!
//! ## Key Features
//!
//! - **Fixed schema** - column names are set once and written as the header
//! - **Cell-at-a-time or row-at-a-time** - set cells by index, or write whole
//!   rows by position, by name, or from any `Serialize` record
//! - **Row-level durability** - every finished row is flushed immediately
//! - **Explicit misuse errors** - bad column indexes, over-long rows and use
//!   after finish are reported, never silently ignored
//! - **Compressed outputs** - `.gz`, `.zst`, `.bz2`, `.xz` paths are
//!   compressed transparently (optional via feature flags)
//!
//! ## Quick Start
//!
//! ```
//! use tablewriter::*;
//! use std::collections::HashMap;
//! # fn main() -> anyhow::Result<()> {
//!
//! let mut out = Vec::<u8>::new();
//! let mut w = CsvWriter::new(&mut out, ["a", "b"])?;
//!
//! // Cell by cell
//! w.set_text(0, Some("x"))?;
//! w.set_long(1, 5)?;
//! w.finish_row()?;
//!
//! // By position; missing trailing columns stay empty
//! w.write_row(["p"])?;
//!
//! // By name
//! let m = HashMap::from([("a", 1), ("b", 2)]);
//! w.write_named(&m)?;
//!
//! w.finish()?;
//! drop(w);
//! assert_eq!(String::from_utf8(out)?, "a,b\nx,5\np,\n1,2\n");
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### TableWriter
//!
//! [`TableWriter`] is the contract: a fixed schema, at most one row in
//! progress, and a `finish` that closes the output. [`CsvWriter`] is its CSV
//! implementation over any [`std::io::Write`] sink.
//!
//! ### Values
//!
//! Cells are [`Value`]s: integers, floats, text, or null. Numbers are written
//! in canonical form; text is escaped according to the writer's
//! [`QuotePolicy`]. Null leaves the cell empty.
//!
//! ### Quoting
//!
//! The default [`QuotePolicy::Legacy`] only quotes a field that is *exactly*
//! one of `\r`, `\n`, `,` or `"`, matching the historical output of these
//! tables. Use [`QuotePolicy::Necessary`] for standard CSV that any reader
//! can parse back.
//!
//! ### Files
//!
//! [`open_csv`] creates a file (and parent directories) and picks a
//! compression codec from the extension:
//!
//! ```no_run
//! use tablewriter::*;
//! # fn main() -> anyhow::Result<()> {
//! let mut w = open_csv("out/results.csv.gz", ["user", "rmse"])?;
//! w.write_row([Value::from("u1"), Value::from(0.93)])?;
//! w.finish()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `compression-gzip`, `compression-zstd`, `compression-bzip2`,
//!   `compression-xz` - output codecs (all enabled by default)
//!
//! ## Module Overview
//!
//! - [`table_writer`] - the `TableWriter` trait
//! - [`io`] - the CSV writer and output compression
//! - [`value`] - cell values and their text form
//! - [`error`] - error types
//! - [`testing`] - mock sinks and assertions for tests

pub mod error;
pub mod io;
pub mod table_writer;
pub mod testing;
pub mod value;

// General re-exports
pub use error::{TableError, TableResult};
pub use io::compression::{FinishWrite, OutputSink};
pub use io::csv::{open_csv, quote_field, CsvWriter, CsvWriterBuilder, QuotePolicy};
pub use table_writer::TableWriter;
pub use value::Value;
