//! Testing utilities for table writers.
//!
//! This module helps users test code that writes tables. It includes:
//!
//! - **Mock sinks**: in-memory and instrumented [`Write`](std::io::Write)
//!   implementations that record what a writer did to them
//! - **Assertions**: compare written tables line by line
//! - **Temp paths**: scratch directories for file-backed writers
//!
//! # Quick Start
//!
//! ```
//! use tablewriter::*;
//! use tablewriter::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let buf = SharedBuffer::new();
//! let mut w = CsvWriter::new(buf.clone(), ["user", "score"])?;
//! w.write_row([Value::from("u1"), Value::from(0.5)])?;
//! w.finish()?;
//!
//! assert_table_lines(&buf.contents(), &["user,score", "u1,0.5"]);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod mock_io;

// Re-export commonly used items
pub use assertions::*;
pub use mock_io::*;
