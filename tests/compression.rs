use anyhow::Result;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use tablewriter::io::compression::{
    auto_detect_writer, codec_for_path, register_codec, CompressionCodec, FinishWrite, OutputSink,
};
use tablewriter::testing::{
    assert_table_lines, read_table_output, FailingSink, SharedBuffer, TempDirPath,
};
use tablewriter::{open_csv, CsvWriterBuilder, QuotePolicy, TableWriter, Value};

/// Write a two-row table to `path` and return the raw file bytes.
fn write_sample(path: &Path) -> Result<Vec<u8>> {
    let mut w = open_csv(path, ["k", "v"])?;
    w.write_row(["a", "1"])?;
    w.write_row(["b", "2"])?;
    w.finish()?;
    Ok(std::fs::read(path)?)
}

#[test]
fn plain_file_output() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let path = tmp.file_path("results.csv");
    let mut w = open_csv(&path, ["user", "rmse"])?;
    w.write_row([Value::from("u1"), Value::from(0.25)])?;
    w.write_row([Value::from("u2"), Value::from(1.5)])?;
    w.finish()?;
    assert_table_lines(&read_table_output(&path)?, &["user,rmse", "u1,0.25", "u2,1.5"]);
    Ok(())
}

#[test]
fn rows_reach_the_file_before_finish() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let path = tmp.file_path("live.csv");
    let mut w = open_csv(&path, ["n"])?;
    w.write_row([1])?;
    assert_table_lines(&read_table_output(&path)?, &["n", "1"]);
    w.finish()?;
    Ok(())
}

#[test]
fn parent_directories_are_created() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let path = tmp.path().join("nested").join("deeper").join("out.csv");
    let mut w = CsvWriterBuilder::new()
        .quote_policy(QuotePolicy::Necessary)
        .from_path(&path, ["a"])?;
    w.write_row(["x,y"])?;
    w.finish()?;
    assert_table_lines(&read_table_output(&path)?, &["a", "\"x,y\""]);
    Ok(())
}

#[test]
fn open_fails_with_context_for_bad_path() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let blocker = tmp.file_path("file");
    std::fs::write(&blocker, b"")?;
    let err = open_csv(blocker.join("out.csv"), ["a"]).err();
    let msg = format!("{:#}", err.expect("opening below a file must fail"));
    assert!(
        msg.contains(&blocker.display().to_string()),
        "unexpected error: {msg}"
    );
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn gzip_output_by_extension() -> Result<()> {
    use flate2::read::GzDecoder;

    let tmp = TempDirPath::new()?;
    let path = tmp.file_path("results.csv.gz");
    let mut w = open_csv(&path, ["a", "b"])?;
    w.write_row(["1", "2"])?;
    w.set_text(0, Some("last"))?;
    w.finish()?;

    let raw = std::fs::read(&path)?;
    assert_eq!(&raw[..2], &[0x1f_u8, 0x8b]);
    let mut text = String::new();
    GzDecoder::new(&raw[..]).read_to_string(&mut text)?;
    assert_table_lines(&text, &["a,b", "1,2", "last,"]);
    Ok(())
}

#[cfg(feature = "compression-zstd")]
#[test]
fn zstd_output_by_extension() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let path = tmp.file_path("results.csv.zst");
    let mut w = open_csv(&path, ["k"])?;
    w.write_row(["v"])?;
    w.finish()?;

    let raw = std::fs::read(&path)?;
    let text = String::from_utf8(zstd::stream::decode_all(&raw[..])?)?;
    assert_table_lines(&text, &["k", "v"]);
    Ok(())
}

#[cfg(feature = "compression-bzip2")]
#[test]
fn bzip2_output_by_extension() -> Result<()> {
    use bzip2::read::BzDecoder;

    let tmp = TempDirPath::new()?;
    for name in ["results.csv.bz2", "results.csv.bzip2"] {
        let raw = write_sample(&tmp.file_path(name))?;
        assert_eq!(&raw[..3], b"BZh");
        let mut text = String::new();
        BzDecoder::new(&raw[..]).read_to_string(&mut text)?;
        assert_table_lines(&text, &["k,v", "a,1", "b,2"]);
    }
    Ok(())
}

#[cfg(feature = "compression-xz")]
#[test]
fn xz_output_by_extension() -> Result<()> {
    use xz2::read::XzDecoder;

    let tmp = TempDirPath::new()?;
    let raw = write_sample(&tmp.file_path("results.csv.xz"))?;
    assert_eq!(&raw[..6], &[0xfd_u8, b'7', b'z', b'X', b'Z', 0x00]);
    let mut text = String::new();
    XzDecoder::new(&raw[..]).read_to_string(&mut text)?;
    assert_table_lines(&text, &["k,v", "a,1", "b,2"]);
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn gzip_alias_extension() -> Result<()> {
    use flate2::read::GzDecoder;

    let tmp = TempDirPath::new()?;
    let raw = write_sample(&tmp.file_path("results.csv.gzip"))?;
    let mut text = String::new();
    GzDecoder::new(&raw[..]).read_to_string(&mut text)?;
    assert_table_lines(&text, &["k,v", "a,1", "b,2"]);
    Ok(())
}

#[cfg(feature = "compression-zstd")]
#[test]
fn zstd_alias_extension() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let raw = write_sample(&tmp.file_path("results.csv.zstd"))?;
    let text = String::from_utf8(zstd::stream::decode_all(&raw[..])?)?;
    assert_table_lines(&text, &["k,v", "a,1", "b,2"]);
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn gzip_trailer_failure_is_reported() -> Result<()> {
    let codec = codec_for_path("t.csv.gz").expect("gzip codec is built in");

    // Everything up to the last row flush, measured on a sink that never fails.
    let measured = SharedBuffer::new();
    let mut w = CsvWriterBuilder::new()
        .from_output(codec.wrap_writer_dyn(Box::new(measured.clone()))?, ["a", "b"])?;
    w.write_row(["1", "2"])?;
    let before_finish = measured.len();
    w.finish()?;
    assert!(measured.len() > before_finish);

    let sink = FailingSink::after_bytes(before_finish);
    let kept = sink.buffer();
    let mut w = CsvWriterBuilder::new()
        .from_output(codec.wrap_writer_dyn(Box::new(sink))?, ["a", "b"])?;
    w.write_row(["1", "2"])?;
    let err = w.finish().unwrap_err();
    assert!(err.is_io());
    assert!(w.is_closed());
    assert_eq!(kept.len(), before_finish);
    Ok(())
}

struct Uppercase;

struct UppercaseWriter(OutputSink);

impl Write for UppercaseWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write_all(&buf.to_ascii_uppercase())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}

impl FinishWrite for UppercaseWriter {
    fn finish_write(self: Box<Self>) -> std::io::Result<()> {
        self.0.finish_write()
    }
}

impl CompressionCodec for Uppercase {
    fn name(&self) -> &str {
        "uppercase"
    }

    fn extensions(&self) -> &[&str] {
        &[".upper"]
    }

    fn wrap_writer_dyn(&self, writer: OutputSink) -> std::io::Result<OutputSink> {
        Ok(Box::new(UppercaseWriter(writer)))
    }
}

#[test]
fn custom_codec_is_used_for_its_extension() -> Result<()> {
    register_codec(Arc::new(Uppercase));
    assert_eq!(
        codec_for_path("table.UPPER").map(|c| c.name().to_owned()).as_deref(),
        Some("uppercase")
    );

    let tmp = TempDirPath::new()?;
    let path = tmp.file_path("table.upper");
    let mut w = open_csv(&path, ["name"])?;
    w.write_row(["quiet"])?;
    w.finish()?;
    assert_table_lines(&read_table_output(&path)?, &["NAME", "QUIET"]);
    Ok(())
}

#[test]
fn unknown_extension_is_passed_through() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let path = tmp.file_path("raw.txt");
    let file = std::fs::File::create(&path)?;
    let mut w = auto_detect_writer(file, &path)?;
    w.write_all(b"x\n")?;
    w.finish_write()?;
    assert_eq!(read_table_output(&path)?, "x\n");
    Ok(())
}
