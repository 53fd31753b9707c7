//! Assertions over written table text.

/// Assert that `actual` consists of exactly `expected` lines, each terminated
/// by `\n`.
///
/// Lines are split on `\n` only, so a stray `\r` stays part of the line and
/// must appear in `expected`.
///
/// # Panics
///
/// Panics if the line counts differ, a line differs, or the text does not end
/// with a newline.
///
/// # Example
///
/// ```
/// use tablewriter::testing::assert_table_lines;
///
/// assert_table_lines("a,b\n1,2\n", &["a,b", "1,2"]);
/// ```
pub fn assert_table_lines(actual: &str, expected: &[&str]) {
    assert!(
        actual.is_empty() || actual.ends_with('\n'),
        "table output does not end with a newline: {actual:?}"
    );
    let lines = split_lines(actual);
    assert_eq!(
        lines.len(),
        expected.len(),
        "table line count mismatch:\n  Expected: {expected:?}\n  Actual: {lines:?}"
    );
    for (i, (a, e)) in lines.iter().zip(expected.iter()).enumerate() {
        assert_eq!(a, e, "table line mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}");
    }
}

/// Assert that every data line of `actual` has `columns - 1` commas.
///
/// Only meaningful for tables whose fields contain no commas.
///
/// # Panics
///
/// Panics on the first line with the wrong number of separators.
pub fn assert_row_widths(actual: &str, columns: usize) {
    for (i, line) in split_lines(actual).into_iter().enumerate() {
        let commas = line.matches(',').count();
        assert_eq!(
            commas,
            columns - 1,
            "line {i} has {commas} separators, expected {}: {line:?}",
            columns - 1
        );
    }
}

fn split_lines(text: &str) -> Vec<&str> {
    match text.strip_suffix('\n') {
        Some(body) => body.split('\n').collect(),
        None if text.is_empty() => Vec::new(),
        None => text.split('\n').collect(),
    }
}
