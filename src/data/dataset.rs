//! CSV parsing for training files.
//!
//! Supported format:
//! - comma-separated numbers, one example per line
//! - the last `n_outputs` columns are the expected output, the rest the input
//! - the first data row fixes the width every other row must match
//! - an optional header row (any non-numeric cell) and blank lines are skipped

use std::path::Path;

use log::debug;

use crate::error::{DataError, Result};

/// One training pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub input: Vec<f64>,
    pub output: Vec<f64>,
}

impl Example {
    pub fn new(input: Vec<f64>, output: Vec<f64>) -> Example {
        Example { input, output }
    }
}

pub fn load_csv<P: AsRef<Path>>(path: P, n_outputs: usize) -> Result<Vec<Example>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let examples = parse_csv(&text, n_outputs)?;
    debug!("read {} examples from {}", examples.len(), path.as_ref().display());
    Ok(examples)
}

pub fn parse_csv(text: &str, n_outputs: usize) -> std::result::Result<Vec<Example>, DataError> {
    let mut examples = Vec::new();
    let mut width = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if width.is_none() && is_header(line) {
            continue;
        }

        let values = line
            .split(',')
            .map(|cell| {
                let cell = cell.trim();
                cell.parse::<f64>().map_err(|_| DataError::InvalidNumber {
                    line: line_no,
                    value: cell.to_string(),
                })
            })
            .collect::<std::result::Result<Vec<f64>, DataError>>()?;

        let expected = *width.get_or_insert(values.len());
        if values.len() != expected {
            return Err(DataError::RowWidth { line: line_no, expected, found: values.len() });
        }
        if values.len() <= n_outputs {
            return Err(DataError::TooFewColumns {
                line: line_no,
                found: values.len(),
                outputs: n_outputs,
            });
        }

        let mut input = values;
        let output = input.split_off(input.len() - n_outputs);
        examples.push(Example { input, output });
    }

    if examples.is_empty() {
        return Err(DataError::Empty);
    }
    Ok(examples)
}

/// A row is a header if any non-empty cell fails to parse as a number.
fn is_header(line: &str) -> bool {
    line.split(',')
        .map(str::trim)
        .any(|cell| !cell.is_empty() && cell.parse::<f64>().is_err())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_inputs_from_outputs() {
        let examples = parse_csv("1,2,3\n4,5,6\n", 1).unwrap();
        assert_eq!(
            examples,
            vec![
                Example::new(vec![1.0, 2.0], vec![3.0]),
                Example::new(vec![4.0, 5.0], vec![6.0]),
            ]
        );
    }

    #[test]
    fn skips_header_blank_lines_and_crlf() {
        let examples = parse_csv("x1,x2,y1,y2\r\n0.5,1.5,1,0\r\n\r\n-2,3e-1,0,1\r\n", 2).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[1].input, vec![-2.0, 0.3]);
        assert_eq!(examples[1].output, vec![0.0, 1.0]);
    }

    #[test]
    fn reports_line_of_bad_number() {
        let err = parse_csv("1,2\n3,oops\n", 1).unwrap_err();
        assert_eq!(err, DataError::InvalidNumber { line: 2, value: "oops".into() });
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = parse_csv("1,2,3\n4,5\n", 1).unwrap_err();
        assert_eq!(err, DataError::RowWidth { line: 2, expected: 3, found: 2 });
    }

    #[test]
    fn needs_at_least_one_input_column() {
        let err = parse_csv("1\n", 1).unwrap_err();
        assert_eq!(err, DataError::TooFewColumns { line: 1, found: 1, outputs: 1 });
    }

    #[test]
    fn empty_file_is_an_error() {
        assert_eq!(parse_csv("\n\n", 1).unwrap_err(), DataError::Empty);
        assert_eq!(parse_csv("a,b\n", 1).unwrap_err(), DataError::Empty);
    }
}
