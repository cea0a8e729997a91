//! Reader for the whitespace-separated instance text format.
//!
//! ```text
//! <instance count>
//! <m> <T> <l_1> .. <l_m> <b_1> .. <b_m>
//! ...
//! ```
//!
//! Blank lines are ignored. Items not shorter than `T` are stripped from each
//! record.

use crate::error::InstanceError;
use crate::instance::Instance;
use std::path::Path;

/// Parse all instances from the text format.
pub fn read_instances(text: &str) -> Result<Vec<Instance>, InstanceError> {
    let mut lines = text.lines().enumerate();
    let expected = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((index, line)) => break parse_field::<usize>(line.trim(), index + 1)?,
            None => {
                return Err(InstanceError::Parse {
                    line: 1,
                    reason: "missing instance count".to_string(),
                })
            }
        }
    };

    let mut instances = Vec::with_capacity(expected);
    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        instances.push(parse_record(line, index + 1)?);
    }

    if instances.len() != expected {
        return Err(InstanceError::CountMismatch {
            expected,
            found: instances.len(),
        });
    }

    tracing::debug!(
        component = "reader",
        operation = "read_instances",
        status = "success",
        instances = instances.len(),
        "Parsed instance records"
    );
    Ok(instances)
}

/// Read and parse an instance file.
pub fn read_instance_file(path: impl AsRef<Path>) -> Result<Vec<Instance>, InstanceError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|err| InstanceError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    read_instances(&text)
}

fn parse_record(line: &str, line_number: usize) -> Result<Instance, InstanceError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(InstanceError::Parse {
            line: line_number,
            reason: "expected item count and threshold".to_string(),
        });
    }
    let item_count: usize = parse_field(fields[0], line_number)?;
    let threshold: u64 = parse_field(fields[1], line_number)?;
    let values = &fields[2..];
    if values.len() != 2 * item_count {
        return Err(InstanceError::Parse {
            line: line_number,
            reason: format!(
                "expected {} lengths and availabilities, found {} values",
                item_count,
                values.len()
            ),
        });
    }

    let lengths = values[..item_count]
        .iter()
        .map(|field| parse_field::<u64>(field, line_number))
        .collect::<Result<Vec<_>, _>>()?;
    let availabilities = values[item_count..]
        .iter()
        .map(|field| parse_field::<u32>(field, line_number))
        .collect::<Result<Vec<_>, _>>()?;

    Instance::strip_large_items(threshold, lengths, availabilities).map_err(|err| {
        InstanceError::Parse {
            line: line_number,
            reason: err.to_string(),
        }
    })
}

fn parse_field<T: std::str::FromStr>(field: &str, line: usize) -> Result<T, InstanceError> {
    field.parse().map_err(|_| InstanceError::Parse {
        line,
        reason: format!("'{}' is not a non-negative integer", field),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_records_and_skips_blank_lines() {
        let text = "2\n4 10 6 5 4 3 1 1 2 4\n\n2 7 3 2 5 1\n";
        let instances = read_instances(text).unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].threshold(), 10);
        assert_eq!(instances[0].lengths(), &[6, 5, 4, 3]);
        assert_eq!(instances[0].availabilities(), &[1, 1, 2, 4]);
        assert_eq!(instances[1].lengths(), &[3, 2]);
        assert_eq!(instances[1].availabilities(), &[5, 1]);
    }

    #[test]
    fn strips_items_at_or_above_threshold() {
        let instances = read_instances("1\n3 10 12 10 4 1 2 3\n").unwrap();
        assert_eq!(instances[0].lengths(), &[4]);
        assert_eq!(instances[0].availabilities(), &[3]);
    }

    #[test]
    fn count_mismatch_is_reported() {
        let err = read_instances("3\n1 10 4 2\n").unwrap_err();
        assert_eq!(
            err,
            InstanceError::CountMismatch {
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn short_record_reports_line() {
        let err = read_instances("1\n\n2 10 4 3 1\n").unwrap_err();
        match err {
            InstanceError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        let err = read_instances("1\n1 10 x 2\n").unwrap_err();
        assert_eq!(err.code(), "INSTANCE_PARSE");
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(read_instances("").is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_instance_file("/nonexistent/ssp/instances.dat").unwrap_err();
        assert_eq!(err.code(), "INSTANCE_IO");
    }
}
