//! Record readers turn a raw byte stream into a header row plus data rows.
//!
//! Adapters do not construct readers themselves; they are handed a
//! [`RecordReaderFactory`] so the same adapter can be fed CSV, TSV or any other
//! tabular layout.

use std::io::Read;

use encoding_rs::Encoding;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AdapterError, Result},
    io_utils,
};

/// Header row and data rows of one bill file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Records {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub trait RecordReader {
    fn read(&mut self) -> Result<Records>;
}

pub trait RecordReaderFactory: Send + Sync {
    fn create<'a>(&self, input: Box<dyn Read + 'a>) -> Result<Box<dyn RecordReader + 'a>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CsvReaderConfig {
    #[serde(default)]
    pub delimiter: Option<char>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Builds [`CsvRecordReader`]s; construction fails on an unusable delimiter or
/// an unknown encoding label.
#[derive(Debug, Clone, Default)]
pub struct CsvReaderFactory {
    config: CsvReaderConfig,
}

impl CsvReaderFactory {
    pub fn new(config: CsvReaderConfig) -> Self {
        Self { config }
    }

    fn delimiter(&self) -> Result<u8> {
        let delimiter = self
            .config
            .delimiter
            .unwrap_or(io_utils::DEFAULT_CSV_DELIMITER as char);
        if !delimiter.is_ascii() || matches!(delimiter, '"' | '\r' | '\n') {
            return Err(AdapterError::ReaderConstruction(format!(
                "unsupported delimiter {delimiter:?}"
            )));
        }
        Ok(delimiter as u8)
    }

    fn encoding(&self) -> Result<&'static Encoding> {
        io_utils::resolve_encoding(self.config.encoding.as_deref())
            .map_err(|err| AdapterError::ReaderConstruction(err.to_string()))
    }
}

impl RecordReaderFactory for CsvReaderFactory {
    fn create<'a>(&self, input: Box<dyn Read + 'a>) -> Result<Box<dyn RecordReader + 'a>> {
        let delimiter = self.delimiter()?;
        let encoding = self.encoding()?;
        Ok(Box::new(CsvRecordReader {
            reader: io_utils::open_csv_reader(input, delimiter),
            encoding,
        }))
    }
}

pub struct CsvRecordReader<R> {
    reader: csv::Reader<R>,
    encoding: &'static Encoding,
}

impl<R: Read> RecordReader for CsvRecordReader<R> {
    fn read(&mut self) -> Result<Records> {
        let encoding = self.encoding;
        let header_record = self.reader.byte_headers()?.clone();
        let headers = io_utils::decode_record(&header_record, encoding).ok_or_else(|| {
            AdapterError::Read(format!(
                "header row is not valid {}",
                encoding.name()
            ))
        })?;
        let headers = io_utils::clean_headers(headers);

        let mut rows = Vec::new();
        for (row_idx, record) in self.reader.byte_records().enumerate() {
            let record = record
                .map_err(|err| AdapterError::Read(format!("row {}: {err}", row_idx + 2)))?;
            let decoded = io_utils::decode_record(&record, encoding).ok_or_else(|| {
                AdapterError::Read(format!(
                    "row {} is not valid {}",
                    row_idx + 2,
                    encoding.name()
                ))
            })?;
            rows.push(decoded);
        }
        debug!("Read {} header(s) and {} row(s)", headers.len(), rows.len());
        Ok(Records { headers, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(factory: &CsvReaderFactory, input: &'static [u8]) -> Result<Records> {
        factory.create(Box::new(input))?.read()
    }

    #[test]
    fn reads_headers_and_rows() {
        let records = read_all(&CsvReaderFactory::default(), b"a,b\n1,2\n3,\n").unwrap();
        assert_eq!(records.headers, vec!["a", "b"]);
        assert_eq!(records.rows, vec![vec!["1", "2"], vec!["3", ""]]);
    }

    #[test]
    fn empty_stream_yields_no_records() {
        let records = read_all(&CsvReaderFactory::default(), b"").unwrap();
        assert_eq!(records, Records::default());
    }

    #[test]
    fn ragged_rows_are_read_errors() {
        let err = read_all(&CsvReaderFactory::default(), b"a,b,c\n1\n").unwrap_err();
        assert!(matches!(err, AdapterError::Read(ref message) if message.starts_with("row 2")));
    }

    #[test]
    fn unterminated_quote_does_not_swallow_rows() {
        let err = read_all(&CsvReaderFactory::default(), b"a,b\n\"x,1\n2,3\n").unwrap_err();
        assert!(matches!(err, AdapterError::Read(_)));
    }

    #[test]
    fn decodes_configured_encoding() {
        let factory = CsvReaderFactory::new(CsvReaderConfig {
            delimiter: Some(';'),
            encoding: Some("windows-1252".to_string()),
        });
        let records = read_all(&factory, b"name;zip\nJos\xe9;10001\n").unwrap();
        assert_eq!(records.rows[0][0], "José");
    }

    #[test]
    fn invalid_utf8_is_a_read_error() {
        let err = read_all(&CsvReaderFactory::default(), b"a\n\xff\xfe\n").unwrap_err();
        assert!(matches!(err, AdapterError::Read(_)));
    }

    #[test]
    fn bad_configuration_fails_construction() {
        let factory = CsvReaderFactory::new(CsvReaderConfig {
            delimiter: Some('"'),
            encoding: None,
        });
        assert!(matches!(
            factory.create(Box::new(&b""[..])),
            Err(AdapterError::ReaderConstruction(_))
        ));

        let factory = CsvReaderFactory::new(CsvReaderConfig {
            delimiter: None,
            encoding: Some("klingon".to_string()),
        });
        assert!(matches!(
            factory.create(Box::new(&b""[..])),
            Err(AdapterError::ReaderConstruction(_))
        ));
    }
}
