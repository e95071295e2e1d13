//! Types shared by every carrier adapter: bill identities, upload metadata and
//! the staging plan handed to the downstream loader.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize, Serializer};

use crate::fields;

/// Identity of one bill. Two rows describe the same bill when all four fields
/// are equal; invoice dates must agree on both instant and offset.
#[derive(Debug, Clone, Serialize)]
pub struct BillDetails {
    pub invoice_id: String,
    pub invoice_date: Option<DateTime<FixedOffset>>,
    pub warehouse_zip: String,
    pub account_no: String,
}

impl BillDetails {
    fn date_key(&self) -> Option<(DateTime<FixedOffset>, i32)> {
        self.invoice_date
            .map(|date| (date, date.offset().local_minus_utc()))
    }
}

impl PartialEq for BillDetails {
    fn eq(&self, other: &Self) -> bool {
        self.invoice_id == other.invoice_id
            && self.date_key() == other.date_key()
            && self.warehouse_zip == other.warehouse_zip
            && self.account_no == other.account_no
    }
}

impl Eq for BillDetails {}

impl Hash for BillDetails {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.invoice_id.hash(state);
        self.date_key().hash(state);
        self.warehouse_zip.hash(state);
        self.account_no.hash(state);
    }
}

/// Metadata supplied alongside an uploaded bill file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BillUploadDetails {
    pub account_number: String,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl BillUploadDetails {
    pub fn for_account(account_number: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<FixedOffset>),
}

impl Cell {
    pub fn as_display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Integer(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Timestamp(ts) => ts.to_rfc3339(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Empty dates stage as the zero timestamp, never as null.
impl From<Option<DateTime<FixedOffset>>> for Cell {
    fn from(value: Option<DateTime<FixedOffset>>) -> Self {
        Cell::Timestamp(value.unwrap_or_else(fields::zero_date))
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Integer(i) => serializer.serialize_i64(*i),
            Cell::Float(f) => serializer.serialize_f64(*f),
            Cell::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
        }
    }
}

/// A named set of rows destined for one table, inserted `chunk` rows at a time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagingBatch {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub chunk: usize,
}

impl StagingBatch {
    /// Row slices of at most `chunk` rows, in order.
    pub fn chunks(&self) -> std::slice::Chunks<'_, Vec<Cell>> {
        self.rows.chunks(self.chunk.max(1))
    }
}

pub type SprocParams = fn(&BillUploadDetails) -> Vec<Cell>;

/// Stored procedure to run once every batch named in `after` has loaded.
#[derive(Clone, Serialize)]
pub struct SprocCall {
    pub name: String,
    pub after: Vec<String>,
    #[serde(skip)]
    pub params: SprocParams,
}

impl SprocCall {
    pub fn params_for(&self, upload: &BillUploadDetails) -> Vec<Cell> {
        (self.params)(upload)
    }
}

impl fmt::Debug for SprocCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SprocCall")
            .field("name", &self.name)
            .field("after", &self.after)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StagingPlan {
    pub batches: Vec<StagingBatch>,
    pub sprocs: Vec<SprocCall>,
}

impl StagingPlan {
    pub fn total_rows(&self) -> usize {
        self.batches.iter().map(|batch| batch.rows.len()).sum()
    }

    pub fn resolve<'a>(&'a self, upload: &BillUploadDetails) -> ResolvedPlan<'a> {
        ResolvedPlan {
            batches: &self.batches,
            sprocs: self
                .sprocs
                .iter()
                .map(|call| ResolvedSproc {
                    name: &call.name,
                    after: &call.after,
                    params: call.params_for(upload),
                })
                .collect(),
        }
    }
}

/// Plan rendering for the loader hand-off, with sproc parameters evaluated
/// against the upload they belong to.
#[derive(Debug, Serialize)]
pub struct ResolvedPlan<'a> {
    pub batches: &'a [StagingBatch],
    pub sprocs: Vec<ResolvedSproc<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ResolvedSproc<'a> {
    pub name: &'a str,
    pub after: &'a [String],
    pub params: Vec<Cell>,
}
