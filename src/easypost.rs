//! USPS bills exported from EasyPost.
//!
//! One export row is one label. Rows are grouped into bills by carrier account
//! and creation day, and every row is staged into
//! `elt_stage.usps_easy_post_bill` before `elt_stage.usp_SyncUSPSEasyPost`
//! folds the staged rows into the billing tables.

use std::{io::Read, sync::Arc};

use chrono::{DateTime, FixedOffset};
use log::{Level, Log, debug, info};

use crate::{
    adapter::{self, CarrierAdapter, ProcessLogger},
    columns,
    domain::{BillDetails, BillUploadDetails, Cell, SprocCall, StagingBatch, StagingPlan},
    error::{AdapterError, Result},
    fields,
    header::HeaderIndex,
    ordered_set::OrderedSet,
    reader::{RecordReaderFactory, Records},
};

pub const BATCH_NAME: &str = "usps_easypost_bill";
pub const TARGET_TABLE: &str = "elt_stage.usps_easy_post_bill";
pub const CHUNK_SIZE: usize = 5000;
pub const SYNC_PROCEDURE: &str = "elt_stage.usp_SyncUSPSEasyPost";

/// Invoice numbers must fit the 40-character column they are loaded into.
pub const MAX_INVOICE_ID_LEN: usize = 40;

pub struct UspsEasyPostAdapter {
    reader_factory: Box<dyn RecordReaderFactory>,
    logger: Arc<dyn Log>,
}

impl UspsEasyPostAdapter {
    pub fn new(reader_factory: impl RecordReaderFactory + 'static) -> Self {
        Self::with_logger(reader_factory, Arc::new(ProcessLogger))
    }

    pub fn with_logger(
        reader_factory: impl RecordReaderFactory + 'static,
        logger: Arc<dyn Log>,
    ) -> Self {
        Self {
            reader_factory: Box::new(reader_factory),
            logger,
        }
    }
}

impl CarrierAdapter for UspsEasyPostAdapter {
    fn get_records<'a>(&self, input: Box<dyn Read + 'a>) -> Result<Records> {
        let mut reader = self.reader_factory.create(input)?;
        reader.read()
    }

    fn get_bills(&self, headers: &[String], rows: &[Vec<String>]) -> Result<Vec<BillDetails>> {
        let index = HeaderIndex::build(headers);
        let mut unique = OrderedSet::new();
        for row in rows {
            let created_at = fields::date(row, &index, columns::CREATED_AT)?;
            unique.add(BillDetails {
                invoice_id: invoice_number(row, &index, created_at.as_ref()),
                invoice_date: created_at,
                warehouse_zip: fields::text(row, &index, columns::FROM_ZIP).to_string(),
                account_no: fields::text(row, &index, columns::CARRIER_ACCOUNT_ID).to_string(),
            });
        }
        debug!(
            "Found {} unique bill(s) across {} row(s)",
            unique.len(),
            rows.len()
        );
        Ok(unique.into_values())
    }

    fn build_staging_plan(&self, headers: &[String], rows: &[Vec<String>]) -> Result<StagingPlan> {
        let index = HeaderIndex::build(headers);
        let records = rows
            .iter()
            .map(|row| BillRecord::extract(row, &index).map(BillRecord::into_cells))
            .collect::<Result<Vec<_>>>()?;
        info!("Staged {} row(s) for {TARGET_TABLE}", records.len());
        Ok(staging_plan(records))
    }

    fn validate(&self, bills: &[BillDetails], upload: &BillUploadDetails) -> Vec<AdapterError> {
        let mut errors = Vec::new();
        for bill in bills {
            if bill.account_no.is_empty() || bill.account_no == upload.account_number {
                continue;
            }
            adapter::emit(
                self.logger.as_ref(),
                Level::Warn,
                module_path!(),
                format_args!(
                    "account number mismatch: in bill={}, given={}",
                    bill.account_no, upload.account_number
                ),
            );
            errors.push(AdapterError::AccountMismatch {
                expected: upload.account_number.clone(),
                found: bill.account_no.clone(),
            });
        }
        errors
    }
}

/// `{carrier_account_id}-{YYYY-MM-DD}`, compact enough to stay within
/// [`MAX_INVOICE_ID_LEN`] for real account ids.
fn invoice_number(
    row: &[String],
    index: &HeaderIndex,
    created_at: Option<&DateTime<FixedOffset>>,
) -> String {
    let account = fields::text(row, index, columns::CARRIER_ACCOUNT_ID);
    format!("{account}-{}", fields::format_day(created_at))
}

/// One staged label row. Field order matches [`columns::BILL_DB_COLUMN_NAMES`].
#[derive(Debug, Clone, PartialEq)]
struct BillRecord {
    tracking_code: String,
    weight: f64,
    rate: f64,
    label_fee: f64,
    postage_fee: f64,
    usps_zone: i64,
    from_zip: String,
    length: f64,
    width: f64,
    height: f64,
    postage_label_created_at: Option<DateTime<FixedOffset>>,
    insurance_fee: f64,
    carbon_offset_fee: f64,
    bill_date: Option<DateTime<FixedOffset>>,
    invoice_number: String,
    service: String,
}

impl BillRecord {
    fn extract(row: &[String], index: &HeaderIndex) -> Result<Self> {
        let bill_date = fields::date(row, index, columns::CREATED_AT)?;
        Ok(Self {
            tracking_code: fields::text(row, index, columns::TRACKING_CODE).to_string(),
            weight: fields::float(row, index, columns::WEIGHT)?,
            rate: fields::float(row, index, columns::RATE)?,
            label_fee: fields::float(row, index, columns::LABEL_FEE)?,
            postage_fee: fields::float(row, index, columns::POSTAGE_FEE)?,
            usps_zone: fields::integer(row, index, columns::USPS_ZONE)?,
            from_zip: fields::text(row, index, columns::FROM_ZIP).to_string(),
            length: fields::float(row, index, columns::LENGTH)?,
            width: fields::float(row, index, columns::WIDTH)?,
            height: fields::float(row, index, columns::HEIGHT)?,
            postage_label_created_at: fields::date(row, index, columns::POSTAGE_LABEL_CREATED_AT)?,
            insurance_fee: fields::float(row, index, columns::INSURANCE_FEE)?,
            carbon_offset_fee: fields::float(row, index, columns::CARBON_OFFSET_FEE)?,
            invoice_number: invoice_number(row, index, bill_date.as_ref()),
            bill_date,
            service: fields::text(row, index, columns::SERVICE).to_string(),
        })
    }

    fn into_cells(self) -> Vec<Cell> {
        vec![
            Cell::Text(self.tracking_code),
            Cell::Float(self.weight),
            Cell::Float(self.rate),
            Cell::Float(self.label_fee),
            Cell::Float(self.postage_fee),
            Cell::Integer(self.usps_zone),
            Cell::Text(self.from_zip),
            Cell::Float(self.length),
            Cell::Float(self.width),
            Cell::Float(self.height),
            Cell::from(self.postage_label_created_at),
            Cell::Float(self.insurance_fee),
            Cell::Float(self.carbon_offset_fee),
            Cell::from(self.bill_date),
            Cell::Text(self.invoice_number),
            Cell::Text(self.service),
        ]
    }
}

fn no_params(_: &BillUploadDetails) -> Vec<Cell> {
    Vec::new()
}

fn staging_plan(rows: Vec<Vec<Cell>>) -> StagingPlan {
    StagingPlan {
        batches: vec![StagingBatch {
            name: BATCH_NAME.to_string(),
            table: TARGET_TABLE.to_string(),
            columns: columns::BILL_DB_COLUMN_NAMES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows,
            chunk: CHUNK_SIZE,
        }],
        sprocs: vec![SprocCall {
            name: SYNC_PROCEDURE.to_string(),
            after: vec![BATCH_NAME.to_string()],
            params: no_params,
        }],
    }
}
