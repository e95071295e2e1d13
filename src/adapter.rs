//! The interface every carrier adapter implements, and the logger seam they
//! report through.

use std::{fmt, io::Read};

use log::{Level, Log, Metadata, Record};

use crate::{
    domain::{BillDetails, BillUploadDetails, StagingPlan},
    error::{AdapterError, Result},
    reader::Records,
};

pub trait CarrierAdapter: Send + Sync {
    /// Reads the header row and data rows of a bill file.
    fn get_records<'a>(&self, input: Box<dyn Read + 'a>) -> Result<Records>;

    /// Distinct bill identities in first-seen order.
    fn get_bills(&self, headers: &[String], rows: &[Vec<String>]) -> Result<Vec<BillDetails>>;

    fn build_staging_plan(&self, headers: &[String], rows: &[Vec<String>]) -> Result<StagingPlan>;

    /// Checks bills against the upload metadata. Never fails; every problem
    /// found is returned.
    fn validate(&self, bills: &[BillDetails], upload: &BillUploadDetails) -> Vec<AdapterError>;
}

/// Forwards to whatever logger the process installed (env_logger in the CLI).
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLogger;

impl Log for ProcessLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        log::logger().log(record)
    }

    fn flush(&self) {
        log::logger().flush()
    }
}

pub(crate) fn emit(logger: &dyn Log, level: Level, target: &str, args: fmt::Arguments<'_>) {
    let metadata = Metadata::builder().level(level).target(target).build();
    if logger.enabled(&metadata) {
        logger.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path(Some(target))
                .build(),
        );
    }
}
