pub mod adapter;
pub mod cli;
pub mod columns;
pub mod config;
pub mod domain;
pub mod easypost;
pub mod error;
pub mod fields;
pub mod header;
pub mod io_utils;
pub mod ordered_set;
pub mod reader;
pub mod table;

use std::{env, io::Write, sync::OnceLock};

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    adapter::CarrierAdapter,
    cli::{BillsArgs, Cli, Commands, ExportArgs, InputArgs, PlanArgs, ValidateArgs},
    config::IngestConfig,
    domain::BillUploadDetails,
    easypost::UspsEasyPostAdapter,
    reader::{CsvReaderConfig, CsvReaderFactory, Records},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("carrier_bill_ingest", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Bills(args) => handle_bills(&args),
        Commands::Validate(args) => handle_validate(&args),
        Commands::Plan(args) => handle_plan(&args),
        Commands::Export(args) => handle_export(&args),
    }
}

/// Everything a command needs once the input has been read.
struct Loaded {
    config: IngestConfig,
    adapter: UspsEasyPostAdapter,
    records: Records,
}

fn load(args: &InputArgs) -> Result<Loaded> {
    let config = IngestConfig::load_optional(args.config.as_deref())?;
    let reader_config = reader_config(args, &config);
    debug!("Reader settings: {:?}", reader_config);

    let adapter = UspsEasyPostAdapter::new(CsvReaderFactory::new(reader_config));
    let input = io_utils::open_input(&args.input)?;
    let records = adapter
        .get_records(input)
        .with_context(|| format!("Reading bill records from {:?}", args.input))?;
    info!(
        "Read {} row(s) across {} column(s) from {:?}",
        records.rows.len(),
        records.headers.len(),
        args.input
    );
    Ok(Loaded {
        config,
        adapter,
        records,
    })
}

fn reader_config(args: &InputArgs, config: &IngestConfig) -> CsvReaderConfig {
    let delimiter = args
        .delimiter
        .map(char::from)
        .or(config.reader.delimiter)
        .unwrap_or_else(|| char::from(io_utils::resolve_input_delimiter(&args.input, None)));
    CsvReaderConfig {
        delimiter: Some(delimiter),
        encoding: args
            .input_encoding
            .clone()
            .or_else(|| config.reader.encoding.clone()),
    }
}

fn upload_details(account: Option<&str>, config: &IngestConfig) -> Option<BillUploadDetails> {
    match (account, &config.upload) {
        (Some(account), Some(upload)) => Some(BillUploadDetails {
            account_number: account.to_string(),
            ..upload.clone()
        }),
        (Some(account), None) => Some(BillUploadDetails::for_account(account)),
        (None, upload) => upload.clone(),
    }
}

fn handle_bills(args: &BillsArgs) -> Result<()> {
    let loaded = load(&args.input)?;
    let bills = loaded
        .adapter
        .get_bills(&loaded.records.headers, &loaded.records.rows)
        .context("Extracting bills")?;

    if args.json {
        let mut out = io_utils::open_output(None)?;
        serde_json::to_writer_pretty(&mut out, &bills).context("Writing bills JSON")?;
        writeln!(out)?;
    } else {
        let headers = ["invoice_id", "invoice_date", "warehouse_zip", "account_no"]
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();
        let rows = bills
            .iter()
            .map(|bill| {
                vec![
                    bill.invoice_id.clone(),
                    fields::format_day(bill.invoice_date.as_ref()),
                    bill.warehouse_zip.clone(),
                    bill.account_no.clone(),
                ]
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
    }
    info!("Found {} bill(s)", bills.len());
    Ok(())
}

fn handle_validate(args: &ValidateArgs) -> Result<()> {
    let loaded = load(&args.input)?;
    let upload = upload_details(args.account.as_deref(), &loaded.config)
        .ok_or_else(|| anyhow!("An expected account number is required (--account or config upload)"))?;
    let bills = loaded
        .adapter
        .get_bills(&loaded.records.headers, &loaded.records.rows)
        .context("Extracting bills")?;

    let errors = loaded.adapter.validate(&bills, &upload);
    if !errors.is_empty() {
        bail!(
            "{} of {} bill(s) failed validation against account '{}'",
            errors.len(),
            bills.len(),
            upload.account_number
        );
    }
    info!(
        "✓ {} bill(s) match account '{}'",
        bills.len(),
        upload.account_number
    );
    Ok(())
}

fn handle_plan(args: &PlanArgs) -> Result<()> {
    let loaded = load(&args.input)?;
    let plan = loaded
        .adapter
        .build_staging_plan(&loaded.records.headers, &loaded.records.rows)
        .context("Building staging plan")?;
    let upload = upload_details(args.account.as_deref(), &loaded.config).unwrap_or_default();

    let mut out = io_utils::open_output(args.output.as_deref())?;
    serde_json::to_writer_pretty(&mut out, &plan.resolve(&upload))
        .context("Writing staging plan JSON")?;
    writeln!(out)?;
    out.flush().context("Flushing staging plan output")?;

    let destination = args
        .output
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    info!(
        "Wrote staging plan with {} batch(es), {} row(s) and {} procedure call(s) -> {}",
        plan.batches.len(),
        plan.total_rows(),
        plan.sprocs.len(),
        destination
    );
    Ok(())
}

fn handle_export(args: &ExportArgs) -> Result<()> {
    let loaded = load(&args.input)?;
    let plan = loaded
        .adapter
        .build_staging_plan(&loaded.records.headers, &loaded.records.rows)
        .context("Building staging plan")?;

    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), io_utils::DEFAULT_CSV_DELIMITER)?;
    for batch in &plan.batches {
        writer
            .write_record(batch.columns.iter())
            .context("Writing output headers")?;
        let mut written = 0usize;
        for chunk in batch.chunks() {
            for row in chunk {
                written += 1;
                writer
                    .write_record(row.iter().map(|cell| cell.as_display()))
                    .with_context(|| format!("Writing staged row {written}"))?;
            }
            writer.flush().context("Flushing output writer")?;
            debug!("Wrote {written} of {} row(s) for {}", batch.rows.len(), batch.table);
        }
    }
    writer.flush().context("Flushing output writer")?;
    info!("Exported {} staged row(s)", plan.total_rows());
    Ok(())
}
