//! Header names of the EasyPost USPS billing export and the column order of the
//! staging table it loads into.

pub const CREATED_AT: &str = "created_at";
pub const TRACKING_CODE: &str = "tracking_code";
pub const CARRIER_ACCOUNT_ID: &str = "carrier_account_id";
pub const FROM_ZIP: &str = "from_zip";
pub const SERVICE: &str = "service";
pub const RATE: &str = "rate";
pub const LABEL_FEE: &str = "label_fee";
pub const POSTAGE_FEE: &str = "postage_fee";
pub const INSURANCE_FEE: &str = "insurance_fee";
pub const CARBON_OFFSET_FEE: &str = "carbon_offset_fee";
pub const WEIGHT: &str = "weight";
pub const LENGTH: &str = "length";
pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";
pub const USPS_ZONE: &str = "usps_zone";
pub const POSTAGE_LABEL_CREATED_AT: &str = "postage_label_created_at";

/// Staging table columns, positionally matching `BillRecord::into_cells`.
/// `id` is an identity column and is never inserted.
pub const BILL_DB_COLUMN_NAMES: [&str; 16] = [
    "tracking_code",
    "weight",
    "rate",
    "label_fee",
    "postage_fee",
    "usps_zone",
    "from_zip",
    "length",
    "width",
    "height",
    "postage_label_created_at",
    "insurance_fee",
    "carbon_offset_fee",
    "bill_date",
    "invoice_number",
    "service",
];
