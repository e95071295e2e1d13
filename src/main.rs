fn main() {
    if let Err(err) = carrier_bill_ingest::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
