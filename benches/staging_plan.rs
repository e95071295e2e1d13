use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

use carrier_bill_ingest::{
    adapter::CarrierAdapter, easypost::UspsEasyPostAdapter, reader::CsvReaderFactory,
};

const HEADER: &str = "created_at,tracking_code,from_zip,service,carrier_account_id,rate,label_fee,postage_fee,insurance_fee,carbon_offset_fee,weight,length,width,height,usps_zone,postage_label_created_at";

fn generate_export(rows: usize) -> String {
    let mut text = String::from(HEADER);
    for i in 0..rows {
        let day = (i % 28) + 1;
        let account = if i % 2 == 0 { "ca_1001" } else { "ca_2002" };
        let created = if i % 3 == 0 {
            format!("{}/{day}/24", (i % 12) + 1)
        } else {
            format!("2024-03-{day:02}T10:00:00Z")
        };
        text.push_str(&format!(
            "\n{created},94001000000{i:011},100{},GroundAdvantage,{account},{}.25,0.05,,,0.01,{}.5,10,8,4,{},2024-03-{day:02}T10:00:01Z",
            i % 10,
            i % 40,
            i % 70,
            (i % 9) + 1
        ));
    }
    text
}

fn bench_staging_plan(c: &mut Criterion) {
    let adapter = UspsEasyPostAdapter::new(CsvReaderFactory::default());
    let export = generate_export(20_000);
    let records = adapter
        .get_records(Box::new(export.as_bytes()))
        .expect("records");

    let mut group = c.benchmark_group("usps_easypost");
    group.bench_function("get_records", |b| {
        b.iter_batched(
            || export.as_bytes(),
            |bytes| adapter.get_records(Box::new(bytes)).expect("records"),
            BatchSize::SmallInput,
        )
    });
    group.bench_function("get_bills", |b| {
        b.iter(|| {
            adapter
                .get_bills(&records.headers, &records.rows)
                .expect("bills")
        })
    });
    group.bench_function("build_staging_plan", |b| {
        b.iter(|| {
            adapter
                .build_staging_plan(&records.headers, &records.rows)
                .expect("plan")
        })
    });
    group.finish();
}

criterion_group!(benches, bench_staging_plan);
criterion_main!(benches);
