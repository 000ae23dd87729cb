use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use excelgen::{StyleSpec, WorkbookGenerator, WorkbookSpec};

struct Record {
    id: u32,
    name: String,
    amount: f64,
    joined: NaiveDate,
    active: bool,
}

fn records(size: u32) -> Vec<Record> {
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
    (0..size)
        .map(|i| Record {
            id: i,
            name: format!("Name_{}", i),
            amount: f64::from(i) * 1.5,
            joined: start + chrono::Days::new(u64::from(i % 365)),
            active: i % 2 == 0,
        })
        .collect()
}

fn spec() -> WorkbookSpec<Record> {
    let mut builder = WorkbookSpec::<Record>::builder()
        .name("Bench")
        .sheet_name("Data")
        .default_header_style()
        .default_body_style();
    builder
        .number_col("ID", |r: &Record| Some(r.id))
        .unwrap()
        .string_col("Name", |r: &Record| Some(r.name.clone()))
        .unwrap()
        .number_col_styled(
            "Amount",
            StyleSpec::new().with_data_format("#,##0.00"),
            |r: &Record| Some(r.amount),
        )
        .unwrap()
        .date_col_styled(
            "Joined",
            StyleSpec::new().with_data_format("yyyy-mm-dd"),
            |r: &Record| Some(r.joined),
        )
        .unwrap()
        .boolean_col("Active", |r: &Record| Some(r.active))
        .unwrap();
    builder.build()
}

fn benchmark_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.sample_size(10);
    let spec = spec();

    for size in [100, 1000, 10000].iter() {
        let data = records(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(WorkbookGenerator::of(&spec, &data).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_generate_and_package(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_and_package");
    group.sample_size(10);
    let spec = spec();

    for size in [100, 1000, 10000].iter() {
        let data = records(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let document = WorkbookGenerator::of(&spec, &data).unwrap();
                black_box(document.to_bytes().unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_generate, benchmark_generate_and_package);
criterion_main!(benches);
