// In tessera-core/benches/codec_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;

use tessera_record::{ColVal, Field, FieldType, OwnedRecord, Record, Schema};

/// Builds the large benchmark batch: 800 rows over four repeated
/// int/float/boolean/string groups plus the time column.
fn generate_large_record() -> OwnedRecord {
    const ROWS: usize = 800;
    const GROUPS: usize = 4;

    let mut rng = rand::rng();
    let ints: Vec<i64> = (0..ROWS).map(|_| rng.random_range(0..1_000_000)).collect();
    let floats: Vec<f64> = (0..ROWS).map(|_| rng.random::<f64>() * 133.43).collect();
    let bools: Vec<bool> = (0..ROWS).map(|i| i % 2 == 0).collect();
    let times: Vec<i64> = (1..=ROWS as i64).collect();
    let all_valid = vec![true; ROWS];

    let mut fields = Vec::new();
    let mut columns = Vec::new();
    for g in 0..GROUPS {
        fields.push(Field::new(format!("int{g}"), FieldType::Integer));
        columns.push(ColVal::from_slice::<i64>(&ints));
        fields.push(Field::new(format!("float{g}"), FieldType::Float));
        columns.push(ColVal::from_slice::<f64>(&floats));
        fields.push(Field::new(format!("boolean{g}"), FieldType::Boolean));
        columns.push(ColVal::from_bools(&bools, &all_valid));
        fields.push(Field::new(format!("string{g}"), FieldType::String));
        columns.push(ColVal::from_strings(&vec!["test"; ROWS], &all_valid));
    }
    fields.push(Field::new("time", FieldType::Integer));
    columns.push(ColVal::from_slice::<i64>(&times));

    Record::from_columns(Schema::new(fields).unwrap(), columns).unwrap()
}

fn bench_codec(c: &mut Criterion) {
    let _ = env_logger::builder().try_init();

    let record = generate_large_record();
    let size = record.codec_size();

    // The producer pattern under test: preallocate once from codec_size,
    // then reuse the buffer across batches with zero growth.
    let mut buf = Vec::with_capacity(size);
    record.marshal(&mut buf).unwrap();
    assert_eq!(buf.len(), size);
    let encoded = buf.clone();

    let mut group = c.benchmark_group("Record Codec");
    group.throughput(criterion::Throughput::Bytes(size as u64));

    group.bench_function("Marshal (preallocated)", |b| {
        b.iter(|| {
            buf.clear();
            record.marshal(black_box(&mut buf)).unwrap();
            black_box(buf.len())
        })
    });

    group.bench_function("Unmarshal (copying)", |b| {
        b.iter(|| black_box(Record::unmarshal(black_box(&encoded)).unwrap()))
    });

    group.bench_function("Unmarshal2 (zero-copy)", |b| {
        b.iter(|| black_box(Record::unmarshal2(black_box(&encoded)).unwrap()))
    });

    group.bench_function("Marshal + Unmarshal2 roundtrip", |b| {
        b.iter(|| {
            buf.clear();
            record.marshal(&mut buf).unwrap();
            black_box(Record::unmarshal2(black_box(&buf)).unwrap())
        })
    });

    group.finish();
}

// These two lines generate the main function and register the benchmark group.
criterion_group!(benches, bench_codec);
criterion_main!(benches);
