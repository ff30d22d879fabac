//! End-to-end codec tests: round-trips, size exactness, null handling,
//! zero-copy aliasing, and malformed-buffer rejection.

use crate::error::TesseraError;
use crate::record::{ColVal, Field, OwnedRecord, Record, Schema};
use crate::types::FieldType;

/// The reference batch: five columns, four rows, an independent null pattern
/// per column.
fn build_reference_record() -> OwnedRecord {
    let schema = Schema::new(vec![
        Field::new("int", FieldType::Integer),
        Field::new("float", FieldType::Float),
        Field::new("boolean", FieldType::Boolean),
        Field::new("string", FieldType::String),
        Field::new("time", FieldType::Integer),
    ])
    .unwrap();

    let columns = vec![
        ColVal::from_nullable_slice::<i64>(&[0, 2, 3, 4], &[false, true, true, true]),
        ColVal::from_nullable_slice::<f64>(&[1.0, 0.0, 3.0, 4.0], &[true, false, true, true]),
        ColVal::from_bools(&[true, true, true, false], &[true, true, true, false]),
        ColVal::from_strings(&["a", "b", "", "d"], &[true, true, false, true]),
        ColVal::from_slice::<i64>(&[1, 2, 3, 4]),
    ];

    Record::from_columns(schema, columns).unwrap()
}

/// 800 rows over four repeated int/float/boolean/string groups plus time.
fn build_large_record() -> OwnedRecord {
    const ROWS: usize = 800;
    const GROUPS: usize = 4;

    let mut fields = Vec::new();
    let mut columns: Vec<ColVal<'static>> = Vec::new();

    let ints: Vec<i64> = (0..ROWS as i64).map(|i| i * 17).collect();
    let floats: Vec<f64> = (0..ROWS).map(|i| i as f64 * 133.43).collect();
    let bools: Vec<bool> = (0..ROWS).map(|i| i % 2 == 0).collect();
    let all_valid = vec![true; ROWS];

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
    columns.push(ColVal::from_slice::<i64>(
        &(1..=ROWS as i64).collect::<Vec<_>>(),
    ));

    Record::from_columns(Schema::new(fields).unwrap(), columns).unwrap()
}

fn marshal_exact(rec: &Record<'_>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(rec.codec_size());
    rec.marshal(&mut buf).unwrap();
    buf
}

#[test]
fn test_reference_record_roundtrip() {
    let rec = build_reference_record();
    let buf = marshal_exact(&rec);
    assert_eq!(buf.len(), rec.codec_size());

    let decoded = Record::unmarshal(&buf).unwrap();
    assert_eq!(decoded.schema, rec.schema);
    assert_eq!(decoded.row_count, 4);
    for (got, want) in decoded.columns.iter().zip(&rec.columns) {
        assert_eq!(got, want);
    }

    // Spot-check observable values through the accessors.
    assert_eq!(decoded.columns[0].integer_at(0), None);
    assert_eq!(decoded.columns[0].integer_at(3), Some(4));
    assert_eq!(decoded.columns[1].float_at(1), None);
    assert_eq!(decoded.columns[1].float_at(2), Some(3.0));
    assert_eq!(decoded.columns[2].boolean_at(2), Some(true));
    assert_eq!(decoded.columns[2].boolean_at(3), None);
    assert_eq!(decoded.columns[3].string_at(1), Some("b"));
    assert_eq!(decoded.columns[3].string_at(2), None);
    assert_eq!(decoded.columns[3].string_at(3), Some("d"));
    assert_eq!(
        decoded.column_by_name("time").unwrap().fixed_values::<i64>(),
        vec![1, 2, 3, 4]
    );
}

#[test]
fn test_large_record_size_exactness() {
    let rec = build_large_record();
    let buf = marshal_exact(&rec);
    assert_eq!(buf.len(), rec.codec_size());

    let decoded = Record::unmarshal(&buf).unwrap();
    assert_eq!(decoded, rec);

    let borrowed = Record::unmarshal2(&buf).unwrap();
    assert_eq!(borrowed, rec);
}

#[test]
fn test_zero_copy_decode_aliases_source_buffer() {
    let rec = build_reference_record();
    let buf = marshal_exact(&rec);

    let borrowed = Record::unmarshal2(&buf).unwrap();
    assert!(borrowed.borrows_source());

    // The string blob must be backed by the encoded buffer itself.
    let string_col = borrowed.column_by_name("string").unwrap();
    assert!(string_col.borrows_source());
    let blob = string_col.values_bytes();
    let buf_start = buf.as_ptr() as usize;
    let blob_start = blob.as_ptr() as usize;
    assert!(blob_start >= buf_start && blob_start + blob.len() <= buf_start + buf.len());

    // The copying decode owns everything instead.
    let owned = Record::unmarshal(&buf).unwrap();
    assert!(!owned.borrows_source());

    // into_owned detaches a borrowed record from its buffer.
    let detached = Record::unmarshal2(&buf).unwrap().into_owned();
    drop(buf);
    assert_eq!(detached, rec);
}

#[test]
fn test_all_null_and_no_null_columns() {
    let schema = Schema::new(vec![
        Field::new("int", FieldType::Integer),
        Field::new("string", FieldType::String),
        Field::new("time", FieldType::Integer),
    ])
    .unwrap();

    let mut int_col = ColVal::new();
    let mut string_col = ColVal::new();
    for _ in 0..4 {
        int_col.append_null(FieldType::Integer);
        string_col.append_null(FieldType::String);
    }
    let rec = Record::from_columns(
        schema,
        vec![int_col, string_col, ColVal::from_slice::<i64>(&[1, 2, 3, 4])],
    )
    .unwrap();

    let buf = marshal_exact(&rec);
    let decoded = Record::unmarshal(&buf).unwrap();
    assert_eq!(decoded, rec);

    // All-null: all-zero bitmap, no meaningful payload content.
    let int_col = decoded.column(0).unwrap();
    assert_eq!(int_col.null_count(), 4);
    assert_eq!(int_col.bitmap.as_raw_slice(), &[0u8]);
    assert!(int_col.values_bytes().iter().all(|&b| b == 0));
    let string_col = decoded.column(1).unwrap();
    assert_eq!(string_col.null_count(), 4);
    assert!(string_col.values_bytes().is_empty());

    // No-null: all-one bitmap (padding bits stay zero).
    let time_col = decoded.column(2).unwrap();
    assert_eq!(time_col.null_count(), 0);
    assert_eq!(time_col.bitmap.as_raw_slice(), &[0b0000_1111]);
}

#[test]
fn test_truncation_is_always_rejected() {
    let rec = build_reference_record();
    let buf = marshal_exact(&rec);

    for cut in 1..=buf.len() {
        let short = &buf[..buf.len() - cut];
        let copying = Record::unmarshal(short);
        assert!(
            matches!(copying, Err(TesseraError::TruncatedBuffer { .. })),
            "copying decode accepted a buffer truncated by {cut} bytes"
        );
        let borrowed = Record::unmarshal2(short);
        assert!(
            matches!(borrowed, Err(TesseraError::TruncatedBuffer { .. })),
            "zero-copy decode accepted a buffer truncated by {cut} bytes"
        );
    }
}

#[test]
fn test_corrupted_offsets_are_rejected() {
    let rec = build_reference_record();
    let buf = marshal_exact(&rec);

    // Locate the string column's offsets: header + schema section + the
    // three columns before it + its own bitmap byte.
    let schema_size: usize = rec.schema.iter().map(|f| 3 + f.name.len()).sum();
    let mut pos = 12 + schema_size;
    for i in 0..3 {
        pos += rec.columns[i].encoded_size(rec.schema.field(i).unwrap().field_type);
    }
    pos += 1; // string column bitmap, ceil(4/8) bytes

    // Blow up offsets[1]; the sequence is no longer non-decreasing.
    let mut corrupt = buf.clone();
    corrupt[pos + 4..pos + 8].copy_from_slice(&u32::MAX.to_le_bytes());
    assert!(matches!(
        Record::unmarshal(&corrupt),
        Err(TesseraError::MalformedOffsets(_))
    ));

    // A final offset disagreeing with the blob length is rejected too.
    let mut corrupt = buf;
    corrupt[pos + 16..pos + 20].copy_from_slice(&2u32.to_le_bytes());
    assert!(matches!(
        Record::unmarshal(&corrupt),
        Err(TesseraError::MalformedOffsets(_))
    ));
}

#[test]
fn test_empty_batch_roundtrip() {
    let schema = Schema::new(vec![
        Field::new("int", FieldType::Integer),
        Field::new("string", FieldType::String),
        Field::new("time", FieldType::Integer),
    ])
    .unwrap();
    let rec = Record::new(schema);
    assert_eq!(rec.rows(), 0);

    // Header + schema section + the lone zero offset and blob length of the
    // string column.
    let schema_size: usize = rec.schema.iter().map(|f| 3 + f.name.len()).sum();
    assert_eq!(rec.codec_size(), 12 + schema_size + 8);

    let buf = marshal_exact(&rec);
    assert_eq!(buf.len(), rec.codec_size());

    let decoded = Record::unmarshal(&buf).unwrap();
    assert_eq!(decoded, rec);
    assert_eq!(decoded.rows(), 0);
    for col in &decoded.columns {
        assert_eq!(col.rows(), 0);
        assert!(col.values_bytes().is_empty());
    }
}

#[test]
fn test_reencoding_a_decoded_record_is_byte_stable() {
    let rec = build_reference_record();
    let buf = marshal_exact(&rec);
    let decoded = Record::unmarshal2(&buf).unwrap();
    let again = marshal_exact(&decoded);
    assert_eq!(again, buf);
}
