use std::fs::File;
use std::io::{BufReader, Cursor};

use khc::core::database::{SequenceRef, TemplateDatabase};

#[test]
fn build_write_read_query_round_trip() {
    let db = TemplateDatabase::build(
        5,
        1024,
        1 << 30,
        vec![
            SequenceRef {
                id: "subject-one",
                data: b"ACGTACGTACGTACGTACGT",
            },
            SequenceRef {
                id: "subject-two",
                data: b"TTTTTTTTTTTTTTTTTTTT",
            },
        ],
    )
    .unwrap();

    let mut buf = Vec::new();
    db.write_binary(&mut buf).unwrap();

    let mut reader = BufReader::new(Cursor::new(buf));
    let reloaded = TemplateDatabase::read_binary(&mut reader, 1 << 30).unwrap();

    let original_hits = db.query(b"CGTACGTAC", 0.0, false).unwrap();
    let reloaded_hits = reloaded.query(b"CGTACGTAC", 0.0, false).unwrap();
    assert_eq!(original_hits, reloaded_hits);
}

#[test]
fn reload_preserves_subject_order_and_lengths() {
    let db = TemplateDatabase::build(
        3,
        0,
        1 << 30,
        vec![
            SequenceRef { id: "a", data: b"ACGTT" },
            SequenceRef { id: "b", data: b"GGGGG" },
        ],
    )
    .unwrap();
    let mut buf = Vec::new();
    db.write_binary(&mut buf).unwrap();
    let mut reader = BufReader::new(Cursor::new(buf));
    let reloaded = TemplateDatabase::read_binary(&mut reader, 1 << 30).unwrap();
    assert_eq!(reloaded.subjects(), db.subjects());
}

#[test]
fn round_trip_through_a_real_file_on_disk() {
    let db = TemplateDatabase::build(
        5,
        1024,
        1 << 30,
        vec![
            SequenceRef {
                id: "one",
                data: b"ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT",
            },
            SequenceRef {
                id: "two",
                data: b"GCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGC",
            },
        ],
    )
    .unwrap();

    let file = tempfile::NamedTempFile::new().unwrap();
    {
        let mut writer = std::io::BufWriter::new(file.reopen().unwrap());
        db.write_binary(&mut writer).unwrap();
        std::io::Write::flush(&mut writer).unwrap();
    }

    let mut reader = BufReader::new(File::open(file.path()).unwrap());
    let reloaded = TemplateDatabase::read_binary(&mut reader, 1 << 30).unwrap();

    let fragment = b"CGTACGTACG";
    assert_eq!(
        db.query(fragment, 0.0, false).unwrap(),
        reloaded.query(fragment, 0.0, false).unwrap()
    );
}
