use super::*;
use crate::model::{Component, Solution, Substrate};
use tempfile::TempDir;

fn solution(mass: f64) -> Record {
    let mut solution = Solution::new("S1");
    solution.components = vec![Component {
        mass: Some(mass),
        ..Component::new("water")
    }];
    crate::derive::solution::finish(&mut solution);
    Record::Solution(solution)
}

#[test]
fn test_entry_ids_are_deterministic() {
    let a = EntryRef::new("upload-1", "S1.Solution.archive.json");
    let b = EntryRef::new("upload-1", "S1.Solution.archive.json");
    let c = EntryRef::new("upload-2", "S1.Solution.archive.json");
    assert_eq!(a, b);
    assert_ne!(a.entry_id, c.entry_id);
    assert_eq!(a.entry_id.len(), 32);
    assert_eq!(
        a.reference,
        format!("../uploads/upload-1/archive/{}#data", a.entry_id)
    );
}

#[test]
fn test_archive_file_name() {
    assert_eq!(archive_file_name(&solution(1.0)), "S1.Solution.archive.json");

    let substrate = Substrate {
        id: "wafer/3".to_string(),
        ..substrate_template()
    };
    assert_eq!(
        archive_file_name(&Record::Substrate(substrate)),
        "wafer%2F3.Substrate.archive.json"
    );
}

#[test]
fn test_archive_file_names_stay_distinct() {
    let names: Vec<String> = ["A/B", "A_B", "A%2FB", "A\\B"]
        .iter()
        .map(|id| archive_file_name(&Record::Solution(Solution::new(*id))))
        .collect();
    assert_eq!(names[0], "A%2FB.Solution.archive.json");
    assert_eq!(names[2], "A%252FB.Solution.archive.json");
    assert_eq!(names[3], "A%5CB.Solution.archive.json");
    for (i, name) in names.iter().enumerate() {
        assert!(!names[i + 1..].contains(name), "{} is not unique", name);
    }
}

#[test]
fn test_check_all_rejects_shared_file_name() {
    let sink = MemorySink::new("upload-1");
    assert!(sink.check_all(&[solution(50.0), solution(50.0)]).is_ok());
    assert!(matches!(
        sink.check_all(&[solution(50.0), solution(10.0)]),
        Err(SinkError::DuplicateEntry { ref file_name }) if file_name == "S1.Solution.archive.json"
    ));
}

fn substrate_template() -> Substrate {
    Substrate {
        id: String::new(),
        orientation: "(001)".to_string(),
        material: None,
        supplier: None,
        charge_id: None,
        crystal_id: None,
        miscut: None,
        diameter: None,
        epi_ready: None,
        delivery_date: None,
        description: None,
        status: Default::default(),
    }
}

#[test]
fn test_archive_is_wrapped_in_data() {
    let dir = TempDir::new().unwrap();
    let mut writer = ArchiveWriter::new(dir.path(), "upload-1");
    let record = solution(50.0);
    writer.write(&record).unwrap();

    let content = std::fs::read_to_string(writer.path_for(&record)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["data"]["m_def"], "Solution");
    assert_eq!(json["data"]["id"], "S1");
    assert_eq!(json["data"]["total_mass"]["calculated"], 50.0);
}

#[test]
fn test_identical_rewrite_succeeds() {
    let dir = TempDir::new().unwrap();
    let mut writer = ArchiveWriter::new(dir.path(), "upload-1");
    let first = writer.write(&solution(50.0)).unwrap();
    let second = writer.write(&solution(50.0)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_different_content_conflicts_unless_overwrite() {
    let dir = TempDir::new().unwrap();
    let mut writer = ArchiveWriter::new(dir.path(), "upload-1");
    writer.write(&solution(50.0)).unwrap();

    assert!(matches!(writer.check(&solution(60.0)), Err(SinkError::Conflict { .. })));
    assert!(matches!(writer.write(&solution(60.0)), Err(SinkError::Conflict { .. })));

    let mut writer = writer.with_overwrite(true);
    writer.check(&solution(60.0)).unwrap();
    writer.write(&solution(60.0)).unwrap();
    let content = std::fs::read_to_string(writer.path_for(&solution(60.0))).unwrap();
    assert!(content.contains("60.0"));
}

#[test]
fn test_writer_creates_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("raw").join("archives");
    let mut writer = ArchiveWriter::new(&nested, "upload-1");
    writer.write(&solution(1.0)).unwrap();
    assert!(nested.join("S1.Solution.archive.json").exists());
}

#[test]
fn test_memory_sink() {
    let mut sink = MemorySink::new("upload-1");
    sink.write(&solution(50.0)).unwrap();
    sink.write(&solution(50.0)).unwrap();
    assert_eq!(sink.len(), 1);
    assert!(matches!(sink.write(&solution(10.0)), Err(SinkError::Conflict { .. })));
    assert_eq!(sink.into_records(), vec![solution(50.0)]);
}
