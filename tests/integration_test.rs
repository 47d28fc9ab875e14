//! Integration tests for pdi-ingest
//!
//! These tests run full passes from files on disk to archive files.

use pdi_ingest::emit::ArchiveWriter;
use pdi_ingest::pipeline::{IngestionPass, PipelineError};
use pdi_ingest::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const PRECURSORS_CSV: &str = "\
Solution ID,Name,Row Type,Component,Role,Mass,Volume,Used Volume,Measured Volume
# stock solutions first
S1,Brine,,water,Solvent,50 g,50 ml,,
,,,NaCl,Solute,5 g,,,
S2,Diluted brine,,water,Solvent,100,100,,130
,,Reference,S1,,,,25,
";

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read_archive(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Test a solution sheet from CSV file to archives
#[test]
fn test_solution_csv_to_archives() {
    let dir = tempdir().unwrap();
    let input = write(dir.path(), "precursors.csv", PRECURSORS_CSV);
    let out = dir.path().join("archives");

    let templates = TemplateRegistry::builtin();
    let output = IngestionPass::new(&templates).run_file(&input, None).unwrap();
    assert_eq!(output.kind, ProcessKind::SolutionPreparation);
    assert_eq!(output.records.len(), 2);

    let mut sink = ArchiveWriter::new(&out, "upload-1");
    let entries = IngestionPass::emit(&output.records, &mut sink).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].file_name, "S1.Solution.archive.json");

    let s2 = read_archive(&out.join("S2.Solution.archive.json"));
    let data = &s2["data"];
    assert_eq!(data["m_def"], "Solution");
    assert_eq!(data["name"], "Diluted brine");
    assert_eq!(data["references"][0]["target"], "S1");
    assert_eq!(data["references"][0]["proportion"], 0.5);
    // 100 ml water plus half of S1's 50 ml
    assert_eq!(data["total_volume"]["calculated"], 125.0);
    assert_eq!(data["total_volume"]["measured"], 130.0);
    assert_eq!(data["contributed"].as_array().unwrap().len(), 2);
}

/// Re-running a pass produces byte-identical archives
#[test]
fn test_rerun_is_idempotent() {
    let dir = tempdir().unwrap();
    let input = write(dir.path(), "precursors.csv", PRECURSORS_CSV);
    let out = dir.path().join("archives");
    let templates = TemplateRegistry::builtin();
    let pass = IngestionPass::new(&templates);

    let first = pass.run_file(&input, None).unwrap();
    let mut sink = ArchiveWriter::new(&out, "upload-1");
    let entries = IngestionPass::emit(&first.records, &mut sink).unwrap();
    let before = fs::read(out.join("S1.Solution.archive.json")).unwrap();

    let second = pass.run_file(&input, None).unwrap();
    assert_eq!(first, second);
    let again = IngestionPass::emit(&second.records, &mut sink).unwrap();
    assert_eq!(entries, again);
    assert_eq!(before, fs::read(out.join("S1.Solution.archive.json")).unwrap());
}

/// A changed sheet conflicts with existing archives unless overwriting
#[test]
fn test_changed_input_conflicts_unless_overwrite() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("archives");
    let templates = TemplateRegistry::builtin();
    let pass = IngestionPass::new(&templates);

    let input = write(dir.path(), "precursors.csv", PRECURSORS_CSV);
    let original = pass.run_file(&input, None).unwrap();
    IngestionPass::emit(&original.records, &mut ArchiveWriter::new(&out, "upload-1")).unwrap();

    let changed = write(
        dir.path(),
        "precursors.csv",
        "Solution ID,Component,Role,Mass\nS1,water,Solvent,40\n",
    );
    let changed = pass.run_file(&changed, None).unwrap();

    let err = IngestionPass::emit(&changed.records, &mut ArchiveWriter::new(&out, "upload-1"))
        .unwrap_err();
    assert!(matches!(err, PipelineError::Sink(SinkError::Conflict { .. })));

    let mut sink = ArchiveWriter::new(&out, "upload-1").with_overwrite(true);
    IngestionPass::emit(&changed.records, &mut sink).unwrap();
    let s1 = read_archive(&out.join("S1.Solution.archive.json"));
    assert_eq!(s1["data"]["total_mass"]["calculated"], 40.0);
}

/// A failed pass writes nothing
#[test]
fn test_reference_error_aborts_pass() {
    let dir = tempdir().unwrap();
    let input = write(
        dir.path(),
        "precursors.csv",
        "Solution ID,Row Type,Component,Used Volume\nS1,Reference,S9,10\n",
    );
    let templates = TemplateRegistry::builtin();
    let err = IngestionPass::new(&templates).run_file(&input, None).unwrap_err();

    match err {
        PipelineError::Reference(e) => {
            assert_eq!(e.identifier, "S9");
            assert_eq!(e.row, 2);
        }
        other => panic!("expected reference error, got {:?}", other),
    }
}

/// Sources TSV plus an EPIC log linked against it
#[test]
fn test_sources_and_epic_log() {
    let dir = tempdir().unwrap();
    let sources = write(
        dir.path(),
        "lab-mbe.tsv",
        "source type\tEPIC_loop\tport number\tmaterial\n\
SFC\tSFC_Ga\t3\tGa\n\
DFC\tDFC_In\t5\tIn\n",
    );
    let log = write(
        dir.path(),
        "run-42.txt",
        "EPIC Log Export\nOperator: jdoe\n\
Date&Time\tSFC_Ga.PV\tDFC_In.PV\tShutter\n\
13.05.2024 10:00:00\t850.1\t700.0\t0\n\
13.05.2024 10:00:05\t850.3\t700.2\t1\n\
13.05.2024 10:01:05\t850.2\t700.1\t1\n",
    );

    let templates = TemplateRegistry::builtin();
    let instrument = match IngestionPass::new(&templates)
        .run_file(&sources, Some(ProcessKind::MbeSources))
        .unwrap()
        .records
        .remove(0)
    {
        Record::Instrument(config) => config,
        other => panic!("expected an instrument, got {:?}", other),
    };
    assert_eq!(instrument.id, "lab-mbe");
    assert_eq!(instrument.ports.len(), 2);

    let output = IngestionPass::new(&templates)
        .with_instrument(&instrument)
        .run_file(&log, None)
        .unwrap();
    assert_eq!(output.kind, ProcessKind::EpicLog);
    let Record::EpicLog(log) = &output.records[0] else {
        panic!("expected an EPIC log");
    };
    assert_eq!(log.id, "run-42");
    assert_eq!(log.process_time, Some(65.0));
    assert_eq!(log.channels.len(), 3);
    assert_eq!(log.channel("DFC_In.PV").unwrap().source.as_deref(), Some("DFC_In"));
    assert_eq!(log.channel("Shutter").unwrap().source, None);

    let out = dir.path().join("archives");
    let entries = IngestionPass::emit(&output.records, &mut ArchiveWriter::new(&out, "upload-1")).unwrap();
    assert_eq!(entries[0].file_name, "run-42.EpicLog.archive.json");
}

/// Unsupported input files are rejected before any parsing
#[test]
fn test_unsupported_file() {
    let dir = tempdir().unwrap();
    let input = write(dir.path(), "notes.docx", "not a sheet");
    let templates = TemplateRegistry::builtin();
    let err = IngestionPass::new(&templates).run_file(&input, None).unwrap_err();
    assert!(matches!(err, PipelineError::Format(FormatError::UnsupportedFile(_))));
}
