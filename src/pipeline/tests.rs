use super::*;
use crate::emit::MemorySink;
use crate::ingest::Sheet;
use crate::mapping::ValidationIssue;
use crate::model::HasTotals;

fn precursors(rows: &[Vec<&str>]) -> Workbook {
    Workbook::single_sheet(Sheet::from_text_rows("precursors", rows).unwrap())
}

fn water_and_salt() -> Workbook {
    precursors(&[
        vec!["Solution ID", "Component", "Role", "Mass", "Volume"],
        vec!["# stock solutions", "", "", "", ""],
        vec!["S1", "water", "Solvent", "50", "50"],
        vec!["", "NaCl", "Solute", "5000 mg", ""],
    ])
}

#[test]
fn test_solution_pass_detects_and_assembles() {
    let templates = TemplateRegistry::builtin();
    let output = IngestionPass::new(&templates)
        .run_workbook(&water_and_salt(), None, "precursors")
        .unwrap();

    assert_eq!(output.kind, ProcessKind::SolutionPreparation);
    assert_eq!(output.records.len(), 1);
    match &output.records[0] {
        Record::Solution(s) => {
            assert_eq!(s.components.len(), 2);
            assert_eq!(s.total("mass"), Some(55.0));
        }
        other => panic!("expected a solution, got {:?}", other),
    }
}

#[test]
fn test_pass_is_repeatable() {
    let templates = TemplateRegistry::builtin();
    let pass = IngestionPass::new(&templates);
    let workbook = water_and_salt();
    let first = pass.run_workbook(&workbook, None, "precursors").unwrap();
    let second = pass.run_workbook(&workbook, None, "precursors").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_validation_error_aborts_pass() {
    let templates = TemplateRegistry::builtin();
    let workbook = precursors(&[
        vec!["Solution ID", "Component", "Role", "Mass"],
        vec!["S1", "water", "Solvant", "50"],
    ]);
    match IngestionPass::new(&templates).run_workbook(&workbook, None, "precursors") {
        Err(PipelineError::Validation(e)) => {
            assert_eq!(e.row, 2);
            assert_eq!(e.column, "Role");
            assert!(matches!(e.issue, ValidationIssue::UnknownVariant { .. }));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_undetected_kind() {
    let templates = TemplateRegistry::builtin();
    let workbook = precursors(&[vec!["Sample", "Weight"], vec!["A", "1"]]);
    let err = IngestionPass::new(&templates)
        .run_workbook(&workbook, None, "notes")
        .unwrap_err();
    assert!(matches!(err, PipelineError::UndetectedKind(ref name) if name == "notes"));
}

#[test]
fn test_explicit_kind_reports_missing_sheet() {
    let templates = TemplateRegistry::builtin();
    let workbook = Workbook::from_sheets(vec![Sheet::from_text_rows(
        "Overview",
        &[vec!["Name", "Sample"], vec!["G1", "G1-a"]],
    )
    .unwrap()]);
    let err = IngestionPass::new(&templates)
        .run_workbook(&workbook, Some(ProcessKind::MbeGrowth), "growth")
        .unwrap_err();
    assert!(matches!(err, PipelineError::Format(FormatError::MissingSheet(ref s)) if s == "Substrate"));
}

fn sources_workbook() -> Workbook {
    Workbook::from_sheets(vec![Sheet::from_text_rows(
        builtin::sources::SOURCES_SHEET,
        &[
            vec!["source type", "EPIC_loop", "port number"],
            vec!["SFC", "SFC_Ga", "3"],
        ],
    )
    .unwrap()])
}

#[test]
fn test_sources_without_gas_sheet() {
    let templates = TemplateRegistry::builtin();
    let output = IngestionPass::new(&templates)
        .run_workbook(&sources_workbook(), None, "mbe-sources")
        .unwrap();
    assert_eq!(output.kind, ProcessKind::MbeSources);
    match &output.records[0] {
        Record::Instrument(config) => {
            assert_eq!(config.id, "mbe-sources");
            assert_eq!(config.sources.len(), 1);
            assert!(config.mass_flow_controllers.is_empty());
        }
        other => panic!("expected an instrument, got {:?}", other),
    }
}

#[test]
fn test_epic_log_links_configured_sources() {
    let templates = TemplateRegistry::builtin();
    let pass = IngestionPass::new(&templates);
    let instrument = match pass
        .run_workbook(&sources_workbook(), None, "mbe-sources")
        .unwrap()
        .records
        .remove(0)
    {
        Record::Instrument(config) => config,
        other => panic!("expected an instrument, got {:?}", other),
    };

    let log = "EPIC Log Export\nLoop: SFC_Ga\nDate&Time\tSFC_Ga.PV\tMFC_N2.PV\n\
13.05.2024 10:00:00\t850.1\t2.0\n13.05.2024 10:00:30\t850.3\t2.1\n";
    let workbook = crate::ingest::epic::read_log(log.as_bytes()).unwrap();
    let output = pass
        .with_instrument(&instrument)
        .run_workbook(&workbook, None, "run-42")
        .unwrap();

    assert_eq!(output.kind, ProcessKind::EpicLog);
    match &output.records[0] {
        Record::EpicLog(log) => {
            assert_eq!(log.process_time, Some(30.0));
            assert_eq!(log.channel("SFC_Ga.PV").unwrap().source.as_deref(), Some("SFC_Ga"));
            assert_eq!(log.channel("MFC_N2.PV").unwrap().source, None);
            assert!(log.preamble.contains(&("Loop".to_string(), "SFC_Ga".to_string())));
        }
        other => panic!("expected an EPIC log, got {:?}", other),
    }
}

#[test]
fn test_emit_checks_before_writing() {
    let templates = TemplateRegistry::builtin();
    let pass = IngestionPass::new(&templates);
    let mut sink = MemorySink::new("upload-1");

    let original = pass.run_workbook(&water_and_salt(), None, "precursors").unwrap();
    IngestionPass::emit(&original.records, &mut sink).unwrap();

    let changed = precursors(&[
        vec!["Solution ID", "Component", "Mass"],
        vec!["S0", "ethanol", "8"],
        vec!["S1", "water", "40"],
    ]);
    let changed = pass.run_workbook(&changed, None, "precursors").unwrap();
    let err = IngestionPass::emit(&changed.records, &mut sink).unwrap_err();

    assert!(matches!(err, PipelineError::Sink(_)));
    // S0 passed its check but was not written.
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_emit_rejects_colliding_batch_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = crate::emit::ArchiveWriter::new(dir.path(), "upload-1");

    let first = Record::Solution(crate::model::Solution::new("S1"));
    let mut changed = crate::model::Solution::new("S1");
    changed.name = Some("Brine".to_string());
    let records = vec![first, Record::Solution(changed)];

    let err = IngestionPass::emit(&records, &mut sink).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Sink(crate::emit::SinkError::DuplicateEntry { .. })
    ));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_emit_keeps_slash_and_underscore_ids_apart() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = crate::emit::ArchiveWriter::new(dir.path(), "upload-1");
    let records = vec![
        Record::Solution(crate::model::Solution::new("A/B")),
        Record::Solution(crate::model::Solution::new("A_B")),
    ];

    let entries = IngestionPass::emit(&records, &mut sink).unwrap();
    assert_ne!(entries[0].entry_id, entries[1].entry_id);
    assert!(dir.path().join("A%2FB.Solution.archive.json").exists());
    assert!(dir.path().join("A_B.Solution.archive.json").exists());
}
