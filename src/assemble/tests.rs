use super::*;
use crate::ingest::Sheet;
use crate::mapping::{FieldMapper, TypedRow, ValidationIssue};
use crate::model::{Component, ComponentOrigin, ComponentRole, HasComponents, HasTotals, SourceType};
use crate::template::{builtin, ProcessTemplate};

fn typed(template: &ProcessTemplate, sheet: &str, rows: &[Vec<&str>]) -> Vec<TypedRow> {
    let sheet_template = template.sheet(sheet).unwrap();
    let mut sheet = Sheet::from_text_rows(sheet, rows).unwrap();
    if let Some(block) = &sheet_template.block {
        let members: Vec<String> = block.fields.iter().map(|f| f.column.clone()).collect();
        sheet.rename_blocks(&block.initial, &members);
    }
    let mapper = FieldMapper::new(sheet_template, sheet.name(), sheet.header()).unwrap();
    sheet.rows().map(|row| mapper.map(&row).unwrap()).collect()
}

fn solution_rows(rows: &[Vec<&str>]) -> Vec<TypedRow> {
    typed(&builtin::solution_preparation(), builtin::solution::SHEET, rows)
}

const SOLUTION_HEADER: [&str; 7] = [
    "Solution ID",
    "Row Type",
    "Component",
    "Role",
    "Mass",
    "Volume",
    "Used Volume",
];

#[test]
fn test_water_and_salt_solution() {
    let rows = solution_rows(&[
        SOLUTION_HEADER.to_vec(),
        vec!["S1", "", "water", "Solvent", "50", "50", ""],
        vec!["", "", "NaCl", "Solute", "5", "", ""],
    ]);
    let solutions = assemble_solutions(&rows).unwrap();
    assert_eq!(solutions.len(), 1);

    let s1 = &solutions[0];
    assert_eq!(s1.id, "S1");
    assert_eq!(s1.total("mass"), Some(55.0));
    let solvents: Vec<&str> = s1.solvents().iter().map(|c| c.name.as_str()).collect();
    let solutes: Vec<&str> = s1.solutes().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(solvents, vec!["water"]);
    assert_eq!(solutes, vec!["NaCl"]);
}

#[test]
fn test_reference_pulls_proportion_of_earlier_solution() {
    let rows = solution_rows(&[
        SOLUTION_HEADER.to_vec(),
        vec!["S1", "", "water", "Solvent", "50", "50", ""],
        vec!["", "", "NaCl", "Solute", "5", "", ""],
        vec!["S2", "", "ethanol", "Solvent", "8", "10", ""],
        vec!["", "Reference", "S1", "", "", "", "25"],
    ]);
    let solutions = assemble_solutions(&rows).unwrap();
    let s2 = &solutions[1];

    assert_eq!(s2.references.len(), 1);
    assert_eq!(s2.references[0].target, "S1");
    assert!((s2.references[0].proportion - 0.5).abs() < 1e-12);
    assert_eq!(s2.contributed.len(), 2);
    assert!(matches!(
        &s2.contributed[0].origin,
        ComponentOrigin::Contributed { from, .. } if from == "S1"
    ));
    assert!((s2.total("mass").unwrap() - 35.5).abs() < 1e-9);
    assert!((s2.total("volume").unwrap() - 35.0).abs() < 1e-9);
}

#[test]
fn test_misspelled_role_is_rejected_at_mapping() {
    let template = builtin::solution_preparation();
    let sheet_template = template.sheet(builtin::solution::SHEET).unwrap();
    let sheet = Sheet::from_text_rows(
        builtin::solution::SHEET,
        &[
            SOLUTION_HEADER.to_vec(),
            vec!["S1", "", "water", "Solvant", "50", "50", ""],
        ],
    )
    .unwrap();
    let mapper = FieldMapper::new(sheet_template, sheet.name(), sheet.header()).unwrap();
    let row = sheet.rows().next().unwrap();
    let err = mapper.map(&row).unwrap_err();
    assert_eq!(err.row, 2);
    assert_eq!(err.column, "Role");
    assert!(matches!(err.issue, ValidationIssue::UnknownVariant { .. }));
}

#[test]
fn test_forward_reference_is_reference_error() {
    let rows = solution_rows(&[
        SOLUTION_HEADER.to_vec(),
        vec!["S1", "Reference", "S2", "", "", "", "10"],
        vec!["S2", "", "water", "Solvent", "50", "50", ""],
    ]);
    let err = assemble_solutions(&rows).unwrap_err();
    match err {
        AssemblyError::Reference(e) => {
            assert_eq!(e.identifier, "S2");
            assert_eq!(e.row, 2);
            assert_eq!(e.column, "Component");
        }
        other => panic!("expected reference error, got {:?}", other),
    }
}

#[test]
fn test_self_reference_is_reference_error() {
    let rows = solution_rows(&[
        SOLUTION_HEADER.to_vec(),
        vec!["S1", "", "water", "Solvent", "50", "50", ""],
        vec!["", "Reference", "S1", "", "", "", "10"],
    ]);
    assert!(matches!(
        assemble_solutions(&rows),
        Err(AssemblyError::Reference(_))
    ));
}

#[test]
fn test_over_allocated_reference() {
    let rows = solution_rows(&[
        SOLUTION_HEADER.to_vec(),
        vec!["S1", "", "water", "Solvent", "50", "50", ""],
        vec!["S2", "Reference", "S1", "", "", "", "30"],
        vec!["", "Reference", "S1", "", "", "", "30"],
    ]);
    match assemble_solutions(&rows) {
        Err(AssemblyError::Validation(e)) => {
            assert_eq!(e.row, 4);
            assert_eq!(e.column, "Used Volume");
            assert!(matches!(e.issue, ValidationIssue::OverAllocated { .. }));
        }
        other => panic!("expected over-allocation, got {:?}", other),
    }
}

#[test]
fn test_over_allocation_across_solutions() {
    let rows = solution_rows(&[
        SOLUTION_HEADER.to_vec(),
        vec!["S1", "", "water", "Solvent", "50", "50", ""],
        vec!["S2", "Reference", "S1", "", "", "", "40"],
        vec!["S3", "Reference", "S1", "", "", "", "40"],
    ]);
    match assemble_solutions(&rows) {
        Err(AssemblyError::Validation(e)) => {
            assert_eq!(e.row, 4);
            assert!(matches!(
                e.issue,
                ValidationIssue::OverAllocated { ref target, .. } if target == "S1"
            ));
        }
        other => panic!("expected over-allocation, got {:?}", other),
    }
}

#[test]
fn test_merge_adds_mass_given_by_volume_and_density() {
    let rows = solution_rows(&[
        vec!["Solution ID", "Component", "Role", "Mass", "Volume", "Density"],
        vec!["S1", "water", "Solvent", "10", "", "2"],
        vec!["", "water", "Solvent", "", "10", "2"],
    ]);
    let solutions = assemble_solutions(&rows).unwrap();
    let s1 = &solutions[0];

    assert_eq!(s1.components.len(), 1);
    assert_eq!(s1.components[0].mass, Some(30.0));
    assert_eq!(s1.components[0].volume, Some(15.0));
    assert_eq!(s1.total("mass"), Some(30.0));
    assert_eq!(s1.total("volume"), Some(15.0));
}

#[test]
fn test_merge_uses_density_from_another_row() {
    let merged = merge_duplicates(vec![
        Component {
            mass: Some(4.0),
            ..Component::new("ethanol")
        },
        Component {
            volume: Some(10.0),
            density: Some(0.8),
            ..Component::new("Ethanol")
        },
    ]);
    assert_eq!(merged.len(), 1);
    assert!((merged[0].mass.unwrap() - 12.0).abs() < 1e-9);
    assert!((merged[0].volume.unwrap() - 15.0).abs() < 1e-9);
}

#[test]
fn test_duplicate_components_are_merged() {
    let rows = solution_rows(&[
        SOLUTION_HEADER.to_vec(),
        vec!["S1", "", "water", "Solvent", "20", "20", ""],
        vec!["", "", "NaCl", "Solute", "5", "", ""],
        vec!["", "", "Water", "", "30", "30", ""],
    ]);
    let solutions = assemble_solutions(&rows).unwrap();
    let components = &solutions[0].components;
    assert_eq!(components.len(), 2);
    assert_eq!(components[0].name, "water");
    assert_eq!(components[0].mass, Some(50.0));
    assert_eq!(components[0].volume, Some(50.0));
    assert_eq!(components[0].role, Some(ComponentRole::Solvent));
}

#[test]
fn test_conflicting_record_attribute() {
    let rows = solution_rows(&[
        vec!["Solution ID", "Name", "Component", "Mass"],
        vec!["S1", "Brine", "water", "50"],
        vec!["", "Saline", "NaCl", "5"],
    ]);
    match assemble_solutions(&rows) {
        Err(AssemblyError::Validation(e)) => {
            assert_eq!(e.row, 3);
            assert_eq!(e.column, "Name");
            assert!(matches!(e.issue, ValidationIssue::Conflicting { .. }));
        }
        other => panic!("expected conflict, got {:?}", other),
    }
}

#[test]
fn test_blank_first_key() {
    let rows = solution_rows(&[vec!["Solution ID", "Component"], vec!["", "water"]]);
    match assemble_solutions(&rows) {
        Err(AssemblyError::Validation(e)) => {
            assert_eq!(e.column, "Solution ID");
            assert_eq!(e.issue, ValidationIssue::MissingValue);
        }
        other => panic!("expected missing key, got {:?}", other),
    }
}

#[test]
fn test_non_adjacent_rows_join_one_group() {
    let rows = solution_rows(&[
        vec!["Solution ID", "Component", "Mass"],
        vec!["S1", "water", "50"],
        vec!["S2", "ethanol", "8"],
        vec!["s1", "NaCl", "5"],
    ]);
    let groups = group_rows(&rows, builtin::solution::SOLUTION_ID).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].key, "S1");
    assert_eq!(groups[0].rows.len(), 2);
}

#[test]
fn test_registry_is_case_insensitive() {
    let mut registry = Registry::new();
    registry.insert("Sub1", 1).unwrap();
    assert_eq!(registry.insert("SUB1", 2), Err(2));
    assert_eq!(registry.get("sub1"), Some(&1));
    assert_eq!(registry.len(), 1);
}

fn growth_sheets(run_name: &str) -> (Vec<TypedRow>, Vec<TypedRow>, Vec<TypedRow>) {
    use builtin::growth::*;
    let template = builtin::mbe_growth();
    let substrates = typed(
        &template,
        SUBSTRATE_SHEET,
        &[
            vec!["Substrates", "Orientation", "Epi Ready"],
            vec!["Sub1", "(001)", "yes"],
            vec!["Sub2", "(010)", "no"],
        ],
    );
    let overview = typed(
        &template,
        OVERVIEW_SHEET,
        &[
            vec!["Name", "Sample", "Substrate", "Substrate T", "VI III Ratio"],
            vec!["G1", "G1-a", "Sub1", "800", "2"],
        ],
    );
    let steps = typed(
        &template,
        GROWTH_RUN_SHEET,
        &[
            vec![
                "Name",
                "Step Index",
                "Duration",
                "Flow Metal Carrier",
                "Flow Oxydant Carrier",
                "Source",
                "Source T",
            ],
            vec![run_name, "2", "10", "1", "2", "Ga", "850"],
            vec!["", "1", "5", "1", "2", "", ""],
        ],
    );
    (substrates, overview, steps)
}

#[test]
fn test_growth_run_links_substrate_and_steps() {
    let (substrates, overview, steps) = growth_sheets("G1");
    let workbook = assemble_growth(&substrates, &overview, &steps).unwrap();

    assert_eq!(workbook.substrates.len(), 2);
    assert!(workbook.substrates[0].status.grown);
    assert!(!workbook.substrates[0].status.as_delivered);
    assert!(!workbook.substrates[1].status.grown);
    assert_eq!(workbook.substrates[0].epi_ready, Some(true));

    let run = &workbook.runs[0];
    assert_eq!(run.substrate.as_deref(), Some("Sub1"));
    assert_eq!(run.method, builtin::growth::DEFAULT_METHOD);
    assert!((run.substrate_temperature - 1073.15).abs() < 1e-9);

    let order: Vec<Option<i64>> = run.steps.iter().map(|s| s.index).collect();
    assert_eq!(order, vec![Some(1), Some(2)]);
    assert!(run.steps[0].sources.is_empty());
    assert_eq!(run.steps[1].sources[0].source.as_deref(), Some("Ga"));
    assert_eq!(run.total("duration"), Some(900.0));
}

#[test]
fn test_unknown_substrate_is_reference_error() {
    let template = builtin::mbe_growth();
    let overview = typed(
        &template,
        builtin::growth::OVERVIEW_SHEET,
        &[
            vec!["Name", "Sample", "Substrate", "Substrate T", "VI III Ratio"],
            vec!["G1", "G1-a", "Sub9", "800", "2"],
        ],
    );
    match assemble_growth(&[], &overview, &[]) {
        Err(AssemblyError::Reference(e)) => {
            assert_eq!(e.kind, "substrate");
            assert_eq!(e.identifier, "Sub9");
            assert_eq!(e.column, "Substrate");
        }
        other => panic!("expected reference error, got {:?}", other),
    }
}

#[test]
fn test_steps_of_unknown_run() {
    let (substrates, overview, steps) = growth_sheets("G7");
    match assemble_growth(&substrates, &overview, &steps) {
        Err(AssemblyError::Reference(e)) => {
            assert_eq!(e.kind, "growth run");
            assert_eq!(e.sheet, builtin::growth::GROWTH_RUN_SHEET);
            assert_eq!(e.row, 2);
        }
        other => panic!("expected reference error, got {:?}", other),
    }
}

fn source_rows(rows: &[Vec<&str>]) -> Vec<TypedRow> {
    typed(&builtin::mbe_sources(), builtin::sources::SOURCES_SHEET, rows)
}

#[test]
fn test_instrument_configuration() {
    let sources = source_rows(&[
        vec!["source type", "EPIC_loop", "port number", "theta", "material"],
        vec!["SFC", "SFC_Ga", "3", "30", "Ga"],
        vec!["PLASMA", "Plasma_O", "3", "30", ""],
        vec!["DFC", "DFC_In", "5", "45", "In"],
    ]);
    let gas = typed(
        &builtin::mbe_sources(),
        builtin::sources::GAS_SHEET,
        &[
            vec!["MFC", "mfc_EPIC_name", "gas", "max flow"],
            vec!["MFC1", "MFC_O2", "O2", "10"],
        ],
    );
    let config = assemble_instrument("lab-mbe", &sources, &gas).unwrap();

    assert_eq!(config.sources.len(), 3);
    assert_eq!(config.sources[0].id, "SFC_Ga");
    assert_eq!(config.sources[1].source_type, SourceType::Plasma);
    let ports: Vec<i64> = config.ports.iter().map(|p| p.port_number).collect();
    assert_eq!(ports, vec![3, 5]);
    assert_eq!(config.mass_flow_controllers[0].gas.as_deref(), Some("O2"));
    assert_eq!(config.loop_owner("SFC_Ga.PV"), Some("SFC_Ga"));
    assert_eq!(config.loop_owner("MFC_O2"), Some("MFC1"));
    assert_eq!(config.loop_owner("SFC_Gallium"), None);
}

#[test]
fn test_duplicate_epic_loop() {
    let sources = source_rows(&[
        vec!["source type", "EPIC_loop"],
        vec!["SFC", "SFC_Ga"],
        vec!["DFC", "sfc_ga"],
    ]);
    match assemble_instrument("lab-mbe", &sources, &[]) {
        Err(AssemblyError::Validation(e)) => {
            assert_eq!(e.row, 3);
            assert_eq!(e.column, "EPIC_loop");
            assert!(matches!(e.issue, ValidationIssue::DuplicateIdentifier(_)));
        }
        other => panic!("expected duplicate, got {:?}", other),
    }
}

#[test]
fn test_epic_channels_and_process_time() {
    let rows = typed(
        &builtin::epic_log(),
        crate::ingest::epic::EPIC_SHEET,
        &[
            vec!["Date&Time", "SFC_Ga.PV", "MFC_O2.PV"],
            vec!["13.05.2024 10:00:00", "850.1", "1.5"],
            vec!["13.05.2024 10:00:05", "850.3", ""],
            vec!["13.05.2024 10:01:00", "850.2", "1.4"],
        ],
    );
    let sources = source_rows(&[vec!["source type", "EPIC_loop"], vec!["SFC", "SFC_Ga"]]);
    let config = assemble_instrument("lab-mbe", &sources, &[]).unwrap();

    let preamble = vec![("Loop".to_string(), "SFC_Ga".to_string())];
    let log = assemble_epic("run-42", &preamble, &rows, Some(&config)).unwrap();

    assert_eq!(log.process_time, Some(60.0));
    assert_eq!(log.channels.len(), 2);
    let ga = log.channel("SFC_Ga.PV").unwrap();
    assert_eq!(ga.source.as_deref(), Some("SFC_Ga"));
    let times: Vec<f64> = ga.samples.iter().map(|s| s.time).collect();
    assert_eq!(times, vec![0.0, 5.0, 60.0]);
    let o2 = log.channel("MFC_O2.PV").unwrap();
    assert_eq!(o2.source, None);
    assert_eq!(o2.samples.len(), 2);
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Merging keeps one component per chemical and preserves total mass
        #[test]
        fn test_merge_preserves_mass(
            entries in prop::collection::vec((0usize..4, 0.0f64..1e3, prop::option::of(0.5f64..3.0)), 1..40)
        ) {
            // With a density the amount is given as a volume, otherwise as a mass
            let components: Vec<Component> = entries
                .iter()
                .map(|(name, amount, density)| match density {
                    Some(density) => Component {
                        volume: Some(*amount),
                        density: Some(*density),
                        ..Component::new(format!("chem{}", name))
                    },
                    None => Component {
                        mass: Some(*amount),
                        ..Component::new(format!("chem{}", name))
                    },
                })
                .collect();
            let expected: f64 = components.iter().filter_map(Component::effective_mass).sum();
            let merged = merge_duplicates(components);

            let mut distinct: Vec<usize> = entries.iter().map(|(n, _, _)| *n).collect();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(merged.len(), distinct.len());

            let total: f64 = merged.iter().filter_map(Component::effective_mass).sum();
            prop_assert!((total - expected).abs() < 1e-6 * expected.max(1.0));
        }

        /// Assembling the same rows twice yields identical records
        #[test]
        fn test_assembly_is_deterministic(masses in prop::collection::vec(0.1f64..100.0, 1..10)) {
            let mut rows = vec![vec!["Solution ID".to_string(), "Component".to_string(), "Mass".to_string()]];
            for (i, mass) in masses.iter().enumerate() {
                rows.push(vec![format!("S{}", i % 3), format!("c{}", i), mass.to_string()]);
            }
            let refs: Vec<Vec<&str>> = rows.iter().map(|r| r.iter().map(String::as_str).collect()).collect();
            let typed_rows = solution_rows(&refs);
            prop_assert_eq!(assemble_solutions(&typed_rows).unwrap(), assemble_solutions(&typed_rows).unwrap());
        }
    }
}
