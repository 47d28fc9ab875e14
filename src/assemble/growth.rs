use log::debug;

use super::grouping::group_rows;
use super::{AssemblyError, ReferenceError, Registry};
use crate::derive::growth as calc;
use crate::mapping::{TypedRow, ValidationError, ValidationIssue};
use crate::model::{GrowthRun, GrowthStep, ResolvedValue, SampleStatus, SourceSetting, Substrate};
use crate::template::builtin::growth::*;

/// Records assembled from one growth workbook
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthWorkbook {
    /// Substrates, grown ones marked as such
    pub substrates: Vec<Substrate>,
    /// Growth runs in overview order
    pub runs: Vec<GrowthRun>,
}

/// Build substrates and growth runs from the mapped rows of the
/// `Substrate`, `Overview` and `GrowthRun` sheets
pub fn assemble_growth(
    substrate_rows: &[TypedRow],
    overview_rows: &[TypedRow],
    step_rows: &[TypedRow],
) -> Result<GrowthWorkbook, AssemblyError> {
    let mut substrates = Registry::new();
    for row in substrate_rows {
        let substrate = substrate_from_row(row)?;
        let id = substrate.id.clone();
        if substrates.insert(&id, substrate).is_err() {
            return Err(duplicate(row, SUBSTRATE_ID, &id).into());
        }
    }

    let mut runs = Registry::new();
    for row in overview_rows {
        let run = run_from_row(row, &mut substrates)?;
        let id = run.id.clone();
        if runs.insert(&id, run).is_err() {
            return Err(duplicate(row, GROWTH_ID, &id).into());
        }
    }

    for group in group_rows(step_rows, GROWTH_ID)? {
        let first = group.rows[0];
        let run: &mut GrowthRun = runs.get_mut(&group.key).ok_or_else(|| ReferenceError {
            sheet: first.sheet().to_string(),
            row: first.row(),
            column: first.values().column(GROWTH_ID).to_string(),
            identifier: group.key.clone(),
            kind: "growth run",
        })?;
        for row in &group.rows {
            run.steps.push(step_from_row(row)?);
        }
    }

    let mut runs = runs.into_values();
    for run in &mut runs {
        calc::finish(run);
        debug!(
            "Assembled growth run '{}': {} step(s), duration {:?} s",
            run.id,
            run.steps.len(),
            run.duration.value()
        );
    }

    Ok(GrowthWorkbook {
        substrates: substrates.into_values(),
        runs,
    })
}

fn duplicate(row: &TypedRow, attribute: &str, id: &str) -> ValidationError {
    row.error(attribute, ValidationIssue::DuplicateIdentifier(id.to_string()))
}

fn owned(row: &TypedRow, attribute: &str) -> Option<String> {
    row.text(attribute).map(str::to_string)
}

fn substrate_from_row(row: &TypedRow) -> Result<Substrate, ValidationError> {
    let values = row.values();
    Ok(Substrate {
        id: row.require_text(SUBSTRATE_ID)?.to_string(),
        orientation: row.require_text(ORIENTATION)?.to_string(),
        material: owned(row, MATERIAL),
        supplier: owned(row, SUPPLIER),
        charge_id: owned(row, CHARGE_ID),
        crystal_id: owned(row, CRYSTAL_ID),
        miscut: row.number(MISCUT),
        diameter: row.number(DIAMETER),
        epi_ready: values.flag(EPI_READY),
        delivery_date: row.datetime(DELIVERY_DATE),
        description: owned(row, DESCRIPTION),
        status: SampleStatus::default(),
    })
}

fn run_from_row(row: &TypedRow, substrates: &mut Registry<Substrate>) -> Result<GrowthRun, AssemblyError> {
    let substrate = match row.text(SUBSTRATE_ID) {
        Some(id) => {
            let substrate = substrates.get_mut(id).ok_or_else(|| ReferenceError {
                sheet: row.sheet().to_string(),
                row: row.row(),
                column: row.values().column(SUBSTRATE_ID).to_string(),
                identifier: id.to_string(),
                kind: "substrate",
            })?;
            substrate.status.mark_grown();
            Some(substrate.id.clone())
        }
        None => None,
    };

    Ok(GrowthRun {
        id: row.require_text(GROWTH_ID)?.to_string(),
        sample_id: row.require_text(SAMPLE_ID)?.to_string(),
        substrate,
        method: owned(row, METHOD).unwrap_or_else(|| DEFAULT_METHOD.to_string()),
        substrate_temperature: row.require_number(SUBSTRATE_TEMPERATURE)?,
        vi_iii_ratio: row.require_number(VI_III_RATIO)?,
        started: row.datetime(STARTED),
        duration: ResolvedValue::measured(row.number(DURATION)),
        recipe: owned(row, RECIPE),
        susceptor: owned(row, SUSCEPTOR),
        mask: owned(row, MASK),
        pocket: owned(row, POCKET),
        description: owned(row, DESCRIPTION),
        steps: Vec::new(),
    })
}

fn step_from_row(row: &TypedRow) -> Result<GrowthStep, ValidationError> {
    let sources = row
        .blocks()
        .iter()
        .map(|block| SourceSetting {
            block: block.index,
            source: block.values.text(SOURCE).map(str::to_string),
            temperature: block.values.number(SOURCE_TEMPERATURE),
            power: block.values.number(SOURCE_POWER),
        })
        .collect();

    Ok(GrowthStep {
        index: row.values().integer(STEP_INDEX),
        name: owned(row, STEP_NAME),
        duration: row.number(DURATION),
        flow_metal_carrier: row.require_number(FLOW_METAL_CARRIER)?,
        flow_oxidant_carrier: row.require_number(FLOW_OXIDANT_CARRIER)?,
        substrate_temperature: row.number(SUBSTRATE_TEMPERATURE),
        shaft_temperature: row.number(SHAFT_TEMPERATURE),
        filament_temperature: row.number(FILAMENT_TEMPERATURE),
        pressure: row.number(PRESSURE),
        rotation: row.number(ROTATION),
        comment: owned(row, COMMENT),
        sources,
    })
}
