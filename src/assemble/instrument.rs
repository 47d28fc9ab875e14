use log::debug;

use super::{AssemblyError, Registry};
use crate::mapping::{TypedRow, ValidationError, ValidationIssue};
use crate::model::{InstrumentConfiguration, MassFlowController, Port, SourceConfig, SourceType};
use crate::template::builtin::sources::*;

/// Build an instrument configuration from the `MBE sources` rows and the
/// optional `MBE gas mixing` rows
pub fn assemble_instrument(
    id: &str,
    source_rows: &[TypedRow],
    gas_rows: &[TypedRow],
) -> Result<InstrumentConfiguration, AssemblyError> {
    let mut sources = Registry::new();
    let mut loops: Registry<()> = Registry::new();
    let mut ports: Vec<Port> = Vec::new();

    for row in source_rows {
        let source = source_from_row(row)?;
        if loops.insert(&source.epic_loop, ()).is_err() {
            return Err(duplicate(row, EPIC_LOOP, &source.epic_loop).into());
        }
        if let Some(port) = port_from_row(row) {
            if !ports.iter().any(|p| p.port_number == port.port_number) {
                ports.push(port);
            }
        }
        let source_id = source.id.clone();
        if sources.insert(&source_id, source).is_err() {
            return Err(duplicate(row, SOURCE_ID, &source_id).into());
        }
    }

    let mut controllers = Registry::new();
    for row in gas_rows {
        let controller = MassFlowController {
            id: row.require_text(MFC_ID)?.to_string(),
            epic_loop: row.require_text(EPIC_LOOP)?.to_string(),
            gas: row.text(GAS).map(str::to_string),
            max_flow: row.number(MAX_FLOW),
        };
        if loops.insert(&controller.epic_loop, ()).is_err() {
            return Err(duplicate(row, EPIC_LOOP, &controller.epic_loop).into());
        }
        let mfc_id = controller.id.clone();
        if controllers.insert(&mfc_id, controller).is_err() {
            return Err(duplicate(row, MFC_ID, &mfc_id).into());
        }
    }

    debug!(
        "Assembled instrument '{}': {} source(s), {} port(s), {} mass-flow controller(s)",
        id,
        sources.len(),
        ports.len(),
        controllers.len()
    );

    Ok(InstrumentConfiguration {
        id: id.to_string(),
        ports,
        sources: sources.into_values(),
        mass_flow_controllers: controllers.into_values(),
    })
}

fn duplicate(row: &TypedRow, attribute: &str, id: &str) -> ValidationError {
    row.error(attribute, ValidationIssue::DuplicateIdentifier(id.to_string()))
}

fn source_from_row(row: &TypedRow) -> Result<SourceConfig, ValidationError> {
    let code = row.require_text(SOURCE_TYPE)?;
    let source_type = SourceType::from_code(code).ok_or_else(|| {
        row.error(
            SOURCE_TYPE,
            ValidationIssue::UnknownVariant {
                value: code.to_string(),
                allowed: SOURCE_TYPES.iter().map(|s| s.to_string()).collect(),
            },
        )
    })?;
    let epic_loop = row.require_text(EPIC_LOOP)?.to_string();

    Ok(SourceConfig {
        id: row.text(SOURCE_ID).unwrap_or(&epic_loop).to_string(),
        source_type,
        port_number: row.values().integer(PORT_NUMBER),
        primary_flux_species: row.text(PRIMARY_FLUX_SPECIES).map(str::to_string),
        secondary_flux_species: row.text(SECONDARY_FLUX_SPECIES).map(str::to_string),
        material: row.text(MATERIAL).map(str::to_string),
        crucible: row.text(CRUCIBLE).map(str::to_string),
        source_length: row.number(SOURCE_LENGTH),
        date: row.datetime(DATE),
        epic_loop,
    })
}

fn port_from_row(row: &TypedRow) -> Option<Port> {
    Some(Port {
        port_number: row.values().integer(PORT_NUMBER)?,
        theta: row.number(THETA),
        phi: row.number(PHI),
        flange_diameter: row.number(FLANGE_DIAMETER),
        flange_to_substrate_distance: row.number(FLANGE_DISTANCE),
    })
}
