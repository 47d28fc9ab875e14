use log::debug;

use super::grouping::{group_rows, record_attribute, Group};
use super::{AssemblyError, ReferenceError, Registry};
use crate::derive::solution::{self as calc, Allocation};
use crate::mapping::{TypedRow, ValidationError};
use crate::model::{Component, ComponentRole, ResolvedValue, Solution, SolutionReference};
use crate::template::builtin::solution::*;

/// Build solutions from the mapped rows of a preparation sheet.
///
/// Rows are grouped by solution ID. Reference rows resolve against the
/// solutions finished before them, so a solution can only use solutions
/// defined above it in the sheet. The shares taken from one solution are
/// summed over the whole sheet and may not exceed the solution itself.
pub fn assemble_solutions(rows: &[TypedRow]) -> Result<Vec<Solution>, AssemblyError> {
    let mut registry: Registry<Solution> = Registry::new();
    let mut allocation = Allocation::default();

    for group in group_rows(rows, SOLUTION_ID)? {
        let solution = assemble_solution(&group, &registry, &mut allocation)?;
        debug!(
            "Assembled solution '{}': {} component(s), {} reference(s)",
            solution.id,
            solution.components.len(),
            solution.references.len()
        );
        let id = solution.id.clone();
        // Group keys are unique, so the insert cannot collide.
        let _ = registry.insert(&id, solution);
    }

    Ok(registry.into_values())
}

fn text(rows: &[&TypedRow], attribute: &str) -> Result<Option<String>, ValidationError> {
    record_attribute(rows, attribute, |r| r.text(attribute).map(str::to_string))
}

fn assemble_solution(
    group: &Group<'_>,
    registry: &Registry<Solution>,
    allocation: &mut Allocation,
) -> Result<Solution, AssemblyError> {
    let rows = group.rows.as_slice();
    let mut solution = Solution::new(group.key.clone());
    solution.name = text(rows, NAME)?;
    solution.description = text(rows, DESCRIPTION)?;
    solution.prepared = record_attribute(rows, PREPARED, |r| r.datetime(PREPARED))?;
    solution.total_mass = ResolvedValue::measured(record_attribute(rows, MEASURED_MASS, |r| {
        r.number(MEASURED_MASS)
    })?);
    solution.total_volume = ResolvedValue::measured(record_attribute(rows, MEASURED_VOLUME, |r| {
        r.number(MEASURED_VOLUME)
    })?);

    let mut owned = Vec::new();
    for row in rows {
        if row.text(ROW_TYPE) == Some(ROW_REFERENCE) {
            let (reference, contributed) = resolve_reference(row, registry, allocation)?;
            solution.references.push(reference);
            solution.contributed.extend(contributed);
        } else {
            owned.push(component_from_row(row)?);
        }
    }
    solution.components = merge_duplicates(owned);

    calc::finish(&mut solution);
    Ok(solution)
}

fn component_from_row(row: &TypedRow) -> Result<Component, ValidationError> {
    let name = row.require_text(COMPONENT)?;
    Ok(Component {
        role: row.text(ROLE).and_then(ComponentRole::from_name),
        mass: row.number(MASS),
        volume: row.number(VOLUME),
        density: row.number(DENSITY),
        molar_mass: row.number(MOLAR_MASS),
        molar_concentration: ResolvedValue::measured(row.number(MOLAR_CONCENTRATION)),
        ..Component::new(name)
    })
}

fn resolve_reference(
    row: &TypedRow,
    registry: &Registry<Solution>,
    allocation: &mut Allocation,
) -> Result<(SolutionReference, Vec<Component>), AssemblyError> {
    let identifier = row.require_text(COMPONENT)?;
    let target = registry.get(identifier).ok_or_else(|| ReferenceError {
        sheet: row.sheet().to_string(),
        row: row.row(),
        column: row.values().column(COMPONENT).to_string(),
        identifier: identifier.to_string(),
        kind: "solution",
    })?;

    let used_volume = row.number(USED_VOLUME);
    let used_mass = row.number(USED_MASS);
    let quantity_column = if used_volume.is_some() || used_mass.is_none() {
        USED_VOLUME
    } else {
        USED_MASS
    };
    let proportion = calc::proportion(target, used_volume, used_mass)
        .map_err(|issue| row.error(quantity_column, issue))?;
    allocation
        .take(&target.id, proportion)
        .map_err(|issue| row.error(quantity_column, issue))?;

    debug!(
        "Row {}: using {:.4} of solution '{}'",
        row.row(),
        proportion,
        target.id
    );
    let reference = SolutionReference {
        used_volume,
        used_mass,
        ..SolutionReference::new(target, proportion)
    };
    Ok((reference, calc::contributed_components(target, proportion)))
}

/// Merge components naming the same chemical, keeping first-seen order.
///
/// Effective masses and volumes are summed, so a row giving a mass and a row
/// giving a volume with density add up. Other attributes keep the first
/// value set.
pub fn merge_duplicates(components: Vec<Component>) -> Vec<Component> {
    let mut merged: Vec<Component> = Vec::with_capacity(components.len());
    for mut component in components {
        match merged.iter_mut().find(|c| c.same_chemical(&component)) {
            Some(existing) => {
                let density = existing.density.or(component.density);
                fill_from_density(existing, density);
                fill_from_density(&mut component, density);
                existing.mass = sum_optional(existing.mass, component.mass);
                existing.volume = sum_optional(existing.volume, component.volume);
                existing.role = existing.role.or(component.role);
                existing.density = density;
                existing.molar_mass = existing.molar_mass.or(component.molar_mass);
                existing.molar_concentration.measured = existing
                    .molar_concentration
                    .measured
                    .or(component.molar_concentration.measured);
            }
            None => merged.push(component),
        }
    }
    merged
}

/// Complete mass or volume from the component's own density, else `fallback`
fn fill_from_density(component: &mut Component, fallback: Option<f64>) {
    let Some(density) = component.density.or(fallback).filter(|d| *d != 0.0) else {
        return;
    };
    match (component.mass, component.volume) {
        (None, Some(volume)) => component.mass = Some(volume * density),
        (Some(mass), None) => component.volume = Some(mass / density),
        _ => {}
    }
}

fn sum_optional(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    }
}
