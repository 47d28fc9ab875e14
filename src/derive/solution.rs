use crate::mapping::ValidationIssue;
use crate::model::{Component, ComponentOrigin, HasComponents, ResolvedValue, Solution};

/// Slack allowed when summing shares of one referenced solution
pub const ALLOCATION_TOLERANCE: f64 = 1e-9;

/// Millilitres per litre
const ML_PER_L: f64 = 1000.0;

/// Sum of the present values; `None` when nothing contributes
pub fn sum_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// Share of `target` taken by a reference.
///
/// A used volume is measured against the target's total volume, otherwise a
/// used mass against its total mass. The target must have a non-zero total
/// of that kind.
pub fn proportion(
    target: &Solution,
    used_volume: Option<f64>,
    used_mass: Option<f64>,
) -> Result<f64, ValidationIssue> {
    let (used, total, quantity) = match (used_volume, used_mass) {
        (Some(volume), _) => (volume, target.total_volume.value(), "volume"),
        (None, Some(mass)) => (mass, target.total_mass.value(), "mass"),
        (None, None) => return Err(ValidationIssue::MissingValue),
    };
    match total {
        Some(total) if total != 0.0 => Ok(used / total),
        _ => Err(ValidationIssue::Unscalable {
            target: target.id.clone(),
            quantity,
        }),
    }
}

/// The target's full composition scaled by `proportion`
pub fn contributed_components(target: &Solution, proportion: f64) -> Vec<Component> {
    target
        .components()
        .into_iter()
        .map(|component| Component {
            mass: component.mass.map(|m| m * proportion),
            volume: component.volume.map(|v| v * proportion),
            molar_concentration: ResolvedValue::default(),
            origin: ComponentOrigin::Contributed {
                from: target.id.clone(),
                proportion,
            },
            ..component.clone()
        })
        .collect()
}

/// Running sum of the shares taken from each referenced solution
#[derive(Debug, Default)]
pub struct Allocation {
    shares: Vec<(String, f64)>,
}

impl Allocation {
    /// Record a share of `target`; fails once the shares exceed the whole
    pub fn take(&mut self, target: &str, proportion: f64) -> Result<(), ValidationIssue> {
        let total = match self
            .shares
            .iter_mut()
            .find(|(t, _)| t.eq_ignore_ascii_case(target))
        {
            Some((_, share)) => {
                *share += proportion;
                *share
            }
            None => {
                self.shares.push((target.to_string(), proportion));
                proportion
            }
        };
        if total > 1.0 + ALLOCATION_TOLERANCE {
            return Err(ValidationIssue::OverAllocated {
                target: target.to_string(),
                proportion: total,
            });
        }
        Ok(())
    }
}

/// Calculated totals from owned components then reference contributions.
///
/// Measured totals already on the solution are left in place.
pub fn calculate_totals(solution: &mut Solution) {
    let masses = solution
        .components
        .iter()
        .map(Component::effective_mass)
        .chain(solution.references.iter().map(|r| r.contributed_mass));
    solution.total_mass.calculated = sum_present(masses);

    let volumes = solution
        .components
        .iter()
        .map(Component::effective_volume)
        .chain(solution.references.iter().map(|r| r.contributed_volume));
    solution.total_volume.calculated = sum_present(volumes);
}

/// Molar concentration of every component against the exposed total volume
pub fn fill_molar_concentrations(solution: &mut Solution) {
    let volume_l = solution
        .total_volume
        .value()
        .filter(|v| *v > 0.0)
        .map(|v| v / ML_PER_L);

    for component in solution
        .components
        .iter_mut()
        .chain(solution.contributed.iter_mut())
    {
        component.molar_concentration.calculated =
            volume_l.and_then(|volume| Some(component.amount_of_substance()? / volume));
    }
}

/// Derive every quantity of an assembled solution
pub fn finish(solution: &mut Solution) {
    calculate_totals(solution);
    fill_molar_concentrations(solution);
}
