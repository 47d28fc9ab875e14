//! Built-in templates for the supported lab files.
//!
//! Each submodule names the sheet and the attribute keys its assembler reads.
//! Templates loaded from TOML may rename columns but must keep these
//! attribute keys.

use super::{ColumnBlock, DefaultValue, FieldKind, FieldSpec, ProcessKind, ProcessTemplate, SheetTemplate};
use crate::ingest::epic::{EPIC_SHEET, TIME_COLUMN};

/// Attribute keys of the solution preparation sheet
pub mod solution {
    /// Sheet name
    pub const SHEET: &str = "Precursors";
    /// Grouping key
    pub const SOLUTION_ID: &str = "solution_id";
    /// Human-readable name
    pub const NAME: &str = "name";
    /// Row discriminator: `Component` or `Reference`
    pub const ROW_TYPE: &str = "row_type";
    /// Chemical identifier, or referenced solution ID for reference rows
    pub const COMPONENT: &str = "component";
    pub const ROLE: &str = "role";
    pub const MASS: &str = "mass";
    pub const VOLUME: &str = "volume";
    pub const DENSITY: &str = "density";
    pub const MOLAR_MASS: &str = "molar_mass";
    pub const MOLAR_CONCENTRATION: &str = "molar_concentration";
    pub const USED_MASS: &str = "used_mass";
    pub const USED_VOLUME: &str = "used_volume";
    pub const MEASURED_MASS: &str = "measured_mass";
    pub const MEASURED_VOLUME: &str = "measured_volume";
    pub const PREPARED: &str = "prepared";
    pub const DESCRIPTION: &str = "description";

    /// Discriminator value of owned component rows
    pub const ROW_COMPONENT: &str = "Component";
    /// Discriminator value of reference rows
    pub const ROW_REFERENCE: &str = "Reference";
    pub const ROLE_SOLVENT: &str = "Solvent";
    pub const ROLE_SOLUTE: &str = "Solute";
}

/// Attribute keys of the MBE growth workbook
pub mod growth {
    pub const SUBSTRATE_SHEET: &str = "Substrate";
    pub const OVERVIEW_SHEET: &str = "Overview";
    pub const GROWTH_RUN_SHEET: &str = "GrowthRun";

    pub const SUBSTRATE_ID: &str = "substrate_id";
    pub const ORIENTATION: &str = "orientation";
    pub const MATERIAL: &str = "material";
    pub const SUPPLIER: &str = "supplier";
    pub const CHARGE_ID: &str = "charge_id";
    pub const CRYSTAL_ID: &str = "crystal_id";
    pub const MISCUT: &str = "miscut";
    pub const DIAMETER: &str = "diameter";
    pub const EPI_READY: &str = "epi_ready";
    pub const DELIVERY_DATE: &str = "delivery_date";
    pub const DESCRIPTION: &str = "description";

    pub const GROWTH_ID: &str = "growth_id";
    pub const SAMPLE_ID: &str = "sample_id";
    pub const SUBSTRATE_TEMPERATURE: &str = "substrate_temperature";
    pub const VI_III_RATIO: &str = "vi_iii_ratio";
    pub const STARTED: &str = "started";
    pub const DURATION: &str = "duration";
    pub const METHOD: &str = "method";
    pub const RECIPE: &str = "recipe";
    pub const SUSCEPTOR: &str = "susceptor";
    pub const MASK: &str = "mask";
    pub const POCKET: &str = "pocket";

    pub const STEP_INDEX: &str = "step_index";
    pub const STEP_NAME: &str = "step_name";
    pub const FLOW_METAL_CARRIER: &str = "flow_metal_carrier";
    pub const FLOW_OXIDANT_CARRIER: &str = "flow_oxidant_carrier";
    pub const SHAFT_TEMPERATURE: &str = "shaft_temperature";
    pub const FILAMENT_TEMPERATURE: &str = "filament_temperature";
    pub const PRESSURE: &str = "pressure";
    pub const ROTATION: &str = "rotation";
    pub const COMMENT: &str = "comment";

    pub const SOURCE: &str = "source";
    pub const SOURCE_TEMPERATURE: &str = "source_temperature";
    pub const SOURCE_POWER: &str = "source_power";

    /// Method recorded when the overview leaves it blank
    pub const DEFAULT_METHOD: &str = "MBE PDI";
}

/// Attribute keys of the MBE source configuration workbook
pub mod sources {
    pub const SOURCES_SHEET: &str = "MBE sources";
    pub const GAS_SHEET: &str = "MBE gas mixing";

    pub const SOURCE_TYPE: &str = "source_type";
    pub const EPIC_LOOP: &str = "epic_loop";
    pub const SOURCE_ID: &str = "source_id";
    pub const PORT_NUMBER: &str = "port_number";
    pub const PRIMARY_FLUX_SPECIES: &str = "primary_flux_species";
    pub const SECONDARY_FLUX_SPECIES: &str = "secondary_flux_species";
    pub const MATERIAL: &str = "material";
    pub const CRUCIBLE: &str = "crucible";
    pub const THETA: &str = "theta";
    pub const PHI: &str = "phi";
    pub const FLANGE_DIAMETER: &str = "flange_diameter";
    pub const FLANGE_DISTANCE: &str = "flange_to_substrate_distance";
    pub const SOURCE_LENGTH: &str = "source_length";
    pub const DATE: &str = "date";

    pub const MFC_ID: &str = "mfc_id";
    pub const GAS: &str = "gas";
    pub const MAX_FLOW: &str = "max_flow";

    /// Source type codes in canonical spelling
    pub const SOURCE_TYPES: [&str; 5] = ["PLASMA", "SFC", "DFC", "other", "none"];
}

/// Attribute keys of EPIC logs
pub mod epic {
    pub const TIMESTAMP: &str = "timestamp";
}

/// All built-in templates
pub fn all() -> Vec<ProcessTemplate> {
    vec![
        solution_preparation(),
        mbe_growth(),
        mbe_sources(),
        epic_log(),
    ]
}

/// Solution / precursor preparation
pub fn solution_preparation() -> ProcessTemplate {
    use solution::*;

    let fields = vec![
        FieldSpec::new("Solution ID", SOLUTION_ID, FieldKind::Text).required(),
        FieldSpec::new("Name", NAME, FieldKind::Text),
        FieldSpec::new("Row Type", ROW_TYPE, FieldKind::one_of(&[ROW_COMPONENT, ROW_REFERENCE]))
            .with_default(DefaultValue::Text(ROW_COMPONENT.to_string())),
        FieldSpec::new("Component", COMPONENT, FieldKind::Text).required(),
        FieldSpec::new("Role", ROLE, FieldKind::one_of(&[ROLE_SOLVENT, ROLE_SOLUTE])),
        FieldSpec::new("Mass", MASS, FieldKind::number("g")),
        FieldSpec::new("Volume", VOLUME, FieldKind::number("ml")),
        FieldSpec::new("Density", DENSITY, FieldKind::number("g/ml")),
        FieldSpec::new("Molar Mass", MOLAR_MASS, FieldKind::number("g/mol")),
        FieldSpec::new("Molar Concentration", MOLAR_CONCENTRATION, FieldKind::number("mol/l")),
        FieldSpec::new("Used Mass", USED_MASS, FieldKind::number("g")),
        FieldSpec::new("Used Volume", USED_VOLUME, FieldKind::number("ml")),
        FieldSpec::new("Measured Mass", MEASURED_MASS, FieldKind::number("g")),
        FieldSpec::new("Measured Volume", MEASURED_VOLUME, FieldKind::number("ml")),
        FieldSpec::new("Prepared", PREPARED, FieldKind::DateTime),
        FieldSpec::new("Description", DESCRIPTION, FieldKind::Text),
    ];

    ProcessTemplate {
        kind: ProcessKind::SolutionPreparation,
        description: "Precursor solutions built from components and other solutions".to_string(),
        sheets: vec![SheetTemplate {
            comment_prefix: Some("#".to_string()),
            ..SheetTemplate::new(SHEET, fields)
        }],
    }
}

/// MBE growth run: substrates, overview and growth steps
pub fn mbe_growth() -> ProcessTemplate {
    use growth::*;

    let substrate = SheetTemplate::new(
        SUBSTRATE_SHEET,
        vec![
            FieldSpec::new("Substrates", SUBSTRATE_ID, FieldKind::Text).required(),
            FieldSpec::new("Orientation", ORIENTATION, FieldKind::Text).required(),
            FieldSpec::new("Material", MATERIAL, FieldKind::Text),
            FieldSpec::new("Supplier", SUPPLIER, FieldKind::Text),
            FieldSpec::new("Charge ID", CHARGE_ID, FieldKind::Text),
            FieldSpec::new("Crystal ID", CRYSTAL_ID, FieldKind::Text),
            FieldSpec::new("Miscut Angle", MISCUT, FieldKind::number("degree")),
            FieldSpec::new("Diameter", DIAMETER, FieldKind::number("mm")),
            FieldSpec::new("Epi Ready", EPI_READY, FieldKind::Bool),
            FieldSpec::new("Delivery Date", DELIVERY_DATE, FieldKind::DateTime),
            FieldSpec::new("Description", DESCRIPTION, FieldKind::Text),
        ],
    );

    let overview = SheetTemplate::new(
        OVERVIEW_SHEET,
        vec![
            FieldSpec::new("Name", GROWTH_ID, FieldKind::Text).required(),
            FieldSpec::new("Sample", SAMPLE_ID, FieldKind::Text).required(),
            FieldSpec::new("Substrate", SUBSTRATE_ID, FieldKind::Text),
            FieldSpec::new("Substrate T", SUBSTRATE_TEMPERATURE, FieldKind::number("°C")).required(),
            FieldSpec::new("VI III Ratio", VI_III_RATIO, FieldKind::number("1")).required(),
            FieldSpec::new("Date", STARTED, FieldKind::DateTime),
            FieldSpec::new("Duration", DURATION, FieldKind::number("min")),
            FieldSpec::new("Method", METHOD, FieldKind::Text)
                .with_default(DefaultValue::Text(DEFAULT_METHOD.to_string())),
            FieldSpec::new("Recipe Name", RECIPE, FieldKind::Text),
            FieldSpec::new("Susceptor", SUSCEPTOR, FieldKind::Text),
            FieldSpec::new("Mask", MASK, FieldKind::Text),
            FieldSpec::new("Pocket", POCKET, FieldKind::Text),
            FieldSpec::new("Description", DESCRIPTION, FieldKind::Text),
        ],
    );

    let growth_run = SheetTemplate {
        block: Some(ColumnBlock {
            initial: "Source".to_string(),
            fields: vec![
                FieldSpec::new("Source", SOURCE, FieldKind::Text),
                FieldSpec::new("Source T", SOURCE_TEMPERATURE, FieldKind::number("°C")),
                FieldSpec::new("Source Power", SOURCE_POWER, FieldKind::number("W")),
            ],
        }),
        ..SheetTemplate::new(
            GROWTH_RUN_SHEET,
            vec![
                FieldSpec::new("Name", GROWTH_ID, FieldKind::Text).required(),
                FieldSpec::new("Step Index", STEP_INDEX, FieldKind::Integer),
                FieldSpec::new("Step Name", STEP_NAME, FieldKind::Text),
                FieldSpec::new("Duration", DURATION, FieldKind::number("min")),
                FieldSpec::new("Flow Metal Carrier", FLOW_METAL_CARRIER, FieldKind::number("sccm"))
                    .required(),
                FieldSpec::new("Flow Oxydant Carrier", FLOW_OXIDANT_CARRIER, FieldKind::number("sccm"))
                    .required(),
                FieldSpec::new("Substrate T", SUBSTRATE_TEMPERATURE, FieldKind::number("°C")),
                FieldSpec::new("Shaft T", SHAFT_TEMPERATURE, FieldKind::number("°C")),
                FieldSpec::new("Filament T", FILAMENT_TEMPERATURE, FieldKind::number("°C")),
                FieldSpec::new("Pressure", PRESSURE, FieldKind::number("mbar")),
                FieldSpec::new("Rotation", ROTATION, FieldKind::Number { unit: None }),
                FieldSpec::new("Comment", COMMENT, FieldKind::Text),
            ],
        )
    };

    ProcessTemplate {
        kind: ProcessKind::MbeGrowth,
        description: "MBE growth run with substrates, overview and growth steps".to_string(),
        // Processing order matters: overview rows reference substrates and
        // growth steps reference overview rows.
        sheets: vec![substrate, overview, growth_run],
    }
}

/// MBE instrument sources and gas mixing
pub fn mbe_sources() -> ProcessTemplate {
    use sources::*;

    let sources_sheet = SheetTemplate {
        comment_prefix: Some("#".to_string()),
        ..SheetTemplate::new(
            SOURCES_SHEET,
            vec![
                FieldSpec::new("source type", SOURCE_TYPE, FieldKind::one_of(&SOURCE_TYPES)).required(),
                FieldSpec::new("EPIC_loop", EPIC_LOOP, FieldKind::Text).required(),
                FieldSpec::new("Source ID", SOURCE_ID, FieldKind::Text),
                FieldSpec::new("port number", PORT_NUMBER, FieldKind::Integer),
                FieldSpec::new("primary flux species", PRIMARY_FLUX_SPECIES, FieldKind::Text),
                FieldSpec::new("secondary flux species", SECONDARY_FLUX_SPECIES, FieldKind::Text),
                FieldSpec::new("material", MATERIAL, FieldKind::Text),
                FieldSpec::new("crucible", CRUCIBLE, FieldKind::Text),
                FieldSpec::new("theta", THETA, FieldKind::number("degree")),
                FieldSpec::new("phi", PHI, FieldKind::number("degree")),
                FieldSpec::new("flange diameter", FLANGE_DIAMETER, FieldKind::number("mm")),
                FieldSpec::new("flange to substrate distance", FLANGE_DISTANCE, FieldKind::number("mm")),
                FieldSpec::new("source length", SOURCE_LENGTH, FieldKind::number("mm")),
                FieldSpec::new("date", DATE, FieldKind::DateTime),
            ],
        )
    };

    let gas_sheet = SheetTemplate {
        required: false,
        comment_prefix: Some("#".to_string()),
        ..SheetTemplate::new(
            GAS_SHEET,
            vec![
                FieldSpec::new("MFC", MFC_ID, FieldKind::Text).required(),
                FieldSpec::new("mfc_EPIC_name", EPIC_LOOP, FieldKind::Text).required(),
                FieldSpec::new("gas", GAS, FieldKind::Text),
                FieldSpec::new("max flow", MAX_FLOW, FieldKind::number("sccm")),
            ],
        )
    };

    ProcessTemplate {
        kind: ProcessKind::MbeSources,
        description: "MBE source and mass-flow-controller configuration".to_string(),
        sheets: vec![sources_sheet, gas_sheet],
    }
}

/// EPIC control-software log: one timestamp column, every other column a
/// numeric channel
pub fn epic_log() -> ProcessTemplate {
    ProcessTemplate {
        kind: ProcessKind::EpicLog,
        description: "EPIC control-software log".to_string(),
        sheets: vec![SheetTemplate {
            passthrough: Some(FieldKind::Number { unit: None }),
            ..SheetTemplate::new(
                EPIC_SHEET,
                vec![FieldSpec::new(TIME_COLUMN, epic::TIMESTAMP, FieldKind::DateTime).required()],
            )
        }],
    }
}
