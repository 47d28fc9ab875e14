//! Inspection report: checks an input against the templates without emitting
//! anything.

use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

use crate::ingest::Workbook;
use crate::mapping::FieldMapper;
use crate::pipeline::IngestionPass;
use crate::template::{ProcessKind, TemplateRegistry};

/// What an inspection step looked at
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    /// Process kind, given or detected
    Kind,
    /// Template of the process kind
    Template,
    /// One template sheet and the columns found in it
    Sheet(String),
    /// Dry run of the ingestion pass
    Assembly,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Kind => f.write_str("Process kind"),
            Subject::Template => f.write_str("Template"),
            Subject::Sheet(name) => write!(f, "Sheet '{}'", name),
            Subject::Assembly => f.write_str("Assembly"),
        }
    }
}

/// Result of one inspection step; the text is a summary or the problem found
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed(String),
    /// Usable, but something in the input will be ignored
    Ignored(String),
    /// The input cannot be ingested
    Rejected(String),
}

/// Number of steps per outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub ignored: usize,
    pub rejected: usize,
}

/// Result of inspecting one input file
#[derive(Debug)]
pub struct InspectionReport {
    /// Name of the inspected input
    pub input: String,
    /// Process kind used for the checks, if one was given or detected
    pub kind: Option<ProcessKind>,
    /// Steps in the order they ran
    pub steps: Vec<(Subject, Outcome)>,
}

impl InspectionReport {
    /// Inspect a workbook: kind detection, sheets and columns per template
    /// sheet, then a dry run of the pass. Stops after a kind or template
    /// failure.
    pub fn inspect(
        workbook: &Workbook,
        templates: &TemplateRegistry,
        kind: Option<ProcessKind>,
        name: &str,
    ) -> Self {
        let mut report = Self {
            input: name.to_string(),
            kind: None,
            steps: Vec::new(),
        };
        let pass = IngestionPass::new(templates);

        let kind = match kind {
            Some(kind) => {
                report.record(Subject::Kind, Outcome::Passed(format!("{} (given)", kind)));
                kind
            }
            None => match pass.detect(workbook, name) {
                Ok(kind) => {
                    report.record(Subject::Kind, Outcome::Passed(format!("{} (detected)", kind)));
                    kind
                }
                Err(e) => {
                    report.record(Subject::Kind, Outcome::Rejected(e.to_string()));
                    return report;
                }
            },
        };
        report.kind = Some(kind);

        let template = match templates.get(kind) {
            Ok(template) => template,
            Err(e) => {
                report.record(Subject::Template, Outcome::Rejected(e.to_string()));
                return report;
            }
        };

        for sheet_template in &template.sheets {
            let subject = Subject::Sheet(sheet_template.sheet.clone());
            let Some(sheet) = sheet_template.locate(workbook) else {
                let outcome = if sheet_template.required {
                    Outcome::Rejected("missing".to_string())
                } else {
                    Outcome::Ignored("optional sheet not present".to_string())
                };
                report.record(subject, outcome);
                continue;
            };

            let mut sheet = sheet.clone();
            if let Some(block) = &sheet_template.block {
                let members: Vec<String> = block.fields.iter().map(|f| f.column.clone()).collect();
                sheet.rename_blocks(&block.initial, &members);
            }
            let outcome = match FieldMapper::new(sheet_template, sheet.name(), sheet.header()) {
                Err(e) => Outcome::Rejected(e.to_string()),
                Ok(mapper) if !mapper.ignored_columns().is_empty() => Outcome::Ignored(format!(
                    "{} rows, unmapped columns: {}",
                    sheet.row_count(),
                    mapper.ignored_columns().join(", ")
                )),
                Ok(mapper) => {
                    let mut summary = format!("{} rows", sheet.row_count());
                    if mapper.block_count() > 0 {
                        summary.push_str(&format!(", {} column blocks", mapper.block_count()));
                    }
                    if !mapper.passthrough_columns().is_empty() {
                        summary.push_str(&format!(", {} channels", mapper.passthrough_columns().len()));
                    }
                    Outcome::Passed(summary)
                }
            };
            report.record(subject, outcome);
        }

        let outcome = match pass.run_workbook(workbook, Some(kind), name) {
            Ok(output) => Outcome::Passed(format!("{} record(s)", output.records.len())),
            Err(e) => Outcome::Rejected(e.to_string()),
        };
        report.record(Subject::Assembly, outcome);

        report
    }

    fn record(&mut self, subject: Subject, outcome: Outcome) {
        self.steps.push((subject, outcome));
    }

    /// Whether any step rejected the input
    pub fn has_failures(&self) -> bool {
        self.tally().rejected > 0
    }

    /// Steps counted by outcome
    pub fn tally(&self) -> Tally {
        self.steps.iter().fold(Tally::default(), |mut tally, (_, outcome)| {
            match outcome {
                Outcome::Passed(_) => tally.passed += 1,
                Outcome::Ignored(_) => tally.ignored += 1,
                Outcome::Rejected(_) => tally.rejected += 1,
            }
            tally
        })
    }

    /// Render the report; `paint` styles the marker and subject of a step
    fn render(&self, paint: impl Fn(&Outcome, String) -> String) -> String {
        let mut output = format!("Inspection of {}\n\n", self.input);
        for (subject, outcome) in &self.steps {
            let (marker, text) = match outcome {
                Outcome::Passed(text) => ("ok", text),
                Outcome::Ignored(text) => ("ignored", text),
                Outcome::Rejected(text) => ("rejected", text),
            };
            let head = paint(outcome, format!("{:>8}  {}", marker, subject));
            output.push_str(&format!("{}: {}\n", head, text));
        }
        let tally = self.tally();
        output.push_str(&format!(
            "\n{} ok, {} with ignored input, {} rejected\n",
            tally.passed, tally.ignored, tally.rejected
        ));
        output
    }

    /// Render with terminal colors (requires the `colorized_output` feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            self.render(|outcome, head| {
                let styled = match outcome {
                    Outcome::Passed(_) => style(head).green(),
                    Outcome::Ignored(_) => style(head).yellow(),
                    Outcome::Rejected(_) => style(head).red().bold(),
                };
                styled.to_string()
            })
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }
}

impl fmt::Display for InspectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(|_, head| head))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Sheet;

    fn precursors(rows: &[Vec<&str>]) -> Workbook {
        Workbook::single_sheet(Sheet::from_text_rows("precursors", rows).unwrap())
    }

    #[test]
    fn test_clean_input_passes() {
        let workbook = precursors(&[
            vec!["Solution ID", "Component", "Mass"],
            vec!["S1", "water", "50"],
        ]);
        let report = InspectionReport::inspect(&workbook, &TemplateRegistry::builtin(), None, "precursors");
        assert_eq!(report.kind, Some(ProcessKind::SolutionPreparation));
        assert!(!report.has_failures());
        assert_eq!(
            report.tally(),
            Tally {
                passed: 3,
                ignored: 0,
                rejected: 0
            }
        );
        assert_eq!(report.steps[1].0, Subject::Sheet("Precursors".to_string()));
    }

    #[test]
    fn test_unmapped_column_warns_and_bad_value_fails() {
        let workbook = precursors(&[
            vec!["Solution ID", "Component", "Mass", "Operator"],
            vec!["S1", "water", "lots", "jdoe"],
        ]);
        let report = InspectionReport::inspect(&workbook, &TemplateRegistry::builtin(), None, "precursors");
        let tally = report.tally();
        assert_eq!((tally.ignored, tally.rejected), (1, 1));
        assert!(report.to_string().contains("unmapped columns: Operator"));
        assert!(matches!(report.steps[2], (Subject::Assembly, Outcome::Rejected(_))));
    }

    #[test]
    fn test_undetected_input_stops_early() {
        let workbook = precursors(&[vec!["Sample"], vec!["A"]]);
        let report = InspectionReport::inspect(&workbook, &TemplateRegistry::builtin(), None, "notes");
        assert_eq!(report.steps.len(), 1);
        assert!(report.has_failures());
        assert_eq!(report.kind, None);
    }
}
