use std::fmt;
use std::fmt::Write as _;

use clap::ValueEnum;
use serde::Serialize;

use crate::modules::dataset::DatasetResult;
use crate::modules::navigator::{Blocked, Position, Report, Step, StepRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Tab-indented text, one block per dataset
    #[default]
    Text,
    /// Pretty-printed JSON array
    Json,
}

impl OutputFormat {
    pub const fn label(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub fn render(
    results: &[DatasetResult],
    format: OutputFormat,
    trace: bool,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(results, trace)),
        OutputFormat::Json => render_json(results, trace),
    }
}

pub fn render_text(results: &[DatasetResult], trace: bool) -> String {
    let mut out = format!("Analyzing {} data set(s)\n", results.len());
    for result in results {
        let _ = write!(
            out,
            "Data set {}\n\tRobot Start: {} {}\n\tRobot Strength and Agility: {} {}\n\tInstructions: {}\n",
            result.index,
            result.start.x,
            result.start.y,
            result.strength,
            result.agility,
            result.instructions
        );
        if trace {
            for record in &result.run.trace {
                out.push_str(&trace_line(record));
            }
        }
        out.push_str(&report_text(&result.run.report));
    }
    out
}

/// The per-dataset result block, without the echoed inputs.
pub fn report_text(report: &Report) -> String {
    match report {
        Report::OffGridStart { .. } => "\trobot is off table\n".to_string(),
        Report::UnsafeHoleStart { .. } => "\trobot is in a hole\n".to_string(),
        Report::BoundaryViolation {
            step,
            directive,
            position,
            grid,
        } => format!(
            "\tInstruction {} unsafe: {} at {} {}\n{}",
            step,
            directive,
            position.x,
            position.y,
            table(grid)
        ),
        Report::Succeeded {
            processed,
            position,
            grid,
        } => format!(
            "\t{} instructions processed; robot at {} {}\n{}",
            processed,
            position.x,
            position.y,
            table(grid)
        ),
    }
}

fn table(grid: &str) -> String {
    let mut out = String::from("\tTable configuration:\n");
    for line in grid.lines() {
        let _ = writeln!(out, "\t\t{}", line);
    }
    out
}

fn trace_line(record: &StepRecord) -> String {
    let detail = match record.step {
        Step::Moved { to, flattened: true } => format!("moved to {} {}, hill flattened", to.x, to.y),
        Step::Moved { to, .. } => format!("moved to {} {}", to.x, to.y),
        Step::Blocked(Blocked::HillEroded { remaining }) => {
            format!("blocked by hill, eroded to {}", remaining)
        }
        Step::Blocked(Blocked::HoleTooDeep { depth }) => {
            format!("blocked by hole of depth {}", depth)
        }
        Step::Halted => "off table".to_string(),
    };
    format!(
        "\t# {} {} from {} {}: {}\n",
        record.index, record.directive, record.from.x, record.from.y, detail
    )
}

#[derive(Serialize)]
struct DatasetView<'a> {
    dataset: usize,
    start: Position,
    strength: u32,
    agility: u32,
    instructions: usize,
    report: &'a Report,
    terrain: Vec<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a [StepRecord]>,
}

pub fn render_json(results: &[DatasetResult], trace: bool) -> serde_json::Result<String> {
    let views: Vec<DatasetView<'_>> = results
        .iter()
        .map(|r| DatasetView {
            dataset: r.index,
            start: r.start,
            strength: r.strength,
            agility: r.agility,
            instructions: r.instructions,
            report: &r.run.report,
            terrain: r.run.terrain.rows(),
            trace: trace.then_some(r.run.trace.as_slice()),
        })
        .collect();
    let mut json = serde_json::to_string_pretty(&views)?;
    json.push('\n');
    Ok(json)
}
