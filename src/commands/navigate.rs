use std::path::Path;

use robonav::{OutputFormat, navigate_all, parse_datasets, render};
use tracing::info;

use super::{read_input, write_output};

pub(super) fn run_navigate(
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    trace: bool,
) -> Result<(), String> {
    let text = read_input(input)?;
    let datasets = parse_datasets(&text).map_err(|e| e.to_string())?;
    info!(datasets = datasets.len(), input = %input.display(), "loaded datasets");

    let results = navigate_all(datasets);
    let report = render(&results, format, trace).map_err(|e| format!("encode report: {}", e))?;
    write_output(output, &report)?;

    if let Some(path) = output {
        let succeeded = results.iter().filter(|r| r.run.report.succeeded()).count();
        println!(
            "Wrote {} report for {} data set(s) ({} succeeded) to {}",
            format,
            results.len(),
            succeeded,
            path.display()
        );
    }
    Ok(())
}

pub(super) fn run_check(input: &Path) -> Result<(), String> {
    let text = read_input(input)?;
    let datasets = parse_datasets(&text).map_err(|e| e.to_string())?;

    println!("{} data set(s) OK", datasets.len());
    for (i, dataset) in datasets.iter().enumerate() {
        let start_on_grid = dataset.terrain.in_bounds(dataset.start.x, dataset.start.y);
        println!(
            " - data set {}: {}x{} grid, start {} {}{}, strength {}, agility {}, {} directive(s)",
            i + 1,
            dataset.terrain.width(),
            dataset.terrain.height(),
            dataset.start.x,
            dataset.start.y,
            if start_on_grid { "" } else { " (off table)" },
            dataset.strength,
            dataset.agility,
            dataset.directives.len()
        );
    }
    Ok(())
}
