use std::path::Path;

use robonav::{GenerateCommand, generate, write_datasets};

use super::write_output;

pub(super) fn run_generate(cmd: GenerateCommand, output: Option<&Path>) -> Result<(), String> {
    let datasets = generate(&cmd).map_err(|e| e.to_string())?;
    write_output(output, &write_datasets(&datasets))?;

    if let Some(path) = output {
        match cmd.seed {
            Some(seed) => println!(
                "Generated {} data set(s) ({}x{}, seed {}) into {}",
                datasets.len(),
                cmd.width,
                cmd.height,
                seed,
                path.display()
            ),
            None => println!(
                "Generated {} data set(s) ({}x{}) into {}",
                datasets.len(),
                cmd.width,
                cmd.height,
                path.display()
            ),
        }
    }
    Ok(())
}
