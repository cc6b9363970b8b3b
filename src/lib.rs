pub mod modules;

pub use modules::dataset::{
    self, Dataset, DatasetResult, ParseError, navigate_all, parse_datasets, write_datasets,
};
pub use modules::direction::{Direction, DirectionError, parse_directives};
pub use modules::generator::{self, GenerateCommand, GenerateError, generate};
pub use modules::navigator::{
    Blocked, Navigator, Position, Report, Robot, Run, RunState, Step, StepRecord,
};
pub use modules::report::{self, OutputFormat, render, render_json, render_text, report_text};
pub use modules::terrain::{Cell, Terrain, TerrainError};
