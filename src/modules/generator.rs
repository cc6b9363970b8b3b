use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::modules::dataset::Dataset;
use crate::modules::direction::Direction;
use crate::modules::navigator::Position;
use crate::modules::terrain::{Cell, Terrain, TerrainError};

pub const DEFAULT_DATASETS: usize = 3;
pub const DEFAULT_WIDTH: usize = 5;
pub const DEFAULT_HEIGHT: usize = 5;
pub const DEFAULT_MAX_HILL: u32 = 9;
pub const DEFAULT_MAX_HOLE: u32 = 9;
pub const DEFAULT_FLAT_RATIO: f64 = 0.5;
pub const DEFAULT_MOVES: usize = 10;

#[derive(Debug, Clone)]
pub struct GenerateCommand {
    pub datasets: usize,
    pub width: usize,
    pub height: usize,
    pub max_hill: u32,
    pub max_hole: u32,
    pub flat_ratio: f64,
    pub moves: usize,
    pub seed: Option<u64>,
}

impl Default for GenerateCommand {
    fn default() -> Self {
        Self {
            datasets: DEFAULT_DATASETS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            max_hill: DEFAULT_MAX_HILL,
            max_hole: DEFAULT_MAX_HOLE,
            flat_ratio: DEFAULT_FLAT_RATIO,
            moves: DEFAULT_MOVES,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error("flat ratio must be within 0..=1, got {0}")]
    FlatRatio(f64),
    #[error(transparent)]
    Terrain(#[from] TerrainError),
}

/// Random datasets; the robot always starts on the grid.
pub fn generate(cmd: &GenerateCommand) -> Result<Vec<Dataset>, GenerateError> {
    if !(0.0..=1.0).contains(&cmd.flat_ratio) {
        return Err(GenerateError::FlatRatio(cmd.flat_ratio));
    }
    // Surface shape errors before touching the rng.
    Terrain::check_shape(cmd.width, cmd.height)?;
    let extent = |len: usize| {
        i32::try_from(len).map_err(|_| TerrainError::TooLarge {
            width: cmd.width,
            height: cmd.height,
        })
    };
    let (width, height) = (extent(cmd.width)?, extent(cmd.height)?);

    let mut rng = match cmd.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    (0..cmd.datasets)
        .map(|_| random_dataset(cmd, width, height, &mut rng))
        .collect()
}

fn random_dataset(
    cmd: &GenerateCommand,
    width: i32,
    height: i32,
    rng: &mut StdRng,
) -> Result<Dataset, GenerateError> {
    let mut terrain = Terrain::flat(cmd.width, cmd.height)?;
    for y in 0..height {
        for x in 0..width {
            terrain.set_cell(x, y, random_cell(cmd, rng));
        }
    }

    let start = Position::new(rng.gen_range(0..width), rng.gen_range(0..height));
    let directives = (0..cmd.moves)
        .map(|_| Direction::ALL[rng.gen_range(0..Direction::ALL.len())])
        .collect();

    Ok(Dataset {
        terrain,
        start,
        strength: rng.gen_range(0..=cmd.max_hill),
        agility: rng.gen_range(0..=cmd.max_hole),
        directives,
    })
}

fn random_cell(cmd: &GenerateCommand, rng: &mut StdRng) -> Cell {
    if rng.gen_bool(cmd.flat_ratio) {
        return Cell::Flat;
    }
    match (cmd.max_hill, cmd.max_hole) {
        (0, 0) => Cell::Flat,
        (0, hole) => Cell::Hole(rng.gen_range(1..=hole)),
        (hill, 0) => Cell::Hill(rng.gen_range(1..=hill)),
        (hill, hole) => {
            if rng.gen_bool(0.5) {
                Cell::Hill(rng.gen_range(1..=hill))
            } else {
                Cell::Hole(rng.gen_range(1..=hole))
            }
        }
    }
}
