use std::fmt;
use std::iter::Peekable;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::modules::direction::{Direction, DirectionError};
use crate::modules::navigator::{Navigator, Position, Robot, Run};
use crate::modules::terrain::{Terrain, TerrainError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: expected {expected}, found end of input")]
    UnexpectedEof { line: usize, expected: &'static str },
    #[error("line {line}: {expected} must be an integer, found '{token}'")]
    InvalidInteger {
        line: usize,
        expected: &'static str,
        token: String,
    },
    #[error("line {line}: {expected} must not be negative, found {value}")]
    Negative {
        line: usize,
        expected: &'static str,
        value: i64,
    },
    #[error("line {line}: {expected} must be at least 1")]
    ZeroDimension { line: usize, expected: &'static str },
    #[error("line {line}: {source}")]
    Directive {
        line: usize,
        #[source]
        source: DirectionError,
    },
    #[error(transparent)]
    Terrain(#[from] TerrainError),
    #[error("line {line}: expected {expected} directive(s), token '{token}' overruns the count")]
    TooManyDirectives {
        line: usize,
        expected: usize,
        token: String,
    },
}

/// One fully parsed simulation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub terrain: Terrain,
    pub start: Position,
    pub strength: u32,
    pub agility: u32,
    pub directives: Vec<Direction>,
}

/// A dataset together with the run it produced.
#[derive(Debug, Clone)]
pub struct DatasetResult {
    pub index: usize,
    pub start: Position,
    pub strength: u32,
    pub agility: u32,
    pub instructions: usize,
    pub run: Run,
}

impl Dataset {
    pub fn robot(&self) -> Robot {
        Robot::new(self.start, self.strength, self.agility)
    }

    /// Runs the directives; `index` is the 1-based dataset number used in reports.
    pub fn navigate(self, index: usize) -> DatasetResult {
        let robot = self.robot();
        let run = Navigator::new(self.terrain, robot).run(&self.directives);
        DatasetResult {
            index,
            start: self.start,
            strength: self.strength,
            agility: self.agility,
            instructions: self.directives.len(),
            run,
        }
    }
}

pub fn navigate_all(datasets: Vec<Dataset>) -> Vec<DatasetResult> {
    datasets
        .into_iter()
        .enumerate()
        .map(|(i, dataset)| dataset.navigate(i + 1))
        .collect()
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.terrain.width(), self.terrain.height())?;
        for row in self.terrain.rows() {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        writeln!(f, "{} {}", self.start.x, self.start.y)?;
        writeln!(f, "{} {}", self.strength, self.agility)?;
        writeln!(f, "{}", self.directives.len())?;
        let symbols: Vec<String> = self.directives.iter().map(|d| d.to_string()).collect();
        writeln!(f, "{}", symbols.join(" "))
    }
}

/// Serializes datasets back into the input format, count line first.
pub fn write_datasets(datasets: &[Dataset]) -> String {
    let mut out = format!("{}\n", datasets.len());
    for dataset in datasets {
        out.push_str(&dataset.to_string());
    }
    out
}

/// Whitespace-separated tokens tagged with their 1-based line number.
struct Tokens<'a> {
    inner: Peekable<Box<dyn Iterator<Item = (usize, &'a str)> + 'a>>,
    last_line: usize,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        let inner: Box<dyn Iterator<Item = (usize, &'a str)> + 'a> = Box::new(
            input
                .lines()
                .enumerate()
                .flat_map(|(i, line)| line.split_whitespace().map(move |t| (i + 1, t))),
        );
        Self {
            inner: inner.peekable(),
            last_line: input.lines().count().max(1),
        }
    }

    fn next(&mut self, expected: &'static str) -> Result<(usize, &'a str), ParseError> {
        self.inner.next().ok_or(ParseError::UnexpectedEof {
            line: self.last_line,
            expected,
        })
    }

    fn signed<T: FromStr>(&mut self, expected: &'static str) -> Result<(usize, T), ParseError> {
        let (line, token) = self.next(expected)?;
        let value = token.parse::<T>().map_err(|_| ParseError::InvalidInteger {
            line,
            expected,
            token: token.to_string(),
        })?;
        Ok((line, value))
    }

    fn unsigned<T: TryFrom<i64>>(&mut self, expected: &'static str) -> Result<(usize, T), ParseError> {
        let (line, token) = self.next(expected)?;
        let invalid = || ParseError::InvalidInteger {
            line,
            expected,
            token: token.to_string(),
        };
        let value = token.parse::<i64>().map_err(|_| invalid())?;
        if value < 0 {
            return Err(ParseError::Negative {
                line,
                expected,
                value,
            });
        }
        let value = T::try_from(value).map_err(|_| invalid())?;
        Ok((line, value))
    }

    fn dimension(&mut self, expected: &'static str) -> Result<usize, ParseError> {
        let (line, value) = self.unsigned::<usize>(expected)?;
        if value == 0 {
            return Err(ParseError::ZeroDimension { line, expected });
        }
        Ok(value)
    }

    fn directives(&mut self, count: usize) -> Result<Vec<Direction>, ParseError> {
        let mut directives = Vec::with_capacity(count.min(1024));
        while directives.len() < count {
            let (line, token) = self.next("directive")?;
            if directives.len() + token.chars().count() > count {
                return Err(ParseError::TooManyDirectives {
                    line,
                    expected: count,
                    token: token.to_string(),
                });
            }
            for c in token.chars() {
                let directive =
                    Direction::try_from(c).map_err(|source| ParseError::Directive { line, source })?;
                directives.push(directive);
            }
        }
        Ok(directives)
    }

    fn dataset(&mut self) -> Result<Dataset, ParseError> {
        let width = self.dimension("grid width")?;
        let height = self.dimension("grid height")?;
        Terrain::check_shape(width, height)?;

        let mut rows = Vec::with_capacity(height.min(1024));
        for _ in 0..height {
            let mut row = Vec::with_capacity(width.min(1024));
            for _ in 0..width {
                row.push(self.signed::<i32>("cell value")?.1);
            }
            rows.push(row);
        }
        let terrain = Terrain::from_rows(&rows)?;

        let (_, x) = self.signed::<i32>("start x")?;
        let (_, y) = self.signed::<i32>("start y")?;
        let (_, strength) = self.unsigned::<u32>("strength")?;
        let (_, agility) = self.unsigned::<u32>("agility")?;
        let (_, count) = self.unsigned::<usize>("directive count")?;
        let directives = self.directives(count)?;

        Ok(Dataset {
            terrain,
            start: Position::new(x, y),
            strength,
            agility,
            directives,
        })
    }
}

/// Parses the whitespace-separated input format; line layout is not enforced, only token order.
pub fn parse_datasets(input: &str) -> Result<Vec<Dataset>, ParseError> {
    let mut tokens = Tokens::new(input);

    let (_, count) = tokens.unsigned::<usize>("dataset count")?;
    let mut datasets = Vec::with_capacity(count.min(1024));
    for i in 0..count {
        let dataset = tokens.dataset()?;
        debug!(
            dataset = i + 1,
            width = dataset.terrain.width(),
            height = dataset.terrain.height(),
            directives = dataset.directives.len(),
            "parsed dataset"
        );
        datasets.push(dataset);
    }

    if let Some((line, _)) = tokens.inner.peek() {
        debug!(line, "ignoring trailing input after last dataset");
    }
    Ok(datasets)
}
