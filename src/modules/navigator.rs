use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::modules::direction::Direction;
use crate::modules::terrain::{Cell, Terrain};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Robot {
    pub position: Position,
    pub strength: u32,
    pub agility: u32,
}

impl Robot {
    pub const fn new(position: Position, strength: u32, agility: u32) -> Self {
        Self {
            position,
            strength,
            agility,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

/// Why a directive left the robot in place without ending the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Blocked {
    /// Hill taller than strength; it loses `strength` and keeps `remaining`.
    HillEroded { remaining: u32 },
    HoleTooDeep { depth: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Step {
    Moved { to: Position, flattened: bool },
    Blocked(Blocked),
    /// Destination is off the grid; the run ends here.
    Halted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub directive: Direction,
    pub from: Position,
    #[serde(flatten)]
    pub step: Step,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Report {
    Succeeded {
        processed: usize,
        position: Position,
        grid: String,
    },
    OffGridStart {
        position: Position,
    },
    UnsafeHoleStart {
        position: Position,
        depth: u32,
        agility: u32,
    },
    BoundaryViolation {
        step: usize,
        directive: Direction,
        position: Position,
        grid: String,
    },
}

impl Report {
    pub fn succeeded(&self) -> bool {
        matches!(self, Report::Succeeded { .. })
    }

    pub fn position(&self) -> Position {
        match self {
            Report::Succeeded { position, .. }
            | Report::OffGridStart { position }
            | Report::UnsafeHoleStart { position, .. }
            | Report::BoundaryViolation { position, .. } => *position,
        }
    }

    /// Grid snapshot; absent for the two start-validation failures.
    pub fn grid(&self) -> Option<&str> {
        match self {
            Report::Succeeded { grid, .. } | Report::BoundaryViolation { grid, .. } => Some(grid),
            Report::OffGridStart { .. } | Report::UnsafeHoleStart { .. } => None,
        }
    }
}

/// Everything a finished run hands back: the report, the mutated terrain and the step trace.
#[derive(Debug, Clone)]
pub struct Run {
    pub report: Report,
    pub terrain: Terrain,
    pub robot: Robot,
    pub trace: Vec<StepRecord>,
}

/// Drives one robot over one terrain. Consumed by [`Navigator::run`].
#[derive(Debug)]
pub struct Navigator {
    terrain: Terrain,
    robot: Robot,
    state: RunState,
    trace: Vec<StepRecord>,
}

impl Navigator {
    pub fn new(terrain: Terrain, robot: Robot) -> Self {
        Self {
            terrain,
            robot,
            state: RunState::NotStarted,
            trace: Vec::new(),
        }
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn run(mut self, directives: &[Direction]) -> Run {
        let report = match self.start() {
            Err(report) => report,
            Ok(()) => self.follow(directives),
        };

        self.state = if report.succeeded() {
            RunState::Succeeded
        } else {
            RunState::Failed
        };
        info!(
            outcome = ?self.state,
            x = report.position().x,
            y = report.position().y,
            steps = self.trace.len(),
            "navigation finished"
        );

        Run {
            report,
            terrain: self.terrain,
            robot: self.robot,
            trace: self.trace,
        }
    }

    fn start(&mut self) -> Result<(), Report> {
        let position = self.robot.position;
        let cell = self
            .terrain
            .cell(position.x, position.y)
            .ok_or(Report::OffGridStart { position })?;

        match cell {
            Cell::Hole(depth) if depth > self.robot.agility => {
                return Err(Report::UnsafeHoleStart {
                    position,
                    depth,
                    agility: self.robot.agility,
                });
            }
            // Standing on a hill always levels it, whatever the strength.
            Cell::Hill(_) => {
                self.terrain.set_cell(position.x, position.y, Cell::Flat);
                debug!(x = position.x, y = position.y, "start hill flattened");
            }
            Cell::Hole(_) | Cell::Flat => {}
        }

        self.state = RunState::Running;
        debug!(x = position.x, y = position.y, "navigation running");
        Ok(())
    }

    fn follow(&mut self, directives: &[Direction]) -> Report {
        for (i, directive) in directives.iter().copied().enumerate() {
            let index = i + 1;
            let from = self.robot.position;
            let step = self.step(directive);

            debug!(index, directive = %directive, ?from, ?step, "step");
            self.trace.push(StepRecord {
                index,
                directive,
                from,
                step,
            });

            if step == Step::Halted {
                return Report::BoundaryViolation {
                    step: index,
                    directive,
                    position: from,
                    grid: self.terrain.render(),
                };
            }
        }

        Report::Succeeded {
            processed: directives.len(),
            position: self.robot.position,
            grid: self.terrain.render(),
        }
    }

    /// Applies a single directive from the current position.
    fn step(&mut self, directive: Direction) -> Step {
        let to = self.robot.position.step(directive);
        let Some(cell) = self.terrain.cell(to.x, to.y) else {
            return Step::Halted;
        };

        match cell {
            Cell::Flat => self.move_to(to, false),
            Cell::Hill(height) if height <= self.robot.strength => {
                // Only an exact match levels the hill; a stronger robot leaves it standing.
                let flattened = height == self.robot.strength;
                if flattened {
                    self.terrain.set_cell(to.x, to.y, Cell::Flat);
                }
                self.move_to(to, flattened)
            }
            Cell::Hill(height) => {
                let remaining = height - self.robot.strength;
                self.terrain.set_cell(to.x, to.y, Cell::Hill(remaining));
                Step::Blocked(Blocked::HillEroded { remaining })
            }
            Cell::Hole(depth) if depth <= self.robot.agility => self.move_to(to, false),
            Cell::Hole(depth) => Step::Blocked(Blocked::HoleTooDeep { depth }),
        }
    }

    fn move_to(&mut self, to: Position, flattened: bool) -> Step {
        self.robot.position = to;
        Step::Moved { to, flattened }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::direction::parse_directives;

    fn navigator(rows: &[Vec<i32>], x: i32, y: i32, strength: u32, agility: u32) -> Navigator {
        let terrain = Terrain::from_rows(rows).unwrap();
        Navigator::new(terrain, Robot::new(Position::new(x, y), strength, agility))
    }

    fn run(rows: &[Vec<i32>], start: (i32, i32), strength: u32, agility: u32, moves: &str) -> Run {
        navigator(rows, start.0, start.1, strength, agility).run(&parse_directives(moves).unwrap())
    }

    #[test]
    fn flat_walk_succeeds_without_mutation() {
        let rows = vec![vec![0; 3]; 3];
        let result = run(&rows, (0, 0), 1, 1, "EES");

        assert_eq!(
            result.report,
            Report::Succeeded {
                processed: 3,
                position: Position::new(2, 1),
                grid: "  0  0  0\n  0  0  0\n  0  0  0\n".to_string(),
            }
        );
        assert_eq!(result.terrain.rows(), rows);
        assert_eq!(result.trace.len(), 3);
    }

    #[test]
    fn off_grid_start_reports_without_grid() {
        let rows = vec![vec![3, -2], vec![0, 1]];
        for (x, y) in [(-1, 0), (0, -1), (2, 0), (0, 2), (5, 5)] {
            let result = run(&rows, (x, y), 1, 1, "NESW");
            assert_eq!(
                result.report,
                Report::OffGridStart {
                    position: Position::new(x, y)
                }
            );
            assert_eq!(result.report.grid(), None);
            assert_eq!(result.terrain.rows(), rows);
            assert!(result.trace.is_empty());
        }
    }

    #[test]
    fn deep_start_hole_is_unsafe() {
        let rows = vec![vec![-5, 0]];
        let result = run(&rows, (0, 0), 9, 2, "E");

        assert_eq!(
            result.report,
            Report::UnsafeHoleStart {
                position: Position::new(0, 0),
                depth: 5,
                agility: 2,
            }
        );
        assert_eq!(result.report.grid(), None);
        assert_eq!(result.terrain.rows(), rows);
        assert!(result.trace.is_empty());
    }

    #[test]
    fn shallow_start_hole_is_kept() {
        let result = run(&[vec![-2, 0]], (0, 0), 0, 2, "E");
        assert!(result.report.succeeded());
        assert_eq!(result.terrain.rows(), vec![vec![-2, 0]]);
    }

    #[test]
    fn start_hill_is_flattened_regardless_of_strength() {
        let mut nav = navigator(&[vec![9, 0]], 0, 0, 1, 0);
        assert_eq!(nav.state(), RunState::NotStarted);
        assert!(nav.start().is_ok());
        assert_eq!(nav.state(), RunState::Running);
        assert_eq!(nav.terrain().value_at(0, 0), Some(0));

        let result = run(&[vec![9, 0]], (0, 0), 1, 0, "");
        assert_eq!(result.terrain.rows(), vec![vec![0, 0]]);
    }

    #[test]
    fn hill_equal_to_strength_is_climbed_and_flattened() {
        let result = run(&[vec![0, 5]], (0, 0), 5, 0, "E");
        assert_eq!(result.report.position(), Position::new(1, 0));
        assert_eq!(result.terrain.rows(), vec![vec![0, 0]]);
        assert_eq!(
            result.trace[0].step,
            Step::Moved {
                to: Position::new(1, 0),
                flattened: true
            }
        );
    }

    #[test]
    fn hill_below_strength_is_climbed_but_left_standing() {
        // Only exact equality flattens; a stronger robot does not.
        let result = run(&[vec![0, 3]], (0, 0), 5, 0, "E");
        assert_eq!(result.report.position(), Position::new(1, 0));
        assert_eq!(result.terrain.rows(), vec![vec![0, 3]]);
    }

    #[test]
    fn hill_above_strength_is_eroded_and_blocks() {
        let result = run(&[vec![0, 7]], (0, 0), 5, 0, "E");
        assert_eq!(result.report.position(), Position::new(0, 0));
        assert!(result.report.succeeded());
        assert_eq!(result.terrain.rows(), vec![vec![0, 2]]);
        assert_eq!(
            result.trace[0].step,
            Step::Blocked(Blocked::HillEroded { remaining: 2 })
        );
    }

    #[test]
    fn repeated_pushes_wear_a_hill_down() {
        // 7 -> 2 (blocked), then 2 < 5 so the robot climbs without flattening.
        let result = run(&[vec![0, 7]], (0, 0), 5, 0, "EE");
        assert_eq!(result.report.position(), Position::new(1, 0));
        assert_eq!(result.terrain.rows(), vec![vec![0, 2]]);
    }

    #[test]
    fn holes_within_agility_are_entered_untouched() {
        let result = run(&[vec![0, -2, -3]], (0, 0), 0, 3, "EE");
        assert_eq!(result.report.position(), Position::new(2, 0));
        assert_eq!(result.terrain.rows(), vec![vec![0, -2, -3]]);
    }

    #[test]
    fn deep_holes_block_without_mutation() {
        let result = run(&[vec![0, -4, 0]], (0, 0), 9, 3, "EN");
        assert_eq!(
            result.trace[0].step,
            Step::Blocked(Blocked::HoleTooDeep { depth: 4 })
        );
        assert_eq!(result.terrain.rows(), vec![vec![0, -4, 0]]);
        // The blocked step keeps the robot at (0, 0); the following north move leaves the grid.
        assert!(matches!(
            result.report,
            Report::BoundaryViolation { step: 2, directive: Direction::North, position, .. }
                if position == Position::new(0, 0)
        ));
    }

    #[test]
    fn boundary_violation_stops_processing() {
        let rows = vec![vec![0, 0, 5], vec![0, 0, 0]];
        let result = run(&rows, (1, 1), 5, 0, "ESSNE");

        assert_eq!(
            result.report,
            Report::BoundaryViolation {
                step: 2,
                directive: Direction::South,
                position: Position::new(2, 1),
                grid: "  0  0  5\n  0  0  0\n".to_string(),
            }
        );
        // The hill at (2, 0) is never reached.
        assert_eq!(result.terrain.rows(), rows);
        assert_eq!(result.trace.len(), 2);
        assert_eq!(result.trace[1].step, Step::Halted);
    }

    #[test]
    fn empty_directive_list_succeeds_in_place() {
        let result = run(&[vec![0]], (0, 0), 0, 0, "");
        assert_eq!(
            result.report,
            Report::Succeeded {
                processed: 0,
                position: Position::new(0, 0),
                grid: "  0\n".to_string(),
            }
        );
    }

    #[test]
    fn settled_terrain_reaches_a_fixed_point() {
        let rows = vec![vec![0, 5, 2], vec![-1, 0, -3]];
        let moves = "EESWWN";
        let first = run(&rows, (0, 0), 5, 1, moves);
        assert_eq!(first.terrain.rows(), vec![vec![0, 0, 2], vec![-1, 0, -3]]);

        let second = Navigator::new(first.terrain.clone(), first.robot_at(0, 0)).run(
            &parse_directives(moves).unwrap(),
        );
        let third = Navigator::new(second.terrain.clone(), second.robot_at(0, 0)).run(
            &parse_directives(moves).unwrap(),
        );
        assert_eq!(second.terrain, first.terrain);
        assert_eq!(third.terrain, second.terrain);
        assert_eq!(second.report, third.report);
    }

    impl Run {
        fn robot_at(&self, x: i32, y: i32) -> Robot {
            Robot::new(Position::new(x, y), self.robot.strength, self.robot.agility)
        }
    }
}
