pub mod dataset;
pub mod direction;
pub mod generator;
pub mod navigator;
pub mod report;
pub mod terrain;
