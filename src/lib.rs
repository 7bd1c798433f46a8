pub mod cli;
pub mod commands;
pub mod predictor;
pub mod utils;
