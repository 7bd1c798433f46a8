pub mod antibiotic;
pub mod classify;
pub mod coverage;
pub mod gene;
pub mod graph;
pub mod install;
pub mod model;
pub mod mutation;
pub mod report;
pub mod sample;
pub mod stream;
pub mod virulence;

pub use antibiotic::{Antibiotic, AntibioticInfo};
pub use classify::{InfectionType, Phenotype};
pub use graph::{CoverageGraph, KmerGraph};
pub use install::InstallDir;
pub use report::{OutputFormat, ReportWriter};
pub use sample::{Params, SamplePredictor, SampleReport};
