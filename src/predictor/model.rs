use super::classify::InfectionType;
use super::coverage::Covg;
use super::gene::{CatalogueGene, GeneInfo};
use super::mutation::{Var, VarOnBackground};
use super::virulence::{VirulenceCall, VirulenceGene};

/// Turns gathered evidence into per-marker calls.
pub trait EvidenceModel: Sync {
    fn gene_call(&self, gene: &GeneInfo) -> InfectionType;
    fn mutation_call(&self, var: &Var) -> InfectionType;
    fn virulence_call(&self, gene: &GeneInfo<VirulenceGene>) -> VirulenceCall;
}

/// Calls markers from coverage breadth and depth relative to the sample's
/// expected depth.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthThresholdModel {
    pub expected_depth: Covg,
    pub min_percent_covered: u8,
    pub min_reads: Covg,
    pub minor_fraction: f64,
}

impl DepthThresholdModel {
    fn is_minor(&self, depth: Covg) -> bool {
        self.expected_depth > 0
            && (depth as f64) < self.minor_fraction * self.expected_depth as f64
    }

    fn presence_call<C: CatalogueGene>(&self, gene: &GeneInfo<C>) -> InfectionType {
        if gene.gene.is_none()
            || gene.percent_covered < self.min_percent_covered
            || gene.median_depth == 0
        {
            InfectionType::Susceptible
        } else if self.is_minor(gene.median_depth) {
            InfectionType::MixedInfection
        } else {
            InfectionType::Resistant
        }
    }

    fn allele_present(&self, allele: &VarOnBackground) -> bool {
        allele.is_observed()
            && !allele.stats.too_short
            && allele.stats.percent_covered >= self.min_percent_covered
            && allele.stats.estimated_read_count >= self.min_reads
    }
}

impl EvidenceModel for DepthThresholdModel {
    fn gene_call(&self, gene: &GeneInfo) -> InfectionType {
        self.presence_call(gene)
    }

    fn mutation_call(&self, var: &Var) -> InfectionType {
        match (
            self.allele_present(&var.best_sus),
            self.allele_present(&var.best_res),
        ) {
            (false, true) => InfectionType::Resistant,
            (true, false) => InfectionType::Susceptible,
            (true, true) => InfectionType::MixedInfection,
            (false, false) => InfectionType::Unsure,
        }
    }

    /// A toxin gene present at any depth, minor populations included, is
    /// positive.
    fn virulence_call(&self, gene: &GeneInfo<VirulenceGene>) -> VirulenceCall {
        if self.presence_call(gene).is_resistant() {
            VirulenceCall::Positive
        } else {
            VirulenceCall::Negative
        }
    }
}
