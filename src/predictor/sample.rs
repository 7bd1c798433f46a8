use super::antibiotic::{Antibiotic, AntibioticInfo};
use super::classify::{
    clindamycin_phenotype, rule_for, CalledGene, CalledVariant, InfectionType, Phenotype,
};
use super::coverage::Covg;
use super::gene::GeneInfo;
use super::graph::CoverageGraph;
use super::install::InstallDir;
use super::model::DepthThresholdModel;
use super::mutation::VarOnBackground;
use super::stream::{ReadingUtils, MAX_LEN_GENE, MAX_LEN_MUT_ALLELE};
use super::virulence::{VirulenceGene, VirulenceInfo, VirulenceResult};
use crate::utils::Result;
use strum::IntoEnumIterator;

/// Runtime thresholds shared by every sample of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub ignore_first: usize,
    pub ignore_last: usize,
    pub expected_depth: Option<Covg>,
    pub min_percent_covered: u8,
    pub min_reads: Covg,
    pub minor_fraction: f64,
    pub min_kmer_count: Covg,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            ignore_first: 0,
            ignore_last: 0,
            expected_depth: None,
            min_percent_covered: 80,
            min_reads: 1,
            minor_fraction: 0.2,
            min_kmer_count: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AntibioticResult {
    pub antibiotic: Antibiotic,
    pub phenotype: Phenotype,
    pub called_genes: Vec<CalledGene>,
    pub called_variants: Vec<CalledVariant>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleReport {
    pub sample: String,
    pub expected_depth: Covg,
    pub results: Vec<AntibioticResult>,
    pub virulence: Vec<VirulenceResult>,
}

/// Per-worker prediction state. Containers and scratch buffers are allocated
/// once and reset between antibiotics.
pub struct SamplePredictor {
    infos: Vec<AntibioticInfo>,
    virulence: VirulenceInfo,
    mutation_utils: ReadingUtils,
    gene_utils: ReadingUtils,
    tmp_vob: VarOnBackground,
    tmp_gi: GeneInfo,
    tmp_virulence: GeneInfo<VirulenceGene>,
    params: Params,
}

impl SamplePredictor {
    pub fn new(install: &InstallDir, params: Params) -> Self {
        SamplePredictor {
            infos: Antibiotic::iter()
                .map(|ab| AntibioticInfo::new(ab, install))
                .collect(),
            virulence: VirulenceInfo::new(install),
            mutation_utils: ReadingUtils::new(MAX_LEN_MUT_ALLELE),
            gene_utils: ReadingUtils::new(MAX_LEN_GENE),
            tmp_vob: VarOnBackground::default(),
            tmp_gi: GeneInfo::default(),
            tmp_virulence: GeneInfo::default(),
            params,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn predict<G: CoverageGraph + ?Sized>(
        &mut self,
        sample: &str,
        graph: &G,
        expected_depth: Covg,
    ) -> Result<SampleReport> {
        let model = DepthThresholdModel {
            expected_depth,
            min_percent_covered: self.params.min_percent_covered,
            min_reads: self.params.min_reads,
            minor_fraction: self.params.minor_fraction,
        };

        let mut erythromycin: Option<(InfectionType, bool)> = None;
        let mut results = Vec::with_capacity(self.infos.len());

        for info in self.infos.iter_mut() {
            info.reset();
            self.mutation_utils.reset();
            self.gene_utils.reset();
            let num_alleles = info.load_mutation_evidence(
                graph,
                &mut self.mutation_utils,
                &mut self.tmp_vob,
                self.params.ignore_first,
                self.params.ignore_last,
            )?;
            let num_exemplars =
                info.load_gene_evidence(graph, &mut self.gene_utils, &mut self.tmp_gi)?;
            log::debug!(
                "{}: {} read {} mutation alleles and {} gene exemplars",
                sample,
                info.antibiotic.name(),
                num_alleles,
                num_exemplars
            );

            let classification = rule_for(info.antibiotic).classify(info, &model);
            let phenotype = match info.antibiotic {
                Antibiotic::Erythromycin => {
                    erythromycin = Some((classification.call, classification.any_erm_present));
                    Phenotype::plain(classification.call)
                }
                Antibiotic::Clindamycin => {
                    let (ery_call, any_erm_present) = erythromycin.ok_or_else(|| {
                        "Erythromycin must be evaluated before clindamycin".to_string()
                    })?;
                    clindamycin_phenotype(classification.call, any_erm_present, ery_call)
                }
                _ => Phenotype::plain(classification.call),
            };

            results.push(AntibioticResult {
                antibiotic: info.antibiotic,
                phenotype,
                called_genes: classification.called_genes,
                called_variants: classification.called_variants,
            });
        }

        self.virulence.reset();
        self.gene_utils.reset();
        let num_exemplars = self.virulence.load_evidence(
            graph,
            &mut self.gene_utils,
            &mut self.tmp_virulence,
        )?;
        log::debug!("{}: read {} toxin gene exemplars", sample, num_exemplars);
        let virulence = self.virulence.results(&model);

        Ok(SampleReport {
            sample: sample.to_string(),
            expected_depth,
            results,
            virulence,
        })
    }
}
