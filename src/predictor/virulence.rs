//! Virulence toxin genes.
//!
//! Toxin genes are not tied to any antibiotic. They are drained the same way as
//! resistance genes and reported as positive or negative.

use super::coverage::Covg;
use super::gene::{CatalogueGene, GeneInfo};
use super::graph::CoverageGraph;
use super::install::InstallDir;
use super::model::EvidenceModel;
use super::stream::{EvidenceStream, ReadingUtils};
use crate::utils::Result;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, EnumString, IntoStaticStr};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumCountMacro,
    EnumString,
    IntoStaticStr,
)]
pub enum VirulenceGene {
    #[strum(serialize = "luk")]
    Luk,
}

impl VirulenceGene {
    pub fn from_name(name: &str) -> Result<Self> {
        VirulenceGene::from_str(name).map_err(|_| format!("Unknown virulence gene {}", name))
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Toxin the gene encodes, as reported.
    pub fn toxin(self) -> &'static str {
        match self {
            VirulenceGene::Luk => "PVL",
        }
    }
}

impl CatalogueGene for VirulenceGene {
    fn from_name(name: &str) -> Result<Self> {
        VirulenceGene::from_name(name)
    }

    fn name(self) -> &'static str {
        VirulenceGene::name(self)
    }
}

impl Serialize for VirulenceGene {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirulenceCall {
    Positive,
    Negative,
}

impl VirulenceCall {
    pub fn as_str(self) -> &'static str {
        match self {
            VirulenceCall::Positive => "positive",
            VirulenceCall::Negative => "negative",
        }
    }
}

impl fmt::Display for VirulenceCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirulenceResult {
    pub gene: VirulenceGene,
    #[serde(serialize_with = "serialize_virulence_call")]
    pub call: VirulenceCall,
    pub median_depth: Covg,
    pub min_depth: Covg,
    pub percent_covered: u8,
    pub source_label: String,
}

fn serialize_virulence_call<S: serde::Serializer>(
    call: &VirulenceCall,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(call.as_str())
}

/// Best exemplar per toxin gene, reused across samples.
#[derive(Debug)]
pub struct VirulenceInfo {
    pub genes: [GeneInfo<VirulenceGene>; VirulenceGene::COUNT],
    fastas: Vec<(VirulenceGene, PathBuf)>,
}

impl VirulenceInfo {
    pub fn new(install: &InstallDir) -> Self {
        VirulenceInfo {
            genes: std::array::from_fn(|_| GeneInfo::default()),
            fastas: VirulenceGene::iter()
                .map(|gene| (gene, install.virulence_fasta(gene)))
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        self.genes.iter_mut().for_each(GeneInfo::reset);
    }

    /// Drains every toxin gene FASTA, keeping the best covered exemplar.
    /// Returns the number of exemplars read.
    pub fn load_evidence<G: CoverageGraph + ?Sized>(
        &mut self,
        graph: &G,
        utils: &mut ReadingUtils,
        tmp_gi: &mut GeneInfo<VirulenceGene>,
    ) -> Result<usize> {
        let mut num_exemplars = 0;
        for (_, path) in &self.fastas {
            let mut stream = EvidenceStream::open(path)?;
            while stream.next_gene_info(graph, tmp_gi, utils)? > 0 {
                if let Some(gene) = tmp_gi.gene {
                    self.genes[gene.index()].retain_best(tmp_gi);
                }
                num_exemplars += 1;
            }
        }
        Ok(num_exemplars)
    }

    pub fn results(&self, model: &dyn EvidenceModel) -> Vec<VirulenceResult> {
        VirulenceGene::iter()
            .map(|gene| {
                let info = &self.genes[gene.index()];
                VirulenceResult {
                    gene,
                    call: model.virulence_call(info),
                    median_depth: info.median_depth,
                    min_depth: info.min_depth,
                    percent_covered: info.percent_covered,
                    source_label: info.source_label.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::model::DepthThresholdModel;

    fn model() -> DepthThresholdModel {
        DepthThresholdModel {
            expected_depth: 40,
            min_percent_covered: 80,
            min_reads: 1,
            minor_fraction: 0.2,
        }
    }

    #[test]
    fn names_round_trip_through_catalogue() {
        for gene in VirulenceGene::iter() {
            assert_eq!(VirulenceGene::from_name(gene.name()).unwrap(), gene);
        }
        assert_eq!(VirulenceGene::Luk.toxin(), "PVL");
    }

    #[test]
    fn unknown_virulence_gene_is_an_error_naming_it() {
        assert_eq!(
            VirulenceGene::from_name("tst").unwrap_err(),
            "Unknown virulence gene tst"
        );
    }

    #[test]
    fn unobserved_toxin_is_negative() {
        let info = VirulenceInfo::new(&InstallDir::new("/install"));
        let results = info.results(&model());
        assert_eq!(results.len(), VirulenceGene::COUNT);
        assert!(results.iter().all(|r| r.call == VirulenceCall::Negative));
    }

    #[test]
    fn covered_toxin_is_positive_even_at_minor_depth() {
        let mut info = VirulenceInfo::new(&InstallDir::new("/install"));
        let candidate = GeneInfo {
            gene: Some(VirulenceGene::Luk),
            median_depth: 3,
            min_depth: 1,
            percent_covered: 95,
            source_label: "luk".to_string(),
        };
        assert!(info.genes[VirulenceGene::Luk.index()].retain_best(&candidate));
        let results = info.results(&model());
        assert_eq!(results[0].call, VirulenceCall::Positive);
        assert_eq!(results[0].percent_covered, 95);

        info.reset();
        assert!(info.genes.iter().all(|g| *g == GeneInfo::default()));
        assert_eq!(info.results(&model())[0].call, VirulenceCall::Negative);
    }
}
