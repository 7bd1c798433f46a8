//! Gene presence evidence.
//!
//! Each gene in the catalogue has a reference FASTA holding one or more
//! exemplars (divergent copies of the same gene). Every exemplar is threaded
//! through the graph and the exemplar with the broadest coverage is retained.

use crate::utils::Result;
use serde::Serialize;
use std::fmt::Debug;
use std::str::FromStr;
use strum_macros::{EnumCount, EnumIter, EnumString, IntoStaticStr};

use super::coverage::Covg;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, EnumString, IntoStaticStr,
)]
pub enum GenePresenceGene {
    #[strum(serialize = "aacA-aphD")]
    AacAAphD,
    #[strum(serialize = "blaZ")]
    BlaZ,
    #[strum(serialize = "dfrA")]
    DfrA,
    #[strum(serialize = "dfrG")]
    DfrG,
    #[strum(serialize = "ermA")]
    ErmA,
    #[strum(serialize = "ermB")]
    ErmB,
    #[strum(serialize = "ermC")]
    ErmC,
    #[strum(serialize = "ermT")]
    ErmT,
    #[strum(serialize = "fusB")]
    FusB,
    #[strum(serialize = "fusC")]
    FusC,
    #[strum(serialize = "vga(A)LC")]
    VgaALc,
    #[strum(serialize = "msrA")]
    MsrA,
    #[strum(serialize = "mecA")]
    MecA,
    #[strum(serialize = "tetK")]
    TetK,
    #[strum(serialize = "tetL")]
    TetL,
    #[strum(serialize = "tetM")]
    TetM,
    #[strum(serialize = "vanA")]
    VanA,
    #[strum(serialize = "mupA")]
    MupA,
    #[strum(serialize = "mupB")]
    MupB,
}

impl GenePresenceGene {
    /// Maps a reference record name onto the catalogue. The catalogue is closed,
    /// so an unrecognised name means the installed data and this build disagree.
    pub fn from_name(name: &str) -> Result<Self> {
        GenePresenceGene::from_str(name).map_err(|_| format!("Unknown gene {}", name))
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_erm(self) -> bool {
        matches!(
            self,
            GenePresenceGene::ErmA
                | GenePresenceGene::ErmB
                | GenePresenceGene::ErmC
                | GenePresenceGene::ErmT
        )
    }
}

/// A closed gene catalogue whose members are named by reference records.
pub trait CatalogueGene: Copy + Eq + Debug {
    fn from_name(name: &str) -> Result<Self>;
    fn name(self) -> &'static str;
}

impl CatalogueGene for GenePresenceGene {
    fn from_name(name: &str) -> Result<Self> {
        GenePresenceGene::from_name(name)
    }

    fn name(self) -> &'static str {
        GenePresenceGene::name(self)
    }
}

impl Serialize for GenePresenceGene {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Best observed coverage of one catalogue gene in the current sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneInfo<C: CatalogueGene = GenePresenceGene> {
    /// `None` until an exemplar has been observed in this sample.
    pub gene: Option<C>,
    pub median_depth: Covg,
    pub min_depth: Covg,
    pub percent_covered: u8,
    /// Name of the exemplar record the statistics came from.
    pub source_label: String,
}

impl<C: CatalogueGene> Default for GeneInfo<C> {
    fn default() -> Self {
        GeneInfo {
            gene: None,
            median_depth: 0,
            min_depth: 0,
            percent_covered: 0,
            source_label: String::new(),
        }
    }
}

impl<C: CatalogueGene> GeneInfo<C> {
    pub fn reset(&mut self) {
        self.gene = None;
        self.median_depth = 0;
        self.min_depth = 0;
        self.percent_covered = 0;
        self.source_label.clear();
    }

    /// Keeps `candidate` if it covers strictly more of the gene than the record
    /// held so far. Ties keep the earlier exemplar.
    pub fn retain_best(&mut self, candidate: &GeneInfo<C>) -> bool {
        if candidate.percent_covered > self.percent_covered {
            self.clone_from(candidate);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use strum::{EnumCount, IntoEnumIterator};

    fn observed(percent_covered: u8, label: &str) -> GeneInfo {
        GeneInfo {
            gene: Some(GenePresenceGene::BlaZ),
            median_depth: percent_covered as Covg / 2,
            min_depth: 1,
            percent_covered,
            source_label: label.to_string(),
        }
    }

    #[test]
    fn names_round_trip_through_catalogue() {
        for gene in GenePresenceGene::iter() {
            assert_eq!(GenePresenceGene::from_name(gene.name()).unwrap(), gene);
        }
        assert_eq!(GenePresenceGene::COUNT, 19);
        assert_eq!(
            GenePresenceGene::from_name("vga(A)LC").unwrap(),
            GenePresenceGene::VgaALc
        );
    }

    #[test]
    fn unknown_gene_is_an_error_naming_it() {
        let err = GenePresenceGene::from_name("blaTEM").unwrap_err();
        assert_eq!(err, "Unknown gene blaTEM");
    }

    #[test]
    fn indices_follow_declaration_order() {
        for (expected, gene) in GenePresenceGene::iter().enumerate() {
            assert_eq!(gene.index(), expected);
        }
    }

    #[test]
    fn erm_genes() {
        let erm = GenePresenceGene::iter().filter(|g| g.is_erm()).collect_vec();
        assert_eq!(
            erm,
            vec![
                GenePresenceGene::ErmA,
                GenePresenceGene::ErmB,
                GenePresenceGene::ErmC,
                GenePresenceGene::ErmT
            ]
        );
    }

    #[test]
    fn retains_highest_percent_covered() {
        let mut best = GeneInfo::default();
        for (i, pct) in [10, 55, 30, 80, 20].iter().enumerate() {
            best.retain_best(&observed(*pct, &format!("exemplar_{}", i)));
        }
        assert_eq!(best.percent_covered, 80);
        assert_eq!(best.source_label, "exemplar_3");
        assert_eq!(best.median_depth, 40);
    }

    #[test]
    fn retained_value_is_order_independent() {
        for order in [10u8, 55, 30, 80, 20].iter().permutations(5) {
            let mut best = GeneInfo::default();
            for pct in order {
                best.retain_best(&observed(*pct, "x"));
            }
            assert_eq!(best.percent_covered, 80);
        }
    }

    #[test]
    fn ties_keep_earlier_exemplar() {
        let mut best = GeneInfo::default();
        assert!(best.retain_best(&observed(60, "first")));
        assert!(!best.retain_best(&observed(60, "second")));
        assert_eq!(best.source_label, "first");
    }

    #[test]
    fn reset_is_idempotent() {
        let mut gi = observed(70, "copy");
        gi.reset();
        let once = gi.clone();
        gi.reset();
        assert_eq!(gi, once);
        assert_eq!(once, GeneInfo::default());
    }
}
