//! Susceptibility rules.
//!
//! Each antibiotic folds the per-marker calls of its genes and mutations into
//! a single infection type. Clindamycin additionally distinguishes
//! constitutive from inducible resistance using the erythromycin result.

use super::antibiotic::{Antibiotic, AntibioticInfo};
use super::coverage::{AlleleCoverageStats, Covg};
use super::gene::GenePresenceGene;
use super::model::EvidenceModel;
use super::mutation::KnownMutation;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfectionType {
    Susceptible,
    Resistant,
    MixedInfection,
    Unsure,
}

impl InfectionType {
    /// Single character code: `S`, `R`, `r` (mixed) or `N` (unsure).
    pub fn code(self) -> char {
        match self {
            InfectionType::Susceptible => 'S',
            InfectionType::Resistant => 'R',
            InfectionType::MixedInfection => 'r',
            InfectionType::Unsure => 'N',
        }
    }

    pub fn is_resistant(self) -> bool {
        matches!(self, InfectionType::Resistant | InfectionType::MixedInfection)
    }
}

/// Folds a new call into a running one. The running call is only overwritten
/// while it is `Unsure` or `Susceptible`, so resistance is sticky.
pub fn update_infection_type(new: InfectionType, permanent: &mut InfectionType) {
    if matches!(
        *permanent,
        InfectionType::Unsure | InfectionType::Susceptible
    ) {
        *permanent = new;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mechanism {
    Constitutive,
    Inducible,
}

/// Reported phenotype for one antibiotic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phenotype {
    pub call: InfectionType,
    pub mechanism: Option<Mechanism>,
}

impl Phenotype {
    pub fn plain(call: InfectionType) -> Self {
        Phenotype {
            call,
            mechanism: None,
        }
    }

    /// Renders the call with `inconclusive` standing in for `Unsure`.
    pub fn render(&self, inconclusive: &str) -> String {
        let call = match self.call {
            InfectionType::Unsure => return inconclusive.to_string(),
            call => call.code(),
        };
        match self.mechanism {
            Some(Mechanism::Constitutive) => format!("{}(constitutive)", call),
            Some(Mechanism::Inducible) => format!("{}(inducible)", call),
            None => call.to_string(),
        }
    }
}

impl fmt::Display for Phenotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render("N"))
    }
}

/// Combines the direct clindamycin call with the erythromycin result.
///
/// Resistance seen directly is constitutive. A susceptible direct call with an
/// erm gene present takes the erythromycin resistance as inducible, and is
/// inconclusive when erythromycin itself is.
pub fn clindamycin_phenotype(
    direct: InfectionType,
    any_erm_present: bool,
    erythromycin: InfectionType,
) -> Phenotype {
    match direct {
        InfectionType::Resistant | InfectionType::MixedInfection => Phenotype {
            call: direct,
            mechanism: Some(Mechanism::Constitutive),
        },
        InfectionType::Susceptible if any_erm_present => match erythromycin {
            InfectionType::Resistant | InfectionType::MixedInfection => Phenotype {
                call: erythromycin,
                mechanism: Some(Mechanism::Inducible),
            },
            InfectionType::Susceptible => Phenotype::plain(InfectionType::Susceptible),
            InfectionType::Unsure => Phenotype::plain(InfectionType::Unsure),
        },
        call => Phenotype::plain(call),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalledGene {
    pub gene: GenePresenceGene,
    #[serde(serialize_with = "serialize_call")]
    pub call: InfectionType,
    pub median_depth: Covg,
    pub min_depth: Covg,
    pub percent_covered: u8,
    pub source_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalledVariant {
    pub mutation: KnownMutation,
    #[serde(serialize_with = "serialize_call")]
    pub call: InfectionType,
    pub susceptible: AlleleCoverageStats,
    pub resistant: AlleleCoverageStats,
}

fn serialize_call<S: serde::Serializer>(
    call: &InfectionType,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_char(call.code())
}

/// Outcome of a rule: the antibiotic call plus the markers that drove it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub call: InfectionType,
    pub any_erm_present: bool,
    pub called_genes: Vec<CalledGene>,
    pub called_variants: Vec<CalledVariant>,
}

pub trait SusceptibilityRule: Sync {
    fn classify(&self, info: &AntibioticInfo, model: &dyn EvidenceModel) -> Classification;
}

/// Folds every mutation call and then every gene call, starting from
/// `Unsure`.
pub struct AnyMarkerRule;

impl SusceptibilityRule for AnyMarkerRule {
    fn classify(&self, info: &AntibioticInfo, model: &dyn EvidenceModel) -> Classification {
        let mut call = InfectionType::Unsure;
        let mut called_genes = Vec::new();
        let mut called_variants = Vec::new();

        for &mutation in info.mutation_ids {
            let var = info.var(mutation);
            let var_call = model.mutation_call(var);
            update_infection_type(var_call, &mut call);
            if var_call.is_resistant() {
                called_variants.push(CalledVariant {
                    mutation,
                    call: var_call,
                    susceptible: var.best_sus.stats,
                    resistant: var.best_res.stats,
                });
            }
        }

        for &gene in &info.gene_ids {
            let gene_info = info.gene(gene);
            let gene_call = model.gene_call(gene_info);
            update_infection_type(gene_call, &mut call);
            if gene_call.is_resistant() {
                called_genes.push(CalledGene {
                    gene,
                    call: gene_call,
                    median_depth: gene_info.median_depth,
                    min_depth: gene_info.min_depth,
                    percent_covered: gene_info.percent_covered,
                    source_label: gene_info.source_label.clone(),
                });
            }
        }

        Classification {
            call,
            any_erm_present: false,
            called_genes,
            called_variants,
        }
    }
}

/// Same as [`AnyMarkerRule`], also recording whether any erm gene was called.
pub struct ErythromycinRule;

impl SusceptibilityRule for ErythromycinRule {
    fn classify(&self, info: &AntibioticInfo, model: &dyn EvidenceModel) -> Classification {
        let mut classification = AnyMarkerRule.classify(info, model);
        classification.any_erm_present = classification
            .called_genes
            .iter()
            .any(|called| called.gene.is_erm());
        classification
    }
}

pub fn rule_for(antibiotic: Antibiotic) -> &'static dyn SusceptibilityRule {
    match antibiotic {
        Antibiotic::Erythromycin => &ErythromycinRule,
        _ => &AnyMarkerRule,
    }
}
