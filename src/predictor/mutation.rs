//! Known resistance mutations and the evidence gathered for them.
//!
//! Every known mutation has alleles on a susceptible background and on a
//! resistant background in the installed mutation FASTA. Records are named
//! `<gene>_<change>_<sus|res>` with an optional `_<suffix>` distinguishing
//! alternative backgrounds, e.g. `rpoB_H481N_res_2`.

use crate::utils::Result;
use serde::Serialize;
use std::str::FromStr;
use strum_macros::{EnumCount, EnumIter, EnumString, IntoStaticStr};

use super::coverage::AlleleCoverageStats;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, EnumString, IntoStaticStr,
)]
pub enum KnownMutation {
    #[strum(serialize = "dfrB_F99Y")]
    DfrBF99Y,
    #[strum(serialize = "dfrB_F99S")]
    DfrBF99S,
    #[strum(serialize = "dfrB_H31N")]
    DfrBH31N,
    #[strum(serialize = "dfrB_L41F")]
    DfrBL41F,
    #[strum(serialize = "dfrB_H150R")]
    DfrBH150R,
    #[strum(serialize = "dfrB_L21V")]
    DfrBL21V,
    #[strum(serialize = "dfrB_N60I")]
    DfrBN60I,
    #[strum(serialize = "gyrA_S84L")]
    GyrAS84L,
    #[strum(serialize = "gyrA_S85P")]
    GyrAS85P,
    #[strum(serialize = "gyrA_E88K")]
    GyrAE88K,
    #[strum(serialize = "gyrA_G106D")]
    GyrAG106D,
    #[strum(serialize = "grlA_S80F")]
    GrlAS80F,
    #[strum(serialize = "grlA_S80Y")]
    GrlAS80Y,
    #[strum(serialize = "grlA_E84K")]
    GrlAE84K,
    #[strum(serialize = "rpoB_H481N")]
    RpoBH481N,
    #[strum(serialize = "rpoB_H481Y")]
    RpoBH481Y,
    #[strum(serialize = "rpoB_S486L")]
    RpoBS486L,
    #[strum(serialize = "rpoB_Q468K")]
    RpoBQ468K,
    #[strum(serialize = "rpoB_D471Y")]
    RpoBD471Y,
    #[strum(serialize = "rpoB_A477D")]
    RpoBA477D,
    #[strum(serialize = "rpoB_I527M")]
    RpoBI527M,
    #[strum(serialize = "fusA_L461K")]
    FusAL461K,
    #[strum(serialize = "fusA_P406L")]
    FusAP406L,
    #[strum(serialize = "fusA_H457Y")]
    FusAH457Y,
    #[strum(serialize = "fusA_L461S")]
    FusAL461S,
    #[strum(serialize = "fusA_V90I")]
    FusAV90I,
}

impl KnownMutation {
    pub fn from_name(name: &str) -> Result<Self> {
        KnownMutation::from_str(name).map_err(|_| format!("Unknown mutation {}", name))
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl Serialize for KnownMutation {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Susceptible,
    Resistant,
}

/// Splits a mutation allele record name into the mutation and its background.
pub fn parse_allele_name(name: &str) -> Result<(KnownMutation, Background)> {
    let error_message = || {
        format!(
            "Mutation allele name must be in '<gene>_<change>_<sus|res>' format: '{}'",
            name
        )
    };
    let mut parts = name.splitn(4, '_');
    let (gene, change, background) = match (parts.next(), parts.next(), parts.next()) {
        (Some(gene), Some(change), Some(background)) => (gene, change, background),
        _ => return Err(error_message()),
    };

    let mutation = KnownMutation::from_name(&format!("{}_{}", gene, change))?;
    let background = match background {
        "sus" => Background::Susceptible,
        "res" => Background::Resistant,
        _ => return Err(error_message()),
    };
    Ok((mutation, background))
}

/// One allele observation of a mutation on a given background.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarOnBackground {
    pub stats: AlleleCoverageStats,
    pub label: String,
}

impl VarOnBackground {
    pub fn reset(&mut self) {
        self.stats = AlleleCoverageStats::default();
        self.label.clear();
    }

    pub fn is_observed(&self) -> bool {
        !self.label.is_empty()
    }

    fn is_better_than(&self, other: &VarOnBackground) -> bool {
        (self.stats.percent_covered, self.stats.median_depth)
            > (other.stats.percent_covered, other.stats.median_depth)
    }
}

/// Evidence for one known mutation: the best supported susceptible and
/// resistant alleles seen in the sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Var {
    pub best_sus: VarOnBackground,
    pub best_res: VarOnBackground,
}

impl Var {
    pub fn reset(&mut self) {
        self.best_sus.reset();
        self.best_res.reset();
    }

    /// Folds an allele in, keeping it if it is better covered than the best
    /// allele held for its background.
    pub fn observe(&mut self, background: Background, candidate: &VarOnBackground) -> bool {
        let best = match background {
            Background::Susceptible => &mut self.best_sus,
            Background::Resistant => &mut self.best_res,
        };
        if !candidate.stats.too_short && candidate.is_better_than(best) {
            best.clone_from(candidate);
            true
        } else {
            false
        }
    }
}
