use super::gene::{GeneInfo, GenePresenceGene};
use super::graph::CoverageGraph;
use super::install::InstallDir;
use super::mutation::{KnownMutation, Var, VarOnBackground};
use super::stream::{EvidenceStream, ReadingUtils};
use crate::utils::Result;
use arrayvec::ArrayVec;
use std::path::PathBuf;
use strum::EnumCount;
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

/// Largest number of resistance genes any one antibiotic is decided by.
pub const MAX_GENES_PER_ANTIBIOTIC: usize = 5;

/// Antibiotics in evaluation order. Erythromycin precedes clindamycin because
/// the inducible clindamycin call depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCountMacro, IntoStaticStr)]
pub enum Antibiotic {
    Gentamicin,
    Penicillin,
    Trimethoprim,
    Erythromycin,
    Methicillin,
    Ciprofloxacin,
    Rifampicin,
    Tetracycline,
    Mupirocin,
    FusidicAcid,
    Clindamycin,
    Vancomycin,
}

impl Antibiotic {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn file_stem(self) -> &'static str {
        match self {
            Antibiotic::Gentamicin => "gentamicin",
            Antibiotic::Penicillin => "penicillin",
            Antibiotic::Trimethoprim => "trimethoprim",
            Antibiotic::Erythromycin => "erythromycin",
            Antibiotic::Methicillin => "methicillin",
            Antibiotic::Ciprofloxacin => "ciprofloxacin",
            Antibiotic::Rifampicin => "rifampicin",
            Antibiotic::Tetracycline => "tetracycline",
            Antibiotic::Mupirocin => "mupirocin",
            Antibiotic::FusidicAcid => "fusidic_acid",
            Antibiotic::Clindamycin => "clindamycin",
            Antibiotic::Vancomycin => "vancomycin",
        }
    }

    pub fn genes(self) -> &'static [GenePresenceGene] {
        use GenePresenceGene::*;
        match self {
            Antibiotic::Gentamicin => &[AacAAphD],
            Antibiotic::Penicillin => &[BlaZ],
            Antibiotic::Trimethoprim => &[DfrA, DfrG],
            Antibiotic::Erythromycin => &[ErmA, ErmB, ErmC, ErmT, MsrA],
            Antibiotic::Methicillin => &[MecA],
            Antibiotic::Ciprofloxacin => &[],
            Antibiotic::Rifampicin => &[],
            Antibiotic::Tetracycline => &[TetK, TetL, TetM],
            Antibiotic::Mupirocin => &[MupA, MupB],
            Antibiotic::FusidicAcid => &[FusB, FusC],
            Antibiotic::Clindamycin => &[VgaALc],
            Antibiotic::Vancomycin => &[VanA],
        }
    }

    pub fn mutations(self) -> &'static [KnownMutation] {
        use KnownMutation::*;
        match self {
            Antibiotic::Trimethoprim => &[
                DfrBF99Y, DfrBF99S, DfrBH31N, DfrBL41F, DfrBH150R, DfrBL21V, DfrBN60I,
            ],
            Antibiotic::Ciprofloxacin => &[
                GyrAS84L, GyrAS85P, GyrAE88K, GyrAG106D, GrlAS80F, GrlAS80Y, GrlAE84K,
            ],
            Antibiotic::Rifampicin => &[
                RpoBH481N, RpoBH481Y, RpoBS486L, RpoBQ468K, RpoBD471Y, RpoBA477D, RpoBI527M,
            ],
            Antibiotic::FusidicAcid => &[FusAL461K, FusAP406L, FusAH457Y, FusAL461S, FusAV90I],
            _ => &[],
        }
    }
}

/// Evidence container for one antibiotic, reused across samples.
///
/// The catalogue arrays are indexed by gene or mutation identity and only the
/// entries named in `gene_ids` and `mutation_ids` are ever populated.
#[derive(Debug)]
pub struct AntibioticInfo {
    pub antibiotic: Antibiotic,
    pub gene_ids: ArrayVec<GenePresenceGene, MAX_GENES_PER_ANTIBIOTIC>,
    pub mutation_ids: &'static [KnownMutation],
    pub vars: [Var; KnownMutation::COUNT],
    pub genes: [GeneInfo; GenePresenceGene::COUNT],
    pub mutation_fasta: Option<PathBuf>,
    gene_fastas: ArrayVec<PathBuf, MAX_GENES_PER_ANTIBIOTIC>,
}

impl AntibioticInfo {
    pub fn new(antibiotic: Antibiotic, install: &InstallDir) -> Self {
        let gene_ids: ArrayVec<_, MAX_GENES_PER_ANTIBIOTIC> =
            antibiotic.genes().iter().copied().collect();
        let gene_fastas = gene_ids.iter().map(|&g| install.gene_fasta(g)).collect();
        let mutation_ids = antibiotic.mutations();
        let mutation_fasta = if mutation_ids.is_empty() {
            None
        } else {
            Some(install.mutation_fasta(antibiotic))
        };

        AntibioticInfo {
            antibiotic,
            gene_ids,
            mutation_ids,
            vars: std::array::from_fn(|_| Var::default()),
            genes: std::array::from_fn(|_| GeneInfo::default()),
            mutation_fasta,
            gene_fastas,
        }
    }

    pub fn num_genes(&self) -> usize {
        self.gene_ids.len()
    }

    pub fn num_mutations(&self) -> usize {
        self.mutation_ids.len()
    }

    pub fn gene(&self, gene: GenePresenceGene) -> &GeneInfo {
        &self.genes[gene.index()]
    }

    pub fn var(&self, mutation: KnownMutation) -> &Var {
        &self.vars[mutation.index()]
    }

    /// Clears all evidence while keeping the antibiotic identity, catalogue
    /// lists, and install paths.
    pub fn reset(&mut self) {
        self.vars.iter_mut().for_each(Var::reset);
        self.genes.iter_mut().for_each(GeneInfo::reset);
    }

    /// Drains the antibiotic's mutation FASTA into `vars`. Returns the number
    /// of alleles read.
    pub fn load_mutation_evidence<G: CoverageGraph + ?Sized>(
        &mut self,
        graph: &G,
        utils: &mut ReadingUtils,
        tmp_vob: &mut VarOnBackground,
        ignore_first: usize,
        ignore_last: usize,
    ) -> Result<usize> {
        let path = match &self.mutation_fasta {
            Some(path) => path,
            None => return Ok(0),
        };
        let mut stream = EvidenceStream::open(path)?;
        let mut num_alleles = 0;
        while stream
            .next_var_on_background(
                graph,
                &mut self.vars,
                tmp_vob,
                utils,
                ignore_first,
                ignore_last,
            )?
            .is_some()
        {
            num_alleles += 1;
        }
        Ok(num_alleles)
    }

    /// Drains each gene FASTA, keeping the best covered exemplar per gene.
    /// Returns the number of exemplars read.
    pub fn load_gene_evidence<G: CoverageGraph + ?Sized>(
        &mut self,
        graph: &G,
        utils: &mut ReadingUtils,
        tmp_gi: &mut GeneInfo,
    ) -> Result<usize> {
        let mut num_exemplars = 0;
        for path in &self.gene_fastas {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::coverage::AlleleCoverageStats;
    use crate::predictor::mutation::Background;
    use strum::IntoEnumIterator;

    #[test]
    fn evaluation_order() {
        let order: Vec<_> = Antibiotic::iter().collect();
        assert_eq!(order.len(), Antibiotic::COUNT);
        assert_eq!(order.first(), Some(&Antibiotic::Gentamicin));
        assert_eq!(order.last(), Some(&Antibiotic::Vancomycin));
        let ery = order.iter().position(|&a| a == Antibiotic::Erythromycin);
        let clinda = order.iter().position(|&a| a == Antibiotic::Clindamycin);
        assert!(ery < clinda);
    }

    #[test]
    fn every_catalogue_entry_belongs_to_one_antibiotic() {
        let genes: Vec<_> = Antibiotic::iter().flat_map(|a| a.genes().to_vec()).collect();
        let mutations: Vec<_> = Antibiotic::iter()
            .flat_map(|a| a.mutations().to_vec())
            .collect();
        assert_eq!(genes.len(), GenePresenceGene::COUNT);
        assert_eq!(mutations.len(), KnownMutation::COUNT);
        for gene in GenePresenceGene::iter() {
            assert!(genes.contains(&gene));
        }
        for mutation in KnownMutation::iter() {
            assert!(mutations.contains(&mutation));
        }
        assert!(Antibiotic::iter().all(|a| a.genes().len() <= MAX_GENES_PER_ANTIBIOTIC));
    }

    #[test]
    fn mutation_fasta_only_for_mutation_antibiotics() {
        let install = InstallDir::new("/install");
        let penicillin = AntibioticInfo::new(Antibiotic::Penicillin, &install);
        assert!(penicillin.mutation_fasta.is_none());
        assert_eq!(penicillin.num_mutations(), 0);
        assert_eq!(penicillin.num_genes(), 1);

        let rifampicin = AntibioticInfo::new(Antibiotic::Rifampicin, &install);
        assert_eq!(
            rifampicin.mutation_fasta,
            Some(install.mutation_fasta(Antibiotic::Rifampicin))
        );
        assert_eq!(rifampicin.num_mutations(), 7);
        assert_eq!(rifampicin.num_genes(), 0);
    }

    #[test]
    fn reset_keeps_identity_and_is_idempotent() {
        let install = InstallDir::new("/install");
        let mut info = AntibioticInfo::new(Antibiotic::FusidicAcid, &install);
        let observed = VarOnBackground {
            stats: AlleleCoverageStats {
                estimated_read_count: 12,
                median_depth: 12,
                min_depth: 3,
                percent_covered: 100,
                too_short: false,
            },
            label: "fusA_L461K_res".to_string(),
        };
        info.vars[KnownMutation::FusAL461K.index()].observe(Background::Resistant, &observed);
        info.genes[GenePresenceGene::FusB.index()].percent_covered = 95;

        info.reset();
        assert_eq!(info.antibiotic, Antibiotic::FusidicAcid);
        assert_eq!(info.num_genes(), 2);
        assert_eq!(info.num_mutations(), 5);
        assert!(info.mutation_fasta.is_some());
        assert!(info.vars.iter().all(|v| *v == Var::default()));
        assert!(info.genes.iter().all(|g| *g == GeneInfo::default()));

        info.reset();
        assert!(info.vars.iter().all(|v| *v == Var::default()));
        assert!(info.genes.iter().all(|g| *g == GeneInfo::default()));
    }
}
