use super::antibiotic::Antibiotic;
use super::gene::GenePresenceGene;
use super::virulence::VirulenceGene;
use crate::utils::Result;
use itertools::Itertools;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

const ANTIBIOTIC_DATA_DIR: &str = "data/staph/antibiotics";
const VIRULENCE_DATA_DIR: &str = "data/staph/virulence";

/// Installed reference evidence: one FASTA per resistance gene, one mutation
/// FASTA per antibiotic that has known mutations, and one FASTA per toxin gene.
#[derive(Debug, Clone)]
pub struct InstallDir {
    root: PathBuf,
}

impl InstallDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        InstallDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn gene_fasta(&self, gene: GenePresenceGene) -> PathBuf {
        self.root
            .join(ANTIBIOTIC_DATA_DIR)
            .join(format!("{}.fa", gene.name()))
    }

    pub fn mutation_fasta(&self, antibiotic: Antibiotic) -> PathBuf {
        self.root
            .join(ANTIBIOTIC_DATA_DIR)
            .join(format!("{}.fa", antibiotic.file_stem()))
    }

    pub fn virulence_fasta(&self, gene: VirulenceGene) -> PathBuf {
        self.root
            .join(VIRULENCE_DATA_DIR)
            .join(format!("{}.fa", gene.name()))
    }

    pub fn expected_files(&self) -> Vec<PathBuf> {
        let mutation_files = Antibiotic::iter()
            .filter(|ab| !ab.mutations().is_empty())
            .map(|ab| self.mutation_fasta(ab));
        let gene_files = Antibiotic::iter()
            .flat_map(|ab| ab.genes().iter().copied())
            .unique()
            .map(|gene| self.gene_fasta(gene));
        let virulence_files = VirulenceGene::iter().map(|gene| self.virulence_fasta(gene));
        mutation_files
            .chain(gene_files)
            .chain(virulence_files)
            .collect()
    }

    /// Fails on the first expected file that is missing.
    pub fn check(&self) -> Result<()> {
        for path in self.expected_files() {
            if !path.is_file() {
                return Err(format!(
                    "Cannot find {} - it should be there as part of the install",
                    path.display()
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::EnumCount;

    #[test]
    fn paths_follow_catalogue_names() {
        let install = InstallDir::new("/opt/resistotype");
        assert_eq!(
            install.gene_fasta(GenePresenceGene::VgaALc),
            PathBuf::from("/opt/resistotype/data/staph/antibiotics/vga(A)LC.fa")
        );
        assert_eq!(
            install.mutation_fasta(Antibiotic::FusidicAcid),
            PathBuf::from("/opt/resistotype/data/staph/antibiotics/fusidic_acid.fa")
        );
        assert_eq!(
            install.virulence_fasta(VirulenceGene::Luk),
            PathBuf::from("/opt/resistotype/data/staph/virulence/luk.fa")
        );
    }

    #[test]
    fn every_gene_and_mutation_file_is_expected() {
        let install = InstallDir::new("/opt/resistotype");
        let expected = install.expected_files();
        let mutation_files = Antibiotic::iter()
            .filter(|ab| !ab.mutations().is_empty())
            .count();
        assert_eq!(
            expected.len(),
            GenePresenceGene::COUNT + mutation_files + VirulenceGene::COUNT
        );
        assert!(expected.contains(&install.virulence_fasta(VirulenceGene::Luk)));
        assert!(expected.contains(&install.gene_fasta(GenePresenceGene::MecA)));
        assert!(expected.contains(&install.mutation_fasta(Antibiotic::Rifampicin)));
        assert!(!expected.contains(&install.mutation_fasta(Antibiotic::Penicillin)));
    }

    #[test]
    fn check_names_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let install = InstallDir::new(dir.path());
        let err = install.check().unwrap_err();
        assert!(err.contains(ANTIBIOTIC_DATA_DIR));
        assert!(err.starts_with("Cannot find"));
    }

    #[test]
    fn check_accepts_only_complete_install() {
        let dir = tempfile::tempdir().unwrap();
        let install = InstallDir::new(dir.path());
        std::fs::create_dir_all(dir.path().join(ANTIBIOTIC_DATA_DIR)).unwrap();
        for path in install.expected_files() {
            if path.starts_with(dir.path().join(ANTIBIOTIC_DATA_DIR)) {
                std::fs::write(path, ">x\nACGT\n").unwrap();
            }
        }
        let err = install.check().unwrap_err();
        assert!(err.contains("virulence/luk.fa"));

        std::fs::create_dir_all(dir.path().join(VIRULENCE_DATA_DIR)).unwrap();
        for path in install.expected_files() {
            std::fs::write(path, ">x\nACGT\n").unwrap();
        }
        assert!(install.check().is_ok());
    }
}
