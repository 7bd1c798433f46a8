use crate::cli::ValidateArgs;
use crate::predictor::antibiotic::Antibiotic;
use crate::predictor::gene::CatalogueGene;
use crate::predictor::mutation::{parse_allele_name, Background, KnownMutation};
use crate::predictor::virulence::VirulenceGene;
use crate::predictor::InstallDir;
use crate::utils::{open_text_reader, Result};
use bio::io::fasta;
use std::collections::HashSet;
use std::path::Path;
use strum::IntoEnumIterator;

pub fn validate(args: ValidateArgs) -> Result<()> {
    let install = InstallDir::new(&args.install_dir);
    let mut error_count = 0;
    let mut success_count = 0;
    let mut exemplar_lengths = Vec::new();
    let mut allele_lengths = Vec::new();

    for antibiotic in Antibiotic::iter() {
        if !antibiotic.mutations().is_empty() {
            let path = install.mutation_fasta(antibiotic);
            match check_mutation_fasta(&path, antibiotic, &mut allele_lengths) {
                Ok(()) => success_count += 1,
                Err(e) => {
                    log::error!("{}", e);
                    error_count += 1;
                }
            }
        }
        for &gene in antibiotic.genes() {
            let path = install.gene_fasta(gene);
            match check_gene_fasta(&path, gene, &mut exemplar_lengths) {
                Ok(()) => success_count += 1,
                Err(e) => {
                    log::error!("{}", e);
                    error_count += 1;
                }
            }
        }
    }

    for gene in VirulenceGene::iter() {
        let path = install.virulence_fasta(gene);
        match check_gene_fasta(&path, gene, &mut exemplar_lengths) {
            Ok(()) => success_count += 1,
            Err(e) => {
                log::error!("{}", e);
                error_count += 1;
            }
        }
    }

    let exemplar_stats = calculate_stats(&exemplar_lengths);
    let allele_stats = calculate_stats(&allele_lengths);

    log::info!(
        "Gene exemplar lengths - Count: {}, Range: [{},{}], Median: {:.2}, Mean: {:.2}, StdDev: {:.2}",
        exemplar_lengths.len(),
        exemplar_stats.min,
        exemplar_stats.max,
        exemplar_stats.median,
        exemplar_stats.mean,
        exemplar_stats.std_dev
    );
    log::info!(
        "Mutation allele lengths - Count: {}, Range: [{},{}], Median: {:.2}, Mean: {:.2}, StdDev: {:.2}",
        allele_lengths.len(),
        allele_stats.min,
        allele_stats.max,
        allele_stats.median,
        allele_stats.mean,
        allele_stats.std_dev
    );

    match error_count {
        0 => {
            log::info!("Validation successful. Files pass={}", success_count);
            Ok(())
        }
        _ => Err(format!(
            "Validation failed. Files pass={}, fail={}",
            success_count, error_count
        )),
    }
}

fn read_records(path: &Path) -> Result<Vec<fasta::Record>> {
    let reader = open_text_reader(path)?;
    let records = fasta::Reader::from_bufread(reader)
        .records()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
    if records.is_empty() {
        return Err(format!("{} has no records", path.display()));
    }
    Ok(records)
}

fn check_gene_fasta<C: CatalogueGene>(
    path: &Path,
    gene: C,
    lengths: &mut Vec<usize>,
) -> Result<()> {
    for record in read_records(path)? {
        let record_gene = C::from_name(record.id())
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        if record_gene != gene {
            log::warn!(
                "{}: exemplar {} is filed under {}",
                path.display(),
                record.id(),
                gene.name()
            );
        }
        lengths.push(record.seq().len());
    }
    Ok(())
}

fn check_mutation_fasta(
    path: &Path,
    antibiotic: Antibiotic,
    lengths: &mut Vec<usize>,
) -> Result<()> {
    let mut seen: HashSet<(KnownMutation, bool)> = HashSet::new();
    for record in read_records(path)? {
        let (mutation, background) =
            parse_allele_name(record.id()).map_err(|e| format!("{}: {}", path.display(), e))?;
        if !antibiotic.mutations().contains(&mutation) {
            return Err(format!(
                "{}: {} is not a {} mutation",
                path.display(),
                mutation.name(),
                antibiotic.name()
            ));
        }
        seen.insert((mutation, background == Background::Resistant));
        lengths.push(record.seq().len());
    }

    for &mutation in antibiotic.mutations() {
        for (resistant, label) in [(false, "susceptible"), (true, "resistant")] {
            if !seen.contains(&(mutation, resistant)) {
                log::warn!(
                    "{}: no {} allele for {}",
                    path.display(),
                    label,
                    mutation.name()
                );
            }
        }
    }
    Ok(())
}

fn calculate_stats(data: &[usize]) -> Stats {
    let mut sorted = data.to_vec();
    sorted.sort_unstable();
    let len = sorted.len();
    if len == 0 {
        return Stats::default();
    }
    let median = if len % 2 == 0 {
        (sorted[len / 2 - 1] + sorted[len / 2]) as f64 / 2.0
    } else {
        sorted[len / 2] as f64
    };
    let sum: usize = sorted.iter().sum();
    let mean = sum as f64 / len as f64;
    let std_dev = (sorted
        .iter()
        .map(|&x| (x as f64 - mean).powi(2))
        .sum::<f64>()
        / len as f64)
        .sqrt();
    Stats {
        min: *sorted.first().unwrap_or(&0),
        max: *sorted.last().unwrap_or(&0),
        mean,
        median,
        std_dev,
    }
}

#[derive(Default)]
struct Stats {
    min: usize,
    max: usize,
    mean: f64,
    median: f64,
    std_dev: f64,
}
