//! Reference evidence streams.
//!
//! An installed FASTA is read one record at a time. Each record is threaded
//! through the coverage graph, summarised, and handed back to the caller, which
//! keeps calling until the stream reports exhaustion.

use super::coverage::{allele_stats, Covg, DepthScratch};
use super::gene::{CatalogueGene, GeneInfo};
use super::graph::CoverageGraph;
use super::mutation::{parse_allele_name, KnownMutation, Var, VarOnBackground};
use crate::utils::{open_text_reader, Result};
use bio::io::fasta;
use std::io::{BufReader, Read as ioRead};
use std::path::{Path, PathBuf};

/// Longest gene path, in nodes, the scratch buffers are sized for.
pub const MAX_LEN_GENE: usize = 10_000;
/// Longest mutation allele path, in nodes.
pub const MAX_LEN_MUT_ALLELE: usize = 1_000;

/// Scratch buffers reused across every record of every stream.
#[derive(Debug)]
pub struct ReadingUtils {
    pub depths: Vec<Covg>,
    pub scratch: DepthScratch,
}

impl ReadingUtils {
    pub fn new(max_len: usize) -> Self {
        ReadingUtils {
            depths: Vec::with_capacity(max_len),
            scratch: DepthScratch::with_capacity(max_len),
        }
    }

    pub fn reset(&mut self) {
        self.depths.clear();
        self.scratch.reset();
    }
}

pub struct EvidenceStream {
    path: PathBuf,
    records: fasta::Records<BufReader<Box<dyn ioRead + Send>>>,
}

impl EvidenceStream {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = open_text_reader(path)
            .map_err(|e| format!("{} - it should be there as part of the install", e))?;
        Ok(EvidenceStream {
            path: path.to_path_buf(),
            records: fasta::Reader::from_bufread(reader).records(),
        })
    }

    /// Reads the next record whose path has at least one node, leaving the
    /// node depths in `utils.depths`.
    fn next_path<G: CoverageGraph + ?Sized>(
        &mut self,
        graph: &G,
        utils: &mut ReadingUtils,
    ) -> Result<Option<fasta::Record>> {
        for record in self.records.by_ref() {
            let record =
                record.map_err(|e| format!("Error reading {}: {}", self.path.display(), e))?;
            graph.node_depths(record.seq(), &mut utils.depths);
            if utils.depths.is_empty() {
                log::warn!(
                    "{}: record {} is shorter than one k-mer, skipping",
                    self.path.display(),
                    record.id()
                );
                continue;
            }
            return Ok(Some(record));
        }
        Ok(None)
    }

    /// Fills `gene_info` from the next gene exemplar and returns the number of
    /// nodes on its path. Zero means the stream is exhausted.
    pub fn next_gene_info<G: CoverageGraph + ?Sized, C: CatalogueGene>(
        &mut self,
        graph: &G,
        gene_info: &mut GeneInfo<C>,
        utils: &mut ReadingUtils,
    ) -> Result<usize> {
        let record = match self.next_path(graph, utils)? {
            Some(record) => record,
            None => return Ok(0),
        };

        let stats = allele_stats(&utils.depths, &mut utils.scratch, 0, 0);
        gene_info.gene = Some(C::from_name(record.id())?);
        gene_info.median_depth = stats.median_depth;
        gene_info.min_depth = stats.min_depth;
        gene_info.percent_covered = stats.percent_covered;
        gene_info.source_label.clear();
        gene_info.source_label.push_str(record.id());
        if let Some(desc) = record.desc() {
            gene_info.source_label.push(' ');
            gene_info.source_label.push_str(desc);
        }

        log::trace!(
            "{}: {}% covered, median {}, min {}",
            gene_info.source_label,
            stats.percent_covered,
            stats.median_depth,
            stats.min_depth
        );
        Ok(utils.depths.len())
    }

    /// Summarises the next mutation allele and folds it into `vars`. Returns
    /// the mutation it belongs to, or `None` once the stream is exhausted.
    pub fn next_var_on_background<G: CoverageGraph + ?Sized>(
        &mut self,
        graph: &G,
        vars: &mut [Var],
        tmp_vob: &mut VarOnBackground,
        utils: &mut ReadingUtils,
        ignore_first: usize,
        ignore_last: usize,
    ) -> Result<Option<KnownMutation>> {
        let record = match self.next_path(graph, utils)? {
            Some(record) => record,
            None => return Ok(None),
        };

        let (mutation, background) = parse_allele_name(record.id())?;
        tmp_vob.reset();
        tmp_vob.stats = allele_stats(&utils.depths, &mut utils.scratch, ignore_first, ignore_last);
        tmp_vob.label.push_str(record.id());
        if tmp_vob.stats.too_short {
            log::debug!(
                "{}: allele {} too short after trimming",
                self.path.display(),
                record.id()
            );
        }

        vars[mutation.index()].observe(background, tmp_vob);
        Ok(Some(mutation))
    }
}
