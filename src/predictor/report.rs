use super::classify::{CalledGene, CalledVariant};
use super::sample::SampleReport;
use super::virulence::{VirulenceCall, VirulenceResult};
use crate::utils::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Tsv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    sample: &'a str,
    expected_depth: u32,
    susceptibility: BTreeMap<&'static str, String>,
    called_genes: BTreeMap<&'static str, Vec<&'a CalledGene>>,
    called_variants: BTreeMap<&'static str, Vec<&'a CalledVariant>>,
    virulence_toxins: BTreeMap<&'static str, &'static str>,
    called_virulence_genes: BTreeMap<&'static str, &'a VirulenceResult>,
}

impl<'a> From<&'a SampleReport> for JsonReport<'a> {
    fn from(report: &'a SampleReport) -> Self {
        let mut json = JsonReport {
            sample: &report.sample,
            expected_depth: report.expected_depth,
            susceptibility: BTreeMap::new(),
            called_genes: BTreeMap::new(),
            called_variants: BTreeMap::new(),
            virulence_toxins: BTreeMap::new(),
            called_virulence_genes: BTreeMap::new(),
        };
        for result in &report.results {
            let name = result.antibiotic.name();
            json.susceptibility
                .insert(name, result.phenotype.render("Inconclusive"));
            if !result.called_genes.is_empty() {
                json.called_genes
                    .insert(name, result.called_genes.iter().collect());
            }
            if !result.called_variants.is_empty() {
                json.called_variants
                    .insert(name, result.called_variants.iter().collect());
            }
        }
        for result in &report.virulence {
            let toxin = result.gene.toxin();
            json.virulence_toxins.insert(toxin, result.call.as_str());
            if result.call == VirulenceCall::Positive {
                json.called_virulence_genes.insert(toxin, result);
            }
        }
        json
    }
}

/// Writes sample reports in the chosen format. TSV output has one line per
/// sample and antibiotic or toxin, JSON output one object per sample.
pub struct ReportWriter {
    writer: Box<dyn Write + Send>,
    format: OutputFormat,
}

impl ReportWriter {
    pub fn new(mut writer: Box<dyn Write + Send>, format: OutputFormat) -> Result<Self> {
        if format == OutputFormat::Tsv {
            writeln!(writer, "sample\tcategory\tname\tcall")
                .map_err(|e| format!("Failed to write report header: {}", e))?;
        }
        Ok(ReportWriter { writer, format })
    }

    pub fn write(&mut self, report: &SampleReport) -> Result<()> {
        match self.format {
            OutputFormat::Tsv => {
                for result in &report.results {
                    writeln!(
                        self.writer,
                        "{}\tantibiotic\t{}\t{}",
                        report.sample,
                        result.antibiotic.name(),
                        result.phenotype
                    )
                    .map_err(|e| format!("Failed to write report: {}", e))?;
                }
                for result in &report.virulence {
                    writeln!(
                        self.writer,
                        "{}\tvirulence\t{}\t{}",
                        report.sample,
                        result.gene.toxin(),
                        result.call
                    )
                    .map_err(|e| format!("Failed to write report: {}", e))?;
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.writer, &JsonReport::from(report))
                    .map_err(|e| format!("Failed to write report: {}", e))?;
                writeln!(self.writer).map_err(|e| format!("Failed to write report: {}", e))?;
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| format!("Failed to flush report: {}", e))
    }
}
