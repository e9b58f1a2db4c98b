//! Cancer distribution of simple somatic mutations for a list of genes.

pub mod aggregate;
pub mod report;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;

use crate::{
    common::error::{RemoteQueryError, ReportError},
    gdc::{
        denominators::{resolve_denominator, DenominatorCache},
        occurrences::{fetch_occurrences, DEFAULT_PAGE_SIZE},
        Api, HttpApi, DEFAULT_BASE_URL,
    },
};

use self::aggregate::Denominators;

/// Command line arguments for `distrib` command.
#[derive(Parser, Debug)]
#[command(about = "Compute per-project SSM distribution for genes", long_about = None)]
pub struct Args {
    /// Path to the ID mapping TSV file with a `To` column of ENSEMBL gene IDs.
    #[clap(long, default_value = "idmapping_2025_12_02.tsv")]
    pub path_mapping: PathBuf,
    /// Directory to write the per-gene TSV files to.
    #[clap(long, default_value = "cancer_distribution_tsv")]
    pub path_output: PathBuf,
    /// Base URL of the GDC API.
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    pub api_base_url: String,
    /// Number of occurrences to request per page.
    #[clap(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
    /// Pause after each project denominator query, in milliseconds.
    #[clap(long, default_value_t = 100)]
    pub project_delay_ms: u64,
    /// Pause between two genes, in milliseconds.
    #[clap(long, default_value_t = 200)]
    pub gene_delay_ms: u64,
    /// Timeout of each HTTP request, in seconds.
    #[clap(long, default_value_t = 60)]
    pub timeout_secs: u64,
}

/// Fixed pauses between requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after each project denominator query.
    pub project_delay: Duration,
    /// Pause between two genes.
    pub gene_delay: Duration,
}

impl From<&Args> for Pacing {
    fn from(args: &Args) -> Self {
        Self {
            project_delay: Duration::from_millis(args.project_delay_ms),
            gene_delay: Duration::from_millis(args.gene_delay_ms),
        }
    }
}

/// Result of processing one gene.
#[derive(Debug)]
pub enum GeneOutcome {
    /// The report was written to the given path.
    Written(PathBuf),
    /// No mutation occurrences are known; nothing was written.
    Empty,
    /// Fetching the occurrences failed; nothing was written.
    Failed(RemoteQueryError),
}

/// Summary of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Paths of the written reports.
    pub written: Vec<PathBuf>,
    /// Genes without occurrences.
    pub empty: Vec<String>,
    /// Genes whose occurrences could not be fetched.
    pub failed: Vec<String>,
}

/// Processes genes one after another, sharing the denominator cache between them.
pub struct Driver<'a, A: Api + ?Sized> {
    /// The API to query.
    api: &'a A,
    /// Denominators resolved so far.
    cache: DenominatorCache,
    /// Output directory.
    out_dir: PathBuf,
    /// Occurrence page size.
    page_size: usize,
    /// Pauses between requests.
    pacing: Pacing,
}

impl<'a, A: Api + ?Sized> Driver<'a, A> {
    /// Construct a new driver with an empty cache.
    pub fn new<P>(api: &'a A, out_dir: P, page_size: usize, pacing: Pacing) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            api,
            cache: DenominatorCache::new(),
            out_dir: out_dir.as_ref().to_path_buf(),
            page_size,
            pacing,
        }
    }

    /// The denominators resolved so far.
    pub fn cache(&self) -> &DenominatorCache {
        &self.cache
    }

    /// Resolve the denominators of all `project_ids`.
    ///
    /// A failed lookup is logged and counted as `0`.
    fn resolve_denominators<'p, I>(&mut self, project_ids: I) -> Denominators
    where
        I: IntoIterator<Item = &'p str>,
    {
        let mut result = Denominators::default();
        for project_id in project_ids {
            let cached = self.cache.contains(project_id);
            let total = match resolve_denominator(self.api, &mut self.cache, project_id) {
                Ok(total) => total,
                Err(e) => {
                    tracing::warn!(
                        "    problem resolving SSM case count of project {}: {}",
                        project_id,
                        e
                    );
                    0
                }
            };
            result.insert(project_id.to_string(), total);
            if !cached {
                std::thread::sleep(self.pacing.project_delay);
            }
        }
        result
    }

    /// Process a single gene: fetch, resolve, aggregate, and write.
    ///
    /// # Errors
    ///
    /// Only if the report cannot be written; remote query failures are reflected in the
    /// returned outcome.
    pub fn process_gene(&mut self, gene_id: &str) -> Result<GeneOutcome, ReportError> {
        let occurrences = match fetch_occurrences(self.api, gene_id, self.page_size) {
            Ok(occurrences) => occurrences,
            Err(e) => {
                tracing::warn!("  problem fetching mutated cases: {}", e);
                return Ok(GeneOutcome::Failed(e));
            }
        };
        if occurrences.is_empty() {
            tracing::info!("  no cases with mutations in gene, skipping");
            return Ok(GeneOutcome::Empty);
        }
        tracing::info!(
            "  found {} mutated cases in {} projects",
            occurrences.total_cases(),
            occurrences.len()
        );

        let denominators =
            self.resolve_denominators(occurrences.iter().map(|p| p.project_id.as_str()));
        let rows = aggregate::aggregate(&occurrences, &denominators);
        let path = report::write_report(&self.out_dir, gene_id, &rows)?;
        tracing::info!("  wrote {}", path.display());

        Ok(GeneOutcome::Written(path))
    }

    /// Process all `gene_ids` in order.
    ///
    /// # Errors
    ///
    /// If a report cannot be written.
    pub fn run<S>(&mut self, gene_ids: &[S]) -> Result<RunSummary, ReportError>
    where
        S: AsRef<str>,
    {
        let mut summary = RunSummary::default();
        for (idx, gene_id) in gene_ids.iter().enumerate() {
            let gene_id: &str = gene_id.as_ref();
            if idx > 0 {
                std::thread::sleep(self.pacing.gene_delay);
            }
            tracing::info!("[{}/{}] processing gene {}", idx + 1, gene_ids.len(), gene_id);
            match self.process_gene(gene_id)? {
                GeneOutcome::Written(path) => summary.written.push(path),
                GeneOutcome::Empty => summary.empty.push(gene_id.to_string()),
                GeneOutcome::Failed(_) => summary.failed.push(gene_id.to_string()),
            }
        }
        Ok(summary)
    }
}

/// Main entry point for the `distrib` command.
///
/// # Arguments
///
/// * `common_args` - Commonly used command line arguments.
/// * `args` - Command line arguments specific to `distrib` command.
///
/// # Errors
///
/// If the gene list cannot be loaded or a report cannot be written.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("  running command `distrib`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    tracing::info!("Loading gene IDs from {} ...", args.path_mapping.display());
    let gene_ids = crate::genes::load_gene_ids(&args.path_mapping)?;
    tracing::info!("... found {} unique ENSEMBL gene IDs", gene_ids.len());

    let api = HttpApi::new(&args.api_base_url, Duration::from_secs(args.timeout_secs))?;
    let mut driver = Driver::new(&api, &args.path_output, args.page_size, args.into());
    let summary = driver.run(gene_ids.as_slice())?;

    tracing::info!(
        "Wrote {} reports, {} genes without mutations, {} genes failed, {} projects resolved",
        summary.written.len(),
        summary.empty.len(),
        summary.failed.len(),
        driver.cache().len()
    );
    if !summary.failed.is_empty() {
        tracing::warn!("Failed genes: {}", summary.failed.join(", "));
    }

    Ok(())
}
