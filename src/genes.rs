//! Loading of the gene identifiers to process from an ID mapping table.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use clap::Parser;

use crate::common::error::ConfigurationError;

/// Command line arguments for `genes` command.
#[derive(Parser, Debug)]
#[command(about = "List the gene IDs that would be processed", long_about = None)]
pub struct Args {
    /// Path to the ID mapping TSV file with a `To` column of ENSEMBL gene IDs.
    #[clap(long, default_value = "idmapping_2025_12_02.tsv")]
    pub path_mapping: PathBuf,
}

/// Name of the column holding the target identifiers (compared trimmed and lower-case).
pub const TARGET_COLUMN: &str = "to";
/// Prefix that all ENSEMBL gene identifiers carry.
pub const GENE_PREFIX: &str = "ENSG";

/// Normalize a raw cell value into a gene identifier.
///
/// Strips surrounding whitespace and any version suffix (`ENSG00000100342.3` becomes
/// `ENSG00000100342`).  Returns `None` for empty cells and for values that do not look
/// like ENSEMBL gene identifiers.
pub fn normalize_gene_id(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let gene_id = raw.split('.').next().unwrap_or(raw);
    gene_id.starts_with(GENE_PREFIX).then_some(gene_id)
}

/// Load the unique gene identifiers from a UniProt-style ID mapping TSV file.
///
/// # Arguments
///
/// * `path` - Path to the tab-separated mapping file with a header row that contains
///   a `To` column.
///
/// # Returns
///
/// The distinct, version-less ENSEMBL gene identifiers, sorted ascending.
///
/// # Errors
///
/// Returns a `ConfigurationError` if the file cannot be read or lacks the `To` column.
pub fn load_gene_ids<P>(path: P) -> Result<Vec<String>, ConfigurationError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let read_err = |source: csv::Error| ConfigurationError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_path(path)
        .map_err(read_err)?;

    let headers = csv_reader.headers().map_err(read_err)?;
    if headers.is_empty() {
        return Err(ConfigurationError::MissingHeader {
            path: path.to_path_buf(),
        });
    }
    let to_idx = headers
        .iter()
        .position(|header| header.trim().to_lowercase() == TARGET_COLUMN)
        .ok_or_else(|| ConfigurationError::MissingColumn {
            path: path.to_path_buf(),
            column: TARGET_COLUMN.to_string(),
        })?;

    let mut gene_ids = BTreeSet::new();
    let mut skipped = 0usize;
    for record in csv_reader.records() {
        let record = record.map_err(read_err)?;
        match record.get(to_idx).and_then(normalize_gene_id) {
            Some(gene_id) => {
                gene_ids.insert(gene_id.to_string());
            }
            None => skipped += 1,
        }
    }
    tracing::debug!(
        "loaded {} gene IDs from {:?}, skipped {} rows",
        gene_ids.len(),
        path,
        skipped
    );

    Ok(gene_ids.into_iter().collect())
}

/// Main entry point for the `genes` command.
///
/// Prints one gene identifier per line to stdout.
///
/// # Errors
///
/// If the mapping file cannot be loaded.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("  running command `genes`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let gene_ids = load_gene_ids(&args.path_mapping)?;
    tracing::info!("found {} unique ENSEMBL gene IDs", gene_ids.len());
    for gene_id in &gene_ids {
        println!("{}", gene_id);
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use std::io::Write as _;

    use crate::common::error::ConfigurationError;

    #[rstest::rstest]
    #[case("ENSG00000100342.3", Some("ENSG00000100342"))]
    #[case("ENSG00000100342", Some("ENSG00000100342"))]
    #[case("  ENSG00000100342.12  ", Some("ENSG00000100342"))]
    #[case("invalid123", None)]
    #[case("ENST00000216024.7", None)]
    #[case("", None)]
    #[case("   ", None)]
    fn normalize_gene_id(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(super::normalize_gene_id(raw), expected);
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_load_file() -> Result<(), anyhow::Error> {
        let genes = super::load_gene_ids("tests/data/genes/idmapping_example.tsv")?;

        insta::assert_yaml_snapshot!(genes);

        Ok(())
    }

    #[test]
    fn load_collapses_versions_and_duplicates() -> Result<(), anyhow::Error> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            "From\t To \nA\tENSG00000100342.3\nB\tENSG00000100342\nC\tinvalid123\n"
        )?;

        let genes = super::load_gene_ids(file.path())?;

        assert_eq!(genes, vec!["ENSG00000100342".to_string()]);

        Ok(())
    }

    #[test]
    fn load_output_sorted_unique_prefixed() -> Result<(), anyhow::Error> {
        let genes = super::load_gene_ids("tests/data/genes/idmapping_example.tsv")?;

        assert!(genes.windows(2).all(|w| w[0] < w[1]));
        assert!(genes
            .iter()
            .all(|g| g.starts_with(super::GENE_PREFIX) && !g.contains('.')));

        Ok(())
    }

    #[test]
    fn load_missing_column() {
        let result = super::load_gene_ids("tests/data/genes/idmapping_no_to.tsv");

        assert!(
            matches!(result, Err(ConfigurationError::MissingColumn { ref column, .. }) if column == "to"),
            "{:?}",
            result
        );
    }

    #[test]
    fn run_smoke() -> Result<(), anyhow::Error> {
        let common = crate::common::Args {
            verbose: clap_verbosity_flag::Verbosity::new(1, 0),
        };
        let args = super::Args {
            path_mapping: "tests/data/genes/idmapping_example.tsv".into(),
        };

        super::run(&common, &args)
    }

    #[test]
    fn load_missing_file() {
        let result = super::load_gene_ids("tests/data/genes/does_not_exist.tsv");

        assert!(matches!(result, Err(ConfigurationError::Read { .. })));
    }

    #[test]
    fn load_empty_file() -> Result<(), anyhow::Error> {
        let file = tempfile::NamedTempFile::new()?;

        let result = super::load_gene_ids(file.path());

        assert!(matches!(
            result,
            Err(ConfigurationError::MissingHeader { .. })
        ));

        Ok(())
    }
}
