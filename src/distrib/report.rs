//! Writing of per-gene distribution TSV files.

use std::path::{Path, PathBuf};

use crate::common::error::ReportError;

use super::aggregate::DistributionRow;

/// Suffix appended to the gene identifier to form the report file name.
pub const REPORT_SUFFIX: &str = "_cancer_distribution_ssm.tsv";
/// Header of the report files.
pub const REPORT_HEADER: [&str; 4] = [
    "project_id",
    "cases_affected",
    "total_cases_with_ssm_data",
    "percent_cases_affected",
];

/// Path of the report for `gene_id` in `out_dir`.
pub fn report_path<P>(out_dir: P, gene_id: &str) -> PathBuf
where
    P: AsRef<Path>,
{
    out_dir.as_ref().join(format!("{}{}", gene_id, REPORT_SUFFIX))
}

/// Write the distribution rows of `gene_id` as TSV into `out_dir`.
///
/// The directory is created if necessary and an existing report is overwritten.  Absent
/// percentages are written as empty fields.
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// If the directory cannot be created or the file cannot be written.
pub fn write_report<P>(
    out_dir: P,
    gene_id: &str,
    rows: &[DistributionRow],
) -> Result<PathBuf, ReportError>
where
    P: AsRef<Path>,
{
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir).map_err(|source| ReportError::CreateDir {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let path = report_path(out_dir, gene_id);
    let write_err = |source: csv::Error| ReportError::Write {
        path: path.clone(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(&path)
        .map_err(write_err)?;
    writer.write_record(REPORT_HEADER).map_err(write_err)?;
    for row in rows {
        writer.serialize(row).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| write_err(csv::Error::from(e)))?;

    Ok(path)
}

#[cfg(test)]
mod test {
    use crate::distrib::aggregate::DistributionRow;

    fn example_rows() -> Vec<DistributionRow> {
        vec![
            DistributionRow {
                project_id: "TCGA-UCEC".to_string(),
                cases_affected: 1,
                total_cases_with_ssm_data: 3,
                percent_cases_affected: Some(100.0 / 3.0),
            },
            DistributionRow {
                project_id: "ProjB".to_string(),
                cases_affected: 1,
                total_cases_with_ssm_data: 0,
                percent_cases_affected: None,
            },
            DistributionRow {
                project_id: "ProjA".to_string(),
                cases_affected: 2,
                total_cases_with_ssm_data: 10,
                percent_cases_affected: Some(20.0),
            },
        ]
    }

    #[test]
    fn report_path() {
        assert_eq!(
            super::report_path("out", "ENSG00000100342"),
            std::path::Path::new("out/ENSG00000100342_cancer_distribution_ssm.tsv")
        );
    }

    #[test]
    fn write_report_contents() -> Result<(), anyhow::Error> {
        let tmp_dir = tempfile::tempdir()?;
        let out_dir = tmp_dir.path().join("nested").join("out");

        let path = super::write_report(&out_dir, "ENSG00000100342", &example_rows())?;

        assert_eq!(path, super::report_path(&out_dir, "ENSG00000100342"));
        let contents = std::fs::read_to_string(&path)?;
        insta::assert_snapshot!(contents);

        Ok(())
    }

    #[test]
    fn write_report_round_trip() -> Result<(), anyhow::Error> {
        let tmp_dir = tempfile::tempdir()?;
        let rows = example_rows();

        let path = super::write_report(tmp_dir.path(), "ENSG00000100342", &rows)?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_path(&path)?;
        assert_eq!(reader.headers()?, super::REPORT_HEADER.as_slice());
        let read = reader
            .deserialize()
            .collect::<Result<Vec<DistributionRow>, _>>()?;
        assert_eq!(read, rows);

        Ok(())
    }

    #[test]
    fn write_report_overwrites_and_allows_existing_dir() -> Result<(), anyhow::Error> {
        let tmp_dir = tempfile::tempdir()?;
        let rows = example_rows();

        super::write_report(tmp_dir.path(), "ENSG00000100342", &rows)?;
        let path = super::write_report(tmp_dir.path(), "ENSG00000100342", &rows[..1])?;

        let contents = std::fs::read_to_string(path)?;
        assert_eq!(contents.lines().count(), 2);

        Ok(())
    }

    #[test]
    fn write_report_header_only() -> Result<(), anyhow::Error> {
        let tmp_dir = tempfile::tempdir()?;

        let path = super::write_report(tmp_dir.path(), "ENSG00000100342", &[])?;

        assert_eq!(
            std::fs::read_to_string(path)?,
            "project_id\tcases_affected\ttotal_cases_with_ssm_data\tpercent_cases_affected\n"
        );

        Ok(())
    }

    #[test]
    fn write_report_fails_on_file_as_dir() -> Result<(), anyhow::Error> {
        let file = tempfile::NamedTempFile::new()?;

        let result = super::write_report(file.path(), "ENSG00000100342", &example_rows());

        assert!(matches!(
            result,
            Err(crate::common::error::ReportError::CreateDir { .. })
        ));

        Ok(())
    }
}
