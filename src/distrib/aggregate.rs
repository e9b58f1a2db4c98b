//! Aggregation of affected cases into per-project percentages.

use crate::gdc::occurrences::OccurrenceMap;

/// Number of cases with SSM data, by project identifier.
pub type Denominators = rustc_hash::FxHashMap<String, usize>;

/// Distribution of affected cases in one project.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DistributionRow {
    /// GDC project identifier.
    pub project_id: String,
    /// Number of distinct cases with a mutation in the gene.
    pub cases_affected: usize,
    /// Number of cases of the project with SSM data; `0` if unknown.
    pub total_cases_with_ssm_data: usize,
    /// Percentage of affected cases; `None` if the denominator is `0`.
    pub percent_cases_affected: Option<f64>,
}

impl DistributionRow {
    /// Key used for ordering, absent percentages count as `0`.
    fn sort_key(&self) -> f64 {
        self.percent_cases_affected.unwrap_or(0.0)
    }
}

/// Compute the per-project distribution rows for one gene.
///
/// Projects without a denominator are treated as having no cases with SSM data.  The
/// result is sorted by percentage, descending; ties keep the order of `occurrences`.
pub fn aggregate(occurrences: &OccurrenceMap, denominators: &Denominators) -> Vec<DistributionRow> {
    let mut rows = occurrences
        .iter()
        .map(|project| {
            let cases_affected = project.case_ids.len();
            let total = denominators
                .get(&project.project_id)
                .copied()
                .unwrap_or_default();
            let percent = (total > 0).then(|| cases_affected as f64 / total as f64 * 100.0);
            DistributionRow {
                project_id: project.project_id.clone(),
                cases_affected,
                total_cases_with_ssm_data: total,
                percent_cases_affected: percent,
            }
        })
        .collect::<Vec<_>>();

    // `sort_by` is stable, so equal percentages keep their input order.
    rows.sort_by(|a, b| b.sort_key().total_cmp(&a.sort_key()));
    rows
}
