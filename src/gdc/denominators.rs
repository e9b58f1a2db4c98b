//! Number of cases with SSM data per project, cached for the whole run.

use crate::common::error::RemoteQueryError;

use super::{query, Api, Endpoint, Filter, Pagination, QueryParams};

/// Fields requested from the `case_ssms` endpoint.
pub const DENOMINATOR_FIELDS: &[&str] = &["project.project_id", "available_variation_data"];
/// Field holding the data types available for a case.
pub const DATA_TYPE_FIELD: &str = "available_variation_data";
/// Data type value for simple somatic mutations.
pub const SSM_DATA_TYPE: &str = "ssm";
/// Field holding the project of a case.
pub const PROJECT_ID_FIELD: &str = "project.project_id";

/// Cache of the number of cases with SSM data by project identifier.
///
/// Entries are only ever added; once a project's total is known it is never queried or
/// replaced again.
#[derive(Debug, Clone, Default)]
pub struct DenominatorCache {
    totals: rustc_hash::FxHashMap<String, usize>,
}

impl DenominatorCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached total for `project_id`, if any.
    pub fn get(&self, project_id: &str) -> Option<usize> {
        self.totals.get(project_id).copied()
    }

    /// Whether the total for `project_id` is cached.
    pub fn contains(&self, project_id: &str) -> bool {
        self.totals.contains_key(project_id)
    }

    /// Number of cached projects.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Store `total` unless a value is already present; returns the stored value.
    fn insert(&mut self, project_id: &str, total: usize) -> usize {
        *self
            .totals
            .entry(project_id.to_string())
            .or_insert(total)
    }
}

/// Response data of the count query; only the pagination is of interest.
#[derive(Debug, serde::Deserialize)]
struct CountPage {
    pagination: Pagination,
}

/// Resolve the number of cases of `project_id` that have SSM data available.
///
/// Looks into `cache` first and only queries the API on a miss, storing the result.
/// Failed lookups are not cached.
///
/// # Errors
///
/// If the query fails or the response lacks `pagination.total`.
pub fn resolve_denominator<A>(
    api: &A,
    cache: &mut DenominatorCache,
    project_id: &str,
) -> Result<usize, RemoteQueryError>
where
    A: Api + ?Sized,
{
    if let Some(total) = cache.get(project_id) {
        tracing::debug!("    {}: {} cases with SSM data (cached)", project_id, total);
        return Ok(total);
    }

    let filter = Filter::And(vec![
        Filter::one_of(DATA_TYPE_FIELD, [SSM_DATA_TYPE]),
        Filter::equals(PROJECT_ID_FIELD, project_id),
    ]);
    let params = QueryParams::new(DENOMINATOR_FIELDS, filter, 1);
    let page: CountPage = query(api, Endpoint::CaseSsms, &params)?;
    tracing::debug!(
        "    {}: {} cases with SSM data",
        project_id,
        page.pagination.total
    );

    Ok(cache.insert(project_id, page.pagination.total))
}
