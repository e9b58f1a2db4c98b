//! Fetching the cases carrying mutations in a gene, grouped by project.

use crate::common::error::RemoteQueryError;

use super::{query, Api, Endpoint, Filter, Pagination, QueryParams};

/// Fields requested for each occurrence.
pub const OCCURRENCE_FIELDS: &[&str] = &["case.case_id", "case.project.project_id"];
/// Field that occurrences are filtered on.
pub const GENE_ID_FIELD: &str = "ssm.consequence.transcript.gene.gene_id";
/// Default page size, large enough that a single page holds all occurrences of a gene.
pub const DEFAULT_PAGE_SIZE: usize = 100_000;

/// The distinct cases of one project that carry a mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectCases {
    /// GDC project identifier, e.g., `TCGA-BRCA`.
    pub project_id: String,
    /// Distinct case identifiers.
    pub case_ids: rustc_hash::FxHashSet<String>,
}

/// Mapping from project to affected cases, in order of first appearance of the project.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceMap {
    /// Projects in order of first appearance.
    projects: Vec<ProjectCases>,
    /// Mapping from project identifier to index in `projects`.
    project_to_idx: rustc_hash::FxHashMap<String, usize>,
}

impl OccurrenceMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `case_id` of `project_id` carries a mutation.
    pub fn insert(&mut self, project_id: &str, case_id: &str) {
        let idx = match self.project_to_idx.get(project_id) {
            Some(idx) => *idx,
            None => {
                self.projects.push(ProjectCases {
                    project_id: project_id.to_string(),
                    case_ids: Default::default(),
                });
                self.project_to_idx
                    .insert(project_id.to_string(), self.projects.len() - 1);
                self.projects.len() - 1
            }
        };
        self.projects[idx].case_ids.insert(case_id.to_string());
    }

    /// Whether no occurrence has been recorded.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Number of projects.
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Iterate the projects in order of first appearance.
    pub fn iter(&self) -> std::slice::Iter<'_, ProjectCases> {
        self.projects.iter()
    }

    /// Number of distinct (project, case) pairs.
    pub fn total_cases(&self) -> usize {
        self.projects.iter().map(|p| p.case_ids.len()).sum()
    }
}

impl<P, C> FromIterator<(P, C)> for OccurrenceMap
where
    P: AsRef<str>,
    C: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut result = Self::new();
        for (project_id, case_id) in iter {
            result.insert(project_id.as_ref(), case_id.as_ref());
        }
        result
    }
}

/// Project reference within a hit.
#[derive(Debug, serde::Deserialize)]
struct HitProject {
    project_id: Option<String>,
}

/// Case reference within a hit.
#[derive(Debug, serde::Deserialize)]
struct HitCase {
    case_id: Option<String>,
    project: Option<HitProject>,
}

/// One mutation occurrence as returned by the API.
#[derive(Debug, serde::Deserialize)]
struct Hit {
    case: Option<HitCase>,
}

impl Hit {
    /// Extract `(project_id, case_id)`, if both are present and non-empty.
    fn into_pair(self) -> Option<(String, String)> {
        let case = self.case?;
        let project_id = case.project?.project_id.filter(|s| !s.is_empty())?;
        let case_id = case.case_id.filter(|s| !s.is_empty())?;
        Some((project_id, case_id))
    }
}

/// One page of occurrences.
#[derive(Debug, serde::Deserialize)]
struct Page {
    hits: Vec<Hit>,
    pagination: Option<Pagination>,
}

/// Fetch the cases carrying a simple somatic mutation in `gene_id`, by project.
///
/// Normally a single request suffices.  Should the API report more matching records
/// than it returned, further pages are requested until all records have been seen.
///
/// # Arguments
///
/// * `api` - The API to query.
/// * `gene_id` - ENSEMBL gene identifier without version.
/// * `page_size` - Number of records to request per page.
///
/// # Returns
///
/// The affected cases by project; empty if the gene has no recorded occurrences.
///
/// # Errors
///
/// If any request fails, or the API stops returning records before all were seen.
pub fn fetch_occurrences<A>(
    api: &A,
    gene_id: &str,
    page_size: usize,
) -> Result<OccurrenceMap, RemoteQueryError>
where
    A: Api + ?Sized,
{
    let filter = Filter::And(vec![Filter::one_of(GENE_ID_FIELD, [gene_id])]);
    let params = QueryParams::new(OCCURRENCE_FIELDS, filter, page_size);

    let mut result = OccurrenceMap::new();
    let mut received = 0;
    let mut dropped = 0;
    loop {
        let page: Page = query(api, Endpoint::SsmOccurrences, &params.clone().with_from(received))?;
        let page_len = page.hits.len();
        received += page_len;
        for hit in page.hits {
            match hit.into_pair() {
                Some((project_id, case_id)) => {
                    result.insert(&project_id, &case_id);
                }
                None => dropped += 1,
            }
        }

        let Some(Pagination { total }) = page.pagination else {
            break;
        };
        if received >= total {
            break;
        }
        if page_len == 0 {
            return Err(RemoteQueryError::Truncated {
                endpoint: Endpoint::SsmOccurrences.to_string(),
                received,
                total,
            });
        }
        tracing::debug!(
            "  {}: received {} of {} occurrences, fetching next page",
            gene_id,
            received,
            total
        );
    }

    if dropped > 0 {
        tracing::debug!("  {}: dropped {} incomplete occurrences", gene_id, dropped);
    }
    Ok(result)
}
