//! Listing query builder.
//!
//! Stateless translation from the job-listing request parameters
//! (search / filter / sort) into a store predicate and ordering.

use crate::store::{Filter, Sort, SortDirection};

/// Sort order requested for a job listing.
///
/// `dsc` is the spelling the client sends on the wire; `desc` is accepted
/// as well. Anything else means no explicit ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineOrder {
    Ascending,
    Descending,
}

impl DeadlineOrder {
    /// Parse from the `sort` query parameter.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Some(Self::Ascending),
            "dsc" | "desc" => Some(Self::Descending),
            _ => None,
        }
    }
}

/// Parameters for listing jobs.
#[derive(Debug, Clone, Default)]
pub struct JobQuery {
    /// Case-insensitive substring match against the job title.
    pub search: Option<String>,
    /// Exact-match category restriction.
    pub filter: Option<String>,
    /// Deadline ordering.
    pub sort: Option<DeadlineOrder>,
}

impl JobQuery {
    /// Build from raw query-string parameters.
    pub fn from_params(
        search: Option<String>,
        filter: Option<String>,
        sort: Option<String>,
    ) -> Self {
        Self {
            search,
            filter,
            sort: sort.as_deref().and_then(DeadlineOrder::parse),
        }
    }

    /// Translate into a store predicate and optional ordering.
    ///
    /// An absent or empty search term must not restrict the result set,
    /// so it contributes no condition at all.
    pub fn build(&self) -> (Filter, Option<Sort>) {
        let mut filter = Filter::new();

        if let Some(search) = self.search.as_deref() {
            if !search.is_empty() {
                filter = filter.contains_ci("title", search);
            }
        }

        if let Some(category) = self.filter.as_deref() {
            if !category.is_empty() {
                filter = filter.eq("category", category);
            }
        }

        let sort = self.sort.map(|order| Sort {
            path: "deadline".to_string(),
            direction: match order {
                DeadlineOrder::Ascending => SortDirection::Ascending,
                DeadlineOrder::Descending => SortDirection::Descending,
            },
        });

        (filter, sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_build_a_match_all_query() {
        let (filter, sort) = JobQuery::default().build();
        assert!(filter.is_empty());
        assert!(sort.is_none());
    }

    #[test]
    fn empty_search_string_is_ignored() {
        let query = JobQuery::from_params(Some(String::new()), None, None);
        let (filter, _) = query.build();
        assert!(filter.is_empty());
    }

    #[test]
    fn sort_parsing_accepts_wire_spellings() {
        assert_eq!(DeadlineOrder::parse("asc"), Some(DeadlineOrder::Ascending));
        assert_eq!(DeadlineOrder::parse("dsc"), Some(DeadlineOrder::Descending));
        assert_eq!(DeadlineOrder::parse("desc"), Some(DeadlineOrder::Descending));
        assert_eq!(DeadlineOrder::parse("newest"), None);
    }

    #[test]
    fn sort_direction_flows_through() {
        let query = JobQuery::from_params(None, None, Some("dsc".to_string()));
        let (_, sort) = query.build();
        let sort = sort.unwrap();
        assert_eq!(sort.path, "deadline");
        assert_eq!(sort.direction, SortDirection::Descending);
    }

    #[test]
    fn search_and_category_compose() {
        let query = JobQuery::from_params(
            Some("eng".to_string()),
            Some("web".to_string()),
            Some("asc".to_string()),
        );
        let (filter, sort) = query.build();
        assert!(!filter.is_empty());
        assert!(sort.is_some());
    }
}
