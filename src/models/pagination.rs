// Pagination and sorting shared by the list endpoints
// Sort keys are parsed into per-resource enums, never interpolated into SQL

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("Invalid sort direction: {}", other)),
        }
    }
}

/// Query string accepted by every paginated list endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number (default 1)
    pub page: Option<i64>,
    /// Page size (default 10, capped at 100)
    pub limit: Option<i64>,
    /// Column to sort by, resource specific (default created_date)
    #[serde(alias = "sort_key")]
    pub sort_key: Option<String>,
    /// asc or desc (default desc)
    #[serde(alias = "sort_direction")]
    pub sort_direction: Option<String>,
}

impl ListQuery {
    pub fn pagination(&self) -> Result<Pagination, String> {
        Pagination::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    /// Parse the sort key against the allow-list of `K`
    pub fn sort<K>(&self) -> Result<(K, SortDirection), String>
    where
        K: FromStr<Err = String> + Default,
    {
        let key = match self.sort_key.as_deref().map(str::trim) {
            None | Some("") => K::default(),
            Some(raw) => raw.parse()?,
        };
        let direction = match self.sort_direction.as_deref().map(str::trim) {
            None | Some("") => SortDirection::default(),
            Some(raw) => raw.parse()?,
        };
        Ok((key, direction))
    }
}

/// Validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Result<Self, String> {
        if page < 1 {
            return Err("Page must be at least 1".to_string());
        }
        if limit < 1 {
            return Err("Limit must be at least 1".to_string());
        }
        let limit = limit.min(MAX_PAGE_SIZE);
        if (page - 1).checked_mul(limit).is_none() {
            return Err("Page is out of range".to_string());
        }
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        let total_pages = if total == 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        };
        PageMeta {
            page: self.page,
            limit: self.limit,
            total,
            total_pages,
        }
    }

    /// Slice an in-memory result set to this page
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(usize::try_from(self.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(0))
            .collect()
    }
}

/// Pagination metadata returned in the `meta` envelope field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    enum TestKey {
        #[default]
        CreatedDate,
        Name,
    }

    impl FromStr for TestKey {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "created_date" => Ok(TestKey::CreatedDate),
                "name" => Ok(TestKey::Name),
                _ => Err(format!("Invalid sort key: {}", s)),
            }
        }
    }

    #[test]
    fn test_defaults_are_created_date_desc() {
        let query = ListQuery::default();
        let (key, direction) = query.sort::<TestKey>().unwrap();
        assert_eq!(key, TestKey::CreatedDate);
        assert_eq!(direction, SortDirection::Desc);

        let page = query.pagination().unwrap();
        assert_eq!(page, Pagination::default());
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_unknown_sort_key_rejected() {
        let query = ListQuery {
            sort_key: Some("name; DROP TABLE guests".to_string()),
            ..Default::default()
        };
        assert!(query.sort::<TestKey>().is_err());
    }

    #[test]
    fn test_sort_direction_case_insensitive() {
        let query = ListQuery {
            sort_key: Some("name".to_string()),
            sort_direction: Some("ASC".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.sort::<TestKey>().unwrap(),
            (TestKey::Name, SortDirection::Asc)
        );
    }

    #[test]
    fn test_limit_capped_and_page_validated() {
        let page = Pagination::new(3, 500).unwrap();
        assert_eq!(page.limit, MAX_PAGE_SIZE);
        assert_eq!(page.offset(), 200);

        assert!(Pagination::new(0, 10).is_err());
        assert!(Pagination::new(1, 0).is_err());
    }

    #[test]
    fn test_huge_page_rejected() {
        let query = ListQuery {
            page: Some(i64::MAX),
            ..Default::default()
        };
        assert!(query.pagination().is_err());

        // Largest page whose offset still fits
        let page = Pagination::new(i64::MAX / MAX_PAGE_SIZE, MAX_PAGE_SIZE).unwrap();
        assert!(page.offset() > 0);
        assert!(page.slice(vec![1, 2, 3]).is_empty());
    }

    #[test]
    fn test_meta_total_pages() {
        let page = Pagination::new(1, 10).unwrap();
        assert_eq!(page.meta(0).total_pages, 0);
        assert_eq!(page.meta(10).total_pages, 1);
        assert_eq!(page.meta(11).total_pages, 2);
    }

    #[test]
    fn test_slice_in_memory() {
        let page = Pagination::new(2, 2).unwrap();
        assert_eq!(page.slice(vec![1, 2, 3, 4, 5]), vec![3, 4]);
    }
}
