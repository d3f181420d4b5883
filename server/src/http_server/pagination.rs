use db::cooking::PageRequest;
use serde::{Deserialize, Serialize};

use super::errors::ApiError;
use crate::AppConfig;

pub(crate) const MAX_PAGE_SIZE: u32 = 100;

/// Page-number pagination: `page` is 1-based, `limit` overrides the configured page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageNumber {
    pub number: u32,
    pub size: u32,
}

impl PageNumber {
    pub fn resolve(page: Option<u32>, limit: Option<u32>, default_size: u32) -> Result<Self, ApiError> {
        let number = page.unwrap_or(1);
        if number == 0 {
            return Err(ApiError::InvalidPage);
        }

        let size = match limit {
            None | Some(0) => default_size,
            Some(limit) => limit.min(MAX_PAGE_SIZE),
        };

        Ok(Self { number, size })
    }

    pub fn request(self) -> PageRequest {
        PageRequest {
            offset: i64::from(self.number - 1) * i64::from(self.size),
            limit: i64::from(self.size),
        }
    }

    /// Pages past the end are an error, except that an empty listing still has a page 1.
    pub fn check_in_range(self, total: i64) -> Result<(), ApiError> {
        if self.number > 1 && self.request().offset >= total {
            return Err(ApiError::InvalidPage);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// `filters` are the non-paging query pairs to carry into the `next`/`previous` links.
    pub(crate) fn new(
        config: &AppConfig,
        path: &str,
        filters: &[(&'static str, String)],
        page: PageNumber,
        total: i64,
        results: Vec<T>,
    ) -> Self {
        let link = |number: u32| {
            let query = filters.iter().cloned().chain([
                ("page", number.to_string()),
                ("limit", page.size.to_string()),
            ]);
            config.app_url(path, query)
        };

        let end = i64::from(page.number) * i64::from(page.size);
        let next = (end < total).then(|| link(page.number + 1));
        let previous = (page.number > 1).then(|| link(page.number - 1));

        Self {
            count: total,
            next,
            previous,
            results,
        }
    }
}
