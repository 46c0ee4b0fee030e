//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::GiveawayError;

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

pub(crate) fn default_page() -> u32 {
    1
}

pub(crate) fn default_per_page() -> u32 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Clamps `per_page` to the allowed maximum of 100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Cuts one page out of `items`.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> (Vec<T>, PaginationMeta) {
        let params = self.clamped();
        let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let total_pages = if total == 0 {
            0
        } else {
            total.div_ceil(params.per_page)
        };

        let start = (params.page - 1) as usize * params.per_page as usize;
        let data = items
            .into_iter()
            .skip(start)
            .take(params.per_page as usize)
            .collect();

        (
            data,
            PaginationMeta {
                page: params.page,
                per_page: params.per_page,
                total,
                total_pages,
            },
        )
    }
}

/// Parses a snowflake sent as a decimal JSON string.
///
/// # Errors
///
/// Returns [`GiveawayError::Validation`] naming `field` if `value` is not
/// an unsigned 64-bit integer.
pub fn parse_snowflake(field: &str, value: &str) -> Result<u64, GiveawayError> {
    value
        .trim()
        .parse()
        .map_err(|_| GiveawayError::Validation(format!("{field} must be a numeric id, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_slices_and_counts() {
        let params = PaginationParams {
            page: 2,
            per_page: 2,
        };
        let (data, meta) = params.paginate(vec![1, 2, 3, 4, 5]);
        assert_eq!(data, vec![3, 4]);
        assert_eq!(meta.total, 5);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn pagination_clamps_bad_input() {
        let params = PaginationParams {
            page: 0,
            per_page: 1_000,
        };
        let (data, meta) = params.paginate((0..150).collect::<Vec<u32>>());
        assert_eq!(meta.page, 1);
        assert_eq!(meta.per_page, 100);
        assert_eq!(data.len(), 100);
    }

    #[test]
    fn empty_list_has_zero_pages() {
        let (data, meta) = PaginationParams::default().paginate(Vec::<u8>::new());
        assert!(data.is_empty());
        assert_eq!(meta.total_pages, 0);
    }

    #[test]
    fn snowflakes_parse_from_strings() {
        assert_eq!(
            parse_snowflake("user_id", "1190000000000000000").ok(),
            Some(1_190_000_000_000_000_000)
        );
        assert!(matches!(
            parse_snowflake("user_id", "-4"),
            Err(GiveawayError::Validation(_))
        ));
        assert!(parse_snowflake("user_id", "abc").is_err());
    }
}
