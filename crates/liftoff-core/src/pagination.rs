// ABOUTME: Offset pagination for leaderboards and other ranked listings
// ABOUTME: Page numbers are 1-based; page size is clamped to a fixed maximum
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use serde::{Deserialize, Serialize};

use crate::constants::pagination::{DEFAULT_PER_PAGE, MAX_PER_PAGE};

/// Requested page of a ranked listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Build a request, clamping page to at least 1 and size to `1..=MAX_PER_PAGE`
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Number of items to skip
    #[must_use]
    pub const fn offset(&self) -> u32 {
        (self.page.saturating_sub(1)).saturating_mul(self.per_page)
    }

    /// 1-based rank of the item at `index` within this page
    #[must_use]
    pub const fn rank_at(&self, index: u32) -> u32 {
        self.offset() + index + 1
    }
}

/// One page of results plus totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total items across all pages
    pub total: u32,
    /// Page number served
    pub page: u32,
    /// Page size used
    pub per_page: u32,
    /// Whether a later page exists
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Assemble a page from its items and the overall count
    #[must_use]
    pub fn new(items: Vec<T>, total: u32, request: PageRequest) -> Self {
        let has_more = request.offset().saturating_add(request.per_page) < total;
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let request = PageRequest::new(0, 10_000);
        assert_eq!(request.page, 1);
        assert_eq!(request.per_page, MAX_PER_PAGE);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_rank_at_accounts_for_offset() {
        let request = PageRequest::new(3, 20);
        assert_eq!(request.offset(), 40);
        assert_eq!(request.rank_at(0), 41);
    }

    #[test]
    fn test_has_more() {
        let request = PageRequest::new(1, 2);
        assert!(Page::new(vec![1, 2], 3, request).has_more);
        assert!(!Page::new(vec![1, 2], 2, request).has_more);
    }
}
