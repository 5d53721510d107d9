//! Fixed-size pagination that never fails on bad input.
//!
//! Malformed page numbers fall back to the first page, page numbers past the
//! end fall back to the last page. An empty collection still has one (empty)
//! page.

use serde::Serialize;
use std::num::IntErrorKind;

/// Posts per listing page.
pub const POSTS_PER_PAGE: u64 = 5;

/// Resolves page requests against a collection of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total: u64,
    per_page: u64,
}

/// The slice of a collection a resolved page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// One-based page number.
    pub number: u64,
    pub offset: u64,
    pub limit: u64,
}

impl Paginator {
    pub fn new(total: u64, per_page: u64) -> Self {
        Self {
            total,
            per_page: per_page.max(1),
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// `max(1, ceil(total / per_page))`.
    pub fn num_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }

    /// Resolve a raw page indicator (query string value, possibly absent).
    pub fn resolve(&self, raw: Option<&str>) -> PageWindow {
        let requested = raw.and_then(parse_page_number).unwrap_or(1);
        let number = requested.min(self.num_pages());
        PageWindow {
            number,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }

    /// Resolve and slice an in-memory collection.
    pub fn paginate<T>(items: Vec<T>, per_page: u64, raw: Option<&str>) -> Page<T> {
        let paginator = Self::new(items.len() as u64, per_page);
        let window = paginator.resolve(raw);
        let items = items
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect();
        Page::new(items, window, &paginator)
    }
}

fn parse_page_number(raw: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(n) => Some(n).filter(|n| *n >= 1),
        // Too large to represent, but still a page past the end.
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u64::MAX),
        Err(_) => None,
    }
}

/// One page of an ordered result set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow, paginator: &Paginator) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: paginator.num_pages(),
            total: paginator.total(),
            per_page: paginator.per_page(),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            per_page: self.per_page,
        }
    }
}
