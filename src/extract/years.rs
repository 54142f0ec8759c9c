use std::collections::BTreeSet;

use anyhow::{Context, Result};
use regex::Regex;

#[derive(Debug)]
pub struct YearFilter {
    year_token: Regex,
}

impl YearFilter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            year_token: Regex::new(r"\b(20\d{2})\b").context("failed to compile year token regex")?,
        })
    }

    pub fn years_in(&self, text: &str) -> BTreeSet<i32> {
        self.year_token
            .captures_iter(text)
            .filter_map(|captures| captures.get(1))
            .filter_map(|token| token.as_str().parse::<i32>().ok())
            .collect()
    }

    pub fn is_relevant(&self, scope_text: &str, target_year: i32) -> bool {
        let years = self.years_in(scope_text);
        years.is_empty() || years.contains(&target_year)
    }
}
