//! Theme brief driving a curation session

use serde::{Deserialize, Serialize};

/// Target context for discovery and scoring
///
/// Built once during theme refinement and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeContext {
    /// Short exhibition title
    pub title: String,
    /// Free-text theme description
    pub description: String,
    /// Validated concepts used as harvest queries and scoring keywords
    pub concepts: Vec<String>,
    /// Controlled-vocabulary movements/styles the theme targets
    pub movements: Vec<String>,
    /// Target period as inclusive years, if the theme is period-bound
    pub period: Option<(i32, i32)>,
    /// Curator-provided reference artists
    pub reference_artists: Vec<String>,
}

impl ThemeContext {
    /// True when the year falls inside the target period
    pub fn in_period(&self, year: i32) -> bool {
        match self.period {
            Some((start, end)) => year >= start && year <= end,
            None => false,
        }
    }

    /// Distance in years to the nearest period bound (0 inside the period)
    pub fn period_distance(&self, year: i32) -> Option<i32> {
        let (start, end) = self.period?;
        if year < start {
            Some(start - year)
        } else if year > end {
            Some(year - end)
        } else {
            Some(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_distance() {
        let ctx = ThemeContext {
            period: Some((1870, 1890)),
            ..Default::default()
        };
        assert_eq!(ctx.period_distance(1880), Some(0));
        assert!(ctx.in_period(1870));
        assert!(ctx.in_period(1890));
        assert_eq!(ctx.period_distance(1865), Some(5));
        assert_eq!(ctx.period_distance(1915), Some(25));
        assert!(!ctx.in_period(1915));
    }

    #[test]
    fn test_no_period() {
        let ctx = ThemeContext::default();
        assert_eq!(ctx.period_distance(1900), None);
        assert!(!ctx.in_period(1900));
    }
}
