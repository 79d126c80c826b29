use serde::Deserialize;

use crate::models::Pool;

/// User-facing filter options. Unset fields impose no restriction; set
/// fields combine with logical AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring match against the pair symbol.
    pub symbol_contains: Option<String>,
    pub min_tvl: Option<f64>,
    pub max_tvl: Option<f64>,
    pub min_apy: Option<f64>,
    pub max_apy: Option<f64>,
    #[serde(default)]
    pub il_risk: RiskFilter,
    /// Free-text search against project name or symbol.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskFilter {
    #[default]
    All,
    Yes,
    No,
}

impl RiskFilter {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("yes") {
            RiskFilter::Yes
        } else if raw.eq_ignore_ascii_case("no") {
            RiskFilter::No
        } else {
            RiskFilter::All
        }
    }
}

impl FilterCriteria {
    pub fn with_symbol(tag: impl Into<String>) -> Self {
        Self {
            symbol_contains: Some(tag.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, pool: &Pool) -> bool {
        if let Some(tag) = &self.symbol_contains {
            if !tag.is_empty()
                && !pool.symbol.to_lowercase().contains(&tag.to_lowercase())
            {
                return false;
            }
        }

        if let Some(min) = self.min_tvl {
            if pool.tvl_usd < min {
                return false;
            }
        }
        if let Some(max) = self.max_tvl {
            if pool.tvl_usd > max {
                return false;
            }
        }

        if let Some(min) = self.min_apy {
            if pool.apy < min {
                return false;
            }
        }
        if let Some(max) = self.max_apy {
            if pool.apy > max {
                return false;
            }
        }

        match self.il_risk {
            RiskFilter::All => {}
            RiskFilter::Yes => {
                if !pool.il_risk.eq_ignore_ascii_case("yes") {
                    return false;
                }
            }
            RiskFilter::No => {
                if !pool.il_risk.eq_ignore_ascii_case("no") {
                    return false;
                }
            }
        }

        if let Some(term) = &self.search {
            if !term.is_empty() {
                let term = term.to_lowercase();
                if !pool.project.to_lowercase().contains(&term)
                    && !pool.symbol.to_lowercase().contains(&term)
                {
                    return false;
                }
            }
        }

        true
    }
}

/// Returns the pools matching every set constraint, in input order.
/// Always a fresh collection, even when no constraint is set.
pub fn filter_pools(pools: &[Pool], criteria: &FilterCriteria) -> Vec<Pool> {
    pools
        .iter()
        .filter(|pool| criteria.matches(pool))
        .cloned()
        .collect()
}
