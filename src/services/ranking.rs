use serde::Deserialize;

use crate::models::Pool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankField {
    Tvl,
    Apy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl RankField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "tvl" | "tvlusd" | "tvl_usd" => Some(RankField::Tvl),
            "apy" => Some(RankField::Apy),
            _ => None,
        }
    }

    fn value(&self, pool: &Pool) -> f64 {
        match self {
            RankField::Tvl => pool.tvl_usd,
            RankField::Apy => pool.apy,
        }
    }
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

/// Sort pools by the chosen field and truncate to `limit`.
///
/// The sort is stable: pools with exactly equal field values keep their
/// input order, so rank badges stay deterministic across recomputations of
/// the same snapshot. Truncation happens strictly after sorting; a limit
/// larger than the collection returns everything.
pub fn rank(
    pools: &[Pool],
    field: RankField,
    direction: SortDirection,
    limit: Option<usize>,
) -> Vec<Pool> {
    let mut ranked: Vec<Pool> = pools.to_vec();
    ranked.sort_by(|a, b| {
        let ord = field.value(a).total_cmp(&field.value(b));
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    if let Some(n) = limit {
        ranked.truncate(n);
    }
    ranked
}
