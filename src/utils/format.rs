/// Human-scaled TVL label: $1.2B, $3.4M, or a comma-grouped dollar amount
/// below a million.
pub fn format_tvl(tvl: f64) -> String {
    if tvl >= 1e9 {
        format!("${:.1}B", tvl / 1e9)
    } else if tvl >= 1e6 {
        format!("${:.1}M", tvl / 1e6)
    } else {
        format!("${}", group_thousands(tvl))
    }
}

/// Compact label for chart axis ticks, with a thousands tier.
pub fn format_axis_value(value: f64) -> String {
    if value >= 1e9 {
        format!("${:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("${:.1}K", value / 1e3)
    } else {
        format!("${:.2}", value)
    }
}

pub fn format_apy(apy: f64) -> String {
    format!("{:.2}%", apy)
}

pub fn format_growth(rate: f64) -> String {
    format!("{:+.2}%", rate)
}

fn group_thousands(value: f64) -> String {
    let whole = value.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if whole < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tvl_tiers() {
        assert_eq!(format_tvl(2_340_000_000.0), "$2.3B");
        assert_eq!(format_tvl(2_500_000.0), "$2.5M");
        assert_eq!(format_tvl(12_345.0), "$12,345");
        assert_eq!(format_tvl(999.0), "$999");
        assert_eq!(format_tvl(0.0), "$0");
    }

    #[test]
    fn axis_tiers_include_thousands() {
        assert_eq!(format_axis_value(1_500_000_000.0), "$1.5B");
        assert_eq!(format_axis_value(1_500_000.0), "$1.5M");
        assert_eq!(format_axis_value(1_500.0), "$1.5K");
        assert_eq!(format_axis_value(42.5), "$42.50");
    }

    #[test]
    fn growth_carries_a_sign() {
        assert_eq!(format_growth(5.263), "+5.26%");
        assert_eq!(format_growth(-2.5), "-2.50%");
        assert_eq!(format_apy(9.1), "9.10%");
    }
}
