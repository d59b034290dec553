use serde::{Deserialize, Serialize};

/// Digit grouping used for every number rendered on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberGrouping {
    /// 511,000
    #[default]
    International,
    /// 5,11,000 (lakh/crore grouping)
    Indian,
}

pub fn format_number(value: u64, grouping: NumberGrouping) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let group = match grouping {
        NumberGrouping::International => 3,
        NumberGrouping::Indian => 2,
    };

    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(group);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}

pub fn format_currency(symbol: &str, value: u64, grouping: NumberGrouping) -> String {
    format!("{symbol}{}", format_number(value, grouping))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn international_grouping_uses_thousands() {
        assert_eq!(format_number(0, NumberGrouping::International), "0");
        assert_eq!(format_number(999, NumberGrouping::International), "999");
        assert_eq!(format_number(2920, NumberGrouping::International), "2,920");
        assert_eq!(format_number(511000, NumberGrouping::International), "511,000");
        assert_eq!(
            format_number(12_345_678, NumberGrouping::International),
            "12,345,678"
        );
    }

    #[test]
    fn indian_grouping_uses_lakhs() {
        assert_eq!(format_number(1460, NumberGrouping::Indian), "1,460");
        assert_eq!(format_number(511000, NumberGrouping::Indian), "5,11,000");
        assert_eq!(format_number(12_345_678, NumberGrouping::Indian), "1,23,45,678");
    }

    #[test]
    fn currency_prefixes_symbol() {
        assert_eq!(
            format_currency("₹", 20440, NumberGrouping::International),
            "₹20,440"
        );
    }
}
