use crate::indicators::monthly_vwap::MonthlyVwapTable;

const RULE_HEAVY: &str = "=================================================";
const RULE_LIGHT: &str = "-------------------------------------------------";

/// Renders the monthly VWAP table as plain text, one row per month in
/// ascending order. An empty table renders the header only.
pub fn render_report(symbol: &str, table: &MonthlyVwapTable) -> String {
    let mut report = format!(
        "Monthly Volume Weighted Average Price (VWAP) for {}\n{}\n",
        symbol, RULE_HEAVY
    );
    report.push_str(&format!("{:<10} {:<15} {:<15}\n", "Month", "VWAP", "Total Volume"));
    report.push_str(&format!("{}\n", RULE_LIGHT));

    for (month, result) in table {
        report.push_str(&format!(
            "{:<10} ${:<14.2} {:>15}\n",
            month.to_string(),
            result.vwap,
            group_thousands(result.total_volume)
        ));
    }

    report
}

/// Formats an integer with comma thousands separators, e.g. `1234567` -> `1,234,567`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
