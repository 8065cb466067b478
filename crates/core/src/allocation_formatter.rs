#![allow(clippy::format_push_string)]
#![allow(clippy::uninlined_format_args)]

use crate::allocation::{AllocationRequest, AllocationResult};

pub struct AllocationFormatter;

impl AllocationFormatter {
    #[must_use]
    pub fn format(request: &AllocationRequest, results: &[AllocationResult]) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                   CAPPED ALLOCATION                           \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str(&format!(
            "Total Capital:         {:.2}\n",
            request.total_capital
        ));
        output.push_str(&format!(
            "Asset Cap:             {:.2}%\n",
            request.asset_cap * 100.0
        ));
        output.push_str(&format!("Assets:                {}\n", results.len()));
        output.push('\n');

        output.push_str(&format!(
            "{:<10} {:>10} {:>16} {:>16} {:>12}\n",
            "Symbol", "Weight", "Capital", "Units", "Price"
        ));
        output.push_str("───────────────────────────────────────────────────────────────\n");

        let mut total_pct = 0.0;
        let mut total_capital = 0.0;
        for result in results {
            let capital = result.capital(request.total_capital);
            total_pct += result.allocation_percentage;
            total_capital += capital;
            output.push_str(&format!(
                "{:<10} {:>9.2}% {:>16.2} {:>16.6} {:>12.2}\n",
                result.symbol, result.allocation_percentage, capital, result.amount, result.price
            ));
        }

        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "{:<10} {:>9.2}% {:>16.2}\n",
            "Total", total_pct, total_capital
        ));
        output.push('\n');

        output
    }
}
