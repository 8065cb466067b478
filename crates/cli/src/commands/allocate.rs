//! One-off allocation from a JSON request file.
//!
//! Reads the same body the HTTP service accepts on `POST /calculate` and
//! prints the resulting allocation as a table or as JSON.

use anyhow::{Context, Result};
use capfund_core::{AllocationFormatter, AllocationRequest, AllocationResult};
use clap::Args;
use std::io::Read;

/// Arguments for the allocate command.
#[derive(Args, Debug, Clone)]
pub struct AllocateArgs {
    /// Request JSON file (`-` reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Print the result as a JSON array instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Runs the allocate command.
///
/// # Errors
/// Returns an error if the request cannot be read or parsed, or if the
/// engine rejects it.
pub fn run_allocate(args: &AllocateArgs) -> Result<()> {
    let raw = read_input(&args.input)?;
    let request = parse_request(&raw)?;
    let results = request.allocate()?;

    tracing::info!("Allocated {} assets", results.len());

    println!("{}", render(&request, &results, args.json)?);

    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        return Ok(buf);
    }

    std::fs::read_to_string(input).with_context(|| format!("Failed to read request file {input}"))
}

fn parse_request(raw: &str) -> Result<AllocationRequest> {
    serde_json::from_str(raw).context("Request is not a valid allocation request")
}

fn render(request: &AllocationRequest, results: &[AllocationResult], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(results)?);
    }
    Ok(AllocationFormatter::format(request, results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use capfund_core::AllocationError;
    use std::io::Write;

    const REQUEST: &str = r#"{
        "asset_cap": 0.5,
        "total_capital": 1000,
        "coins": [
            {"symbol": "BTC", "market_cap": 20000, "price": 80},
            {"symbol": "ETH", "market_cap": 10000, "price": 25},
            {"symbol": "LTC", "market_cap": 5000, "price": 10}
        ]
    }"#;

    #[test]
    fn reads_request_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(REQUEST.as_bytes()).unwrap();

        let raw = read_input(file.path().to_str().unwrap()).unwrap();
        let request = parse_request(&raw).unwrap();
        assert_eq!(request.assets.len(), 3);
    }

    #[test]
    fn missing_file_has_context() {
        let err = read_input("/nonexistent/request.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/request.json"));
    }

    #[test]
    fn json_output_is_array_in_input_order() {
        let request = parse_request(REQUEST).unwrap();
        let results = request.allocate().unwrap();
        let out = render(&request, &results, true).unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows[0]["symbol"], "BTC");
        assert_eq!(rows[2]["symbol"], "LTC");
    }

    #[test]
    fn table_output_lists_every_symbol() {
        let request = parse_request(REQUEST).unwrap();
        let results = request.allocate().unwrap();
        let out = render(&request, &results, false).unwrap();
        for symbol in ["BTC", "ETH", "LTC"] {
            assert!(out.contains(symbol));
        }
    }

    #[test]
    fn engine_errors_propagate() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"asset_cap": 0.1, "total_capital": 10, "coins": [{"symbol": "A", "market_cap": 1, "price": 1}]}"#)
            .unwrap();

        let args = AllocateArgs {
            input: file.path().to_str().unwrap().to_string(),
            json: true,
        };
        let err = run_allocate(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AllocationError>(),
            Some(AllocationError::InfeasibleConstraint { .. })
        ));
    }
}
