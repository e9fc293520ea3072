//! Batch query CLI command.
//!
//! Reads one query per line and answers each through a [`StatisticsCache`],
//! so repeated queries in a batch are computed once. Blank lines and lines
//! starting with `#` are skipped. A malformed or failing query is reported
//! and the batch continues.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cache::{Answer, Query, StatisticsCache};
use crate::output::{self, OutputFormat};

use super::open;

/// Arguments for the query command.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// File of queries (default: stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output format: text, json (default: text; json prints one object per line)
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Runs the query command.
///
/// # Errors
/// Returns an error if loading fails or the input cannot be read.
pub fn run_query(config_path: &str, args: QueryArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let (_, manager) = open(config_path)?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path)
                .with_context(|| format!("Failed to open query file: {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut cache = StatisticsCache::new(&manager);
    let mut failed = 0;

    for line in reader.lines() {
        let line = line.context("Failed to read query")?;
        let Some(text) = query_text(&line) else {
            continue;
        };

        let (query, outcome) = match text.parse::<Query>() {
            Ok(query) => {
                let outcome = cache.get(&query).map_err(anyhow::Error::from);
                (Some(query), outcome)
            }
            Err(e) => (None, Err(e)),
        };
        if outcome.is_err() {
            failed += 1;
        }

        match format {
            OutputFormat::Text => println!("{}", render(text, &outcome)),
            OutputFormat::Json => {
                let json = json_line(text, query.as_ref(), &outcome);
                println!("{}", serde_json::to_string(&json)?);
            }
        }
    }

    tracing::info!(
        hits = cache.hits(),
        misses = cache.misses(),
        cached = cache.len(),
        failed,
        "query batch complete"
    );
    Ok(())
}

/// The query on `line`, or `None` for blank and comment lines.
fn query_text(line: &str) -> Option<&str> {
    let text = line.trim();
    if text.is_empty() || text.starts_with('#') {
        None
    } else {
        Some(text)
    }
}

/// One JSON-lines record: the raw line, the parsed request (null when the
/// line does not parse), and either the answer or the error.
fn json_line(text: &str, query: Option<&Query>, outcome: &Result<Answer>) -> serde_json::Value {
    match outcome {
        Ok(answer) => serde_json::json!({ "query": text, "request": query, "answer": answer }),
        Err(e) => serde_json::json!({ "query": text, "request": query, "error": format!("{e:#}") }),
    }
}

fn render(text: &str, outcome: &Result<Answer>) -> String {
    match outcome {
        Ok(Answer::Coefficient(r)) => format!("{text}: {}", output::coefficient(*r)),
        Ok(Answer::Series(values)) => {
            let values: Vec<String> = values
                .iter()
                .map(|r| output::coefficient(*r).to_string())
                .collect();
            format!("{text}:{}", values.join(""))
        }
        Err(e) => format!("{text}: {}", format!("{e:#}").red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(query_text("   "), None);
        assert_eq!(query_text("# warm-up"), None);
        assert_eq!(
            query_text("  local close 0 snp500 usa "),
            Some("local close 0 snp500 usa")
        );
    }

    #[test]
    fn json_line_carries_parsed_request() {
        let query: Query = "local open 2 snp500 usa".parse().unwrap();
        let json = json_line("local open 2 snp500 usa", Some(&query), &Ok(Answer::Coefficient(-0.5)));

        assert_eq!(json["request"]["kind"], "local");
        assert_eq!(json["request"]["stream"], "open");
        assert_eq!(json["request"]["max_gap"], 2);
        assert_eq!(json["request"]["region"], "usa");
        assert_eq!(json["answer"], -0.5);

        let json = json_line("local open", None, &Err(anyhow!("expected five fields")));
        assert!(json["request"].is_null());
        assert_eq!(json["error"], "expected five fields");
    }

    #[test]
    fn renders_answers() {
        colored::control::set_override(false);
        assert_eq!(
            render("local c 0 snp500 usa", &Ok(Answer::Coefficient(0.5))),
            "local c 0 snp500 usa:   0.5000"
        );
        assert_eq!(
            render("weekly c 0 snp500 usa", &Ok(Answer::Series(vec![0.1, -0.25]))),
            "weekly c 0 snp500 usa:  0.1000 -0.2500"
        );
        assert_eq!(
            render("global c 9 snp500 mex", &Err(anyhow!("region 'mex' is not loaded"))),
            "global c 9 snp500 mex: region 'mex' is not loaded"
        );
    }
}
