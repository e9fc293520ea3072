//! Runs the `contagion` binary against a generated config and data set.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use tempfile::TempDir;

fn write_fixture(dir: &Path) -> PathBuf {
    let start = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();

    let mut cases = String::from("region,date,new_cases\n");
    for offset in 0..19u64 {
        let day = start + Days::new(offset);
        let value = (offset * 37 % 11) * 100;
        writeln!(cases, "usa,{day},{value}").unwrap();
    }
    fs::write(dir.join("covid.csv"), cases).unwrap();

    let mut prices = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    let first = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    for offset in 0..22u64 {
        let day = first + Days::new(offset);
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }
        let base = 3700.0 + (offset * offset % 7) as f64 * 12.5;
        writeln!(
            prices,
            "{day},{base},{},{},{},{},1000",
            base + 20.0,
            base - 20.0,
            base + 5.0,
            base + 5.0
        )
        .unwrap();
    }
    fs::write(dir.join("snp.csv"), prices).unwrap();

    let config = format!(
        r#"
[analysis]
start = "2021-01-04"
end = "2021-01-22"
max_shift = 3

[[regions]]
code = "usa"
name = "United States of America"
path = "{}"

[[instruments]]
code = "snp500"
name = "SNP500"
path = "{}"
"#,
        dir.join("covid.csv").display(),
        dir.join("snp.csv").display()
    );
    let path = dir.join("Config.toml");
    fs::write(&path, config).unwrap();
    path
}

fn contagion(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_contagion"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

#[test]
fn global_prints_profile_and_writes_csv() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path());
    let csv = dir.path().join("profile.csv");

    let out = contagion(
        &config,
        &[
            "global",
            "--region",
            "usa",
            "--instrument",
            "snp500",
            "--format",
            "json",
            "--output",
            csv.to_str().unwrap(),
        ],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let pair = &json[0];
    assert_eq!(pair["label"], "United States of America v. SNP500");
    assert_eq!(pair["stream"], "close");
    assert_eq!(pair["profile"].as_array().unwrap().len(), 4);

    let written = fs::read_to_string(&csv).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("shift,coefficient"));
    assert_eq!(lines.count(), 4);
}

#[test]
fn query_batch_reports_each_line() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path());
    let queries = dir.path().join("queries.txt");
    fs::write(
        &queries,
        "# warm-up\nglobal close 3 snp500 usa\n\nglobal close 3 snp500 usa\nlocal open 1 snp500 usa\nweekly close 0 snp500 mex\n",
    )
    .unwrap();

    let out = contagion(
        &config,
        &["query", "--input", queries.to_str().unwrap(), "--format", "json"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout).unwrap();
    let answers: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(answers.len(), 4);
    assert_eq!(answers[0]["answer"], answers[1]["answer"]);
    assert_eq!(answers[0]["request"]["kind"], "global");
    assert_eq!(answers[0]["request"]["max_shift"], 3);
    assert!(answers[2]["answer"].is_f64());
    assert!(answers[3]["error"].as_str().unwrap().contains("mex"));
}

#[test]
fn unknown_region_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path());

    let out = contagion(&config, &["local", "--region", "chn"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("chn"));
}

#[test]
fn report_text_names_the_pair() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path());

    let out = contagion(&config, &["report", "--max-gap", "1"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("United States of America v. SNP500 (close)"));
    assert!(stdout.contains("local (gap 1)"));
}
