//! Latency and success benchmark over a fixed prompt set.
//!
//! Each prompt runs `repeats` times, every run preceded by a restart so
//! it starts from empty filters. Every call is appended to a JSONL log;
//! per-prompt and overall statistics go to a summary JSON next to it.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use chrono::Local;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use server::{MovieAgent, ReplyAction, Session};

pub const DEFAULT_PROMPTS: [&str; 4] = [
    "lighthearted sci-fi from the 90s",
    "romantic comedy around 2005",
    "thrillers with DiCaprio",
    "family friendly animation recent",
];

/// Result counts inside this range count as an ideal answer.
const IDEAL_RESULTS: std::ops::RangeInclusive<usize> = 5..=10;

const REMOTE_TIMEOUT: Duration = Duration::from_secs(60);

/// Where benchmark calls go.
pub enum Target {
    InProcess { agent: MovieAgent, session: Session },
    Remote { http: reqwest::Client, url: String, session_id: Option<Value> },
}

impl Target {
    pub fn in_process(agent: MovieAgent) -> Self {
        let session = agent.new_session();
        Target::InProcess { agent, session }
    }

    pub fn remote(server_url: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REMOTE_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Target::Remote {
            http,
            url: format!("{}/api/message", server_url.trim_end_matches('/')),
            session_id: None,
        })
    }

    fn label(&self) -> String {
        match self {
            Target::InProcess { .. } => "in-process".to_string(),
            Target::Remote { url, .. } => url.clone(),
        }
    }

    /// Send one input, mapping the outcome onto HTTP-style status codes.
    async fn call(&mut self, input: &str) -> Measurement {
        let start = Instant::now();
        match self {
            Target::InProcess { agent, session } => {
                let outcome = agent.handle(session, input).await;
                let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
                match outcome {
                    Ok(reply) => Measurement {
                        status: if reply.action == ReplyAction::Unavailable { 503 } else { 200 },
                        duration_ms,
                        results_count: Some(reply.results.len()),
                        filters: Some(reply.filters),
                    },
                    Err(_) => Measurement::failed(400, duration_ms),
                }
            }
            Target::Remote { http, url, session_id } => {
                let mut body = serde_json::json!({ "input": input });
                if let Some(id) = session_id.as_ref() {
                    body["session_id"] = id.clone();
                }
                let response = http.post(url.as_str()).json(&body).send().await;
                let (status, payload) = match response {
                    Ok(response) => {
                        let status = response.status().as_u16();
                        (status, response.json::<Value>().await.unwrap_or(Value::Null))
                    }
                    Err(_) => (0, Value::Null),
                };
                let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
                if let Some(id) = payload.get("session_id") {
                    *session_id = Some(id.clone());
                }
                Measurement {
                    status,
                    duration_ms,
                    results_count: payload.get("results").and_then(Value::as_array).map(Vec::len),
                    filters: payload.get("filters").and_then(Value::as_str).map(str::to_string),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Measurement {
    /// HTTP status, or 0 when the server could not be reached
    status: u16,
    duration_ms: f64,
    results_count: Option<usize>,
    filters: Option<String>,
}

impl Measurement {
    fn failed(status: u16, duration_ms: f64) -> Self {
        Self {
            status,
            duration_ms,
            results_count: None,
            filters: None,
        }
    }

    fn succeeded(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn ideal(&self) -> bool {
        self.succeeded() && self.results_count.is_some_and(|count| IDEAL_RESULTS.contains(&count))
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LogRow<'a> {
    Meta(&'a Meta),
    Restart {
        prompt: &'a str,
        iteration: usize,
        status: u16,
        duration_ms: f64,
        filters: Option<&'a str>,
    },
    Run {
        prompt: &'a str,
        iteration: usize,
        status: u16,
        duration_ms: f64,
        results_count: Option<usize>,
        filters: Option<&'a str>,
    },
}

#[derive(Debug, Clone, Serialize)]
struct Meta {
    started_at: String,
    target: String,
    repeats: usize,
    prompts_count: usize,
    llm_base_url: String,
}

/// Aggregates over a group of runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub runs: usize,
    pub avg_ms: Option<f64>,
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub min_ms: Option<f64>,
    pub max_ms: Option<f64>,
    /// Share of runs with a 2xx status
    pub success_rate: f64,
    /// Share of 2xx runs that returned between 5 and 10 results
    pub success_rate_ideal_results: f64,
    pub avg_results: Option<f64>,
}

#[derive(Serialize)]
struct Summary<'a> {
    meta: &'a Meta,
    prompts: BTreeMap<&'a str, RunStats>,
    totals: RunStats,
}

pub struct BenchOptions {
    pub prompts: Vec<String>,
    pub repeats: usize,
    pub log_dir: PathBuf,
    pub log_prefix: String,
    pub llm_base_url: String,
}

/// Read prompts from a JSON list or `{"prompts": [...]}`; defaults when no file is given.
pub fn load_prompts(path: Option<&Path>) -> Result<Vec<String>> {
    let Some(path) = path else {
        return Ok(DEFAULT_PROMPTS.iter().map(|p| p.to_string()).collect());
    };
    let raw = fs::read_to_string(path).with_context(|| format!("Prompts file not found: {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw).context("Prompts file is not valid JSON")?;
    prompts_from_json(value)
}

fn prompts_from_json(value: Value) -> Result<Vec<String>> {
    let list = match value {
        Value::Array(list) => list,
        Value::Object(mut object) => match object.remove("prompts") {
            Some(Value::Array(list)) => list,
            _ => bail!("Prompts file must be a JSON list or an object with a 'prompts' list"),
        },
        _ => bail!("Prompts file must be a JSON list or an object with a 'prompts' list"),
    };
    Ok(list
        .into_iter()
        .map(|item| match item {
            Value::String(text) => text,
            other => other.to_string(),
        })
        .collect())
}

/// Run the benchmark and write `<prefix>_<timestamp>.jsonl` plus
/// `<prefix>_<timestamp>_summary.json` into the log directory.
pub async fn run(mut target: Target, options: BenchOptions) -> Result<()> {
    fs::create_dir_all(&options.log_dir)
        .with_context(|| format!("Failed to create {}", options.log_dir.display()))?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = options.log_dir.join(format!("{}_{}.jsonl", options.log_prefix, stamp));
    let summary_path = options.log_dir.join(format!("{}_{}_summary.json", options.log_prefix, stamp));

    let meta = Meta {
        started_at: Local::now().to_rfc3339(),
        target: target.label(),
        repeats: options.repeats,
        prompts_count: options.prompts.len(),
        llm_base_url: options.llm_base_url.clone(),
    };
    let mut log = BufWriter::new(
        File::create(&log_path).with_context(|| format!("Failed to create {}", log_path.display()))?,
    );
    write_row(&mut log, &LogRow::Meta(&meta))?;

    println!(
        "{} prompts={} repeats={} target={}",
        "[BENCH]".bold(),
        options.prompts.len(),
        options.repeats,
        meta.target
    );

    let mut per_prompt: BTreeMap<&str, Vec<Measurement>> = BTreeMap::new();
    for prompt in &options.prompts {
        for iteration in 1..=options.repeats {
            let restart = target.call("restart").await;
            write_row(
                &mut log,
                &LogRow::Restart {
                    prompt,
                    iteration,
                    status: restart.status,
                    duration_ms: round2(restart.duration_ms),
                    filters: restart.filters.as_deref(),
                },
            )?;

            let run = target.call(prompt).await;
            write_row(
                &mut log,
                &LogRow::Run {
                    prompt,
                    iteration,
                    status: run.status,
                    duration_ms: round2(run.duration_ms),
                    results_count: run.results_count,
                    filters: run.filters.as_deref(),
                },
            )?;

            let status = if run.succeeded() {
                run.status.to_string().green()
            } else {
                run.status.to_string().red()
            };
            let note = if run.status == 503 { " (backend unavailable)" } else { "" };
            println!(
                "{} '{}' #{}: {} in {:.2} ms, results={}{}",
                "[BENCH]".bold(),
                prompt,
                iteration,
                status,
                run.duration_ms,
                run.results_count.map_or("-".to_string(), |c| c.to_string()),
                note
            );
            per_prompt.entry(prompt.as_str()).or_default().push(run);
        }
    }
    log.flush().context("Failed to write benchmark log")?;

    let all: Vec<Measurement> = per_prompt.values().flatten().cloned().collect();
    let summary = Summary {
        meta: &meta,
        prompts: per_prompt.iter().map(|(prompt, runs)| (*prompt, summarize(runs))).collect(),
        totals: summarize(&all),
    };
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    let totals = &summary.totals;
    println!("{}", "Benchmark results:".bold().blue());
    println!("Runs: {}", totals.runs);
    println!("Average latency: {}", format_ms(totals.avg_ms));
    println!("P50 latency: {}", format_ms(totals.p50_ms));
    println!("P95 latency: {}", format_ms(totals.p95_ms));
    println!("Success rate: {:.1}%", totals.success_rate * 100.0);
    println!("Ideal result rate: {:.1}%", totals.success_rate_ideal_results * 100.0);
    println!("Log: {}", log_path.display());
    println!("Summary: {}", summary_path.display());
    Ok(())
}

fn write_row(log: &mut impl Write, row: &LogRow<'_>) -> Result<()> {
    serde_json::to_writer(&mut *log, row)?;
    writeln!(log).context("Failed to write benchmark log")?;
    Ok(())
}

fn format_ms(value: Option<f64>) -> String {
    value.map_or("-".to_string(), |ms| format!("{ms:.2} ms"))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn rate(hits: usize, total: usize) -> f64 {
    (hits as f64 / total.max(1) as f64 * 1000.0).round() / 1000.0
}

fn summarize(runs: &[Measurement]) -> RunStats {
    let durations: Vec<f64> = runs.iter().map(|run| run.duration_ms).collect();
    let counts: Vec<f64> = runs.iter().filter_map(|run| run.results_count).map(|c| c as f64).collect();
    let mean = |values: &[f64]| (!values.is_empty()).then(|| round2(values.iter().sum::<f64>() / values.len() as f64));

    RunStats {
        runs: runs.len(),
        avg_ms: mean(&durations),
        p50_ms: percentile(&durations, 50.0).map(round2),
        p95_ms: percentile(&durations, 95.0).map(round2),
        min_ms: durations.iter().copied().reduce(f64::min).map(round2),
        max_ms: durations.iter().copied().reduce(f64::max).map(round2),
        success_rate: rate(runs.iter().filter(|run| run.succeeded()).count(), runs.len()),
        success_rate_ideal_results: rate(runs.iter().filter(|run| run.ideal()).count(), runs.len()),
        avg_results: mean(&counts),
    }
}

/// Linearly interpolated percentile, `p` in 0-100.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (sorted.len() - 1) as f64 * (p / 100.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    Some(sorted[lower] * (upper as f64 - rank) + sorted[upper] * (rank - lower as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn measurement(status: u16, duration_ms: f64, results: Option<usize>) -> Measurement {
        Measurement {
            status,
            duration_ms,
            results_count: results,
            filters: None,
        }
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&values, 50.0), Some(25.0));
        assert_eq!(percentile(&values, 0.0), Some(10.0));
        assert_eq!(percentile(&values, 100.0), Some(40.0));
        assert_eq!(percentile(&[7.0], 95.0), Some(7.0));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_summarize_rates() {
        let runs = [
            measurement(200, 100.0, Some(5)),
            measurement(200, 200.0, Some(2)),
            measurement(503, 300.0, None),
            measurement(200, 400.0, Some(10)),
        ];
        let stats = summarize(&runs);

        assert_eq!(stats.runs, 4);
        assert_eq!(stats.avg_ms, Some(250.0));
        assert_eq!(stats.min_ms, Some(100.0));
        assert_eq!(stats.max_ms, Some(400.0));
        assert_eq!(stats.success_rate, 0.75);
        assert_eq!(stats.success_rate_ideal_results, 0.5);
        assert_eq!(stats.avg_results, Some(5.67));
    }

    #[test]
    fn test_summarize_nothing() {
        let stats = summarize(&[]);
        assert_eq!(stats.runs, 0);
        assert_eq!(stats.avg_ms, None);
        assert_eq!(stats.success_rate, 0.0);
    }

    #[test]
    fn test_prompts_from_json() {
        assert_eq!(prompts_from_json(json!(["a", "b"])).unwrap(), vec!["a", "b"]);
        assert_eq!(prompts_from_json(json!({ "prompts": ["heist"] })).unwrap(), vec!["heist"]);
        assert!(prompts_from_json(json!({ "cases": [] })).is_err());
        assert!(prompts_from_json(json!("heist")).is_err());
        assert_eq!(load_prompts(None).unwrap().len(), DEFAULT_PROMPTS.len());
    }

    #[test]
    fn test_log_rows_are_tagged() {
        let row = LogRow::Run {
            prompt: "heist",
            iteration: 1,
            status: 200,
            duration_ms: 12.5,
            results_count: Some(5),
            filters: Some("query='heist'"),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["type"], "run");
        assert_eq!(value["results_count"], 5);
    }
}
