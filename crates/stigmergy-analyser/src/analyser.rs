//! Help Analyser (spec §4.B): probe a CLI's `--help` output and extract a
//! [`CliPattern`]. Grounded on `csa-process::lib.rs`'s spawn-with-timeout
//! style, reused here for a much shorter-lived probe than a full task run.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use chrono::Utc;
use stigmergy_process::shell::build_shell_command;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::cache::{self, PatternCache};
use crate::families::{detect_family, patterns_for};
use crate::types::{CliPattern, InteractionMode, Subcommand};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const PER_CLI_BUDGET: Duration = Duration::from_secs(60);
const OVERALL_ANALYSIS_BUDGET: Duration = Duration::from_secs(120);
const TTL: chrono::Duration = chrono::Duration::hours(24);

/// Options accepted by [`analyse`] (spec §4.B `options`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyseOptions {
    pub enhanced: bool,
    pub force_refresh: bool,
}

/// Run `binary` with `args`, with a short timeout, returning combined
/// stdout+stderr as the analyser treats either stream as evidence of
/// a successful probe (spec §4.B.2: "first probe that produces non-empty
/// output on stdout or stderr wins"). Shell-wrapped via the same
/// `sh -c` invocation the Process Supervisor uses (spec §4.B.2:
/// "shell-style invocation"), so a help/version probe resolves shims
/// (nvm/pyenv/npm bin wrappers) the same way a real invocation would.
async fn run_probe(binary: &str, args: &[String]) -> Option<String> {
    let mut argv = vec![binary.to_string()];
    argv.extend(args.iter().cloned());
    let line = build_shell_command(&argv);

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&line);
    cmd.env("FORCE_COLOR", "0");
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let child = cmd.spawn().ok()?;
    let output = tokio::time::timeout(PROBE_TIMEOUT, child.wait_with_output())
        .await
        .ok()?
        .ok()?;

    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    if combined.trim().is_empty() {
        None
    } else {
        Some(combined)
    }
}

fn extract_options(help_text: &str, option_re: &regex::Regex) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    for caps in option_re.captures_iter(help_text) {
        if let Some(m) = caps.get(1) {
            seen.insert(m.as_str().to_string());
        }
    }
    seen.into_iter().collect()
}

fn extract_subcommands(help_text: &str, subcommand_re: &regex::Regex) -> Vec<Subcommand> {
    subcommand_re
        .captures_iter(help_text)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_string();
            let description = caps.get(2).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
            Some(Subcommand { name, description })
        })
        .collect()
}

fn extract_examples(help_text: &str, example_re: &regex::Regex) -> Vec<String> {
    example_re
        .find_iter(help_text)
        .map(|m| m.as_str().trim().to_string())
        .take(10)
        .collect()
}

/// Identify the flag believed to carry the prompt (spec §4.B.5).
fn detect_prompt_flag(options: &[String], help_text: &str) -> Option<String> {
    let keyword_re = regex::Regex::new(r"(?i)prompt|input|query|question").unwrap();
    options
        .iter()
        .find(|opt| {
            let window = help_window(help_text, opt);
            keyword_re.is_match(&window)
        })
        .cloned()
}

/// Identify the flag believed to suppress interactive prompts (spec §4.B.5).
fn detect_non_interactive_flag(options: &[String], help_text: &str) -> Option<String> {
    let keyword_re =
        regex::Regex::new(r"(?i)non-interactive|batch|no-input|stdin|print|pipe|exit").unwrap();
    options
        .iter()
        .find(|opt| {
            let window = help_window(help_text, opt);
            keyword_re.is_match(&window)
        })
        .cloned()
}

/// The line containing `needle`, used as local context for flag heuristics.
fn help_window(help_text: &str, needle: &str) -> String {
    help_text
        .lines()
        .find(|line| line.contains(needle))
        .unwrap_or("")
        .to_string()
}

/// Classify interaction mode (spec §4.B.6).
fn classify_interaction_mode(non_interactive_flag: &Option<String>, help_text: &str) -> InteractionMode {
    if non_interactive_flag.is_some() {
        return InteractionMode::NonInteractive;
    }
    let lower = help_text.to_ascii_lowercase();
    if lower.contains("stdin") || lower.contains("pipe") {
        InteractionMode::StdinSupport
    } else if lower.contains("batch") || lower.contains("script") {
        InteractionMode::BatchMode
    } else {
        InteractionMode::Interactive
    }
}

/// Probe `binary` across `help_probes` in order, returning the first probe's
/// non-empty output (spec §4.B.2).
async fn probe_help(binary: &str, help_probes: &[Vec<String>]) -> Option<String> {
    for probe in help_probes {
        if let Some(text) = run_probe(binary, probe).await {
            return Some(text);
        }
    }
    None
}

/// Probe `binary`'s version (spec §3 `version`, used for cache staleness).
async fn probe_version(binary: &str, version_probe: &[String]) -> String {
    run_probe(binary, version_probe)
        .await
        .map(|s| s.lines().next().unwrap_or("unknown").trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Analyse one CLI, consulting and updating the on-disk pattern cache
/// (spec §4.B `analyse(name, options)`).
pub async fn analyse(
    name: &str,
    binary: &str,
    version_probe: &[String],
    help_probes: &[Vec<String>],
    options: AnalyseOptions,
    cache_path: &Path,
) -> CliPattern {
    let mut cache = cache::load(cache_path).unwrap_or_default();
    let now = Utc::now();

    if !options.force_refresh {
        if let Some(cached) = cache.cli_patterns.get(name).cloned() {
            let current_version = probe_version(binary, version_probe).await;
            if !cached.is_stale(&current_version, now, TTL) {
                debug!(cli = name, "pattern cache hit");
                return cached;
            }
        }
    }

    let budgeted = tokio::time::timeout(PER_CLI_BUDGET, async {
        let version = probe_version(binary, version_probe).await;
        match probe_help(binary, help_probes).await {
            Some(help_text) => {
                let family = detect_family(name, &help_text);
                let fam_patterns = patterns_for(family);
                let options_found = extract_options(&help_text, &fam_patterns.option_re);
                let subcommands = extract_subcommands(&help_text, &fam_patterns.subcommand_re);
                let examples = extract_examples(&help_text, &fam_patterns.example_re);
                let prompt_flag = detect_prompt_flag(&options_found, &help_text);
                let non_interactive_flag = detect_non_interactive_flag(&options_found, &help_text);
                let interaction_mode = classify_interaction_mode(&non_interactive_flag, &help_text);

                CliPattern {
                    name: name.to_string(),
                    version,
                    family,
                    options: options_found,
                    subcommands,
                    prompt_flag,
                    non_interactive_flag,
                    examples,
                    interaction_mode,
                    timestamp: now,
                    last_failure: None,
                    degraded: false,
                }
            }
            None => CliPattern::degraded(name, &version, "no help probe produced output", now),
        }
    })
    .await;

    let pattern = match budgeted {
        Ok(pattern) => pattern,
        Err(_) => CliPattern::degraded(name, "unknown", "analysis exceeded per-CLI budget", now),
    };

    if pattern.degraded {
        if let Some(failure) = &pattern.last_failure {
            cache.record_failure(name, failure.error.clone(), now);
        }
    } else {
        cache.record_pattern(pattern.clone(), now);
    }
    let _ = cache::save(cache_path, &cache);

    pattern
}

/// One CLI's probe inputs, as handed to [`analyse_all`].
#[derive(Debug, Clone, Copy)]
pub struct ProbeSpec<'a> {
    pub name: &'a str,
    pub binary: &'a str,
    pub version_probe: &'a [String],
    pub help_probes: &'a [Vec<String>],
}

/// Analyse every CLI in `specs` in parallel under a single 120 s ceiling
/// (spec §4.B "Concurrency": "analyses of distinct CLIs proceed in
/// parallel with a per-CLI 60 s budget and an overall 120 s ceiling;
/// over-budget analyses are abandoned and reported as degraded
/// patterns"). A CLI whose own [`analyse`] call is still running when the
/// overall ceiling expires is reported degraded rather than dropped, so
/// the caller always gets one [`CliPattern`] per input spec, in order
/// (spec §8 S5: a timed-out CLI "does not prevent other CLIs from
/// completing").
pub async fn analyse_all(
    specs: &[ProbeSpec<'_>],
    options: AnalyseOptions,
    cache_path: &Path,
) -> Vec<CliPattern> {
    let analyses = specs.iter().map(|spec| {
        analyse(spec.name, spec.binary, spec.version_probe, spec.help_probes, options, cache_path)
    });

    match tokio::time::timeout(OVERALL_ANALYSIS_BUDGET, futures::future::join_all(analyses)).await {
        Ok(patterns) => patterns,
        Err(_) => {
            warn!("multi-CLI analysis exceeded the overall 120s ceiling");
            let now = Utc::now();
            specs
                .iter()
                .map(|spec| CliPattern::degraded(spec.name, "unknown", "overall analysis budget exceeded", now))
                .collect()
        }
    }
}
