//! Family-specific extraction regexes (spec §4.B.4): "the expressions are
//! part of the spec's state; each family has one set." Compiled once via
//! `OnceLock`, matching the teacher's `OnceLock`-memoized statics
//! (`cli.rs::build_version`).

use std::sync::OnceLock;

use regex::Regex;

use crate::types::Family;

/// One family's `(options, subcommands, examples)` extraction patterns.
pub struct FamilyPatterns {
    pub family: Family,
    pub option_re: Regex,
    pub subcommand_re: Regex,
    pub example_re: Regex,
}

fn anthropic() -> FamilyPatterns {
    FamilyPatterns {
        family: Family::Anthropic,
        option_re: Regex::new(r"(?m)^\s*(--[a-zA-Z][\w-]*|-[a-zA-Z])\b").unwrap(),
        subcommand_re: Regex::new(r"(?m)^\s{2,4}([a-z][\w-]*)\s{2,}(.+)$").unwrap(),
        example_re: Regex::new(r"(?m)^\s*(?:\$\s*)?claude\s+.+$").unwrap(),
    }
}

fn google() -> FamilyPatterns {
    FamilyPatterns {
        family: Family::Google,
        option_re: Regex::new(r"(?m)^\s*(--[a-zA-Z][\w-]*|-[a-zA-Z])\b").unwrap(),
        subcommand_re: Regex::new(r"(?m)^\s{2,4}([a-z][\w-]*)\s{2,}(.+)$").unwrap(),
        example_re: Regex::new(r"(?m)^\s*(?:\$\s*)?gemini\s+.+$").unwrap(),
    }
}

fn openai() -> FamilyPatterns {
    FamilyPatterns {
        family: Family::OpenAi,
        option_re: Regex::new(r"(?m)^\s*(--[a-zA-Z][\w-]*|-[a-zA-Z])\b").unwrap(),
        subcommand_re: Regex::new(r"(?m)^\s{2,4}([a-z][\w-]*)\s{2,}(.+)$").unwrap(),
        example_re: Regex::new(r"(?m)^\s*(?:\$\s*)?codex\s+.+$").unwrap(),
    }
}

fn alibaba() -> FamilyPatterns {
    FamilyPatterns {
        family: Family::Alibaba,
        option_re: Regex::new(r"(?m)^\s*(--[a-zA-Z][\w-]*|-[a-zA-Z])\b").unwrap(),
        subcommand_re: Regex::new(r"(?m)^\s{2,4}([a-z][\w-]*)\s{2,}(.+)$").unwrap(),
        example_re: Regex::new(r"(?m)^\s*(?:\$\s*)?(?:qwen|iflow)\s+.+$").unwrap(),
    }
}

fn github() -> FamilyPatterns {
    FamilyPatterns {
        family: Family::GitHub,
        option_re: Regex::new(r"(?m)^\s*(--[a-zA-Z][\w-]*|-[a-zA-Z])\b").unwrap(),
        subcommand_re: Regex::new(r"(?m)^\s{2,4}([a-z][\w-]*)\s{2,}(.+)$").unwrap(),
        example_re: Regex::new(r"(?m)^\s*(?:\$\s*)?copilot\s+.+$").unwrap(),
    }
}

fn generic() -> FamilyPatterns {
    FamilyPatterns {
        family: Family::Generic,
        option_re: Regex::new(r"(?m)^\s*(--[a-zA-Z][\w-]*|-[a-zA-Z])\b").unwrap(),
        subcommand_re: Regex::new(r"(?m)^\s{2,4}([a-z][\w-]*)\s{2,}(.+)$").unwrap(),
        example_re: Regex::new(r"(?m)^\s*(?:\$\s*).+$").unwrap(),
    }
}

fn table() -> &'static Vec<FamilyPatterns> {
    static TABLE: OnceLock<Vec<FamilyPatterns>> = OnceLock::new();
    TABLE.get_or_init(|| vec![anthropic(), google(), openai(), alibaba(), github(), generic()])
}

pub fn patterns_for(family: Family) -> &'static FamilyPatterns {
    table()
        .iter()
        .find(|p| p.family == family)
        .expect("every Family variant has a table entry")
}

/// Detect family from CLI name heuristics first, then help-text substring
/// scan, falling back to generic (spec §4.B.3).
pub fn detect_family(name: &str, help_text: &str) -> Family {
    let lower_name = name.to_ascii_lowercase();
    if lower_name.contains("claude") {
        return Family::Anthropic;
    }
    if lower_name.contains("gemini") {
        return Family::Google;
    }
    if lower_name.contains("codex") || lower_name.contains("copilot") {
        return if lower_name.contains("copilot") {
            Family::GitHub
        } else {
            Family::OpenAi
        };
    }
    if lower_name.contains("qwen") || lower_name.contains("iflow") {
        return Family::Alibaba;
    }

    let lower_help = help_text.to_ascii_lowercase();
    if lower_help.contains("anthropic") {
        Family::Anthropic
    } else if lower_help.contains("google") || lower_help.contains("gemini") {
        Family::Google
    } else if lower_help.contains("openai") {
        Family::OpenAi
    } else if lower_help.contains("alibaba") || lower_help.contains("qwen") {
        Family::Alibaba
    } else if lower_help.contains("github") {
        Family::GitHub
    } else {
        Family::Generic
    }
}
