//! Static skill/agent phrase mapping table (spec §4.C): "a known skill
//! phrase (from a static mapping table), rewrite that phrase to the
//! CLI-specific skill identifier."

/// One entry: a natural-language phrase and the skill identifier it maps to.
pub struct SkillMapping {
    pub phrase: &'static str,
    pub identifier: &'static str,
}

/// Fixed table of recognised skill phrases. Order matters: longer, more
/// specific phrases are listed before their generic substrings so the
/// longest match wins.
pub const SKILL_TABLE: &[SkillMapping] = &[
    SkillMapping { phrase: "security review", identifier: "security-review" },
    SkillMapping { phrase: "code review", identifier: "code-review" },
    SkillMapping { phrase: "run the debate skill", identifier: "debate" },
    SkillMapping { phrase: "debate", identifier: "debate" },
    SkillMapping { phrase: "plan this out", identifier: "plan" },
    SkillMapping { phrase: "triage this bug", identifier: "bug-triage" },
];

/// Find the first (longest-first, by table order) skill phrase mentioned in
/// `prompt`, case-insensitively.
pub fn find_skill_phrase(prompt: &str) -> Option<&'static SkillMapping> {
    let lower = prompt.to_ascii_lowercase();
    SKILL_TABLE.iter().find(|entry| lower.contains(entry.phrase))
}

/// Rewrite the first matching skill phrase in `prompt` to the CLI-specific
/// identifier, prefixing with `skill:` when `requires_skill_prefix`.
pub fn rewrite_skill_phrase(prompt: &str, requires_skill_prefix: bool) -> String {
    let Some(mapping) = find_skill_phrase(prompt) else {
        return prompt.to_string();
    };

    let replacement = if requires_skill_prefix {
        format!("skill:{}", mapping.identifier)
    } else {
        mapping.identifier.to_string()
    };

    let lower = prompt.to_ascii_lowercase();
    let Some(start) = lower.find(mapping.phrase) else {
        return prompt.to_string();
    };
    let end = start + mapping.phrase.len();
    format!("{}{}{}", &prompt[..start], replacement, &prompt[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_known_phrase_case_insensitively() {
        let mapping = find_skill_phrase("Please run a Code Review on this PR").unwrap();
        assert_eq!(mapping.identifier, "code-review");
    }

    #[test]
    fn returns_none_for_unrecognised_prompt() {
        assert!(find_skill_phrase("fix the login bug").is_none());
    }

    #[test]
    fn rewrite_inserts_plain_identifier_without_prefix() {
        let rewritten = rewrite_skill_phrase("please do a code review here", false);
        assert_eq!(rewritten, "please do a code-review here");
    }

    #[test]
    fn rewrite_inserts_skill_prefixed_identifier() {
        let rewritten = rewrite_skill_phrase("please do a code review here", true);
        assert_eq!(rewritten, "please do a skill:code-review here");
    }

    #[test]
    fn rewrite_is_noop_when_no_phrase_matches() {
        let rewritten = rewrite_skill_phrase("fix the login bug", true);
        assert_eq!(rewritten, "fix the login bug");
    }
}
