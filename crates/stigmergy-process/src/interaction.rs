//! Streaming scanner for interactive-prompt tokens in child stdout (spec §4.D.2, §9).
//!
//! The regex is intentionally loose — it is meant to catch a CLI that is
//! blocked waiting for a human, not to precisely parse any one tool's UI.
//! Spec §9 Open Question (a) treats the debounce as part of the
//! specification, not an incidental detail: a match only fires once it sits
//! at the tail of the most recently read chunk, or once [`IDLE_DEBOUNCE`]
//! has elapsed with no further stdout activity. This prevents killing a CLI
//! that merely prints prose containing a matching token mid-stream (e.g. a
//! code sample showing `(y/n)`).

use regex::Regex;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

pub const IDLE_DEBOUNCE: Duration = Duration::from_millis(200);

fn prompt_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(>>>?\s*$|\(y/n\)|\[y/n\]|continue\?|press any key|do you want to proceed|overwrite\?|¿contin[uú]ar\?|是否继续|続行しますか)",
        )
        .expect("interaction prompt regex is valid")
    })
}

/// Tracks whether a just-observed regex match should be treated as a live
/// interactive prompt, given the debounce rule above.
#[derive(Debug, Default)]
pub struct InteractionScanner {
    pending_since: Option<Instant>,
}

/// Outcome of feeding one stdout chunk to the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanResult {
    /// No match pending.
    Clear,
    /// A match was seen but hasn't satisfied the debounce yet.
    Pending,
    /// The debounce condition was satisfied — treat this as a live prompt.
    Detected,
}

impl InteractionScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a freshly-read chunk (decoded so far) plus the full accumulated
    /// output buffer. Returns `Detected` immediately if the match sits at
    /// the tail of `chunk`.
    pub fn observe_chunk(&mut self, chunk: &str) -> ScanResult {
        let Some(m) = prompt_pattern().find(chunk) else {
            // A chunk with no match clears any pending detection — the
            // debounce is specifically "idle period with no further output",
            // and new output without the pattern means the tool kept going.
            self.pending_since = None;
            return ScanResult::Clear;
        };

        if chunk[m.end()..].trim().is_empty() {
            // match sits at (or near) the tail of this chunk
            return ScanResult::Detected;
        }

        self.pending_since = Some(Instant::now());
        ScanResult::Pending
    }

    /// Called on each idle tick (no stdout activity this tick) to check
    /// whether a pending match has aged past [`IDLE_DEBOUNCE`].
    pub fn poll_idle(&mut self) -> ScanResult {
        match self.pending_since {
            Some(since) if since.elapsed() >= IDLE_DEBOUNCE => ScanResult::Detected,
            Some(_) => ScanResult::Pending,
            None => ScanResult::Clear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_match_at_tail_of_chunk() {
        let mut scanner = InteractionScanner::new();
        assert_eq!(scanner.observe_chunk("Continue? "), ScanResult::Detected);
    }

    #[test]
    fn detects_yn_token() {
        let mut scanner = InteractionScanner::new();
        assert_eq!(scanner.observe_chunk("Overwrite file foo.txt (y/n)"), ScanResult::Detected);
    }

    #[test]
    fn non_tail_match_is_pending_not_detected() {
        let mut scanner = InteractionScanner::new();
        let result = scanner.observe_chunk("Continue? yes, doing more work after this\n");
        assert_eq!(result, ScanResult::Pending);
    }

    #[test]
    fn pending_match_clears_when_chunk_has_no_match() {
        let mut scanner = InteractionScanner::new();
        scanner.observe_chunk("Continue? still working\n");
        assert_eq!(scanner.observe_chunk("more ordinary output\n"), ScanResult::Clear);
        assert_eq!(scanner.poll_idle(), ScanResult::Clear);
    }

    #[test]
    fn pending_match_eventually_detected_after_idle() {
        let mut scanner = InteractionScanner::new();
        scanner.observe_chunk("Continue? still working\n");
        assert_eq!(scanner.poll_idle(), ScanResult::Pending);
        std::thread::sleep(IDLE_DEBOUNCE + Duration::from_millis(50));
        assert_eq!(scanner.poll_idle(), ScanResult::Detected);
    }

    #[test]
    fn no_match_is_clear() {
        let mut scanner = InteractionScanner::new();
        assert_eq!(scanner.observe_chunk("regular stdout line\n"), ScanResult::Clear);
    }

    #[test]
    fn code_snippet_with_yn_in_prose_debounces() {
        // A CLI echoing a code sample like `if confirm (y/n): ...` should not
        // trigger instantly — it's mid-chunk, not at the tail, so it only
        // becomes `Detected` if the tool then goes idle.
        let mut scanner = InteractionScanner::new();
        let r1 = scanner.observe_chunk("example: if confirm (y/n): proceed\nmore explanation\n");
        assert_eq!(r1, ScanResult::Pending);
    }
}
