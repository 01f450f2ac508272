use regex::bytes::Regex;

use crate::config::ConfigError;

/// What a pattern does when it matches the line being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternRole {
    /// Resets the time origin to the start of the matching line.
    Base,
    /// Records the first time it matches.
    Instant,
    /// Stops the read loop.
    Quit,
}

impl PatternRole {
    pub fn label(self) -> &'static str {
        match self {
            PatternRole::Base => "basepat",
            PatternRole::Instant => "instantpat",
            PatternRole::Quit => "quitpat",
        }
    }

    /// Base markers are whole lines, so they must match from the first byte.
    fn anchored(self) -> bool {
        matches!(self, PatternRole::Base)
    }

    /// Base markers are only checked once the terminator has arrived.
    fn matches_mid_line(self) -> bool {
        !matches!(self, PatternRole::Base)
    }
}

/// A compiled regex bound to one role. Matching runs on raw bytes so serial noise that is not
/// valid UTF-8 still gets scanned.
#[derive(Debug, Clone)]
pub struct LinePattern {
    role: PatternRole,
    source: String,
    regex: Regex,
}

impl LinePattern {
    pub fn new(role: PatternRole, source: &str) -> Result<Self, ConfigError> {
        let compiled = if role.anchored() {
            Regex::new(&format!(r"\A(?:{source})"))
        } else {
            Regex::new(source)
        };
        let regex = compiled.map_err(|source_err| ConfigError::InvalidPattern {
            role: role.label(),
            pattern: source.to_string(),
            source: source_err,
        })?;
        Ok(Self {
            role,
            source: source.to_string(),
            regex,
        })
    }

    pub fn role(&self) -> PatternRole {
        self.role
    }

    /// The pattern text as the user typed it.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check the accumulated line. `line_complete` is true when the last byte was `\n`.
    pub fn matches(&self, line: &[u8], line_complete: bool) -> bool {
        if !line_complete && !self.role.matches_mid_line() {
            return false;
        }
        // A base marker like `^START$` has to see the line without its terminator.
        let line = match line {
            [body @ .., b'\n'] if line_complete && self.role.anchored() => body,
            _ => line,
        };
        self.regex.is_match(line)
    }
}

/// Which roles fired for the current byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternHits {
    pub base: bool,
    pub instant: bool,
    pub quit: bool,
}

/// The three optional matchers, scanned the same way after every appended byte.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    pub base: Option<LinePattern>,
    pub instant: Option<LinePattern>,
    pub quit: Option<LinePattern>,
}

impl PatternSet {
    pub fn compile(
        base: Option<&str>,
        instant: Option<&str>,
        quit: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let build = |role, raw: Option<&str>| raw.map(|raw| LinePattern::new(role, raw)).transpose();
        Ok(Self {
            base: build(PatternRole::Base, base)?,
            instant: build(PatternRole::Instant, instant)?,
            quit: build(PatternRole::Quit, quit)?,
        })
    }

    /// Run every configured matcher over `line`. Callers skip roles they no longer care about
    /// through `want_instant`.
    pub fn scan(&self, line: &[u8], line_complete: bool, want_instant: bool) -> PatternHits {
        let hit = |pattern: &Option<LinePattern>| {
            pattern
                .as_ref()
                .is_some_and(|pattern| pattern.matches(line, line_complete))
        };
        PatternHits {
            base: hit(&self.base),
            instant: want_instant && hit(&self.instant),
            quit: hit(&self.quit),
        }
    }

    /// The configured patterns, base first.
    pub fn iter(&self) -> impl Iterator<Item = &LinePattern> {
        [&self.base, &self.instant, &self.quit]
            .into_iter()
            .filter_map(Option::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_none() && self.instant.is_none() && self.quit.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_pattern_requires_line_start() {
        let pattern = LinePattern::new(PatternRole::Base, "START").expect("valid regex");
        assert!(pattern.matches(b"STARTed\n", true));
        assert!(!pattern.matches(b"reSTART\n", true));
    }

    #[test]
    fn base_pattern_ignores_partial_lines() {
        let pattern = LinePattern::new(PatternRole::Base, "^START").expect("valid regex");
        assert!(!pattern.matches(b"START", false));
        assert!(pattern.matches(b"START\n", true));
    }

    #[test]
    fn base_end_anchor_ignores_only_the_final_newline() {
        let pattern = LinePattern::new(PatternRole::Base, "^U-Boot 2020$").expect("valid regex");
        assert!(pattern.matches(b"U-Boot 2020\n", true));
        assert!(!pattern.matches(b"U-Boot 2020\n\n", true));
        assert!(!pattern.matches(b"U-Boot 2020.01\n", true));
    }

    #[test]
    fn anchoring_wraps_alternations() {
        let pattern = LinePattern::new(PatternRole::Base, "boot|BOOT").expect("valid regex");
        assert!(!pattern.matches(b"reboot\n", true));
        assert!(pattern.matches(b"BOOT ok\n", true));
    }

    #[test]
    fn instant_and_quit_match_anywhere_mid_line() {
        let instant = LinePattern::new(PatternRole::Instant, "READY").expect("valid regex");
        let quit = LinePattern::new(PatternRole::Quit, "login:").expect("valid regex");
        assert!(instant.matches(b"system READY", false));
        assert!(quit.matches(b"host login:", false));
        assert!(!quit.matches(b"host login", false));
    }

    #[test]
    fn matches_non_utf8_lines() {
        let pattern = LinePattern::new(PatternRole::Quit, "OK").expect("valid regex");
        assert!(pattern.matches(&[0xff, 0xfe, b'O', b'K'], false));
    }

    #[test]
    fn as_str_keeps_user_text() {
        let pattern = LinePattern::new(PatternRole::Base, "^START").expect("valid regex");
        assert_eq!(pattern.as_str(), "^START");
        assert_eq!(pattern.role(), PatternRole::Base);
    }

    #[test]
    fn invalid_regex_reports_role() {
        let err = LinePattern::new(PatternRole::Instant, "(").expect_err("regex should fail");
        assert!(err.to_string().contains("instantpat"));
    }

    #[test]
    fn scan_reports_each_role_independently() {
        let set = PatternSet::compile(Some("boot"), Some("READY"), Some("halt"))
            .expect("patterns compile");
        let hits = set.scan(b"boot READY halt\n", true, true);
        assert_eq!(
            hits,
            PatternHits {
                base: true,
                instant: true,
                quit: true
            }
        );
        let hits = set.scan(b"boot READY", false, false);
        assert_eq!(hits, PatternHits::default());
    }

    #[test]
    fn iter_lists_configured_roles_in_order() {
        let set = PatternSet::compile(Some("boot"), None, Some("halt")).expect("patterns compile");
        let roles: Vec<_> = set.iter().map(LinePattern::role).collect();
        assert_eq!(roles, vec![PatternRole::Base, PatternRole::Quit]);
    }

    #[test]
    fn empty_set_never_hits() {
        let set = PatternSet::default();
        assert!(set.is_empty());
        assert_eq!(set.scan(b"anything\n", true, true), PatternHits::default());
    }
}
