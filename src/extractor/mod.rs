use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Show name, season and episode recovered from a filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedInfo {
    pub show_name: String,
    pub season: u32,
    pub episode: u32,
}

/// Capability shared by every filename pattern
pub trait PatternMatcher: Send + Sync {
    /// Stable identifier, used in logs and to lock the evaluation order in tests
    fn name(&self) -> &str;

    /// Attempt to read a show/season/episode triple out of `filename`
    fn try_match(&self, filename: &str) -> Option<ExtractedInfo>;
}

/// A single structural filename pattern
#[derive(Debug, Clone)]
pub struct EpisodePattern {
    pub name: String,
    pub description: String,
    pub example: String,
    /// Must expose `show` and `episode` groups. Without a `season` group the season is 1.
    pub pattern: Regex,
}

impl PatternMatcher for EpisodePattern {
    fn name(&self) -> &str {
        &self.name
    }

    fn try_match(&self, filename: &str) -> Option<ExtractedInfo> {
        let caps = self.pattern.captures(filename)?;

        let episode: u32 = caps.name("episode")?.as_str().parse().ok()?;
        let season: u32 = match caps.name("season") {
            Some(season) => season.as_str().parse().ok()?,
            None => 1,
        };

        if season == 0 || episode == 0 {
            trace!("Pattern '{}' matched '{}' with a zero number", self.name, filename);
            return None;
        }

        let raw_show = caps.name("show").map_or("", |m| m.as_str());

        Some(ExtractedInfo {
            show_name: normalize_show_name(raw_show),
            season,
            episode,
        })
    }
}

/// Ordered collection of patterns. The first pattern that matches wins.
pub struct PatternExtractor {
    patterns: Vec<Box<dyn PatternMatcher>>,
}

static DEFAULT_EXTRACTOR: Lazy<PatternExtractor> = Lazy::new(PatternExtractor::new);

/// Extract episode information using the built-in pattern order
pub fn extract(filename: &str) -> Option<ExtractedInfo> {
    DEFAULT_EXTRACTOR.extract(filename)
}

impl PatternExtractor {
    pub fn new() -> Self {
        let mut patterns: Vec<Box<dyn PatternMatcher>> = Vec::new();

        // Pattern 1: release-group tag followed by an episode number only
        // Example: [Fansub]MyShow-07.mkv -> MyShow, season 1, episode 7
        patterns.push(Box::new(EpisodePattern {
            name: "bracket_tag_episode".to_string(),
            description: "Bracketed tag, show name, episode number; season defaults to 1"
                .to_string(),
            example: "[Fansub]MyShow-07.mkv".to_string(),
            pattern: builtin_regex(
                r"^\[[^\]]*\][\s._-]*(?P<show>.*?)[\s._-]+(?P<episode>\d{2,3})(?:\D|$)",
            ),
        }));

        // Pattern 2: Show.Name.S01E02
        patterns.push(Box::new(EpisodePattern {
            name: "season_episode_markers".to_string(),
            description: "SxxExx markers".to_string(),
            example: "Show.Name.S01E02.mkv".to_string(),
            pattern: builtin_regex(
                r"(?i)^(?P<show>.*?)[\s._-]S(?P<season>\d{1,2})E(?P<episode>\d{1,2})(?:\D|$)",
            ),
        }));

        // Pattern 3: Show.Name.1x02
        patterns.push(Box::new(EpisodePattern {
            name: "season_x_episode".to_string(),
            description: "Season 'x' episode".to_string(),
            example: "Show.Name.1x02.mkv".to_string(),
            pattern: builtin_regex(
                r"(?i)^(?P<show>.*?)[\s._-](?P<season>\d{1,2})x(?P<episode>\d{1,2})(?:\D|$)",
            ),
        }));

        // Pattern 4: Show.Name.102. Must stay behind the marker forms above.
        patterns.push(Box::new(EpisodePattern {
            name: "compact_three_digit".to_string(),
            description: "Single season digit followed by two episode digits".to_string(),
            example: "Show.Name.102.mkv".to_string(),
            pattern: builtin_regex(
                r"^(?P<show>.*?)[\s._-](?P<season>\d)(?P<episode>\d{2})(?:\D|$)",
            ),
        }));

        // Pattern 5: Show.Name.Season.1.Episode.02
        patterns.push(Box::new(EpisodePattern {
            name: "verbose_season_episode".to_string(),
            description: "Spelled-out Season and Episode words".to_string(),
            example: "Show.Name.Season.1.Episode.02.mkv".to_string(),
            pattern: builtin_regex(
                r"(?i)^(?P<show>.*?)[\s._-]Season[\s._-]?(?P<season>\d{1,2})[\s._-]Episode[\s._-]?(?P<episode>\d{1,2})(?:\D|$)",
            ),
        }));

        // Pattern 6: Show.Name.E02.S01, episode marker first
        patterns.push(Box::new(EpisodePattern {
            name: "episode_before_season".to_string(),
            description: "Exx marker preceding Sxx marker".to_string(),
            example: "Show.Name.E02.S01.mkv".to_string(),
            pattern: builtin_regex(
                r"(?i)^(?P<show>.*?)[\s._-]E(?P<episode>\d{1,2})[\s._-]S(?P<season>\d{1,2})(?:\D|$)",
            ),
        }));

        Self { patterns }
    }

    /// Build an extractor from a custom ordered list of matchers
    pub fn with_patterns(patterns: Vec<Box<dyn PatternMatcher>>) -> Self {
        Self { patterns }
    }

    /// Run the patterns in order and return the first match
    pub fn extract(&self, filename: &str) -> Option<ExtractedInfo> {
        for pattern in &self.patterns {
            if let Some(info) = pattern.try_match(filename) {
                debug!(
                    "Pattern '{}' matched '{}': show='{}', S{:02}E{:02}",
                    pattern.name(),
                    filename,
                    info.show_name,
                    info.season,
                    info.episode
                );
                return Some(info);
            }
        }

        debug!("No pattern matched for filename: {}", filename);
        None
    }

    /// Names of the patterns in evaluation order
    pub fn pattern_names(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.name()).collect()
    }

    pub fn patterns(&self) -> &[Box<dyn PatternMatcher>] {
        &self.patterns
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile one of the built-in pattern literals
fn builtin_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

/// Dots, underscores and square brackets become spaces; whitespace is collapsed and trimmed.
pub fn normalize_show_name(raw: &str) -> String {
    let spaced: String = raw
        .chars()
        .map(|c| match c {
            '.' | '_' | '[' | ']' => ' ',
            other => other,
        })
        .collect();

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
