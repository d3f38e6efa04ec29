use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use regex::Regex;

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)*").expect("version pattern is valid"));

/// Pulls the first dotted numeric token out of a tool's `-v` output.
///
/// `"Vagrant 1.8.1\n"` gives `Some("1.8.1")`. Best effort: the token is not
/// checked for semantic-versioning form.
pub fn extract_version(output: &str) -> Option<String> {
    VERSION_PATTERN
        .find(output)
        .map(|found| found.as_str().to_string())
}

/// A loose, purely numeric dotted version such as `1`, `1.8` or `1.8.1.2`.
///
/// Components compare numerically from left to right and a missing trailing
/// component counts as zero, so `2` and `2.0.0` are equal.
#[derive(Debug, Clone)]
pub struct Version {
    segments: Vec<u64>,
}

impl Version {
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// The exclusive upper bound of a pessimistic `~>` constraint.
    ///
    /// Drops the last component (unless it is the only one) and increments
    /// the new last one: `1.2.3` → `1.3`, `1.2` → `2`, `1` → `2`.
    ///
    /// `None` when that component is already `u64::MAX`; there is no upper bound then.
    pub fn bump(&self) -> Option<Version> {
        let mut segments = self.segments.clone();
        if segments.len() > 1 {
            segments.pop();
        }
        let last = segments.last_mut()?;
        *last = last.checked_add(1)?;
        Some(Version { segments })
    }

    fn segment(&self, idx: usize) -> u64 {
        self.segments.get(idx).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVersionError {
    input: String,
}

impl fmt::Display for ParseVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Malformed version number string {}", self.input)
    }
}

impl std::error::Error for ParseVersionError {}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseVersionError { input: s.to_string() };
        if trimmed.is_empty() {
            return Err(err());
        }
        let segments = trimmed
            .split('.')
            .map(|part| {
                if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
                    part.parse::<u64>().map_err(|_| err())
                } else {
                    Err(err())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Version { segments })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.segments.iter().map(u64::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|idx| self.segment(idx).cmp(&other.segment(idx)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}
