use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use unscanny::Scanner;

/// Optional prerelease modifier (alpha, beta or release candidate) appended to a version.
///
/// <https://peps.python.org/pep-0440/#pre-releases>
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PrereleaseKind {
    /// alpha prerelease
    Alpha,
    /// beta prerelease
    Beta,
    /// release candidate prerelease
    Rc,
}

impl PrereleaseKind {
    /// Map a (lowercase) prerelease spelling onto its kind, e.g. `preview` onto [`Self::Rc`].
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "a" | "alpha" => Some(Self::Alpha),
            "b" | "beta" => Some(Self::Beta),
            "c" | "rc" | "pre" | "preview" => Some(Self::Rc),
            _ => None,
        }
    }
}

impl Display for PrereleaseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alpha => write!(f, "a"),
            Self::Beta => write!(f, "b"),
            Self::Rc => write!(f, "rc"),
        }
    }
}

/// A prerelease kind together with its counter, e.g. `rc2`.
///
/// The derived ordering compares the kind first and the counter second.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Prerelease {
    /// The kind of prerelease.
    pub kind: PrereleaseKind,
    /// The counter following the kind, `0` when omitted.
    pub number: u64,
}

impl Display for Prerelease {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.kind, self.number)
    }
}

/// A part of the [local version identifier](<https://peps.python.org/pep-0440/#local-version-identifiers>)
///
/// > If a segment consists entirely of ASCII digits then that section should be considered an
/// > integer for comparison purposes and if a segment contains any ASCII letters then that
/// > segment is compared lexicographically with case insensitivity. When comparing a numeric and
/// > lexicographic segment, the numeric section always compares as greater than the lexicographic
/// > segment.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum LocalSegment {
    /// A segment containing at least one letter, stored lowercase.
    String(String),
    /// A segment made only of ASCII digits.
    Number(u64),
}

impl LocalSegment {
    fn parse(segment: &str) -> Option<Self> {
        if segment.bytes().all(|byte| byte.is_ascii_digit()) {
            segment.parse().ok().map(Self::Number)
        } else {
            Some(Self::String(segment.to_ascii_lowercase()))
        }
    }
}

impl Display for LocalSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(string) => write!(f, "{string}"),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl PartialOrd for LocalSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LocalSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(n1), Self::Number(n2)) => n1.cmp(n2),
            (Self::String(s1), Self::String(s2)) => s1.cmp(s2),
            (Self::Number(_), Self::String(_)) => Ordering::Greater,
            (Self::String(_), Self::Number(_)) => Ordering::Less,
        }
    }
}

/// Which parts of a version [`VersionIdentifier::compare_with`] skips.
///
/// The epoch and the release are always compared.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompareOptions {
    /// Skip the local version label.
    pub ignore_local: bool,
    /// Skip the prerelease, including the "plain dev-release sorts first" rule.
    pub ignore_pre: bool,
    /// Skip the postrelease and the devrelease.
    pub ignore_post: bool,
}

impl CompareOptions {
    /// Compare every part of the version; this is what [`Ord`] uses.
    pub const ALL: Self = Self {
        ignore_local: false,
        ignore_pre: false,
        ignore_post: false,
    };

    /// Compare only the epoch and the release.
    pub const RELEASE_ONLY: Self = Self {
        ignore_local: true,
        ignore_pre: true,
        ignore_post: true,
    };
}

/// A version identifier such as `1.2.3` or `4!5.6.7-a8.post9.dev0+local`.
///
/// Parsing never fails: text that does not follow PEP 440 produces an identifier with
/// [`Self::is_valid`] unset, a release of `[0]` and the (trimmed) input retained, so that such
/// identifiers still take part in comparisons. Callers that need a well-formed version must check
/// the flag.
///
/// ```rust
/// use pyprovider_pep440::VersionIdentifier;
///
/// let version = VersionIdentifier::parse("1.0alpha2");
/// assert_eq!(version.to_string(), "1.0a2");
/// assert!(version < VersionIdentifier::parse("1.0"));
/// ```
#[derive(Debug, Clone)]
pub struct VersionIdentifier {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<Prerelease>,
    post: Option<u64>,
    dev: Option<u64>,
    /// Empty when there is no local version label.
    local: Vec<LocalSegment>,
    wildcard: bool,
    valid: bool,
    raw: String,
}

impl VersionIdentifier {
    /// Parse a version such as `1.19`, `1.0a1`, `1.0+abc.5` or `1!2012.2`.
    ///
    /// A trailing `.*` is a grammar violation here, see [`Self::parse_wildcard`].
    pub fn parse(text: &str) -> Self {
        Self::parse_impl(text, false)
    }

    /// Like [`Self::parse`], but also accepts a release ending in `.*` (with nothing after it),
    /// as used by the operands of `==` and `!=` specifiers.
    pub fn parse_wildcard(text: &str) -> Self {
        Self::parse_impl(text, true)
    }

    fn parse_impl(text: &str, allow_wildcard: bool) -> Self {
        let raw = text.trim();
        let normalized = raw.to_ascii_lowercase();
        match Parser::new(&normalized, allow_wildcard).parse() {
            Ok(parts) => Self {
                epoch: parts.epoch,
                release: parts.release,
                pre: parts.pre,
                post: parts.post,
                dev: parts.dev,
                local: parts.local,
                wildcard: parts.wildcard,
                valid: true,
                raw: raw.to_string(),
            },
            Err(GrammarViolation) => {
                #[cfg(feature = "tracing")]
                tracing::trace!("Version `{raw}` does not follow PEP 440");
                Self {
                    epoch: 0,
                    release: vec![0],
                    pre: None,
                    post: None,
                    dev: None,
                    local: Vec::new(),
                    wildcard: false,
                    valid: false,
                    raw: raw.to_string(),
                }
            }
        }
    }

    /// Constructor for a version that is just a release such as `3.8`.
    pub fn from_release(release: Vec<u64>) -> Self {
        let release = if release.is_empty() { vec![0] } else { release };
        let raw = release
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Self {
            epoch: 0,
            release,
            pre: None,
            post: None,
            dev: None,
            local: Vec::new(),
            wildcard: false,
            valid: true,
            raw,
        }
    }

    /// The [versioning epoch](https://peps.python.org/pep-0440/#version-epochs).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The release segments, such as `[1, 2, 3]` in `4!1.2.3-a8.post9.dev1`.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// The prerelease, if any.
    pub fn pre(&self) -> Option<Prerelease> {
        self.pre
    }

    /// The postrelease counter, if any.
    pub fn post(&self) -> Option<u64> {
        self.post
    }

    /// The devrelease counter, if any.
    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    /// The local version label segments, empty if there is none.
    pub fn local(&self) -> &[LocalSegment] {
        &self.local
    }

    /// Whether the text followed PEP 440.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the release ended in `.*`. Only [`Self::parse_wildcard`] produces these.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// The trimmed input text, before any normalization.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether this is an alpha/beta/rc or dev version.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Whether this is a post version.
    pub fn is_post(&self) -> bool {
        self.post.is_some()
    }

    /// Whether this is a dev version.
    pub fn is_dev(&self) -> bool {
        self.dev.is_some()
    }

    /// Whether this is a local version (e.g. `1.2.3+localsuffixesareweird`).
    pub fn is_local(&self) -> bool {
        !self.local.is_empty()
    }

    /// A plain dev-release like `1.0.dev1` sorts before every prerelease of the same release.
    fn is_plain_dev(&self) -> bool {
        self.dev.is_some() && self.pre.is_none() && self.post.is_none()
    }

    /// Returns a copy without the local version label.
    #[must_use]
    pub fn without_local(&self) -> Self {
        Self {
            local: Vec::new(),
            ..self.clone()
        }
    }

    /// Whether every release segment of `self` equals the corresponding segment of `other`,
    /// within the same epoch. Missing trailing segments of `other` count as `0`; prerelease,
    /// postrelease, devrelease and local parts are ignored.
    ///
    /// This is how a requested `3.2` selects an interpreter reporting `3.2.7`.
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.epoch == other.epoch && starts_with_release(&other.release, &self.release)
    }

    /// Compare two versions, skipping the parts selected in `options`.
    ///
    /// The priority is epoch, release (zero padded), prerelease, postrelease and devrelease,
    /// then local.
    pub fn compare_with(&self, other: &Self, options: CompareOptions) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_release(&self.release, &other.release))
            .then_with(|| {
                if options.ignore_pre {
                    return Ordering::Equal;
                }
                match (self.is_plain_dev(), other.is_plain_dev()) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    // A missing prerelease sorts after every prerelease
                    _ => match (self.pre, other.pre) {
                        (None, None) => Ordering::Equal,
                        (None, Some(_)) => Ordering::Greater,
                        (Some(_), None) => Ordering::Less,
                        (Some(this), Some(other)) => this.cmp(&other),
                    },
                }
            })
            .then_with(|| {
                if options.ignore_post {
                    return Ordering::Equal;
                }
                // Any post release sorts after no post release, while any dev release sorts
                // before no dev release.
                self.post
                    .cmp(&other.post)
                    .then_with(|| match (self.dev, other.dev) {
                        (None, None) => Ordering::Equal,
                        (None, Some(_)) => Ordering::Greater,
                        (Some(_), None) => Ordering::Less,
                        (Some(this), Some(other)) => this.cmp(&other),
                    })
            })
            .then_with(|| {
                if options.ignore_local {
                    return Ordering::Equal;
                }
                // Lexicographic over the segments, a longer label wins a tie
                self.local.cmp(&other.local)
            })
    }
}

/// Compare the release parts of two versions, e.g. `4.3.1` > `4.2`, `1.1.0` == `1.1` and
/// `1.16` < `1.19`.
pub(crate) fn compare_release(this: &[u64], other: &[u64]) -> Ordering {
    // "When comparing release segments with different numbers of components, the shorter segment
    // is padded out with additional zeros as necessary"
    let len = this.len().max(other.len());
    (0..len)
        .map(|index| {
            let this = this.get(index).copied().unwrap_or(0);
            let other = other.get(index).copied().unwrap_or(0);
            this.cmp(&other)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Whether `release`, padded with zeros, starts with `prefix`.
pub(crate) fn starts_with_release(release: &[u64], prefix: &[u64]) -> bool {
    prefix
        .iter()
        .enumerate()
        .all(|(index, segment)| release.get(index).copied().unwrap_or(0) == *segment)
}

/// Shows the normalized version; invalid versions show their original text.
impl Display for VersionIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.valid {
            return write!(f, "{}", self.raw);
        }
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release = self
            .release
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<String>>()
            .join(".");
        write!(f, "{release}")?;
        if self.wildcard {
            write!(f, ".*")?;
        }
        if let Some(pre) = self.pre {
            write!(f, "{pre}")?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{post}")?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{dev}")?;
        }
        if !self.local.is_empty() {
            let local = self
                .local
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
                .join(".");
            write!(f, "+{local}")?;
        }
        Ok(())
    }
}

impl PartialEq<Self> for VersionIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionIdentifier {}

impl Hash for VersionIdentifier {
    /// Ignores trailing zeros because equality zero pads the release.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epoch.hash(state);
        let significant = self
            .release
            .iter()
            .rposition(|segment| *segment != 0)
            .map_or(1, |last| last + 1);
        for segment in &self.release[..significant.min(self.release.len())] {
            segment.hash(state);
        }
        self.pre.hash(state);
        self.post.hash(state);
        self.dev.hash(state);
        self.local.hash(state);
    }
}

impl PartialOrd<Self> for VersionIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionIdentifier {
    /// 1.0.dev456 < 1.0a1 < 1.0a2.dev456 < 1.0a12.dev456 < 1.0a12 < 1.0b1.dev456 < 1.0b2
    /// < 1.0b2.post345.dev456 < 1.0b2.post345 < 1.0c1.dev456 < 1.0c1 < 1.0rc2 < 1.0
    /// < 1.0.post456.dev34 < 1.0.post456
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_with(other, CompareOptions::ALL)
    }
}

impl FromStr for VersionIdentifier {
    type Err = Infallible;

    /// Same as [`VersionIdentifier::parse`]; check [`VersionIdentifier::is_valid`] afterwards.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(text))
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for VersionIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for VersionIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// The pieces of a well-formed version.
#[derive(Debug, Default)]
struct Parts {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<Prerelease>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Vec<LocalSegment>,
    wildcard: bool,
}

/// The text does not follow the PEP 440 grammar.
#[derive(Debug)]
struct GrammarViolation;

/// A single pass over a trimmed, lowercase version string.
///
/// Every `parse_*` method either consumes its part of the grammar or leaves the scanner where it
/// was.
struct Parser<'a> {
    s: Scanner<'a>,
    allow_wildcard: bool,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, allow_wildcard: bool) -> Self {
        let mut s = Scanner::new(text);
        // `v1.0`, but not a lone `v`
        if text.len() >= 2 {
            s.eat_if('v');
        }
        Self { s, allow_wildcard }
    }

    fn parse(mut self) -> Result<Parts, GrammarViolation> {
        let mut parts = Parts {
            epoch: self.parse_epoch()?,
            release: self.parse_release()?,
            ..Parts::default()
        };

        if self.s.eat_if(".*") {
            if !self.allow_wildcard || !self.s.done() {
                return Err(GrammarViolation);
            }
            parts.wildcard = true;
            return Ok(parts);
        }

        parts.pre = self.parse_pre()?;
        parts.post = self.parse_post()?;
        parts.dev = self.parse_dev()?;
        parts.local = self.parse_local()?;

        if self.s.done() {
            Ok(parts)
        } else {
            Err(GrammarViolation)
        }
    }

    /// Leading digits immediately followed by `!`.
    fn parse_epoch(&mut self) -> Result<u64, GrammarViolation> {
        let checkpoint = self.s.cursor();
        let digits = self.s.eat_while(|c: char| c.is_ascii_digit());
        if !digits.is_empty() && self.s.eat_if('!') {
            return parse_number(digits);
        }
        self.s.jump(checkpoint);
        Ok(0)
    }

    fn parse_release(&mut self) -> Result<Vec<u64>, GrammarViolation> {
        let mut release = vec![parse_number(self.s.eat_while(|c: char| c.is_ascii_digit()))?];
        loop {
            let checkpoint = self.s.cursor();
            if self.s.eat_if('.') {
                let digits = self.s.eat_while(|c: char| c.is_ascii_digit());
                if !digits.is_empty() {
                    release.push(parse_number(digits)?);
                    continue;
                }
            }
            self.s.jump(checkpoint);
            return Ok(release);
        }
    }

    fn parse_pre(&mut self) -> Result<Option<Prerelease>, GrammarViolation> {
        let checkpoint = self.s.cursor();
        self.eat_separator();
        let label = self.s.eat_while(|c: char| c.is_ascii_alphabetic());
        let Some(kind) = PrereleaseKind::from_label(label) else {
            // Not a prerelease spelling, leave it to the following parts
            self.s.jump(checkpoint);
            return Ok(None);
        };
        let number = self.parse_counter()?;
        Ok(Some(Prerelease { kind, number }))
    }

    fn parse_post(&mut self) -> Result<Option<u64>, GrammarViolation> {
        let checkpoint = self.s.cursor();
        self.eat_separator();
        // Only the keyword itself is consumed so that `1.0postdev1` keeps its `dev`
        if self.s.eat_if("post") || self.s.eat_if("rev") || self.s.eat_if('r') {
            return self.parse_counter().map(Some);
        }
        self.s.jump(checkpoint);

        // The implicit form, `1.0-1`
        if self.s.eat_if('-') {
            let digits = self.s.eat_while(|c: char| c.is_ascii_digit());
            if !digits.is_empty() {
                return parse_number(digits).map(Some);
            }
        }
        self.s.jump(checkpoint);
        Ok(None)
    }

    fn parse_dev(&mut self) -> Result<Option<u64>, GrammarViolation> {
        let checkpoint = self.s.cursor();
        self.eat_separator();
        if self.s.eat_if("dev") {
            return self.parse_counter().map(Some);
        }
        self.s.jump(checkpoint);
        Ok(None)
    }

    fn parse_local(&mut self) -> Result<Vec<LocalSegment>, GrammarViolation> {
        if !self.s.eat_if('+') {
            return Ok(Vec::new());
        }
        let label = self
            .s
            .eat_while(|c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        label
            .split(['.', '-', '_'])
            .map(|segment| {
                if segment.is_empty() {
                    Err(GrammarViolation)
                } else {
                    LocalSegment::parse(segment).ok_or(GrammarViolation)
                }
            })
            .collect()
    }

    /// An optional separator followed by optional digits, `0` when there are no digits.
    fn parse_counter(&mut self) -> Result<u64, GrammarViolation> {
        let checkpoint = self.s.cursor();
        self.eat_separator();
        let digits = self.s.eat_while(|c: char| c.is_ascii_digit());
        if digits.is_empty() {
            self.s.jump(checkpoint);
            return Ok(0);
        }
        parse_number(digits)
    }

    fn eat_separator(&mut self) {
        self.s.eat_if(['.', '-', '_']);
    }
}

/// Rejects an empty or overflowing digit run.
fn parse_number(digits: &str) -> Result<u64, GrammarViolation> {
    digits.parse().map_err(|_| GrammarViolation)
}

#[cfg(test)]
mod tests;
