use std::num::NonZeroU32;
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// An error parsing the list of supported tags.
#[derive(Debug, thiserror::Error)]
pub enum TagsError {
    /// A supported tag that isn't a `python-abi-platform` triple.
    #[error("Invalid tag `{0}`, expected `python-abi-platform`")]
    InvalidTag(String),
    /// More tags than fit into a priority.
    #[error("Invalid priority: {0}")]
    InvalidPriority(usize, #[source] std::num::TryFromIntError),
}

/// The set of wheel tags an interpreter supports.
///
/// Its principal function is to determine whether the tags of a particular wheel are compatible
/// with the interpreter.
#[derive(Debug, Clone, Default)]
pub struct Tags {
    /// python_tag |--> abi_tag |--> platform_tag |--> priority
    #[allow(clippy::type_complexity)]
    map: Arc<FxHashMap<String, FxHashMap<String, FxHashMap<String, TagPriority>>>>,
}

impl Tags {
    /// Create a new set of tags.
    ///
    /// Tags are prioritized based on their position in the given vector. Specifically, tags that
    /// appear earlier in the vector are given higher priority than tags that appear later.
    pub fn new(tags: Vec<(String, String, String)>) -> Result<Self, TagsError> {
        let mut map = FxHashMap::default();
        for (index, (python, abi, platform)) in tags.into_iter().rev().enumerate() {
            let priority = TagPriority::try_from(index)?;
            map.entry(python)
                .or_insert_with(FxHashMap::default)
                .entry(abi)
                .or_insert_with(FxHashMap::default)
                .entry(platform)
                .or_insert(priority);
        }
        Ok(Self { map: Arc::new(map) })
    }

    /// Parse the `.`-joined `python-abi-platform` tags printed by the interpreter query, most
    /// preferred first.
    ///
    /// An empty list means the interpreter can't tell which tags it supports.
    pub fn from_query_output(tags: &str) -> Result<Self, TagsError> {
        if tags.is_empty() {
            return Ok(Self::default());
        }
        let tags = tags
            .split('.')
            .map(|tag| {
                let mut parts = tag.split('-');
                match (parts.next(), parts.next(), parts.next(), parts.next()) {
                    (Some(python), Some(abi), Some(platform), None)
                        if !python.is_empty() && !abi.is_empty() && !platform.is_empty() =>
                    {
                        Ok((python.to_string(), abi.to_string(), platform.to_string()))
                    }
                    _ => Err(TagsError::InvalidTag(tag.to_string())),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tags)
    }

    /// Whether no tag is supported at all.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns true when the wheel tag (for example `cp36-cp36m-win_amd64`) names at least one
    /// supported tag.
    ///
    /// Each part of a wheel tag may be a compressed tag set, with alternatives separated by a dot
    /// as in `py2.py3-none-any`.
    pub fn is_compatible(&self, wheel_tag: &str) -> bool {
        self.priority(wheel_tag).is_some()
    }

    /// The priority of the most preferred supported tag the wheel tag names, if any.
    pub fn priority(&self, wheel_tag: &str) -> Option<TagPriority> {
        let mut parts = wheel_tag.split('-');
        let (Some(wheel_python), Some(wheel_abi), Some(wheel_platform), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return None;
        };

        // The wheel names only a handful of tags, so look them up rather than walking the
        // (usually much larger) supported set.
        let mut best = None;
        for python in wheel_python.split('.') {
            let Some(abis) = self.map.get(python) else {
                continue;
            };
            for abi in wheel_abi.split('.') {
                let Some(platforms) = abis.get(abi) else {
                    continue;
                };
                for platform in wheel_platform.split('.') {
                    if let Some(&priority) = platforms.get(platform) {
                        best = best.max(Some(priority));
                    }
                }
            }
        }
        best
    }
}

/// The priority of a supported tag.
///
/// A wrapper around [`NonZeroU32`]. Higher values indicate higher priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TagPriority(NonZeroU32);

impl TryFrom<usize> for TagPriority {
    type Error = TagsError;

    /// Create a [`TagPriority`] from a `usize`, where higher `usize` values are given higher
    /// priority.
    fn try_from(priority: usize) -> Result<Self, TagsError> {
        match u32::try_from(priority).and_then(|priority| NonZeroU32::try_from(1 + priority)) {
            Ok(priority) => Ok(Self(priority)),
            Err(err) => Err(TagsError::InvalidPriority(priority, err)),
        }
    }
}

/// The `python-abi-platform` tag at the end of a wheel's file name, such as
/// `cp36-cp36m-win_amd64` for `numpy-1.13.1-cp36-cp36m-win_amd64.whl`.
///
/// Returns `None` if the name doesn't have enough `-`-separated parts.
pub fn wheel_tag(filename: &str) -> Option<&str> {
    let stem = filename.strip_suffix(".whl").unwrap_or(filename);
    let platform_dash = stem.rfind('-')?;
    let abi_dash = stem[..platform_dash].rfind('-')?;
    let python_dash = stem[..abi_dash].rfind('-')?;
    Some(&stem[python_dash + 1..])
}

#[cfg(test)]
mod tests;
