//! Picking versions out of a list of candidates, as done when searching an index or a list of
//! interpreter releases.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::VersionIdentifier;

/// Optional required, minimum and maximum versions a candidate has to respect.
///
/// All three bounds are inclusive and compare every part of the version, so a `required` of `1.0`
/// accepts `1.0.0` but not `1.0+local`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionBounds {
    /// The candidate must be equal to this version.
    pub required: Option<VersionIdentifier>,
    /// The candidate must not be older than this version.
    pub minimum: Option<VersionIdentifier>,
    /// The candidate must not be newer than this version.
    pub maximum: Option<VersionIdentifier>,
}

impl VersionBounds {
    /// Build the bounds from user input, where empty or all whitespace text means "no bound".
    pub fn from_user_input(
        required: Option<&str>,
        minimum: Option<&str>,
        maximum: Option<&str>,
    ) -> Self {
        let parse = |text: Option<&str>| {
            text.filter(|text| !text.trim().is_empty())
                .map(VersionIdentifier::parse)
        };
        Self {
            required: parse(required),
            minimum: parse(minimum),
            maximum: parse(maximum),
        }
    }

    /// Whether there is no bound at all.
    pub fn is_unbounded(&self) -> bool {
        self.required.is_none() && self.minimum.is_none() && self.maximum.is_none()
    }

    /// Whether the candidate respects every bound that is set.
    pub fn contains(&self, candidate: &VersionIdentifier) -> bool {
        self.required
            .as_ref()
            .is_none_or(|required| candidate == required)
            && self
                .minimum
                .as_ref()
                .is_none_or(|minimum| candidate >= minimum)
            && self
                .maximum
                .as_ref()
                .is_none_or(|maximum| candidate <= maximum)
    }

    /// The candidates within the bounds, in preference order (see [`compare_candidates`]).
    ///
    /// Without `all_versions`, only the most preferred candidate is kept.
    pub fn select<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a VersionIdentifier>,
        all_versions: bool,
    ) -> Vec<&'a VersionIdentifier> {
        let mut selected: Vec<_> = candidates
            .into_iter()
            .filter(|candidate| self.contains(candidate))
            .collect();
        selected.sort_by(|a, b| compare_candidates(a, b));
        if !all_versions {
            selected.truncate(1);
        }
        selected
    }
}

/// Preference order for listing candidates: stable releases before prereleases, then newer
/// versions first.
pub fn compare_candidates(a: &VersionIdentifier, b: &VersionIdentifier) -> Ordering {
    a.is_prerelease()
        .cmp(&b.is_prerelease())
        .then_with(|| b.cmp(a))
}

/// Whether `candidate` should replace `current` as the best version.
///
/// A stable release always beats a prerelease; otherwise the newer version wins.
pub fn is_better_candidate(current: &VersionIdentifier, candidate: &VersionIdentifier) -> bool {
    match (current.is_prerelease(), candidate.is_prerelease()) {
        (true, false) => true,
        (false, true) => false,
        _ => candidate > current,
    }
}

/// The best candidate within each release series, keyed by the major version (the first release
/// segment).
pub fn best_per_major<'a>(
    candidates: impl IntoIterator<Item = &'a VersionIdentifier>,
) -> BTreeMap<u64, &'a VersionIdentifier> {
    let mut best: BTreeMap<u64, &VersionIdentifier> = BTreeMap::new();
    for candidate in candidates {
        let major = candidate.release().first().copied().unwrap_or(0);
        if best
            .get(&major)
            .is_none_or(|current| is_better_candidate(current, candidate))
        {
            best.insert(major, candidate);
        }
    }
    best
}
