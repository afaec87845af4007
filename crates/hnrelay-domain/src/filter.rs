//! Filter module - which stories are worth mirroring
//!
//! A story is mirrored only when it is a plain story with an external link,
//! at least [`SCORE_THRESHOLD`] points and at least [`COMMENTS_THRESHOLD`]
//! comments. Both thresholds are inclusive.

use crate::CandidateItem;

/// Item type tag of a regular story
pub const STORY_KIND: &str = "story";

/// Minimum score for inclusion
pub const SCORE_THRESHOLD: i64 = 50;

/// Minimum comment count for inclusion
pub const COMMENTS_THRESHOLD: i64 = 5;

/// Decide whether a candidate should be mirrored
///
/// Any single failing condition excludes the item.
///
/// # Examples
///
/// ```
/// use hnrelay_domain::{should_include, CandidateItem};
///
/// let item = CandidateItem {
///     id: 1,
///     url: "https://example.com".to_string(),
///     title: "Example".to_string(),
///     score: 50,
///     descendants: 5,
///     kind: "story".to_string(),
/// };
/// assert!(should_include(&item));
/// ```
pub fn should_include(item: &CandidateItem) -> bool {
    let excluded = item.kind != STORY_KIND
        || item.score < SCORE_THRESHOLD
        || item.descendants < COMMENTS_THRESHOLD
        || item.url.is_empty();

    !excluded
}
