//! Leveling business logic - The pure experience-to-level mapping.
//!
//! Shared by every component that awards experience. Level is a cache derived
//! solely from experience; any code that mutates `experience` must recompute
//! and persist `level` through [`level_for`] in the same update.

/// Experience points required to advance one level.
pub const XP_PER_LEVEL: i64 = 100;

/// Computes the level for a given amount of experience.
///
/// Defined as `floor(experience / 100) + 1`, so level 1 covers 0..=99 XP.
/// Negative inputs are clamped to zero rather than producing a level below 1.
#[must_use]
pub fn level_for(experience: i64) -> i64 {
    experience.max(0) / XP_PER_LEVEL + 1
}

/// Computes how far into the current level the experience has progressed (0..=99).
#[must_use]
pub fn progress_in_level(experience: i64) -> i64 {
    experience.max(0) % XP_PER_LEVEL
}
