//! Review scores and the title rating derived from them.

use crate::error::CoreError;

/// Lowest accepted review score.
pub const MIN_SCORE: i32 = 1;

/// Highest accepted review score.
pub const MAX_SCORE: i32 = 10;

/// Validate that a score lies in `[MIN_SCORE, MAX_SCORE]`.
pub fn validate_score(score: i32) -> Result<(), CoreError> {
    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Score must be between {MIN_SCORE} and {MAX_SCORE}, got {score}"
        )))
    }
}

/// Rating from a score total and review count: the mean rounded half away
/// from zero, or `None` when there are no reviews.
///
/// Works on integers so the result does not depend on float formatting in
/// the database driver. Totals are non-negative because every stored score
/// is at least [`MIN_SCORE`].
pub fn rating_from_totals(total: i64, count: i64) -> Option<i32> {
    if count <= 0 {
        return None;
    }
    let rounded = (2 * total + count) / (2 * count);
    i32::try_from(rounded).ok()
}

/// Rating for a slice of scores. See [`rating_from_totals`].
pub fn aggregate_rating(scores: &[i32]) -> Option<i32> {
    let total: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    rating_from_totals(total, scores.len() as i64)
}
