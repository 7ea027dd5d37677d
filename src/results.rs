use crate::cam::ActivationGrid;
use crate::condition::Condition;
use crate::config::ResultsParams;
use crate::error::{XRayError, XrResult};
use crate::score::{LikelihoodLabel, ScoreOutput};
use image::Rgba;

/// One row of the results screen.
#[derive(Debug, Clone)]
pub struct ConditionResult {
    pub condition: Condition,
    pub score: ScoreOutput,
    pub cam: ActivationGrid,
    pub color: Rgba<u8>,
    pub selected: bool,
}

impl ConditionResult {
    pub fn new(condition: Condition, score: ScoreOutput, cam: ActivationGrid) -> Self {
        Self {
            condition,
            score,
            cam,
            color: Rgba([0, 0, 0, 0]),
            selected: false,
        }
    }

    pub fn label(&self) -> LikelihoodLabel {
        self.score.label()
    }
}

/// Truncation rule for the ranked list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultsPolicy {
    /// Entries always kept, whatever their likelihood.
    pub min_conditions: usize,
    /// Past `min_conditions`, the list stops at the first entry below this.
    pub min_likelihood: f32,
}

impl Default for ResultsPolicy {
    fn default() -> Self {
        Self::from(&ResultsParams::default())
    }
}

impl From<&ResultsParams> for ResultsPolicy {
    fn from(p: &ResultsParams) -> Self {
        Self {
            min_conditions: p.min_conditions,
            min_likelihood: p.min_likelihood,
        }
    }
}

/// Pairs conditions with their scores and CAMs, ranks them by likelihood
/// (highest first, ties keep input order), truncates per `policy` and
/// assigns palette colours.
///
/// Results past the end of the palette reuse its last colour.
pub fn build_results(
    conditions: &[Condition],
    scores: &[ScoreOutput],
    cams: Vec<ActivationGrid>,
    colors: &[Rgba<u8>],
    policy: &ResultsPolicy,
) -> XrResult<Vec<ConditionResult>> {
    if conditions.len() != scores.len() || scores.len() != cams.len() {
        return Err(XRayError::LengthMismatch {
            conditions: conditions.len(),
            scores: scores.len(),
            cams: cams.len(),
        });
    }

    let mut results: Vec<ConditionResult> = conditions
        .iter()
        .zip(scores)
        .zip(cams)
        .map(|((&condition, &score), cam)| ConditionResult::new(condition, score, cam))
        .collect();

    // sort_by is stable
    results.sort_by(|a, b| b.score.total_cmp(&a.score));

    let count = results
        .iter()
        .enumerate()
        .position(|(i, r)| i >= policy.min_conditions && r.score.likelihood < policy.min_likelihood)
        .unwrap_or(results.len());
    results.truncate(count);

    if !results.is_empty() && colors.is_empty() {
        return Err(XRayError::Validation(
            "colour palette must contain at least one colour".to_string(),
        ));
    }

    for (i, result) in results.iter_mut().enumerate() {
        result.color = colors[i.min(colors.len() - 1)];
    }

    Ok(results)
}

/// Clears every selection, then toggles `index` relative to its previous
/// state. Returns whether `index` is now selected.
pub fn select_exclusive(results: &mut [ConditionResult], index: usize) -> XrResult<bool> {
    let was_selected = results
        .get(index)
        .map(|r| r.selected)
        .ok_or_else(|| {
            XRayError::Validation(format!(
                "result index {} out of range ({} results)",
                index,
                results.len()
            ))
        })?;

    for r in results.iter_mut() {
        r.selected = false;
    }
    results[index].selected = !was_selected;
    Ok(!was_selected)
}

/// The currently selected result, if any.
pub fn selected(results: &[ConditionResult]) -> Option<&ConditionResult> {
    results.iter().find(|r| r.selected)
}
