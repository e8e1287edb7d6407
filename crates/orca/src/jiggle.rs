use crate::RandomSource;

/// Deterministic micro-perturbation substituted when an inverse-distance
/// denominator collapses (coincident points). Small enough not to disturb
/// the layout, sign-random so paired nodes separate in both directions.
pub(crate) fn jiggle(random: &mut RandomSource) -> f64 {
    (random() - 0.5) * 1e-6
}
