//! Charge selection for a requested trajectory.

use fdc_core::enums::{ArcPreference, FireType, SolveFailure, SystemClass, TrajectoryType};
use fdc_core::model::Charge;

/// Trajectory type actually used for selection. Mortars only fire indirect.
pub fn effective_trajectory_type(requested: TrajectoryType, class: SystemClass) -> TrajectoryType {
    match class {
        SystemClass::Mortar => TrajectoryType::Indirect,
        SystemClass::Howitzer | SystemClass::Gun => requested,
    }
}

/// Charges usable at `distance`, in registration order.
///
/// Candidates must cover the distance, then match the fire type (unless
/// `Auto`) and the arc variant (unless `Standard`). A non-standard arc
/// preference is strict; `Standard` falls back to the fire-type matches.
pub fn candidate_charges(
    charges: &[Charge],
    distance: f64,
    trajectory_type: TrajectoryType,
    arc_preference: ArcPreference,
    class: SystemClass,
) -> Result<Vec<&Charge>, SolveFailure> {
    let in_range: Vec<&Charge> = charges.iter().filter(|c| c.covers(distance)).collect();
    if in_range.is_empty() {
        return Err(SolveFailure::DistanceOutOfRange);
    }

    let fire_type: Option<FireType> = effective_trajectory_type(trajectory_type, class).fire_type();
    let by_type = in_range
        .into_iter()
        .filter(|c| fire_type.map_or(true, |ft| c.fire_type == ft));

    let candidates: Vec<&Charge> = match arc_preference.variant() {
        None => by_type.collect(),
        Some(variant) => by_type.filter(|c| c.variant == variant).collect(),
    };
    if candidates.is_empty() {
        return Err(SolveFailure::TrajectoryNotSupported);
    }
    Ok(candidates)
}

/// Pick the charge for `distance` among the candidates.
///
/// The charge with the smallest maximum range wins; on a tie the one
/// registered first is kept.
pub fn select_charge(
    charges: &[Charge],
    distance: f64,
    trajectory_type: TrajectoryType,
    arc_preference: ArcPreference,
    class: SystemClass,
) -> Result<&Charge, SolveFailure> {
    let mut best: Option<&Charge> = None;
    for charge in candidate_charges(charges, distance, trajectory_type, arc_preference, class)? {
        match best {
            Some(current) if current.max_range() <= charge.max_range() => {}
            _ => best = Some(charge),
        }
    }
    best.ok_or(SolveFailure::TrajectoryNotSupported)
}
