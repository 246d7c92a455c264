//! No-fire areas: zone geometry, segment tests and the firing policy.
//!
//! A firing segment (gun → aim point, or a leg of a linear pattern)
//! violates a zone when it touches a circle's disk or crosses or
//! enters a polygon.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use fdc_core::config::NfaSettings;
use fdc_core::enums::{FireMode, NfaAction};
use fdc_core::error::{FdcError, Result};
use fdc_core::types::Point2;

/// Zone outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum NfaShape {
    Circle { center: Point2, radius: f64 },
    Polygon { vertices: Vec<Point2> },
}

/// A named no-fire zone. Construction validates the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NoFireAreaDef")]
pub struct NoFireArea {
    pub id: String,
    #[serde(flatten)]
    pub shape: NfaShape,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ShapeKind {
    Circle,
    Polygon,
}

/// Wire form: a shape tag plus whichever fields were supplied.
#[derive(Debug, Deserialize)]
struct NoFireAreaDef {
    id: String,
    shape: ShapeKind,
    #[serde(default)]
    center: Option<Point2>,
    #[serde(default)]
    radius: Option<f64>,
    #[serde(default)]
    vertices: Option<Vec<Point2>>,
    #[serde(default)]
    notes: String,
}

impl TryFrom<NoFireAreaDef> for NoFireArea {
    type Error = FdcError;

    fn try_from(def: NoFireAreaDef) -> Result<Self> {
        let mixed = match def.shape {
            ShapeKind::Circle => def.vertices.is_some(),
            ShapeKind::Polygon => def.center.is_some() || def.radius.is_some(),
        };
        if mixed {
            return Err(invalid(&def.id, "circle and polygon fields are mutually exclusive"));
        }
        let area = match def.shape {
            ShapeKind::Circle => {
                let (Some(center), Some(radius)) = (def.center, def.radius) else {
                    return Err(invalid(&def.id, "circle needs a center and a radius"));
                };
                NoFireArea::circle(def.id, center, radius)?
            }
            ShapeKind::Polygon => {
                let Some(vertices) = def.vertices else {
                    return Err(invalid(&def.id, "polygon needs vertices"));
                };
                NoFireArea::polygon(def.id, vertices)?
            }
        };
        Ok(area.with_notes(def.notes))
    }
}

fn invalid(id: &str, reason: &str) -> FdcError {
    FdcError::InvalidNoFireArea {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(p: &Point2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

impl NoFireArea {
    pub fn circle(id: impl Into<String>, center: Point2, radius: f64) -> Result<Self> {
        let id = id.into();
        if !finite(&center) {
            return Err(invalid(&id, "center must be finite"));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(invalid(&id, "radius must be positive"));
        }
        Ok(Self {
            id,
            shape: NfaShape::Circle { center, radius },
            notes: String::new(),
        })
    }

    pub fn polygon(id: impl Into<String>, vertices: Vec<Point2>) -> Result<Self> {
        let id = id.into();
        if vertices.len() < 3 {
            return Err(invalid(&id, "polygon needs at least 3 vertices"));
        }
        if !vertices.iter().all(finite) {
            return Err(invalid(&id, "vertices must be finite"));
        }
        Ok(Self {
            id,
            shape: NfaShape::Polygon { vertices },
            notes: String::new(),
        })
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Whether the segment `a`–`b` touches this zone.
    pub fn intersects_segment(&self, a: Point2, b: Point2) -> bool {
        match &self.shape {
            NfaShape::Circle { center, radius } => {
                segment_intersects_circle(a.into(), b.into(), (*center).into(), *radius)
            }
            NfaShape::Polygon { vertices } => {
                let poly: Vec<DVec2> = vertices.iter().map(|v| DVec2::from(*v)).collect();
                segment_intersects_polygon(a.into(), b.into(), &poly)
            }
        }
    }
}

// ---- Geometry ----

/// Closest point to `p` on the segment `a`–`b`.
pub fn closest_point_on_segment(p: DVec2, a: DVec2, b: DVec2) -> DVec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Segment touches the closed disk.
pub fn segment_intersects_circle(a: DVec2, b: DVec2, center: DVec2, radius: f64) -> bool {
    closest_point_on_segment(center, a, b).distance(center) <= radius
}

/// Ray-casting containment test. Points exactly on an edge may go either way.
pub fn point_in_polygon(p: DVec2, vertices: &[DVec2]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];
        if (vi.y > p.y) != (vj.y > p.y) {
            let x_cross = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn orientation(p: DVec2, q: DVec2, r: DVec2) -> i8 {
    let cross = (q - p).perp_dot(r - p);
    if cross > 0.0 {
        1
    } else if cross < 0.0 {
        -1
    } else {
        0
    }
}

/// `q` lies within the bounding box of `p`–`r` (used for collinear cases).
fn on_segment(p: DVec2, q: DVec2, r: DVec2) -> bool {
    q.x >= p.x.min(r.x) && q.x <= p.x.max(r.x) && q.y >= p.y.min(r.y) && q.y <= p.y.max(r.y)
}

/// Proper or touching intersection of segments `p1`–`p2` and `q1`–`q2`.
pub fn segments_intersect(p1: DVec2, p2: DVec2, q1: DVec2, q2: DVec2) -> bool {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && on_segment(p1, q1, p2))
        || (o2 == 0 && on_segment(p1, q2, p2))
        || (o3 == 0 && on_segment(q1, p1, q2))
        || (o4 == 0 && on_segment(q1, p2, q2))
}

/// Segment crosses an edge or has an endpoint inside the polygon.
pub fn segment_intersects_polygon(a: DVec2, b: DVec2, vertices: &[DVec2]) -> bool {
    if point_in_polygon(a, vertices) || point_in_polygon(b, vertices) {
        return true;
    }
    let n = vertices.len();
    (0..n).any(|i| segments_intersect(a, b, vertices[i], vertices[(i + 1) % n]))
}

// ---- Policy ----

/// Outcome of checking one firing segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NfaAssessment {
    pub has_violation: bool,
    pub warning: Option<String>,
    pub action: NfaAction,
    /// Whether an operator may override the action.
    pub can_override: bool,
    pub impacted_zones: Vec<String>,
}

impl NfaAssessment {
    fn clear() -> Self {
        Self {
            has_violation: false,
            warning: None,
            action: NfaAction::Allow,
            can_override: false,
            impacted_zones: Vec::new(),
        }
    }
}

/// Action for a violating segment under the given settings and fire mode.
pub fn violation_action(settings: &NfaSettings, mode: FireMode) -> NfaAction {
    if settings.cancel_fire_on_nfa_hit {
        NfaAction::CancelFire
    } else if settings.skip_nfa_in_linear_pattern && mode == FireMode::Linear {
        NfaAction::SkipNfaSegment
    } else {
        NfaAction::WarnOnly
    }
}

/// A leg of a firing pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point2,
    pub end: Point2,
}

impl Segment {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }
}

/// Assessment of one leg of a linear pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentVerdict {
    pub segment: Segment,
    pub assessment: NfaAssessment,
    /// The leg is dropped from the pattern.
    pub skipped: bool,
}

/// Zones keyed by id, in insertion order, plus the firing policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoFireAreaRegistry {
    #[serde(default)]
    zones: Vec<NoFireArea>,
    #[serde(default)]
    settings: NfaSettings,
}

impl NoFireAreaRegistry {
    pub fn new(settings: NfaSettings) -> Self {
        Self {
            zones: Vec::new(),
            settings,
        }
    }

    /// Insert a zone, replacing any zone with the same id in place.
    pub fn add(&mut self, zone: NoFireArea) {
        tracing::info!(zone = %zone.id, "No-fire area registered");
        match self.zones.iter_mut().find(|z| z.id == zone.id) {
            Some(existing) => *existing = zone,
            None => self.zones.push(zone),
        }
    }

    /// Remove a zone by id. Returns whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.zones.len();
        self.zones.retain(|z| z.id != id);
        let removed = self.zones.len() != before;
        if removed {
            tracing::info!(zone = %id, "No-fire area removed");
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&NoFireArea> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn zones(&self) -> &[NoFireArea] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }

    pub fn settings(&self) -> &NfaSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: NfaSettings) {
        self.settings = settings;
    }

    /// Check a firing segment against every zone.
    pub fn assess_trajectory(&self, start: Point2, end: Point2, mode: FireMode) -> NfaAssessment {
        let impacted: Vec<String> = self
            .zones
            .iter()
            .filter(|z| z.intersects_segment(start, end))
            .map(|z| z.id.clone())
            .collect();

        if impacted.is_empty() {
            return NfaAssessment::clear();
        }

        let action = violation_action(&self.settings, mode);
        let warning = format!("Trajectory crosses no-fire area(s): {}", impacted.join(", "));
        tracing::warn!(zones = ?impacted, action = %action, "No-fire area violation");

        NfaAssessment {
            has_violation: true,
            warning: Some(warning),
            action,
            can_override: true,
            impacted_zones: impacted,
        }
    }

    /// Assess each leg of a linear pattern and mark the legs to drop.
    pub fn filter_linear_pattern_segments(&self, segments: &[Segment]) -> Vec<SegmentVerdict> {
        segments
            .iter()
            .map(|segment| {
                let assessment = self.assess_trajectory(segment.start, segment.end, FireMode::Linear);
                let skipped = assessment.action == NfaAction::SkipNfaSegment;
                SegmentVerdict {
                    segment: *segment,
                    assessment,
                    skipped,
                }
            })
            .collect()
    }
}
