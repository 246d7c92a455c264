//! Solver constants and tuning parameters.

// --- Angles ---

/// Degrees in a full circle.
pub const FULL_CIRCLE_DEG: f64 = 360.0;

/// NATO mils per full circle.
pub const MILS_PER_CIRCLE: f64 = 6400.0;

/// Heading value meaning "no heading set" (gun is omni-directional).
pub const NO_HEADING_DEG: f64 = 360.0;

// --- Envelope ---

/// Angular sampling step for sector and ring envelope polygons (degrees).
pub const ENVELOPE_STEP_DEG: f64 = 5.0;

// --- Display trajectory ---

/// Number of segments in the cosmetic trajectory curve.
pub const TRAJECTORY_STEPS: usize = 32;

/// Apex height per meter of horizontal distance for the cosmetic curve.
pub const TRAJECTORY_PEAK_PER_METER: f64 = 0.23;

/// Share of the height difference added to the cosmetic apex.
pub const TRAJECTORY_PEAK_HEIGHT_SHARE: f64 = 0.5;

// --- Environmental corrections ---

/// Reference air temperature (°C).
pub const REFERENCE_TEMPERATURE_C: f64 = 15.0;

/// Reference relative humidity (%).
pub const REFERENCE_HUMIDITY_PCT: f64 = 50.0;

/// Reference station pressure (hPa).
pub const REFERENCE_PRESSURE_HPA: f64 = 1013.25;

/// Elevation change per m/s of headwind (mil).
pub const DEFAULT_HEADWIND_FACTOR: f64 = 0.5;

/// Elevation change per °C above reference (mil). Warm air carries further.
pub const DEFAULT_TEMPERATURE_FACTOR: f64 = -0.4;

/// Elevation change per % humidity above reference (mil).
pub const DEFAULT_HUMIDITY_FACTOR: f64 = -0.05;

/// Elevation change per hPa above reference (mil). Dense air shortens range.
pub const DEFAULT_PRESSURE_FACTOR: f64 = 0.1;

/// Spin drift per kilometer of range (mil).
pub const DEFAULT_SPIN_FACTOR: f64 = 0.3;

/// Height correction tables are expressed per this many meters.
pub const HEIGHT_TABLE_STEP_M: f64 = 100.0;

// --- Fire patterns ---

/// Default pattern bearing (degrees).
pub const DEFAULT_PATTERN_BEARING_DEG: f64 = 0.0;

/// Default circular pattern radius (m).
pub const DEFAULT_PATTERN_RADIUS_M: f64 = 120.0;

/// Default rectangle width (m).
pub const DEFAULT_PATTERN_WIDTH_M: f64 = 200.0;

/// Default rectangle / line length (m).
pub const DEFAULT_PATTERN_LENGTH_M: f64 = 200.0;

/// Default spacing between line and grid aim points (m).
pub const DEFAULT_PATTERN_SPACING_M: f64 = 40.0;

/// Default sheaf width (m).
pub const DEFAULT_SHEAF_WIDTH_M: f64 = 180.0;

/// Default number of ring points for circular fire.
pub const DEFAULT_AIMPOINT_COUNT: u32 = 8;

/// Narrowest sheaf the generator will spread guns across (m).
pub const MIN_SHEAF_WIDTH_M: f64 = 10.0;

/// Ring point count limits for circular fire.
pub const MIN_RING_POINTS: u32 = 3;
pub const MAX_RING_POINTS: u32 = 36;

/// Smallest radius, length or spacing accepted by the generator (m).
pub const MIN_PATTERN_DIMENSION_M: f64 = 1.0;

/// Most aim points a line or grid pattern may produce. Larger patterns are
/// spread out to fit.
pub const MAX_PATTERN_POINTS: usize = 4096;

// --- Adjustment ---

/// Default bracket size for adjust-fire (m).
pub const DEFAULT_BRACKET_M: f64 = 200.0;

/// Smallest bracket step (m).
pub const MIN_BRACKET_M: f64 = 1.0;

// --- Grid references ---

/// Side of a 3-digit grid square (m).
pub const GRID_SQUARE_COARSE_M: f64 = 100.0;

/// Side of a 4-digit grid square (m).
pub const GRID_SQUARE_FINE_M: f64 = 10.0;

// --- Multiple rounds, simultaneous impact ---

/// Rounds per gun when none are requested.
pub const DEFAULT_MRSI_ROUNDS: u32 = 3;

/// Smallest time-of-flight gap between two rounds of one gun (s).
pub const DEFAULT_MRSI_MIN_SEPARATION_S: f64 = 2.0;
