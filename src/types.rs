use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cleaning: CleaningConfig,
    pub cycles: CycleConfig,
    pub contact: ContactConfig,
    pub session: SessionConfig,
    pub io: IoConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Largest plausible ball displacement between adjacent frames (px/frame)
    pub max_velocity: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            max_velocity: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Minimum frames between troughs, also the minimum cycle length
    pub min_cycle_duration: usize,
    /// Minimum prominence (normalized units) for a trough to count
    pub prominence: f64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            min_cycle_duration: 10,
            prominence: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// d_thr = threshold_k * shoulder_width_session
    pub threshold_k: f64,
    /// Minimum frames for a contact event to count as meaningful
    pub min_window_frames: usize,
    /// Margin one hand's contact fraction must exceed the other's by
    pub dominant_hand_delta: f64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            threshold_k: 1.0,
            min_window_frames: 3,
            dominant_hand_delta: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Unknown-hand cycles that may sit between two compared cycles
    pub crossover_hand_gap_tolerance: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            crossover_hand_gap_tolerance: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    pub input_dir: String,
    pub output_dir: String,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_dir: "sessions".to_string(),
            output_dir: "reports".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// 2D point. Serialized as an `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Linear interpolation: `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + t * (other.x - self.x),
            self.y + t * (other.y - self.y),
        )
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Distance between two optional points; `None` unless both are defined.
pub fn distance(a: Option<Point>, b: Option<Point>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.distance(&b)),
        _ => None,
    }
}

// ============================================================================
// FRAMES
// ============================================================================

/// Body landmarks tracked per frame. Each one is independently optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Landmarks {
    pub left_wrist: Option<Point>,
    pub right_wrist: Option<Point>,
    pub left_elbow: Option<Point>,
    pub right_elbow: Option<Point>,
    pub left_shoulder: Option<Point>,
    pub right_shoulder: Option<Point>,
    pub left_knee: Option<Point>,
    pub right_knee: Option<Point>,
    pub hip_center: Option<Point>,
}

impl Landmarks {
    /// Apply `f` to every defined landmark.
    pub fn map(&self, f: impl Fn(Point) -> Point) -> Landmarks {
        Landmarks {
            left_wrist: self.left_wrist.map(&f),
            right_wrist: self.right_wrist.map(&f),
            left_elbow: self.left_elbow.map(&f),
            right_elbow: self.right_elbow.map(&f),
            left_shoulder: self.left_shoulder.map(&f),
            right_shoulder: self.right_shoulder.map(&f),
            left_knee: self.left_knee.map(&f),
            right_knee: self.right_knee.map(&f),
            hip_center: self.hip_center.map(&f),
        }
    }
}

/// One processed video frame as delivered by the detection/pose collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    pub frame_index: u64,
    pub timestamp_ms: i64,
    #[serde(default)]
    pub ball_center: Option<Point>,
    #[serde(flatten)]
    pub landmarks: Landmarks,
}

/// Frame stream file: one session's frames plus the capture frame rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameStream {
    pub fps: f64,
    pub frames: Vec<RawFrame>,
}

/// Pixel-space origin and scale a normalized frame was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationTransform {
    /// Hip center in pixels
    pub origin: Point,
    /// Shoulder-center to hip-center distance in pixels
    pub scale: f64,
}

impl NormalizationTransform {
    pub fn apply(&self, p: Point) -> Point {
        Point::new((p.x - self.origin.x) / self.scale, (p.y - self.origin.y) / self.scale)
    }

    pub fn invert(&self, p: Point) -> Point {
        Point::new(self.origin.x + p.x * self.scale, self.origin.y + p.y * self.scale)
    }
}

/// Frame in body-relative units: hip center at (0, 0), body height 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFrame {
    pub frame_index: u64,
    pub timestamp_ms: i64,
    pub ball_center: Option<Point>,
    pub landmarks: Landmarks,
    pub body_height: f64,
    pub transform: NormalizationTransform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "L",
            Self::Right => "R",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactLabel {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
    /// Ball visible but not close enough to either wrist
    #[serde(rename = "None")]
    NoContact,
    /// Ball missing or both wrists missing
    #[serde(rename = "unknown")]
    Unknown,
}

impl ContactLabel {
    pub fn hand(&self) -> Option<Hand> {
        match self {
            Self::Left => Some(Hand::Left),
            Self::Right => Some(Hand::Right),
            Self::NoContact | Self::Unknown => None,
        }
    }

    pub fn is_controlled(&self) -> bool {
        self.hand().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledFrame {
    pub frame_index: u64,
    pub timestamp_ms: i64,
    pub cycle_id: Option<usize>,
    pub contact_label: ContactLabel,
    pub d_left: Option<f64>,
    pub d_right: Option<f64>,
    pub d_min: Option<f64>,
    pub ball_center: Option<Point>,
    pub landmarks: Landmarks,
}

// ============================================================================
// CYCLES & SESSION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    pub hand: Hand,
    pub start_frame_index: u64,
    pub end_frame_index: u64,
    pub frame_count: usize,
    pub t_start_ms: i64,
    pub t_end_ms: i64,
    pub t_norm_start: Option<f64>,
    pub t_norm_end: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    pub cycle_id: usize,
    pub frames: Vec<LabeledFrame>,
    pub contact_events: Vec<ContactEvent>,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub duration_ms: i64,
    /// Topmost ball position (smallest y)
    pub max_height: f64,
    /// Bottom of the bounce (largest y)
    pub min_height: f64,
    pub avg_height: f64,
    pub height_range: f64,
    pub contact_time_fraction_left: f64,
    pub contact_time_fraction_right: f64,
    pub controlled_time_ratio: f64,
    pub start_hand: Option<Hand>,
    pub end_hand: Option<Hand>,
    pub is_crossover: Option<bool>,
    pub dominant_hand: Option<Hand>,
    pub switch_time_norm: Option<f64>,
    pub control_deviation_overall: Option<f64>,
    pub control_deviation_in_control: Option<f64>,
}

impl Cycle {
    /// Hand used for session-level crossover counting and hand ratios:
    /// the dominant hand, falling back to the hand holding the ball at the
    /// end of the cycle.
    pub fn representative_hand(&self) -> Option<Hand> {
        self.dominant_hand.or(self.end_hand)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub cycles: Vec<Cycle>,
    pub total_frames: usize,
    pub valid_frames: usize,
    pub duration_mean: f64,
    pub duration_variance: f64,
    pub max_height_mean: f64,
    pub max_height_variance: f64,
    pub controlled_time_ratio_mean: f64,
    pub controlled_time_ratio_variance: f64,
    pub control_deviation_mean: f64,
    pub control_deviation_variance: f64,
    pub crossovers_count: usize,
    /// Cycles whose own contact events change hands
    pub intra_cycle_crossovers: usize,
    pub left_hand_ratio: f64,
    pub right_hand_ratio: f64,
    pub hand_ratio_sample_size: usize,
    pub shoulder_width_session: f64,
    pub d_thr: f64,
}
