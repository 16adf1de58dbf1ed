use serde::{Deserialize, Serialize};

use crate::error::Rejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaceClass {
    Warmup,
    Walk,
    Easy,
    Steady,
    Tempo,
    Interval,
    Sprint,
    Recovery,
    Cooldown,
}

impl PaceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaceClass::Warmup => "warmup",
            PaceClass::Walk => "walk",
            PaceClass::Easy => "easy",
            PaceClass::Steady => "steady",
            PaceClass::Tempo => "tempo",
            PaceClass::Interval => "interval",
            PaceClass::Sprint => "sprint",
            PaceClass::Recovery => "recovery",
            PaceClass::Cooldown => "cooldown",
        }
    }
}

/// Display data carried with a segment. The timer never looks inside.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetadata {
    #[serde(default)]
    pub label: String,
    /// Treadmill incline in percent, if the segment prescribes one.
    #[serde(default)]
    pub incline_pct: Option<f32>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub pace: PaceClass,
    /// Duration in whole seconds. Must be positive.
    pub duration_secs: u32,
    #[serde(default)]
    pub metadata: SegmentMetadata,
}

impl Segment {
    pub fn new(pace: PaceClass, duration_secs: u32) -> Self {
        Self {
            pace,
            duration_secs,
            metadata: SegmentMetadata::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.metadata.label = label.into();
        self
    }

    pub fn with_incline(mut self, incline_pct: f32) -> Self {
        self.metadata.incline_pct = Some(incline_pct);
        self
    }
}

/// An ordered, non-empty list of timed segments.
///
/// Definitions come from the catalog and are never mutated during a run.
/// Deserialized definitions skip validation, so anything that accepts one
/// from outside (the catalog, `start`) calls [`WorkoutDefinition::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDefinition {
    pub id: String,
    pub name: String,
    pub segments: Vec<Segment>,
}

impl WorkoutDefinition {
    /// Build a validated definition.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::InvalidWorkout`] if `segments` is empty or any
    /// segment has a zero duration.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        segments: Vec<Segment>,
    ) -> Result<Self, Rejection> {
        let def = Self {
            id: id.into(),
            name: name.into(),
            segments,
        };
        def.validate()?;
        Ok(def)
    }

    pub fn validate(&self) -> Result<(), Rejection> {
        if self.segments.is_empty() || self.segments.iter().any(|s| s.duration_secs == 0) {
            return Err(Rejection::InvalidWorkout);
        }
        Ok(())
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Duration of the segment at `index`, or 0 when out of range.
    pub fn duration_of(&self, index: usize) -> u64 {
        self.segments
            .get(index)
            .map(|s| u64::from(s.duration_secs))
            .unwrap_or(0)
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.segments.iter().map(|s| u64::from(s.duration_secs)).sum()
    }

    /// Cumulative seconds of all segments before `index`.
    pub fn cumulative_secs(&self, index: usize) -> u64 {
        self.segments
            .iter()
            .take(index)
            .map(|s| u64::from(s.duration_secs))
            .sum()
    }

    pub fn last_index(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }
}
