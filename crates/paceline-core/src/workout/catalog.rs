//! Workout catalog contract.
//!
//! The real catalog (remote data, favorites, downloads) lives outside the
//! core. The timer only needs to resolve an id to a [`WorkoutDefinition`].

use crate::error::Rejection;

use super::definition::{PaceClass, Segment, WorkoutDefinition};

pub trait WorkoutCatalog: Send {
    /// Look up a workout by id.
    fn get(&self, id: &str) -> Option<WorkoutDefinition>;

    /// All workouts, in catalog order.
    fn list(&self) -> Vec<WorkoutDefinition>;
}

/// Catalog backed by a plain list of validated definitions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    workouts: Vec<WorkoutDefinition>,
}

impl InMemoryCatalog {
    /// Build a catalog, validating every definition.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::InvalidWorkout`] on the first invalid definition.
    pub fn new(workouts: Vec<WorkoutDefinition>) -> Result<Self, Rejection> {
        let mut catalog = Self::default();
        for workout in workouts {
            catalog.insert(workout)?;
        }
        Ok(catalog)
    }

    /// Add or replace a workout. A later definition with the same id wins.
    pub fn insert(&mut self, workout: WorkoutDefinition) -> Result<(), Rejection> {
        workout.validate()?;
        match self.workouts.iter_mut().find(|w| w.id == workout.id) {
            Some(existing) => *existing = workout,
            None => self.workouts.push(workout),
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    /// Stock workouts shipped with the app.
    pub fn builtin() -> Self {
        Self {
            workouts: vec![
                WorkoutDefinition {
                    id: "walk-run-20".into(),
                    name: "Walk/Run 20".into(),
                    segments: vec![
                        Segment::new(PaceClass::Warmup, 300).with_label("Warm Up"),
                        Segment::new(PaceClass::Easy, 60).with_label("Run"),
                        Segment::new(PaceClass::Walk, 90).with_label("Walk"),
                        Segment::new(PaceClass::Easy, 60).with_label("Run"),
                        Segment::new(PaceClass::Walk, 90).with_label("Walk"),
                        Segment::new(PaceClass::Easy, 60).with_label("Run"),
                        Segment::new(PaceClass::Walk, 90).with_label("Walk"),
                        Segment::new(PaceClass::Easy, 60).with_label("Run"),
                        Segment::new(PaceClass::Cooldown, 390).with_label("Cool Down"),
                    ],
                },
                WorkoutDefinition {
                    id: "hill-intervals".into(),
                    name: "Hill Intervals".into(),
                    segments: vec![
                        Segment::new(PaceClass::Warmup, 300).with_label("Warm Up"),
                        Segment::new(PaceClass::Interval, 120)
                            .with_label("Climb")
                            .with_incline(6.0),
                        Segment::new(PaceClass::Recovery, 90).with_label("Recover"),
                        Segment::new(PaceClass::Interval, 120)
                            .with_label("Climb")
                            .with_incline(8.0),
                        Segment::new(PaceClass::Recovery, 90).with_label("Recover"),
                        Segment::new(PaceClass::Interval, 120)
                            .with_label("Climb")
                            .with_incline(10.0),
                        Segment::new(PaceClass::Cooldown, 300).with_label("Cool Down"),
                    ],
                },
                WorkoutDefinition {
                    id: "tempo-30".into(),
                    name: "Tempo 30".into(),
                    segments: vec![
                        Segment::new(PaceClass::Warmup, 480).with_label("Warm Up"),
                        Segment::new(PaceClass::Tempo, 1200).with_label("Tempo"),
                        Segment::new(PaceClass::Cooldown, 120).with_label("Cool Down"),
                    ],
                },
                WorkoutDefinition {
                    id: "sprint-ladder".into(),
                    name: "Sprint Ladder".into(),
                    segments: vec![
                        Segment::new(PaceClass::Steady, 240).with_label("Settle In"),
                        Segment::new(PaceClass::Sprint, 15).with_label("Sprint 15"),
                        Segment::new(PaceClass::Recovery, 45).with_label("Recover"),
                        Segment::new(PaceClass::Sprint, 30).with_label("Sprint 30"),
                        Segment::new(PaceClass::Recovery, 60).with_label("Recover"),
                        Segment::new(PaceClass::Sprint, 45).with_label("Sprint 45"),
                        Segment::new(PaceClass::Cooldown, 180).with_label("Cool Down"),
                    ],
                },
            ],
        }
    }
}

impl WorkoutCatalog for InMemoryCatalog {
    fn get(&self, id: &str) -> Option<WorkoutDefinition> {
        self.workouts.iter().find(|w| w.id == id).cloned()
    }

    fn list(&self) -> Vec<WorkoutDefinition> {
        self.workouts.clone()
    }
}
