use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::Muscle;

/// Category assigned when a record does not name one.
pub const DEFAULT_CATEGORY: &str = "strength";

/// A strength-training exercise in the catalog.
///
/// Records are written only by the ingestion path (`seed`) and are read-only
/// from the HTTP API. `instructions` are in execution order and `images` are
/// relative references resolved by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub primary_muscles: Vec<Muscle>,
    pub secondary_muscles: Vec<Muscle>,
    pub equipment: Equipment,
    pub instructions: Vec<String>,
    pub images: Vec<String>,
    pub category: String,
    pub force: Option<Force>,
    pub level: Option<Level>,
    pub mechanic: Option<Mechanic>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Exercise {
    /// True if `muscle` is listed as either a primary or a secondary target.
    pub fn works(&self, muscle: Muscle) -> bool {
        self.primary_muscles.contains(&muscle) || self.secondary_muscles.contains(&muscle)
    }
}

/// Equipment category, e.g. `barbell` or `body only`.
///
/// Unlike [`Muscle`] this is an open set: any non-empty string is accepted so
/// new equipment types need no code change. Comparison is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Equipment(String);

impl Equipment {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Equipment {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Equipment {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for Equipment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Force {
    Pull,
    Push,
    Static,
}

impl Force {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pull => "pull",
            Self::Push => "push",
            Self::Static => "static",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pull" => Some(Self::Pull),
            "push" => Some(Self::Push),
            "static" => Some(Self::Static),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Expert,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Expert => "expert",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "expert" => Some(Self::Expert),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mechanic {
    Compound,
    Isolation,
}

impl Mechanic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compound => "compound",
            Self::Isolation => "isolation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "compound" => Some(Self::Compound),
            "isolation" => Some(Self::Isolation),
            _ => None,
        }
    }
}

/// Input for inserting an exercise through the ingestion path.
///
/// Deserializes from the free-exercise-db record layout. Keys it does not know
/// about (such as a source `id`) are ignored; the store assigns its own id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExercise {
    pub name: String,
    #[serde(default)]
    pub primary_muscles: Vec<Muscle>,
    #[serde(default)]
    pub secondary_muscles: Vec<Muscle>,
    pub equipment: Equipment,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Defaults to [`DEFAULT_CATEGORY`] when absent.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub force: Option<Force>,
    #[serde(default)]
    pub level: Option<Level>,
    #[serde(default)]
    pub mechanic: Option<Mechanic>,
}

impl NewExercise {
    /// A minimal record with only the required fields set.
    pub fn new(name: impl Into<String>, equipment: impl Into<Equipment>) -> Self {
        Self {
            name: name.into(),
            primary_muscles: Vec::new(),
            secondary_muscles: Vec::new(),
            equipment: equipment.into(),
            instructions: Vec::new(),
            images: Vec::new(),
            category: None,
            force: None,
            level: None,
            mechanic: None,
        }
    }

    pub fn primary(mut self, muscles: impl IntoIterator<Item = Muscle>) -> Self {
        self.primary_muscles = muscles.into_iter().collect();
        self
    }

    pub fn secondary(mut self, muscles: impl IntoIterator<Item = Muscle>) -> Self {
        self.secondary_muscles = muscles.into_iter().collect();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Check the write-time invariants: `name` and `equipment` are non-blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.equipment.as_str().trim().is_empty() {
            return Err(ValidationError::EmptyEquipment);
        }
        if matches!(&self.category, Some(c) if c.trim().is_empty()) {
            return Err(ValidationError::EmptyCategory);
        }
        Ok(())
    }

    /// Category to persist, applying the default.
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("exercise name must not be empty")]
    EmptyName,

    #[error("exercise equipment must not be empty")]
    EmptyEquipment,

    #[error("exercise category must not be blank when given")]
    EmptyCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_exercise_parses_free_exercise_db_records() {
        let record = serde_json::json!({
            "id": "Barbell_Bench_Press",
            "name": "Barbell Bench Press",
            "force": "push",
            "level": "beginner",
            "mechanic": "compound",
            "equipment": "barbell",
            "primaryMuscles": ["chest"],
            "secondaryMuscles": ["shoulders", "triceps"],
            "instructions": ["Lie back.", "Press."],
            "category": "strength",
            "images": ["Barbell_Bench_Press/0.jpg"]
        });

        let input: NewExercise = serde_json::from_value(record).unwrap();
        assert_eq!(input.name, "Barbell Bench Press");
        assert_eq!(input.force, Some(Force::Push));
        assert_eq!(input.secondary_muscles, vec![Muscle::Shoulders, Muscle::Triceps]);
        assert_eq!(input.equipment.as_str(), "barbell");
    }

    #[test]
    fn null_optional_enums_are_absent() {
        let record = serde_json::json!({
            "name": "Plank",
            "force": null,
            "mechanic": null,
            "equipment": "body only"
        });

        let input: NewExercise = serde_json::from_value(record).unwrap();
        assert!(input.force.is_none());
        assert!(input.mechanic.is_none());
        assert_eq!(input.category_or_default(), DEFAULT_CATEGORY);
    }

    #[test]
    fn validate_rejects_blank_required_fields() {
        assert_eq!(
            NewExercise::new("  ", "barbell").validate(),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            NewExercise::new("Squat", "").validate(),
            Err(ValidationError::EmptyEquipment)
        );
        assert!(NewExercise::new("Squat", "barbell").validate().is_ok());
    }
}
