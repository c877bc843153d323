use serde::{Deserialize, Serialize};

/// A muscle group an exercise can target.
///
/// This set is closed: records carrying any other tag are rejected at
/// ingestion time, and tags read back from storage that fall outside it are
/// dropped rather than surfaced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Muscle {
    Abdominals,
    Abductors,
    Adductors,
    Biceps,
    Calves,
    Chest,
    Forearms,
    Glutes,
    Hamstrings,
    Lats,
    #[serde(rename = "lower back")]
    LowerBack,
    #[serde(rename = "middle back")]
    MiddleBack,
    Neck,
    Quadriceps,
    Shoulders,
    Traps,
    Triceps,
}

impl Muscle {
    pub const ALL: [Muscle; 17] = [
        Self::Abdominals,
        Self::Abductors,
        Self::Adductors,
        Self::Biceps,
        Self::Calves,
        Self::Chest,
        Self::Forearms,
        Self::Glutes,
        Self::Hamstrings,
        Self::Lats,
        Self::LowerBack,
        Self::MiddleBack,
        Self::Neck,
        Self::Quadriceps,
        Self::Shoulders,
        Self::Traps,
        Self::Triceps,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abdominals => "abdominals",
            Self::Abductors => "abductors",
            Self::Adductors => "adductors",
            Self::Biceps => "biceps",
            Self::Calves => "calves",
            Self::Chest => "chest",
            Self::Forearms => "forearms",
            Self::Glutes => "glutes",
            Self::Hamstrings => "hamstrings",
            Self::Lats => "lats",
            Self::LowerBack => "lower back",
            Self::MiddleBack => "middle back",
            Self::Neck => "neck",
            Self::Quadriceps => "quadriceps",
            Self::Shoulders => "shoulders",
            Self::Traps => "traps",
            Self::Triceps => "triceps",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl std::fmt::Display for Muscle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a muscle is worked as a primary or secondary target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuscleRole {
    Primary,
    Secondary,
}

impl MuscleRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "primary" => Some(Self::Primary),
            "secondary" => Some(Self::Secondary),
            _ => None,
        }
    }
}
