use serde::{Deserialize, Serialize};

/// Classification state of an area fragment
///
/// Every area starts out `Unknown`. The probe moves it to `Deep` or
/// `Shallow`; a later split may replace it with fresh `Unknown` fragments.
/// Only `Deep` areas survive the cleanup pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keep {
    Deep,
    Shallow,
    #[default]
    Unknown,
}

impl Keep {
    /// Map a probe result onto a classification
    pub fn from_probe(deep: bool) -> Self {
        if deep {
            Keep::Deep
        } else {
            Keep::Shallow
        }
    }

    /// Whether the cleanup pass keeps an area in this state
    pub fn is_kept(self) -> bool {
        self == Keep::Deep
    }

    /// The nullable-boolean view used by the output properties
    pub fn as_option(self) -> Option<bool> {
        match self {
            Keep::Deep => Some(true),
            Keep::Shallow => Some(false),
            Keep::Unknown => None,
        }
    }
}
