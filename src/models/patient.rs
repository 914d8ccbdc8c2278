use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Lowest age the patient form accepts
pub const AGE_MIN: u8 = 30;
/// Highest age the patient form accepts
pub const AGE_MAX: u8 = 120;

/// Error returned when a label does not name a known option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOption(pub String);

impl fmt::Display for UnknownOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown option '{}'", self.0)
    }
}

impl std::error::Error for UnknownOption {}

/// Declares a closed set of form options with a display label per variant.
///
/// The label is used everywhere: HTML option values, serde, and the prompt.
macro_rules! labelled_options {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every option, in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = UnknownOption;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownOption(other.to_string())),
                }
            }
        }
    };
}

labelled_options!(
    /// Patient gender
    Gender {
        Male => "Male",
        Female => "Female",
        Other => "Other",
    }
);

labelled_options!(
    /// Pre-existing condition recorded in the medical history
    Condition {
        Diabetes => "Diabetes",
        Hypertension => "Hypertension",
        HeartDisease => "Heart Disease",
        None => "None",
    }
);

labelled_options!(
    /// Smoking habit
    SmokingStatus {
        NonSmoker => "Non-smoker",
        FormerSmoker => "Former smoker",
        CurrentSmoker => "Current smoker",
    }
);

labelled_options!(
    /// Region of interest the analysis should concentrate on
    FocusArea {
        CavityDetection => "Cavity Detection",
        BoneDensity => "Bone Density",
        RootCanalAssessment => "Root Canal Assessment",
        PeriodontalStatus => "Periodontal Status",
        WisdomTeeth => "Wisdom Teeth",
        OverallAssessment => "Overall Assessment",
    }
);

/// Patient history collected by the sidebar form.
///
/// Replaced wholesale on every form submission. The age bound is
/// enforced by the form collector, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientRecord {
    #[serde(default)]
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    /// Kept in option order so the prompt is stable
    #[schema(value_type = Vec<Condition>)]
    pub medical_history: BTreeSet<Condition>,
    pub dental_complaints: String,
    pub previous_treatments: String,
    pub smoking_status: SmokingStatus,
    pub last_visit: NaiveDate,
}

impl PatientRecord {
    /// Form defaults, with the last visit set to `today`
    pub fn with_visit(last_visit: NaiveDate) -> Self {
        Self {
            name: "John Doe".to_string(),
            age: AGE_MIN,
            gender: Gender::Male,
            medical_history: BTreeSet::from([Condition::None]),
            dental_complaints: "Tooth pain".to_string(),
            previous_treatments: "None".to_string(),
            smoking_status: SmokingStatus::NonSmoker,
            last_visit,
        }
    }

    /// Whether the record names a patient (required before analysis)
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn history_labels(&self) -> Vec<&'static str> {
        self.medical_history.iter().map(Condition::label).collect()
    }
}

impl Default for PatientRecord {
    fn default() -> Self {
        Self::with_visit(chrono::Local::now().date_naive())
    }
}
