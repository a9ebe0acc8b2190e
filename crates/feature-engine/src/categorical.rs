//! Categorical Attributes
//!
//! Each categorical input is a closed enumeration with one reference variant.
//! The reference variant has no indicator column; it is encoded as all zeros.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A closed set of labels with a designated reference level
pub trait Categorical: Sized + Copy + 'static {
    /// Attribute name as it appears in the input mapping
    const ATTRIBUTE: &'static str;
    /// Level encoded as all-zero indicators
    const REFERENCE: Self;
    /// Every level, reference first
    const LEVELS: &'static [Self];

    /// Exact label of this level
    fn label(&self) -> &'static str;

    /// Strict, case-sensitive lookup
    fn parse(label: &str) -> Option<Self> {
        Self::LEVELS.iter().copied().find(|level| level.label() == label)
    }

    /// Lookup that maps unknown labels to the reference level
    fn from_label(label: &str) -> Self {
        match Self::parse(label) {
            Some(level) => level,
            None => {
                warn!(
                    attribute = Self::ATTRIBUTE,
                    label,
                    reference = Self::REFERENCE.label(),
                    "Unknown category, encoding as reference level"
                );
                Self::REFERENCE
            }
        }
    }

    /// Whether this is the reference level
    fn is_reference(&self) -> bool {
        self.label() == Self::REFERENCE.label()
    }
}

/// Highest completed education
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Education {
    Graduate,
    HighSchool,
    PostGraduate,
    Professional,
}

impl Categorical for Education {
    const ATTRIBUTE: &'static str = "education";
    const REFERENCE: Self = Education::Graduate;
    const LEVELS: &'static [Self] = &[
        Education::Graduate,
        Education::HighSchool,
        Education::PostGraduate,
        Education::Professional,
    ];

    fn label(&self) -> &'static str {
        match self {
            Education::Graduate => "Graduate",
            Education::HighSchool => "High School",
            Education::PostGraduate => "Post Graduate",
            Education::Professional => "Professional",
        }
    }
}

/// Kind of employer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EmploymentType {
    Government,
    Private,
    SelfEmployed,
}

impl Categorical for EmploymentType {
    const ATTRIBUTE: &'static str = "employment_type";
    const REFERENCE: Self = EmploymentType::Government;
    const LEVELS: &'static [Self] = &[
        EmploymentType::Government,
        EmploymentType::Private,
        EmploymentType::SelfEmployed,
    ];

    fn label(&self) -> &'static str {
        match self {
            EmploymentType::Government => "Government",
            EmploymentType::Private => "Private",
            EmploymentType::SelfEmployed => "Self-Employed",
        }
    }
}

/// Size class of the employing company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompanyType {
    Large,
    MidSize,
    Mnc,
    Small,
    Startup,
}

impl Categorical for CompanyType {
    const ATTRIBUTE: &'static str = "company_type";
    const REFERENCE: Self = CompanyType::Large;
    const LEVELS: &'static [Self] = &[
        CompanyType::Large,
        CompanyType::MidSize,
        CompanyType::Mnc,
        CompanyType::Small,
        CompanyType::Startup,
    ];

    fn label(&self) -> &'static str {
        match self {
            CompanyType::Large => "Large",
            CompanyType::MidSize => "Mid-Size",
            CompanyType::Mnc => "MNC",
            CompanyType::Small => "Small",
            CompanyType::Startup => "Startup",
        }
    }
}

/// Housing situation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HouseType {
    Other,
    Own,
    Rented,
}

impl Categorical for HouseType {
    const ATTRIBUTE: &'static str = "house_type";
    const REFERENCE: Self = HouseType::Other;
    const LEVELS: &'static [Self] = &[HouseType::Other, HouseType::Own, HouseType::Rented];

    fn label(&self) -> &'static str {
        match self {
            HouseType::Other => "Other",
            HouseType::Own => "Own",
            HouseType::Rented => "Rented",
        }
    }
}

macro_rules! label_conversions {
    ($($ty:ty),*) => {
        $(
            impl From<String> for $ty {
                fn from(label: String) -> Self {
                    <$ty as Categorical>::from_label(&label)
                }
            }

            impl From<$ty> for String {
                fn from(level: $ty) -> Self {
                    level.label().to_string()
                }
            }

            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

label_conversions!(Education, EmploymentType, CompanyType, HouseType);
