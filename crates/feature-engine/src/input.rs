//! Applicant Input

use crate::categorical::{CompanyType, Education, EmploymentType, HouseType};
use serde::{Deserialize, Serialize};

/// Applicant gender, encoded as a binary code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Numeric code used by the models
    pub fn code(&self) -> u8 {
        match self {
            Gender::Female => 0,
            Gender::Male => 1,
        }
    }

    /// Decode a binary code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Gender::Female),
            1 => Some(Gender::Male),
            _ => None,
        }
    }
}

/// Applicant marital status, encoded as a binary code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaritalStatus {
    Single,
    Married,
}

impl MaritalStatus {
    /// Numeric code used by the models
    pub fn code(&self) -> u8 {
        match self {
            MaritalStatus::Single => 0,
            MaritalStatus::Married => 1,
        }
    }

    /// Decode a binary code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(MaritalStatus::Single),
            1 => Some(MaritalStatus::Married),
            _ => None,
        }
    }
}

/// The attributes collected from the applicant.
///
/// Ranges are enforced at the input boundary; nothing here re-checks them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub age: f64,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub education: Education,
    pub monthly_salary: f64,
    pub employment_type: EmploymentType,
    pub years_of_employment: f64,
    pub company_type: CompanyType,
    pub house_type: HouseType,
    pub monthly_rent: f64,
    pub credit_score: f64,
    pub bank_balance: f64,
    pub emergency_fund: f64,
}

impl Default for RawInput {
    /// The values the input form starts with
    fn default() -> Self {
        Self {
            age: 30.0,
            gender: Gender::Female,
            marital_status: MaritalStatus::Single,
            education: Education::Graduate,
            monthly_salary: 50_000.0,
            employment_type: EmploymentType::Government,
            years_of_employment: 5.0,
            company_type: CompanyType::Large,
            house_type: HouseType::Own,
            monthly_rent: 10_000.0,
            credit_score: 700.0,
            bank_balance: 100_000.0,
            emergency_fund: 50_000.0,
        }
    }
}
