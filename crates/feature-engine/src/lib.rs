//! Feature Engineering Engine
//!
//! Expands an applicant's attributes into the engineered record the EMI models
//! were trained on, and lays it out in the exact column order each model expects.

mod categorical;
mod columns;
mod features;
mod input;

pub use categorical::{Categorical, CompanyType, Education, EmploymentType, HouseType};
pub use columns::{
    FeatureColumn, FeatureLayout, FeatureVector, CLASSIFICATION_COLUMNS, REGRESSION_COLUMNS,
};
pub use features::{engineer_features, salary_divisor, EngineeredRecord, Indicators};
pub use input::{Gender, MaritalStatus, RawInput};

/// Fixed assumptions applied to every applicant
pub mod defaults {
    pub use crate::features::{
        COLLEGE_FEES_SHARE, DEFAULT_CURRENT_EMI, DEFAULT_DEPENDENTS, DEFAULT_EMI_SCENARIO,
        DEFAULT_EXISTING_LOANS, DEFAULT_FAMILY_SIZE, DEFAULT_REQUESTED_TENURE,
        EMI_SHARE_OF_SAVINGS, GROCERIES_UTILITIES_SHARE, OTHER_EXPENSES_SHARE,
        REQUESTED_SALARY_MONTHS, SCHOOL_FEES_SHARE, TRAVEL_EXPENSES_SHARE,
    };
}
