//! Engineered Feature Record

use crate::categorical::{CompanyType, Education, EmploymentType, HouseType};
use crate::input::RawInput;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Expense components as fractions of monthly salary
pub const SCHOOL_FEES_SHARE: f64 = 0.05;
pub const COLLEGE_FEES_SHARE: f64 = 0.03;
pub const TRAVEL_EXPENSES_SHARE: f64 = 0.02;
pub const GROCERIES_UTILITIES_SHARE: f64 = 0.15;
pub const OTHER_EXPENSES_SHARE: f64 = 0.08;

/// Share of savings capacity that may go to an installment
pub const EMI_SHARE_OF_SAVINGS: f64 = 0.4;

/// Values the form does not collect
pub const DEFAULT_FAMILY_SIZE: f64 = 4.0;
pub const DEFAULT_DEPENDENTS: f64 = 2.0;
pub const DEFAULT_EXISTING_LOANS: f64 = 0.0;
pub const DEFAULT_CURRENT_EMI: f64 = 0.0;
pub const DEFAULT_REQUESTED_TENURE: f64 = 24.0;
pub const DEFAULT_EMI_SCENARIO: f64 = 1.0;
/// Requested amount is this many months of salary
pub const REQUESTED_SALARY_MONTHS: f64 = 12.0;

/// One-hot indicators for the four categorical attributes.
///
/// Reference levels (Graduate, Government, Large, Other) have no column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicators {
    #[serde(rename = "education_high school")]
    pub education_high_school: u8,
    #[serde(rename = "education_post graduate")]
    pub education_post_graduate: u8,
    pub education_professional: u8,
    pub employment_type_private: u8,
    #[serde(rename = "employment_type_self-employed")]
    pub employment_type_self_employed: u8,
    #[serde(rename = "company_type_mid-size")]
    pub company_type_mid_size: u8,
    pub company_type_mnc: u8,
    pub company_type_small: u8,
    pub company_type_startup: u8,
    pub house_type_own: u8,
    pub house_type_rented: u8,
}

impl Indicators {
    /// Encode the categorical attributes of an input
    pub fn encode(
        education: Education,
        employment_type: EmploymentType,
        company_type: CompanyType,
        house_type: HouseType,
    ) -> Self {
        let mut indicators = Indicators::default();

        match education {
            Education::Graduate => {}
            Education::HighSchool => indicators.education_high_school = 1,
            Education::PostGraduate => indicators.education_post_graduate = 1,
            Education::Professional => indicators.education_professional = 1,
        }

        match employment_type {
            EmploymentType::Government => {}
            EmploymentType::Private => indicators.employment_type_private = 1,
            EmploymentType::SelfEmployed => indicators.employment_type_self_employed = 1,
        }

        match company_type {
            CompanyType::Large => {}
            CompanyType::MidSize => indicators.company_type_mid_size = 1,
            CompanyType::Mnc => indicators.company_type_mnc = 1,
            CompanyType::Small => indicators.company_type_small = 1,
            CompanyType::Startup => indicators.company_type_startup = 1,
        }

        match house_type {
            HouseType::Other => {}
            HouseType::Own => indicators.house_type_own = 1,
            HouseType::Rented => indicators.house_type_rented = 1,
        }

        indicators
    }
}

/// Raw input plus every derived column the models were trained on.
///
/// Built once by [`engineer_features`]; fields are not meant to change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineeredRecord {
    #[serde(flatten)]
    pub raw: RawInput,

    // Expense components
    pub school_fees: f64,
    pub college_fees: f64,
    pub travel_expenses: f64,
    pub groceries_utilities: f64,
    pub other_monthly_expenses: f64,

    // Defaults not collected from the applicant
    pub family_size: f64,
    pub dependents: f64,
    pub existing_loans: f64,
    pub current_emi_amount: f64,
    pub requested_amount: f64,
    pub requested_tenure: f64,
    pub emi_scenario: f64,

    // Aggregates
    pub total_monthly_expenses: f64,
    pub savings_capacity: f64,
    pub max_monthly_emi: f64,

    // Ratios
    pub debt_to_income_ratio: f64,
    pub financial_stability: f64,
    pub per_capita_income: f64,
    pub employment_stability: f64,
    pub housing_burden_ratio: f64,
    pub loan_to_income_ratio: f64,
    pub expance_to_income_ratio: f64,
    pub affordability_ratio: f64,

    #[serde(flatten)]
    pub indicators: Indicators,
}

/// Salary used as a ratio divisor: zero is replaced by one.
///
/// This mirrors the training pipeline, so a zero salary yields ratios against
/// a divisor of 1 rather than an error or NaN. Revisit if the models are retrained.
pub fn salary_divisor(monthly_salary: f64) -> f64 {
    if monthly_salary == 0.0 {
        1.0
    } else {
        monthly_salary
    }
}

/// Expand the applicant's attributes into the full engineered record
pub fn engineer_features(raw: &RawInput) -> EngineeredRecord {
    let salary = raw.monthly_salary;
    let divisor = salary_divisor(salary);

    let school_fees = salary * SCHOOL_FEES_SHARE;
    let college_fees = salary * COLLEGE_FEES_SHARE;
    let travel_expenses = salary * TRAVEL_EXPENSES_SHARE;
    let groceries_utilities = salary * GROCERIES_UTILITIES_SHARE;
    let other_monthly_expenses = salary * OTHER_EXPENSES_SHARE;

    let family_size = DEFAULT_FAMILY_SIZE;
    let current_emi_amount = DEFAULT_CURRENT_EMI;
    let requested_amount = salary * REQUESTED_SALARY_MONTHS;

    // Summed left to right in this order to match the training pipeline
    let total_monthly_expenses = raw.monthly_rent
        + school_fees
        + college_fees
        + travel_expenses
        + groceries_utilities
        + other_monthly_expenses;
    let savings_capacity = salary - total_monthly_expenses;
    let max_monthly_emi = savings_capacity * EMI_SHARE_OF_SAVINGS;

    let record = EngineeredRecord {
        raw: raw.clone(),
        school_fees,
        college_fees,
        travel_expenses,
        groceries_utilities,
        other_monthly_expenses,
        family_size,
        dependents: DEFAULT_DEPENDENTS,
        existing_loans: DEFAULT_EXISTING_LOANS,
        current_emi_amount,
        requested_amount,
        requested_tenure: DEFAULT_REQUESTED_TENURE,
        emi_scenario: DEFAULT_EMI_SCENARIO,
        total_monthly_expenses,
        savings_capacity,
        max_monthly_emi,
        debt_to_income_ratio: current_emi_amount / divisor,
        financial_stability: raw.bank_balance / divisor,
        per_capita_income: salary / family_size,
        employment_stability: raw.years_of_employment / 10.0,
        housing_burden_ratio: raw.monthly_rent / divisor,
        loan_to_income_ratio: requested_amount / (divisor * REQUESTED_SALARY_MONTHS),
        expance_to_income_ratio: total_monthly_expenses / divisor,
        affordability_ratio: max_monthly_emi / divisor,
        indicators: Indicators::encode(
            raw.education,
            raw.employment_type,
            raw.company_type,
            raw.house_type,
        ),
    };

    debug!(
        salary,
        total_monthly_expenses, max_monthly_emi, "Engineered applicant features"
    );

    record
}

impl From<&RawInput> for EngineeredRecord {
    fn from(raw: &RawInput) -> Self {
        engineer_features(raw)
    }
}
