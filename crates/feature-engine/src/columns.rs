//! Model Column Layouts
//!
//! The models consume positional arrays, so the column order is part of the
//! model contract. Values are always looked up by column identity and only
//! flattened into a positional array at the final hand-off.

use crate::features::EngineeredRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every column a model can consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FeatureColumn {
    Age,
    Gender,
    MaritalStatus,
    MonthlySalary,
    YearsOfEmployment,
    MonthlyRent,
    FamilySize,
    Dependents,
    SchoolFees,
    CollegeFees,
    TravelExpenses,
    GroceriesUtilities,
    OtherMonthlyExpenses,
    ExistingLoans,
    CurrentEmiAmount,
    CreditScore,
    BankBalance,
    EmergencyFund,
    EmiScenario,
    RequestedAmount,
    RequestedTenure,
    MaxMonthlyEmi,
    DebtToIncomeRatio,
    TotalMonthlyExpenses,
    SavingsCapacity,
    FinancialStability,
    PerCapitaIncome,
    EmploymentStability,
    HousingBurdenRatio,
    LoanToIncomeRatio,
    ExpanceToIncomeRatio,
    AffordabilityRatio,
    EducationHighSchool,
    EducationPostGraduate,
    EducationProfessional,
    EmploymentTypePrivate,
    EmploymentTypeSelfEmployed,
    CompanyTypeMidSize,
    CompanyTypeMnc,
    CompanyTypeSmall,
    CompanyTypeStartup,
    HouseTypeOwn,
    HouseTypeRented,
}

/// Column order of the classification model
pub const CLASSIFICATION_COLUMNS: [FeatureColumn; 43] = {
    use FeatureColumn::*;
    [
        Age,
        Gender,
        MaritalStatus,
        MonthlySalary,
        YearsOfEmployment,
        MonthlyRent,
        FamilySize,
        Dependents,
        SchoolFees,
        CollegeFees,
        TravelExpenses,
        GroceriesUtilities,
        OtherMonthlyExpenses,
        ExistingLoans,
        CurrentEmiAmount,
        CreditScore,
        BankBalance,
        EmergencyFund,
        EmiScenario,
        RequestedAmount,
        RequestedTenure,
        MaxMonthlyEmi,
        DebtToIncomeRatio,
        TotalMonthlyExpenses,
        SavingsCapacity,
        FinancialStability,
        PerCapitaIncome,
        EmploymentStability,
        HousingBurdenRatio,
        LoanToIncomeRatio,
        ExpanceToIncomeRatio,
        AffordabilityRatio,
        EducationHighSchool,
        EducationPostGraduate,
        EducationProfessional,
        EmploymentTypePrivate,
        EmploymentTypeSelfEmployed,
        CompanyTypeMidSize,
        CompanyTypeMnc,
        CompanyTypeSmall,
        CompanyTypeStartup,
        HouseTypeOwn,
        HouseTypeRented,
    ]
};

/// Column order of the regression model: classification order without
/// `max_monthly_emi`, which leaks the regression target.
pub const REGRESSION_COLUMNS: [FeatureColumn; 42] = {
    use FeatureColumn::*;
    [
        Age,
        Gender,
        MaritalStatus,
        MonthlySalary,
        YearsOfEmployment,
        MonthlyRent,
        FamilySize,
        Dependents,
        SchoolFees,
        CollegeFees,
        TravelExpenses,
        GroceriesUtilities,
        OtherMonthlyExpenses,
        ExistingLoans,
        CurrentEmiAmount,
        CreditScore,
        BankBalance,
        EmergencyFund,
        EmiScenario,
        RequestedAmount,
        RequestedTenure,
        DebtToIncomeRatio,
        TotalMonthlyExpenses,
        SavingsCapacity,
        FinancialStability,
        PerCapitaIncome,
        EmploymentStability,
        HousingBurdenRatio,
        LoanToIncomeRatio,
        ExpanceToIncomeRatio,
        AffordabilityRatio,
        EducationHighSchool,
        EducationPostGraduate,
        EducationProfessional,
        EmploymentTypePrivate,
        EmploymentTypeSelfEmployed,
        CompanyTypeMidSize,
        CompanyTypeMnc,
        CompanyTypeSmall,
        CompanyTypeStartup,
        HouseTypeOwn,
        HouseTypeRented,
    ]
};

impl FeatureColumn {
    /// Column name as the models were trained with it
    pub fn name(&self) -> &'static str {
        use FeatureColumn::*;
        match self {
            Age => "age",
            Gender => "gender",
            MaritalStatus => "marital_status",
            MonthlySalary => "monthly_salary",
            YearsOfEmployment => "years_of_employment",
            MonthlyRent => "monthly_rent",
            FamilySize => "family_size",
            Dependents => "dependents",
            SchoolFees => "school_fees",
            CollegeFees => "college_fees",
            TravelExpenses => "travel_expenses",
            GroceriesUtilities => "groceries_utilities",
            OtherMonthlyExpenses => "other_monthly_expenses",
            ExistingLoans => "existing_loans",
            CurrentEmiAmount => "current_emi_amount",
            CreditScore => "credit_score",
            BankBalance => "bank_balance",
            EmergencyFund => "emergency_fund",
            EmiScenario => "emi_scenario",
            RequestedAmount => "requested_amount",
            RequestedTenure => "requested_tenure",
            MaxMonthlyEmi => "max_monthly_emi",
            DebtToIncomeRatio => "debt_to_income_ratio",
            TotalMonthlyExpenses => "total_monthly_expenses",
            SavingsCapacity => "savings_capacity",
            FinancialStability => "financial_stability",
            PerCapitaIncome => "per_capita_income",
            EmploymentStability => "employment_stability",
            HousingBurdenRatio => "housing_burden_ratio",
            LoanToIncomeRatio => "loan_to_income_ratio",
            ExpanceToIncomeRatio => "expance_to_income_ratio",
            AffordabilityRatio => "affordability_ratio",
            EducationHighSchool => "education_high school",
            EducationPostGraduate => "education_post graduate",
            EducationProfessional => "education_professional",
            EmploymentTypePrivate => "employment_type_private",
            EmploymentTypeSelfEmployed => "employment_type_self-employed",
            CompanyTypeMidSize => "company_type_mid-size",
            CompanyTypeMnc => "company_type_mnc",
            CompanyTypeSmall => "company_type_small",
            CompanyTypeStartup => "company_type_startup",
            HouseTypeOwn => "house_type_own",
            HouseTypeRented => "house_type_rented",
        }
    }

    /// Look a column up by its trained name
    pub fn from_name(name: &str) -> Option<Self> {
        CLASSIFICATION_COLUMNS
            .iter()
            .copied()
            .find(|column| column.name() == name)
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for FeatureColumn {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        FeatureColumn::from_name(&name).ok_or_else(|| format!("unknown feature column '{name}'"))
    }
}

impl From<FeatureColumn> for String {
    fn from(column: FeatureColumn) -> Self {
        column.name().to_string()
    }
}

impl EngineeredRecord {
    /// Value of one column
    pub fn value(&self, column: FeatureColumn) -> f64 {
        use FeatureColumn::*;
        let raw = &self.raw;
        let ind = &self.indicators;
        match column {
            Age => raw.age,
            Gender => f64::from(raw.gender.code()),
            MaritalStatus => f64::from(raw.marital_status.code()),
            MonthlySalary => raw.monthly_salary,
            YearsOfEmployment => raw.years_of_employment,
            MonthlyRent => raw.monthly_rent,
            FamilySize => self.family_size,
            Dependents => self.dependents,
            SchoolFees => self.school_fees,
            CollegeFees => self.college_fees,
            TravelExpenses => self.travel_expenses,
            GroceriesUtilities => self.groceries_utilities,
            OtherMonthlyExpenses => self.other_monthly_expenses,
            ExistingLoans => self.existing_loans,
            CurrentEmiAmount => self.current_emi_amount,
            CreditScore => raw.credit_score,
            BankBalance => raw.bank_balance,
            EmergencyFund => raw.emergency_fund,
            EmiScenario => self.emi_scenario,
            RequestedAmount => self.requested_amount,
            RequestedTenure => self.requested_tenure,
            MaxMonthlyEmi => self.max_monthly_emi,
            DebtToIncomeRatio => self.debt_to_income_ratio,
            TotalMonthlyExpenses => self.total_monthly_expenses,
            SavingsCapacity => self.savings_capacity,
            FinancialStability => self.financial_stability,
            PerCapitaIncome => self.per_capita_income,
            EmploymentStability => self.employment_stability,
            HousingBurdenRatio => self.housing_burden_ratio,
            LoanToIncomeRatio => self.loan_to_income_ratio,
            ExpanceToIncomeRatio => self.expance_to_income_ratio,
            AffordabilityRatio => self.affordability_ratio,
            EducationHighSchool => f64::from(ind.education_high_school),
            EducationPostGraduate => f64::from(ind.education_post_graduate),
            EducationProfessional => f64::from(ind.education_professional),
            EmploymentTypePrivate => f64::from(ind.employment_type_private),
            EmploymentTypeSelfEmployed => f64::from(ind.employment_type_self_employed),
            CompanyTypeMidSize => f64::from(ind.company_type_mid_size),
            CompanyTypeMnc => f64::from(ind.company_type_mnc),
            CompanyTypeSmall => f64::from(ind.company_type_small),
            CompanyTypeStartup => f64::from(ind.company_type_startup),
            HouseTypeOwn => f64::from(ind.house_type_own),
            HouseTypeRented => f64::from(ind.house_type_rented),
        }
    }

    /// Value of a column given its trained name
    pub fn value_by_name(&self, name: &str) -> Option<f64> {
        FeatureColumn::from_name(name).map(|column| self.value(column))
    }
}

/// Which model a vector is laid out for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureLayout {
    /// All engineered columns
    #[default]
    Classification,
    /// All engineered columns except `max_monthly_emi`
    Regression,
}

impl FeatureLayout {
    /// Ordered columns of this layout
    pub fn columns(&self) -> &'static [FeatureColumn] {
        match self {
            FeatureLayout::Classification => &CLASSIFICATION_COLUMNS,
            FeatureLayout::Regression => &REGRESSION_COLUMNS,
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns().len()
    }
}

/// Feature vector for ML inference: values paired with the columns they hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    columns: Vec<FeatureColumn>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Extract a record's values in the order of a layout
    pub fn extract(record: &EngineeredRecord, layout: FeatureLayout) -> Self {
        let columns = layout.columns().to_vec();
        let values = columns.iter().map(|&column| record.value(column)).collect();
        Self { columns, values }
    }

    /// Pair existing values with their columns.
    ///
    /// Returns `None` when the lengths differ.
    pub fn from_parts(columns: Vec<FeatureColumn>, values: Vec<f64>) -> Option<Self> {
        (columns.len() == values.len()).then_some(Self { columns, values })
    }

    /// Columns in order
    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    /// Values in column order, ready for positional hand-off
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of one column, if present
    pub fn get(&self, column: FeatureColumn) -> Option<f64> {
        self.columns
            .iter()
            .position(|&c| c == column)
            .map(|idx| self.values[idx])
    }

    /// Whether the columns match a layout exactly, order included
    pub fn matches(&self, layout: FeatureLayout) -> bool {
        self.columns == layout.columns()
    }

    /// Replace every value, keeping the columns.
    ///
    /// Returns `None` when the number of values differs.
    pub fn with_values(&self, values: Vec<f64>) -> Option<Self> {
        Self::from_parts(self.columns.clone(), values)
    }

    /// Re-order by column name onto another layout.
    ///
    /// Returns the first missing column when this vector lacks one the layout needs.
    pub fn project(&self, layout: FeatureLayout) -> Result<Self, FeatureColumn> {
        let columns = layout.columns().to_vec();
        let values = columns
            .iter()
            .map(|&column| self.get(column).ok_or(column))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns, values })
    }
}
