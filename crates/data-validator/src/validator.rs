//! Data Validator for the Applicant Form

use crate::error::{ValidationError, ValidationErrors, ValidationWarning};
use feature_engine::{
    Categorical, CompanyType, Education, EmploymentType, Gender, HouseType, MaritalStatus,
    RawInput,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// The attribute names accepted at the input boundary
pub const ATTRIBUTE_NAMES: [&str; 13] = [
    "age",
    "gender",
    "marital_status",
    "education",
    "monthly_salary",
    "employment_type",
    "years_of_employment",
    "company_type",
    "house_type",
    "monthly_rent",
    "credit_score",
    "bank_balance",
    "emergency_fund",
];

/// Upper bound for monetary attributes.
///
/// Keeps every derived amount and ratio finite.
pub const MAX_AMOUNT: f64 = 1e12;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Age valid range (years)
    pub age_range: (f64, f64),
    /// Monthly salary valid range
    pub monthly_salary_range: (f64, f64),
    /// Years of employment valid range
    pub years_of_employment_range: (f64, f64),
    /// Monthly rent valid range
    pub monthly_rent_range: (f64, f64),
    /// Credit score valid range
    pub credit_score_range: (f64, f64),
    /// Bank balance valid range
    pub bank_balance_range: (f64, f64),
    /// Emergency fund valid range
    pub emergency_fund_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            age_range: (18.0, 100.0),
            monthly_salary_range: (0.0, MAX_AMOUNT),
            years_of_employment_range: (0.0, 50.0),
            monthly_rent_range: (0.0, MAX_AMOUNT),
            credit_score_range: (300.0, 900.0),
            bank_balance_range: (0.0, MAX_AMOUNT),
            emergency_fund_range: (0.0, MAX_AMOUNT),
        }
    }
}

/// A typed input plus anything worth telling the applicant about it
#[derive(Debug, Clone)]
pub struct ValidatedInput {
    pub input: RawInput,
    pub warnings: Vec<ValidationWarning>,
}

/// Validator for submitted applicant attributes
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() || value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Check the numeric ranges of an already typed input
    pub fn validate_input(&self, input: &RawInput) -> Result<(), ValidationErrors> {
        let errors = self.check_ranges([
            Some(input.age),
            Some(input.monthly_salary),
            Some(input.years_of_employment),
            Some(input.monthly_rent),
            Some(input.credit_score),
            Some(input.bank_balance),
            Some(input.emergency_fund),
        ]);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// Validate a JSON document holding the attribute mapping
    pub fn validate_value(&self, value: &Value) -> Result<ValidatedInput, ValidationErrors> {
        match value.as_object() {
            Some(attributes) => self.validate(attributes),
            None => Err(ValidationError::InvalidFormat(
                "expected an object of applicant attributes".to_string(),
            )
            .into()),
        }
    }

    /// Validate the attribute mapping and build the typed input.
    ///
    /// Every problem is reported, not just the first. Unknown category labels
    /// are warnings and fall back to the attribute's reference level.
    pub fn validate(&self, attributes: &Map<String, Value>) -> Result<ValidatedInput, ValidationErrors> {
        let mut fields = FieldReader {
            attributes,
            errors: Vec::new(),
            warnings: Vec::new(),
        };

        let age = fields.number("age");
        let gender = fields.binary("gender", Gender::from_code, |label| match label {
            "Female" => Some(Gender::Female),
            "Male" => Some(Gender::Male),
            _ => None,
        });
        let marital_status =
            fields.binary("marital_status", MaritalStatus::from_code, |label| match label {
                "Single" => Some(MaritalStatus::Single),
                "Married" => Some(MaritalStatus::Married),
                _ => None,
            });
        let education = fields.category::<Education>();
        let monthly_salary = fields.number("monthly_salary");
        let employment_type = fields.category::<EmploymentType>();
        let years_of_employment = fields.number("years_of_employment");
        let company_type = fields.category::<CompanyType>();
        let house_type = fields.category::<HouseType>();
        let monthly_rent = fields.number("monthly_rent");
        let credit_score = fields.number("credit_score");
        let bank_balance = fields.number("bank_balance");
        let emergency_fund = fields.number("emergency_fund");

        let FieldReader {
            mut errors,
            warnings,
            ..
        } = fields;

        let input = match (
            age,
            gender,
            marital_status,
            education,
            monthly_salary,
            employment_type,
            years_of_employment,
            company_type,
            house_type,
            monthly_rent,
            credit_score,
            bank_balance,
            emergency_fund,
        ) {
            (
                Some(age),
                Some(gender),
                Some(marital_status),
                Some(education),
                Some(monthly_salary),
                Some(employment_type),
                Some(years_of_employment),
                Some(company_type),
                Some(house_type),
                Some(monthly_rent),
                Some(credit_score),
                Some(bank_balance),
                Some(emergency_fund),
            ) => Some(RawInput {
                age,
                gender,
                marital_status,
                education,
                monthly_salary,
                employment_type,
                years_of_employment,
                company_type,
                house_type,
                monthly_rent,
                credit_score,
                bank_balance,
                emergency_fund,
            }),
            _ => None,
        };

        // Range checks only apply to numbers that parsed
        errors.extend(self.check_ranges([
            age,
            monthly_salary,
            years_of_employment,
            monthly_rent,
            credit_score,
            bank_balance,
            emergency_fund,
        ]));

        match input {
            Some(input) if errors.is_empty() => {
                debug!(
                    fields_checked = ATTRIBUTE_NAMES.len(),
                    warnings = warnings.len(),
                    "Applicant input validated"
                );
                Ok(ValidatedInput { input, warnings })
            }
            _ => {
                warn!(errors = errors.len(), "Applicant input rejected");
                Err(ValidationErrors(errors))
            }
        }
    }
}

impl Validator {
    /// Range-check the numeric attributes, in the order of [`Self::ranges`]
    fn check_ranges(&self, values: [Option<f64>; 7]) -> Vec<ValidationError> {
        self.ranges()
            .into_iter()
            .zip(values)
            .filter_map(|((field, range), value)| {
                value.and_then(|value| self.validate_range(field, value, range).err())
            })
            .collect()
    }

    fn ranges(&self) -> [(&'static str, (f64, f64)); 7] {
        let c = &self.config;
        [
            ("age", c.age_range),
            ("monthly_salary", c.monthly_salary_range),
            ("years_of_employment", c.years_of_employment_range),
            ("monthly_rent", c.monthly_rent_range),
            ("credit_score", c.credit_score_range),
            ("bank_balance", c.bank_balance_range),
            ("emergency_fund", c.emergency_fund_range),
        ]
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

/// Reads fields one by one, collecting errors instead of stopping at the first
struct FieldReader<'a> {
    attributes: &'a Map<String, Value>,
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl<'a> FieldReader<'a> {
    fn present(&mut self, field: &'static str) -> Option<&'a Value> {
        match self.attributes.get(field) {
            Some(Value::Null) | None => {
                self.errors.push(ValidationError::MissingField(field));
                None
            }
            Some(value) => Some(value),
        }
    }

    fn number(&mut self, field: &'static str) -> Option<f64> {
        let value = self.present(field)?.as_f64();
        if value.is_none() {
            self.errors.push(ValidationError::WrongType {
                field,
                expected: "a number",
            });
        }
        value
    }

    fn binary<T>(
        &mut self,
        field: &'static str,
        from_code: fn(u8) -> Option<T>,
        from_label: fn(&str) -> Option<T>,
    ) -> Option<T> {
        let value = self.present(field)?;
        let parsed = match value {
            Value::Number(n) => n
                .as_u64()
                .and_then(|code| u8::try_from(code).ok())
                .and_then(from_code),
            Value::String(label) => from_label(label),
            _ => {
                self.errors.push(ValidationError::WrongType {
                    field,
                    expected: "0, 1 or a label",
                });
                return None;
            }
        };
        if parsed.is_none() {
            self.errors.push(ValidationError::InvalidCode {
                field,
                value: value.to_string(),
            });
        }
        parsed
    }

    fn category<T: Categorical>(&mut self) -> Option<T> {
        let field = T::ATTRIBUTE;
        let label = match self.present(field)? {
            Value::String(label) => label,
            _ => {
                self.errors.push(ValidationError::WrongType {
                    field,
                    expected: "a category label",
                });
                return None;
            }
        };
        match T::parse(label) {
            Some(level) => Some(level),
            None => {
                self.warnings.push(ValidationWarning::UnknownCategory {
                    field,
                    value: label.clone(),
                    fallback: T::REFERENCE.label(),
                });
                Some(T::from_label(label))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form() -> Value {
        json!({
            "age": 30,
            "gender": 1,
            "marital_status": 0,
            "education": "Graduate",
            "monthly_salary": 50000,
            "employment_type": "Private",
            "years_of_employment": 5,
            "company_type": "MNC",
            "house_type": "Rented",
            "monthly_rent": 10000,
            "credit_score": 700,
            "bank_balance": 100000,
            "emergency_fund": 50000
        })
    }

    #[test]
    fn test_valid_form() {
        let validated = Validator::default().validate_value(&form()).unwrap();
        assert!(validated.warnings.is_empty());
        assert_eq!(validated.input.gender, Gender::Male);
        assert_eq!(validated.input.marital_status, MaritalStatus::Single);
        assert_eq!(validated.input.company_type, CompanyType::Mnc);
        assert_eq!(validated.input.monthly_salary, 50_000.0);
    }

    #[test]
    fn test_binary_fields_accept_labels() {
        let mut value = form();
        value["gender"] = json!("Female");
        value["marital_status"] = json!("Married");
        let validated = Validator::default().validate_value(&value).unwrap();
        assert_eq!(validated.input.gender, Gender::Female);
        assert_eq!(validated.input.marital_status, MaritalStatus::Married);
    }

    #[test]
    fn test_invalid_binary_code() {
        let mut value = form();
        value["gender"] = json!(2);
        let errors = Validator::default().validate_value(&value).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.0[0].field(), Some("gender"));
    }

    #[test]
    fn test_unknown_category_warns_and_falls_back() {
        let mut value = form();
        value["education"] = json!("Doctorate");
        let validated = Validator::default().validate_value(&value).unwrap();
        assert_eq!(validated.input.education, Education::Graduate);
        assert_eq!(
            validated.warnings,
            vec![ValidationWarning::UnknownCategory {
                field: "education",
                value: "Doctorate".to_string(),
                fallback: "Graduate",
            }]
        );
    }

    #[test]
    fn test_collects_every_error() {
        let mut value = form();
        value["age"] = json!(12);
        value["credit_score"] = json!(950);
        value["monthly_rent"] = json!("a lot");
        value.as_object_mut().unwrap().remove("bank_balance");

        let errors = Validator::default().validate_value(&value).unwrap_err();
        let fields: Vec<_> = errors.iter().filter_map(|e| e.field()).collect();
        assert_eq!(errors.len(), 4);
        assert!(fields.contains(&"age"));
        assert!(fields.contains(&"credit_score"));
        assert!(fields.contains(&"monthly_rent"));
        assert!(errors.0.contains(&ValidationError::MissingField("bank_balance")));
    }

    #[test]
    fn test_range_boundaries_are_inclusive() {
        let validator = Validator::default();
        assert!(validator.validate_range("age", 18.0, (18.0, 100.0)).is_ok());
        assert!(validator.validate_range("age", 100.0, (18.0, 100.0)).is_ok());
        assert!(validator.validate_range("age", 17.9, (18.0, 100.0)).is_err());
    }

    #[test]
    fn test_overflowing_salary_is_rejected() {
        let mut value = form();
        value["monthly_salary"] = json!(1e308);
        let errors = Validator::default().validate_value(&value).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.0[0].field(), Some("monthly_salary"));

        value["monthly_salary"] = json!(MAX_AMOUNT);
        assert!(Validator::default().validate_value(&value).is_ok());
    }

    #[test]
    fn test_non_finite_is_out_of_range() {
        let validator = Validator::default();
        let wide = (f64::MIN, f64::MAX);
        assert!(validator.validate_range("bank_balance", f64::NAN, wide).is_err());
        assert!(validator.validate_range("bank_balance", f64::INFINITY, wide).is_err());
    }

    #[test]
    fn test_zero_salary_is_accepted() {
        let mut value = form();
        value["monthly_salary"] = json!(0);
        assert!(Validator::default().validate_value(&value).is_ok());
    }

    #[test]
    fn test_validate_typed_input() {
        let validator = Validator::default();
        let mut input = RawInput::default();
        assert!(validator.validate_input(&input).is_ok());
        input.credit_score = 250.0;
        input.age = 120.0;
        assert_eq!(validator.validate_input(&input).unwrap_err().len(), 2);
    }

    #[test]
    fn test_non_object_rejected() {
        let errors = Validator::default().validate_value(&json!([1, 2])).unwrap_err();
        assert!(matches!(errors.0[0], ValidationError::InvalidFormat(_)));
    }
}
