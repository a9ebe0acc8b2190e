//! Property tests for feature engineering

use feature_engine::{
    engineer_features, Categorical, CompanyType, Education, EmploymentType, FeatureColumn,
    FeatureLayout, FeatureVector, Gender, HouseType, MaritalStatus, RawInput,
};
use proptest::prelude::*;

fn level<T: Categorical + std::fmt::Debug>() -> impl Strategy<Value = T> {
    prop::sample::select(T::LEVELS.to_vec())
}

prop_compose! {
    fn applicant()(
        age in 18.0f64..=100.0,
        male in any::<bool>(),
        married in any::<bool>(),
        education in level::<Education>(),
        monthly_salary in prop_oneof![Just(0.0f64), 0.0f64..1_000_000.0],
        employment_type in level::<EmploymentType>(),
        years_of_employment in 0.0f64..=50.0,
        company_type in level::<CompanyType>(),
        house_type in level::<HouseType>(),
        monthly_rent in 0.0f64..200_000.0,
        credit_score in 300.0f64..=900.0,
        bank_balance in 0.0f64..10_000_000.0,
        emergency_fund in 0.0f64..5_000_000.0,
    ) -> RawInput {
        RawInput {
            age,
            gender: if male { Gender::Male } else { Gender::Female },
            marital_status: if married { MaritalStatus::Married } else { MaritalStatus::Single },
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
        }
    }
}

const INDICATOR_GROUPS: [&[FeatureColumn]; 4] = [
    &[
        FeatureColumn::EducationHighSchool,
        FeatureColumn::EducationPostGraduate,
        FeatureColumn::EducationProfessional,
    ],
    &[
        FeatureColumn::EmploymentTypePrivate,
        FeatureColumn::EmploymentTypeSelfEmployed,
    ],
    &[
        FeatureColumn::CompanyTypeMidSize,
        FeatureColumn::CompanyTypeMnc,
        FeatureColumn::CompanyTypeSmall,
        FeatureColumn::CompanyTypeStartup,
    ],
    &[FeatureColumn::HouseTypeOwn, FeatureColumn::HouseTypeRented],
];

proptest! {
    #[test]
    fn engineering_is_deterministic(raw in applicant()) {
        prop_assert_eq!(engineer_features(&raw), engineer_features(&raw));
    }

    #[test]
    fn every_column_is_finite(raw in applicant()) {
        let record = engineer_features(&raw);
        let vector = FeatureVector::extract(&record, FeatureLayout::Classification);
        for (column, value) in vector.columns().iter().zip(vector.values()) {
            prop_assert!(value.is_finite(), "{} is {}", column, value);
        }
    }

    #[test]
    fn at_most_one_indicator_per_group(raw in applicant()) {
        let record = engineer_features(&raw);
        for group in INDICATOR_GROUPS {
            let hot: f64 = group.iter().map(|&c| record.value(c)).sum();
            prop_assert!(hot == 0.0 || hot == 1.0);
        }
        let education_hot: f64 = INDICATOR_GROUPS[0].iter().map(|&c| record.value(c)).sum();
        prop_assert_eq!(education_hot == 0.0, raw.education.is_reference());
    }

    #[test]
    fn regression_layout_is_classification_minus_emi(raw in applicant()) {
        let record = engineer_features(&raw);
        let classification = FeatureVector::extract(&record, FeatureLayout::Classification);
        let regression = FeatureVector::extract(&record, FeatureLayout::Regression);

        let expected: Vec<f64> = classification
            .columns()
            .iter()
            .zip(classification.values())
            .filter(|(&c, _)| c != FeatureColumn::MaxMonthlyEmi)
            .map(|(_, &v)| v)
            .collect();
        prop_assert_eq!(regression.values(), expected.as_slice());
    }

    #[test]
    fn unknown_labels_encode_like_reference(label in "[a-z]{1,12}") {
        let raw = RawInput {
            education: Education::from_label(&label),
            employment_type: EmploymentType::from_label(&label),
            company_type: CompanyType::from_label(&label),
            house_type: HouseType::from_label(&label),
            ..Default::default()
        };
        let record = engineer_features(&raw);
        for group in INDICATOR_GROUPS {
            for &column in group {
                prop_assert_eq!(record.value(column), 0.0);
            }
        }
    }
}

#[test]
fn end_to_end_ratios() {
    let raw = RawInput {
        monthly_salary: 50_000.0,
        credit_score: 750.0,
        bank_balance: 200_000.0,
        ..Default::default()
    };
    let record = engineer_features(&raw);
    let vector = FeatureVector::extract(&record, FeatureLayout::Classification);

    assert_eq!(vector.get(FeatureColumn::FinancialStability), Some(4.0));
    assert_eq!(vector.get(FeatureColumn::HousingBurdenRatio), Some(0.2));
    assert_eq!(vector.get(FeatureColumn::CreditScore), Some(750.0));
}
