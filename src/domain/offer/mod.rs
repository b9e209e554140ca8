//! Loan offers and the application projection handed to the decision
//! gateway.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{ApplicationId, UserIdentity};
use crate::domain::journey::FieldName;
use crate::domain::session::Session;

/// One loan offer.
///
/// Immutable once presented; the position in the session's offer list is
/// the selection key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Principal in whole rupees.
    pub amount: i64,
    /// Annual percentage rate.
    pub apr: f64,
    /// Tenure in months.
    pub term_months: u32,
    /// Approximate monthly installment in whole rupees.
    pub monthly_emi: i64,
    /// Processing fee as a percentage of principal.
    pub processing_fee_pct: f64,
}

/// Error raised when the answers cannot be projected into an application.
///
/// The orchestrator only projects after the consent step, so in practice
/// this indicates a corrupted session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("answer '{0:?}' is missing")]
    MissingAnswer(FieldName),

    #[error("answer '{0:?}' holds an unexpected value kind")]
    WrongKind(FieldName),

    #[error("credit-check consent has not been given")]
    ConsentMissing,
}

/// Read-only projection of the onboarding answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub application_id: ApplicationId,
    pub identity: UserIdentity,
    pub full_name: String,
    pub age: u32,
    pub employment: String,
    pub monthly_income: f64,
    pub purpose: String,
    pub consent_to_credit_check: bool,
}

impl LoanApplication {
    /// Projects a session's answers into an application.
    ///
    /// `today` anchors the age computation.
    ///
    /// # Errors
    ///
    /// - `MissingAnswer` / `WrongKind` when a required answer is absent or
    ///   mistyped
    /// - `ConsentMissing` when the consent flag is not set
    pub fn from_session(session: &Session, today: NaiveDate) -> Result<Self, ProjectionError> {
        let text = |field: FieldName| -> Result<String, ProjectionError> {
            session
                .answer(field)
                .ok_or(ProjectionError::MissingAnswer(field))?
                .as_text()
                .map(str::to_string)
                .ok_or(ProjectionError::WrongKind(field))
        };

        // Read in journey order, so the first gap reported is the first
        // step the user would have answered.
        let full_name = text(FieldName::FullName)?;
        let dob = session
            .answer(FieldName::DateOfBirth)
            .ok_or(ProjectionError::MissingAnswer(FieldName::DateOfBirth))?
            .as_date()
            .ok_or(ProjectionError::WrongKind(FieldName::DateOfBirth))?;
        let employment = text(FieldName::Employment)?;
        let monthly_income = session
            .answer(FieldName::MonthlyIncome)
            .ok_or(ProjectionError::MissingAnswer(FieldName::MonthlyIncome))?
            .as_number()
            .ok_or(ProjectionError::WrongKind(FieldName::MonthlyIncome))?;
        let purpose = text(FieldName::Purpose)?;

        if !session.flag("consent_given") {
            return Err(ProjectionError::ConsentMissing);
        }

        Ok(Self {
            application_id: ApplicationId::new(),
            identity: session.identity().clone(),
            full_name,
            age: today.years_since(dob).unwrap_or(0),
            employment,
            monthly_income,
            purpose,
            consent_to_credit_check: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::journey::Journey;
    use crate::domain::validation::FieldValue;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    fn onboarded_session() -> Session {
        let mut session = Session::new(
            UserIdentity::new("919876543210").unwrap(),
            Timestamp::now(),
        );
        session.enter(Journey::Onboarding).unwrap();
        session
            .set_answer(FieldName::FullName, FieldValue::Text("Jane Doe".into()))
            .unwrap();
        session
            .set_answer(
                FieldName::DateOfBirth,
                FieldValue::Date(NaiveDate::from_ymd_opt(1995, 12, 31).unwrap()),
            )
            .unwrap();
        session
            .set_answer(FieldName::Employment, FieldValue::Text("Salaried".into()))
            .unwrap();
        session
            .set_answer(FieldName::MonthlyIncome, FieldValue::Number(45000.0))
            .unwrap();
        session
            .set_answer(FieldName::Purpose, FieldValue::Text("Personal".into()))
            .unwrap();
        session.set_flag("consent_given", true);
        session
    }

    #[test]
    fn projects_complete_answers() {
        let application = LoanApplication::from_session(&onboarded_session(), anchor()).unwrap();
        assert_eq!(application.full_name, "Jane Doe");
        assert_eq!(application.age, 30);
        assert_eq!(application.employment, "Salaried");
        assert_eq!(application.monthly_income, 45000.0);
        assert!(application.consent_to_credit_check);
    }

    #[test]
    fn fails_on_missing_answer() {
        let mut session = onboarded_session();
        session.reset();
        assert_eq!(
            LoanApplication::from_session(&session, anchor()),
            Err(ProjectionError::MissingAnswer(FieldName::FullName))
        );
    }

    #[test]
    fn fails_without_consent() {
        let mut session = onboarded_session();
        session.set_flag("consent_given", false);
        assert_eq!(
            LoanApplication::from_session(&session, anchor()),
            Err(ProjectionError::ConsentMissing)
        );
    }
}
