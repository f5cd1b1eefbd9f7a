//! Denormalized customer and delivery details copied onto each order.

use serde::{Deserialize, Serialize};

use critter_games_core::{CountryCode, Email};

/// A customer field failed the column constraints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomerDetailsError {
    #[error("{0} cannot be blank")]
    Blank(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Customer record as it was entered at checkout.
///
/// Orders keep their own copy so later profile edits do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone_number: String,
    pub street_address1: String,
    pub street_address2: Option<String>,
    pub town_or_city: String,
    pub county: Option<String>,
    pub postcode: String,
    pub country: CountryCode,
}

impl CustomerDetails {
    /// Check required fields and the `VARCHAR` limits of the orders table.
    ///
    /// # Errors
    ///
    /// Returns the first field that is blank or too long.
    pub fn validate(&self) -> Result<(), CustomerDetailsError> {
        required("first_name", &self.first_name, 50)?;
        required("last_name", &self.last_name, 50)?;
        required("phone_number", &self.phone_number, 20)?;
        required("street_address1", &self.street_address1, 80)?;
        optional("street_address2", self.street_address2.as_deref(), 80)?;
        required("town_or_city", &self.town_or_city, 40)?;
        optional("county", self.county.as_deref(), 80)?;
        required("postcode", &self.postcode, 20)?;
        Ok(())
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn required(field: &'static str, value: &str, max: usize) -> Result<(), CustomerDetailsError> {
    if value.trim().is_empty() {
        return Err(CustomerDetailsError::Blank(field));
    }
    optional(field, Some(value), max)
}

fn optional(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), CustomerDetailsError> {
    match value {
        Some(v) if v.chars().count() > max => Err(CustomerDetailsError::TooLong { field, max }),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample() -> CustomerDetails {
        CustomerDetails {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            phone_number: "+44 20 7946 0000".to_string(),
            street_address1: "12 Analytical Row".to_string(),
            street_address2: None,
            town_or_city: "London".to_string(),
            county: Some("Greater London".to_string()),
            postcode: "N1 9GU".to_string(),
            country: CountryCode::parse("GB").unwrap(),
        }
    }

    #[test]
    fn test_sample_is_valid() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn test_blank_required_field() {
        let mut details = sample();
        details.postcode = "   ".to_string();
        assert_eq!(
            details.validate(),
            Err(CustomerDetailsError::Blank("postcode"))
        );
    }

    #[test]
    fn test_too_long_optional_field() {
        let mut details = sample();
        details.county = Some("x".repeat(81));
        assert_eq!(
            details.validate(),
            Err(CustomerDetailsError::TooLong {
                field: "county",
                max: 80
            })
        );
    }

    #[test]
    fn test_limits_count_characters_not_bytes() {
        let mut details = sample();
        details.town_or_city = "é".repeat(40);
        assert_eq!(details.validate(), Ok(()));
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample().full_name(), "Ada Lovelace");
    }
}
