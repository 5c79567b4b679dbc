//! Attribute value types.
//!
//! This module defines the closed set of concrete value kinds an attribute
//! can carry. The platform distinguishes plain identity data (names, contact
//! data, birth date components), structured complex values whose components
//! are themselves attribute values (`BirthDate`, `StreetAddress`), and
//! proprietary values used inside relationships.
//!
//! The enum is internally tagged with `@type`, which doubles as the value
//! type discriminator persisted in documents and matched by attribute
//! queries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for attribute values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// A date component was outside its calendar range.
    #[error("invalid date component: {0}")]
    InvalidDateComponent(String),

    /// An e-mail address was structurally invalid.
    #[error("invalid e-mail address: {0}")]
    InvalidEMailAddress(String),

    /// A nationality was not a two-letter country code.
    #[error("invalid country code: {0}")]
    InvalidCountryCode(String),

    /// A proprietary value was missing its title.
    #[error("proprietary value requires a non-empty title")]
    EmptyTitle,
}

/// The value carried by an attribute.
///
/// A closed sum: adding a variant forces every processor boundary that
/// matches on values to handle it. `value_type()` returns the serialized
/// `@type` discriminator, which is also the string form used by attribute
/// queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum AttributeValue {
    /// A person's given name.
    GivenName { value: String },
    /// A person's surname.
    Surname { value: String },
    /// The name an identity displays to peers.
    DisplayName { value: String },
    /// An e-mail address.
    EMailAddress { value: String },
    /// A phone number in free form.
    PhoneNumber { value: String },
    /// Nationality as an ISO 3166-1 alpha-2 code.
    Nationality { value: String },

    /// A full birth date. Complex: decomposes into day/month/year children.
    BirthDate { day: u8, month: u8, year: u16 },
    /// Day-of-month component of a birth date.
    BirthDay { value: u8 },
    /// Month component of a birth date.
    BirthMonth { value: u8 },
    /// Year component of a birth date.
    BirthYear { value: u16 },

    /// A postal address. Complex: decomposes into street/number/zip/city/country.
    StreetAddress {
        recipient: String,
        street: String,
        house_number: String,
        zip_code: String,
        city: String,
        country: String,
    },
    /// Street component of a postal address.
    Street { value: String },
    /// House number component of a postal address.
    HouseNumber { value: String },
    /// Zip code component of a postal address.
    ZipCode { value: String },
    /// City component of a postal address.
    City { value: String },
    /// Country component of a postal address.
    Country { value: String },

    /// A free-form string value scoped to one relationship.
    ProprietaryString {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        value: String,
    },
    /// An integer value scoped to one relationship.
    ProprietaryInteger {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        value: i64,
    },
}

impl AttributeValue {
    /// Returns the serialized `@type` discriminator of this value.
    #[must_use]
    pub fn value_type(&self) -> &'static str {
        match self {
            Self::GivenName { .. } => "GivenName",
            Self::Surname { .. } => "Surname",
            Self::DisplayName { .. } => "DisplayName",
            Self::EMailAddress { .. } => "EMailAddress",
            Self::PhoneNumber { .. } => "PhoneNumber",
            Self::Nationality { .. } => "Nationality",
            Self::BirthDate { .. } => "BirthDate",
            Self::BirthDay { .. } => "BirthDay",
            Self::BirthMonth { .. } => "BirthMonth",
            Self::BirthYear { .. } => "BirthYear",
            Self::StreetAddress { .. } => "StreetAddress",
            Self::Street { .. } => "Street",
            Self::HouseNumber { .. } => "HouseNumber",
            Self::ZipCode { .. } => "ZipCode",
            Self::City { .. } => "City",
            Self::Country { .. } => "Country",
            Self::ProprietaryString { .. } => "ProprietaryString",
            Self::ProprietaryInteger { .. } => "ProprietaryInteger",
        }
    }

    /// Whether this value decomposes into component child values.
    #[must_use]
    pub fn is_complex(&self) -> bool {
        matches!(self, Self::BirthDate { .. } | Self::StreetAddress { .. })
    }

    /// Component values of a complex value, in declaration order.
    ///
    /// Returns an empty vector for simple values.
    #[must_use]
    pub fn children(&self) -> Vec<AttributeValue> {
        match self {
            Self::BirthDate { day, month, year } => vec![
                Self::BirthDay { value: *day },
                Self::BirthMonth { value: *month },
                Self::BirthYear { value: *year },
            ],
            Self::StreetAddress {
                street,
                house_number,
                zip_code,
                city,
                country,
                ..
            } => vec![
                Self::Street {
                    value: street.clone(),
                },
                Self::HouseNumber {
                    value: house_number.clone(),
                },
                Self::ZipCode {
                    value: zip_code.clone(),
                },
                Self::City {
                    value: city.clone(),
                },
                Self::Country {
                    value: country.clone(),
                },
            ],
            _ => Vec::new(),
        }
    }

    /// Semantic validation of the value's fields.
    ///
    /// Structural validation (types, presence) is serde's job; this covers
    /// the field-level rules a well-formed value must satisfy.
    pub fn validate(&self) -> Result<(), ValueError> {
        match self {
            Self::BirthDate { day, month, .. } => {
                if !(1..=31).contains(day) {
                    return Err(ValueError::InvalidDateComponent(format!("day {day}")));
                }
                if !(1..=12).contains(month) {
                    return Err(ValueError::InvalidDateComponent(format!("month {month}")));
                }
                Ok(())
            }
            Self::BirthDay { value } => {
                if !(1..=31).contains(value) {
                    return Err(ValueError::InvalidDateComponent(format!("day {value}")));
                }
                Ok(())
            }
            Self::BirthMonth { value } => {
                if !(1..=12).contains(value) {
                    return Err(ValueError::InvalidDateComponent(format!("month {value}")));
                }
                Ok(())
            }
            Self::EMailAddress { value } => {
                let well_formed = value.split_once('@').is_some_and(|(local, domain)| {
                    !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
                });
                if !well_formed {
                    return Err(ValueError::InvalidEMailAddress(value.clone()));
                }
                Ok(())
            }
            Self::Nationality { value } => {
                if value.len() != 2 || !value.chars().all(|c| c.is_ascii_uppercase()) {
                    return Err(ValueError::InvalidCountryCode(value.clone()));
                }
                Ok(())
            }
            Self::ProprietaryString { title, .. } | Self::ProprietaryInteger { title, .. } => {
                if title.trim().is_empty() {
                    return Err(ValueError::EmptyTitle);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Title of a proprietary value, if this is one.
    #[must_use]
    pub fn proprietary_title(&self) -> Option<&str> {
        match self {
            Self::ProprietaryString { title, .. } | Self::ProprietaryInteger { title, .. } => {
                Some(title)
            }
            _ => None,
        }
    }

    /// Description of a proprietary value, if this is one and it has one.
    #[must_use]
    pub fn proprietary_description(&self) -> Option<&str> {
        match self {
            Self::ProprietaryString { description, .. }
            | Self::ProprietaryInteger { description, .. } => description.as_deref(),
            _ => None,
        }
    }
}
