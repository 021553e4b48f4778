use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::validate::{
    FieldError, check_email, check_max_len, check_name, check_phone, normalize_name,
    normalize_phone,
};

// CRM enums use SCREAMING values on the wire

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum YesNo {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Citizenship {
    #[serde(rename = "POLAND")]
    Poland,
    #[serde(rename = "OTHER")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Code95 {
    #[serde(rename = "NO")]
    No,
    #[serde(rename = "YES, POLISH")]
    YesPolish,
    #[serde(rename = "YES, OTHER EU COUNTRY")]
    YesOtherEu,
}

// Forms arrive with numbers sometimes quoted ("27" vs 27)
fn number_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    <T as FromStr>::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString<T> {
        Number(T),
        Text(String),
    }

    match NumberOrString::<T>::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Full application form, forwarded to the CRM as `PUT {crm_url}/{token}`.
///
/// `token`, `website` and `honeypot` never reach the CRM
/// (`skip_serializing`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationForm {
    #[serde(skip_serializing)]
    pub token: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viber_phone: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub age: u32,
    pub ce_experience_years: String,
    pub europe_experience_years: String,
    pub pesel_status: YesNo,
    pub medical_certificate: YesNo,
    pub work_schedule: String,
    pub truck_brands: String,
    pub trailer_types: String,
    pub countries_driven: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_employer: Option<String>,
    pub acceptance: bool,
    // Honeypot fields - humans never fill these
    #[serde(default, skip_serializing)]
    pub website: Option<String>,
    #[serde(default, skip_serializing)]
    pub honeypot: Option<String>,
}

impl ApplicationForm {
    pub fn is_bot(&self) -> bool {
        honeypot_tripped(&self.website) || honeypot_tripped(&self.honeypot)
    }

    /// Normalizes free-text fields in place and checks every constraint,
    /// collecting all failures rather than stopping at the first.
    pub fn validate(&mut self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.token.chars().count() < 10 {
            errors.push(FieldError::new("token", "invalid token"));
        }

        self.first_name = normalize_name(&self.first_name);
        self.last_name = normalize_name(&self.last_name);
        check_name("first_name", &self.first_name, &mut errors);
        check_name("last_name", &self.last_name, &mut errors);
        check_email("email", &self.email, &mut errors);

        check_phone("phone", &self.phone, &mut errors);
        self.phone = normalize_phone(&self.phone);

        // Empty string means the field was shown but left blank
        self.viber_phone = match self.viber_phone.take() {
            Some(raw) if !raw.is_empty() => {
                check_phone("viber_phone", &raw, &mut errors);
                Some(normalize_phone(&raw))
            }
            _ => None,
        };

        if !(21..=70).contains(&self.age) {
            errors.push(FieldError::new("age", "age must be between 21 and 70"));
        }

        check_max_len("ce_experience_years", &self.ce_experience_years, 10, &mut errors);
        check_max_len("europe_experience_years", &self.europe_experience_years, 10, &mut errors);
        check_max_len("work_schedule", &self.work_schedule, 100, &mut errors);
        check_max_len("truck_brands", &self.truck_brands, 200, &mut errors);
        check_max_len("trailer_types", &self.trailer_types, 200, &mut errors);
        check_max_len("countries_driven", &self.countries_driven, 500, &mut errors);
        if let Some(employer) = &self.last_employer {
            check_max_len("last_employer", employer, 200, &mut errors);
        }

        if !self.acceptance {
            errors.push(FieldError::new(
                "acceptance",
                "you must accept data processing consent",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Short lead form, forwarded to the CRM as `POST {crm_url}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadForm {
    pub first_name: String,
    pub email: String,
    pub whatsapp_phone: String,
    pub citizenship: Citizenship,
    pub has_experience: YesNo,
    pub code_95: Code95,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub vacancy_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ip: Option<String>,
    #[serde(default, skip_serializing)]
    pub website: Option<String>,
    #[serde(default, skip_serializing)]
    pub honeypot: Option<String>,
}

impl LeadForm {
    pub fn is_bot(&self) -> bool {
        honeypot_tripped(&self.website) || honeypot_tripped(&self.honeypot)
    }

    pub fn validate(&mut self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        self.first_name = normalize_name(&self.first_name);
        check_name("first_name", &self.first_name, &mut errors);
        check_email("email", &self.email, &mut errors);

        check_phone("whatsapp_phone", &self.whatsapp_phone, &mut errors);
        self.whatsapp_phone = normalize_phone(&self.whatsapp_phone);

        if NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d").is_err() {
            errors.push(FieldError::new(
                "start_date",
                "date must be in YYYY-MM-DD format",
            ));
        }

        if let Some(letter) = &self.cover_letter {
            check_max_len("cover_letter", letter, 1000, &mut errors);
        }

        if self.vacancy_id == 0 {
            errors.push(FieldError::new(
                "vacancy_id",
                "vacancy ID must be a positive number",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn honeypot_tripped(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.is_empty())
}
