use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::domain::{Provider, ProviderDraft};

/// Summary shown when a form is rejected locally.
pub const FORM_REJECTED_MESSAGE: &str = "Please fix the errors before submitting";

/// Raw provider form input, every field as typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderForm {
    pub legal_name: String,
    pub trade_name: String,
    pub tax_id: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    #[serde(rename = "addresss")]
    pub address: String,
    pub country: String,
    pub annual_revenue: String,
}

/// Field name to message, one message per failing field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn record(&mut self, field: &'static str, outcome: Result<(), &'static str>) {
        if let Err(message) = outcome {
            self.fields.insert(field, message.to_string());
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(FORM_REJECTED_MESSAGE)
    }
}

impl std::error::Error for ValidationErrors {}

struct Patterns {
    digits: Regex,
    email: Regex,
    website: Regex,
    phone: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        digits: compile(r"^[0-9]+$"),
        email: compile(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"),
        website: compile(r"^https?://.+"),
        phone: compile(r"^\+?[0-9\s\-()]{7,15}$"),
    })
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static validation pattern compiles")
}

impl ProviderForm {
    /// Prefills the form from a stored record; zero revenue shows as blank.
    pub fn from_provider(provider: &Provider) -> Self {
        Self {
            legal_name: provider.legal_name.clone(),
            trade_name: provider.trade_name.clone(),
            tax_id: provider.tax_id.clone(),
            phone: provider.phone.clone(),
            email: provider.email.clone(),
            website: provider.website.clone(),
            address: provider.address.clone(),
            country: provider.country.clone(),
            annual_revenue: if provider.annual_revenue == 0.0 {
                String::new()
            } else {
                provider.annual_revenue.to_string()
            },
        }
    }

    pub fn validate(&self) -> Result<ProviderDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.record("legalName", check_legal_name(&self.legal_name));
        errors.record("taxId", check_tax_id(&self.tax_id));
        errors.record("email", check_email(&self.email));
        errors.record("country", check_country(&self.country));
        errors.record("website", check_website(&self.website));
        errors.record("phone", check_phone(&self.phone));

        let revenue = parse_revenue(&self.annual_revenue);
        errors.record("annualRevenue", revenue.map(|_| ()));

        match revenue {
            Ok(annual_revenue) if errors.is_empty() => Ok(ProviderDraft {
                legal_name: self.legal_name.clone(),
                trade_name: self.trade_name.clone(),
                tax_id: self.tax_id.clone(),
                phone: self.phone.clone(),
                email: self.email.clone(),
                website: self.website.clone(),
                address: self.address.clone(),
                country: self.country.clone(),
                annual_revenue,
            }),
            _ => Err(errors),
        }
    }
}

fn check_legal_name(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Legal name is required");
    }
    if value.chars().count() < 3 {
        return Err("Legal name must be at least 3 characters");
    }
    Ok(())
}

fn check_tax_id(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Tax ID is required");
    }
    if !patterns().digits.is_match(value) {
        return Err("Tax ID must contain only digits");
    }
    if value.len() != 11 {
        return Err("Tax ID must be exactly 11 digits");
    }
    Ok(())
}

fn check_email(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Email is required");
    }
    if !patterns().email.is_match(value) {
        return Err("Please enter a valid email address");
    }
    Ok(())
}

fn check_country(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Country is required");
    }
    Ok(())
}

fn check_website(value: &str) -> Result<(), &'static str> {
    if !value.is_empty() && !patterns().website.is_match(value) {
        return Err("Website must start with http:// or https://");
    }
    Ok(())
}

fn check_phone(value: &str) -> Result<(), &'static str> {
    if !value.is_empty() && !patterns().phone.is_match(value) {
        return Err("Please enter a valid phone number");
    }
    Ok(())
}

fn parse_revenue(value: &str) -> Result<f64, &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount < 0.0 => Err("Annual revenue cannot be negative"),
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err("Please enter a valid number"),
    }
}
