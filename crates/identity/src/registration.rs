//! Registration and login payloads with their field validation.
//!
//! Each `check()` returns every field failure it found together with the
//! normalized email (when the email itself was valid), so callers can add
//! uniqueness failures before rejecting the whole payload.

use serde::Deserialize;

use agora_core::validation::{check_name, check_present};
use agora_core::{Email, ValidationErrors};

const MIN_NAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentRegistration {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone_number: Option<String>,
}

impl AgentRegistration {
    pub fn check(&self) -> (ValidationErrors, Option<Email>) {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "firstname", "Firstname", &self.firstname, MIN_NAME_LEN);
        check_name(&mut errors, "lastname", "Lastname", &self.lastname, MIN_NAME_LEN);
        let email = check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password, &self.confirm_password);
        (errors, email)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DistributorRegistration {
    pub business_name: String,
    pub representative_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub contact_email: Option<String>,
    pub phone_number: Option<String>,
}

impl DistributorRegistration {
    pub fn check(&self) -> (ValidationErrors, Option<Email>) {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "business_name", "Business name", &self.business_name, MIN_NAME_LEN);
        check_name(
            &mut errors,
            "representative_name",
            "Representative name",
            &self.representative_name,
            MIN_NAME_LEN,
        );
        let email = check_email(&mut errors, &self.email);
        let contact = self.contact_email.as_deref().unwrap_or("");
        if !contact.trim().is_empty() && Email::parse(contact).is_err() {
            errors.add("contact_email", "Invalid email address.");
        }
        check_password(&mut errors, &self.password, &self.confirm_password);
        (errors, email)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InsuranceRegistration {
    pub company_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub contact_email: String,
    pub contact_phone: String,
}

impl InsuranceRegistration {
    pub fn check(&self) -> (ValidationErrors, Option<Email>) {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "company_name", "Company name", &self.company_name, MIN_NAME_LEN);
        let email = check_email(&mut errors, &self.email);
        match Email::parse(&self.contact_email) {
            Ok(_) => {}
            Err(msg) => errors.add("contact_email", msg.replace("Email", "Contact email")),
        }
        check_present(&mut errors, "contact_phone", "Contact phone", &self.contact_phone);
        check_password(&mut errors, &self.password, &self.confirm_password);
        (errors, email)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn check(&self) -> Result<Email, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result()?;
        Email::parse(&self.email)
            .map_err(|_| ValidationErrors::single("email", "Invalid email or password"))
    }
}

fn check_email(errors: &mut ValidationErrors, raw: &str) -> Option<Email> {
    match Email::parse(raw) {
        Ok(email) => Some(email),
        Err(msg) => {
            errors.add("email", msg);
            None
        }
    }
}

/// Length and character-class rules plus the confirmation match.
pub fn check_password(errors: &mut ValidationErrors, password: &str, confirm: &str) {
    if password.is_empty() {
        errors.add("password", "Password field is blank.");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", "Password is too short. Must be 8 or more characters");
    } else {
        let upper = password.chars().any(|c| c.is_ascii_uppercase());
        let lower = password.chars().any(|c| c.is_ascii_lowercase());
        let digit = password.chars().any(|c| c.is_ascii_digit());
        if !(upper && lower && digit) {
            errors.add(
                "password",
                "Password must include an uppercase character, lowercase character, and number.",
            );
        }
    }

    if confirm.is_empty() {
        errors.add("confirm_password", "Please enter the password again.");
    } else if confirm != password {
        errors.add("confirm_password", "Passwords must match.");
    }
}
