//! New-contact form: field values, validation rules and submission.

use std::sync::LazyLock;

use regex::Regex;
use shared::domain::{Contact, NewContact};
use tracing::{debug, warn};

use crate::{controller::DirectoryController, error::ClientError};

pub const CREATE_FAILED_MESSAGE: &str = "There was an error adding the contact";

static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://[a-z0-9.-]+(/[a-z0-9._%+-]*)*\.(jpg|jpeg|png|gif|bmp|svg|webp)$",
    )
    .expect("image url pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    PhotoUrl,
    Name,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::PhotoUrl, FormField::Name, FormField::Description];

    pub fn label(self) -> &'static str {
        match self {
            Self::PhotoUrl => "Profile image URL",
            Self::Name => "Name",
            Self::Description => "Description",
        }
    }

    fn rules(self) -> &'static [Rule] {
        match self {
            Self::PhotoUrl => PHOTO_URL_RULES,
            Self::Name => NAME_RULES,
            Self::Description => DESCRIPTION_RULES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Required,
    Format,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub reason: FailureReason,
    pub message: &'static str,
}

struct Rule {
    reason: FailureReason,
    message: &'static str,
    check: fn(&str) -> bool,
}

fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Empty input is left to the required rule.
fn is_image_url(value: &str) -> bool {
    value.is_empty() || IMAGE_URL.is_match(value)
}

const PHOTO_URL_RULES: &[Rule] = &[
    Rule {
        reason: FailureReason::Required,
        message: "Please enter an image URL",
        check: is_present,
    },
    Rule {
        reason: FailureReason::Format,
        message: "The URL must be valid and point to an image (jpg, jpeg, png, gif, bmp, svg, webp)",
        check: is_image_url,
    },
];

const NAME_RULES: &[Rule] = &[Rule {
    reason: FailureReason::Required,
    message: "Please enter the contact's name",
    check: is_present,
}];

const DESCRIPTION_RULES: &[Rule] = &[Rule {
    reason: FailureReason::Required,
    message: "Please enter a description",
    check: is_present,
}];

/// First failing rule for `field`, in declaration order.
pub fn validate_field(field: FormField, value: &str) -> Option<FieldError> {
    field
        .rules()
        .iter()
        .find(|rule| !(rule.check)(value))
        .map(|rule| FieldError {
            field,
            reason: rule.reason,
            message: rule.message,
        })
}

pub fn validate(contact: &NewContact) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = FormField::ALL
        .into_iter()
        .filter_map(|field| validate_field(field, field_value(contact, field)))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn field_value(contact: &NewContact, field: FormField) -> &str {
    match field {
        FormField::PhotoUrl => &contact.photo_url,
        FormField::Name => &contact.name,
        FormField::Description => &contact.description,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid,
    Created(Contact),
    Failed(ClientError),
}

#[derive(Debug, Clone, Default)]
pub struct CreationForm {
    values: NewContact,
    errors: Vec<FieldError>,
    submit_error: Option<String>,
    open: bool,
}

impl CreationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn values(&self) -> &NewContact {
        &self.values
    }

    pub fn value(&self, field: FormField) -> &str {
        field_value(&self.values, field)
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        self.errors.retain(|err| err.field != field);
        match field {
            FormField::PhotoUrl => self.values.photo_url = value,
            FormField::Name => self.values.name = value,
            FormField::Description => self.values.description = value,
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: FormField) -> Option<&FieldError> {
        self.errors.iter().find(|err| err.field == field)
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.values == NewContact::default()
            && self.errors.is_empty()
            && self.submit_error.is_none()
    }

    /// Closes the form and discards its contents.
    pub fn cancel(&mut self) {
        self.reset();
        self.open = false;
    }

    fn reset(&mut self) {
        self.values = NewContact::default();
        self.errors.clear();
        self.submit_error = None;
    }

    pub async fn submit(&mut self, controller: &DirectoryController) -> SubmitOutcome {
        self.submit_error = None;
        if let Err(errors) = validate(&self.values) {
            debug!(failed_fields = errors.len(), "contact form rejected");
            self.errors = errors;
            return SubmitOutcome::Invalid;
        }
        self.errors.clear();

        match controller.create(&self.values).await {
            Ok(created) => {
                self.cancel();
                controller.refresh_after_create().await;
                SubmitOutcome::Created(created)
            }
            Err(err) => {
                let message = err.message_or(CREATE_FAILED_MESSAGE);
                warn!(error = %message, "contact creation failed");
                self.submit_error = Some(message);
                SubmitOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
