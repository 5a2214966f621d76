// 📐 Validation Layer
// Pure checks from a proposed field set to a list of violations.
// Nothing here touches storage; existence and uniqueness checks that need
// the database live with the entity that owns them.

use crate::entities::member::MemberForm;
use crate::entities::ministry::MinistryForm;
use serde::Serialize;

pub const MAX_NAME_LEN: usize = 60;
pub const MAX_ADDRESS_LEN: usize = 150;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_PHONE_DIGITS: usize = 15;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl ValidationError {
    pub fn new(context: &str, field: &str, message: &str) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.to_string(),
            context: context.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

// ============================================================================
// PHONE NORMALIZER
// ============================================================================

/// Strip every non-digit character, preserving order
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize an optional phone; a value with no digits left is absent
pub fn normalize_optional_phone(phone: Option<&str>) -> Option<String> {
    phone.map(normalize_phone).filter(|digits| !digits.is_empty())
}

// ============================================================================
// FIELD CHECKS
// ============================================================================

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Simple local@domain shape: one '@', both sides non-empty, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn check_required(errors: &mut Vec<ValidationError>, context: &str, field: &str, value: &str) {
    if is_blank(value) {
        errors.push(ValidationError::new(context, field, "can't be blank"));
    }
}

fn check_max_len(
    errors: &mut Vec<ValidationError>,
    context: &str,
    field: &str,
    value: &str,
    max: usize,
) {
    if value.chars().count() > max {
        errors.push(ValidationError::new(
            context,
            field,
            &format!("is too long (maximum is {} characters)", max),
        ));
    }
}

fn into_result(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// ENTITY VALIDATORS
// ============================================================================

/// Validate a member field set (church existence is checked on save)
pub fn validate_member(form: &MemberForm) -> ValidationResult {
    let mut errors = Vec::new();
    let ctx = "Member";

    check_required(&mut errors, ctx, "first_name", &form.first_name);
    check_required(&mut errors, ctx, "last_name", &form.last_name);
    check_max_len(&mut errors, ctx, "first_name", &form.first_name, MAX_NAME_LEN);
    check_max_len(&mut errors, ctx, "last_name", &form.last_name, MAX_NAME_LEN);

    if form.church_id.as_deref().map_or(true, is_blank) {
        errors.push(ValidationError::new(ctx, "church", "must exist"));
    }

    if let Some(address) = &form.address {
        check_max_len(&mut errors, ctx, "address", address, MAX_ADDRESS_LEN);
    }

    // Stored trimmed, so checked trimmed
    if let Some(email) = form.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        if !is_valid_email(email) {
            errors.push(ValidationError::new(ctx, "email", "is invalid"));
        }
        check_max_len(&mut errors, ctx, "email", email, MAX_EMAIL_LEN);
    }

    if let Some(phone) = normalize_optional_phone(form.phone.as_deref()) {
        if phone.len() > MAX_PHONE_DIGITS {
            errors.push(ValidationError::new(
                ctx,
                "phone",
                &format!("is too long (maximum is {} digits)", MAX_PHONE_DIGITS),
            ));
        }
    }

    into_result(errors)
}

/// Validate a ministry field set (name uniqueness is checked on save)
pub fn validate_ministry(form: &MinistryForm) -> ValidationResult {
    let mut errors = Vec::new();
    let ctx = "Ministry";

    check_required(&mut errors, ctx, "name", &form.name);
    check_max_len(&mut errors, ctx, "name", &form.name, MAX_NAME_LEN);

    if is_blank(&form.church_id) {
        errors.push(ValidationError::new(ctx, "church", "must exist"));
    }

    if form.responsibilities.iter().all(|r| is_blank(r)) {
        errors.push(ValidationError::new(ctx, "responsibilities", "can't be blank"));
    }

    into_result(errors)
}
