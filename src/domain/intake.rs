//! Donation form validation.
//!
//! Every field is checked on its own against the [`FieldPolicy`] schema.
//! Invalid values are scrubbed to a safe fallback and flagged; flagged
//! fields are reported in canonical order. Only a missing required key
//! aborts the parse.

use {
    super::{
        donation::{Checked, FieldValue, ParsedDonation},
        error::PipelineError,
        field::FieldKind,
        image::{ImageAsset, ImageIntake},
        money::DonationAmount,
        policy::FieldPolicy,
        submission::{RawValue, Submission},
    },
    std::collections::BTreeMap,
};

pub fn parse(
    submission: &Submission,
    policy: &FieldPolicy,
    images: &dyn ImageIntake,
) -> Result<ParsedDonation, PipelineError> {
    let specs = policy.specs();

    if let Some(missing) = specs
        .iter()
        .find(|spec| spec.required && !submission.contains(spec.field))
    {
        return Err(PipelineError::MissingKey(missing.field));
    }

    let mut values = BTreeMap::new();
    let mut errors = Vec::new();
    for spec in &specs {
        let checked = check_field(&spec.kind, submission.get(spec.field), images);
        if !checked.valid {
            errors.push(spec.field);
        }
        values.insert(spec.field, checked.value);
    }

    Ok(ParsedDonation::new(values, errors))
}

fn check_field(
    kind: &FieldKind,
    raw: Option<&RawValue>,
    images: &dyn ImageIntake,
) -> Checked<FieldValue> {
    let text = || raw.map(RawValue::to_text).unwrap_or_default();
    match kind {
        FieldKind::Amount { min } => check_amount(&text(), *min).map(FieldValue::Text),
        FieldKind::Secret { max } => check_secret(text(), *max).map(FieldValue::Text),
        FieldKind::Text { max } => check_length(text(), *max).map(FieldValue::Text),
        FieldKind::Choice { allowed, fallback } => {
            check_choice(text(), allowed, fallback).map(FieldValue::Text)
        }
        FieldKind::Image => check_image(raw, images).map(FieldValue::Image),
    }
}

/// Whole dollars, digits only, at least `min`. When invalid, keeps the
/// digits of the integer part so `"1,000"` becomes `"1000"`.
pub fn check_amount(raw: &str, min: u64) -> Checked<String> {
    let valid = DonationAmount::try_from(raw)
        .map(|amount| amount.dollars() as u64 >= min)
        .unwrap_or(false);

    if valid {
        return Checked::ok(raw.to_string());
    }

    let integer_part = raw.split('.').next().unwrap_or_default();
    Checked::scrubbed(integer_part.chars().filter(char::is_ascii_digit).collect())
}

/// Over-long secrets are dropped entirely rather than truncated.
pub fn check_secret(raw: String, max: usize) -> Checked<String> {
    if raw.chars().count() > max {
        Checked::scrubbed(String::new())
    } else {
        Checked::ok(raw)
    }
}

/// Length in characters; over-long values keep exactly `max` characters.
pub fn check_length(raw: String, max: usize) -> Checked<String> {
    if raw.chars().count() > max {
        Checked::scrubbed(raw.chars().take(max).collect())
    } else {
        Checked::ok(raw)
    }
}

pub fn check_choice(raw: String, allowed: &[&str], fallback: &str) -> Checked<String> {
    if allowed.contains(&raw.as_str()) {
        Checked::ok(raw)
    } else {
        Checked::scrubbed(fallback.to_string())
    }
}

fn check_image(raw: Option<&RawValue>, images: &dyn ImageIntake) -> Checked<Option<ImageAsset>> {
    match raw {
        None => Checked::ok(None),
        Some(RawValue::Text(s)) if s.is_empty() => Checked::ok(None),
        Some(RawValue::Text(_)) => Checked::scrubbed(None),
        // A file input left blank still arrives as a nameless, empty part.
        Some(RawValue::Upload { filename, bytes }) if filename.is_empty() && bytes.is_empty() => {
            Checked::ok(None)
        }
        Some(RawValue::Upload { filename, bytes }) => match images.process(bytes, filename) {
            Ok(asset) => Checked::ok(Some(asset)),
            Err(reason) => {
                tracing::debug!(%filename, %reason, "promotion logo rejected");
                Checked::scrubbed(None)
            }
        },
    }
}
