use crate::utils::error::{DuplicatorError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DuplicatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DuplicatorError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(DuplicatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_board_id(field_name: &str, board_id: u64) -> Result<()> {
    if board_id == 0 {
        return Err(DuplicatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: board_id.to_string(),
            reason: "Board id must be a positive number".to_string(),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| DuplicatorError::MissingConfigError {
            field: field_name.to_string(),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DuplicatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_unique<'a, I>(field_name: &str, values: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(DuplicatorError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.to_string(),
                reason: "Value must be unique".to_string(),
            });
        }
    }
    Ok(())
}
