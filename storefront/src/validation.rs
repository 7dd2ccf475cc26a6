//! Product payload validation.
//!
//! Create and update commands are validated before any request is issued.

use crate::error::ShopError;
use crate::money::Money;
use crate::types::{ProductDraft, ProductEdit};
use thiserror::Error;

/// Minimum description length, in characters, after trimming
pub const MIN_DESCRIPTION_CHARS: usize = 5;

/// Why a product payload was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty or whitespace
    #[error("title must not be empty")]
    EmptyTitle,

    /// Image URL is empty or whitespace
    #[error("image URL must not be empty")]
    EmptyImageUrl,

    /// Description is too short
    #[error("description must be at least 5 characters")]
    DescriptionTooShort,

    /// Price is below one cent
    #[error("price must be at least 0.01, got {0}")]
    PriceTooLow(Money),
}

fn validate_text(title: &str, description: &str, image_url: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if image_url.trim().is_empty() {
        return Err(ValidationError::EmptyImageUrl);
    }
    if description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooShort);
    }
    Ok(())
}

impl ProductDraft {
    /// Checks the draft before it is sent
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::InvalidProduct`] naming the first failing field.
    pub fn validate(&self) -> Result<(), ShopError> {
        validate_text(&self.title, &self.description, &self.image_url)?;
        if self.price < Money::from_cents(1) {
            return Err(ValidationError::PriceTooLow(self.price).into());
        }
        Ok(())
    }
}

impl ProductEdit {
    /// Checks the edit before it is sent
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::InvalidProduct`] naming the first failing field.
    pub fn validate(&self) -> Result<(), ShopError> {
        validate_text(&self.title, &self.description, &self.image_url)?;
        Ok(())
    }
}
