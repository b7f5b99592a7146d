//! Signature block entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ImageSource;
use crate::error::{Error, Result};

/// One signer in the trailing signature section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureEntry {
    /// Signer name (required, non-blank)
    pub signer_name: String,

    /// Signer role or title
    #[serde(default)]
    pub signer_role: Option<String>,

    /// When the document was signed
    #[serde(default)]
    pub signed_at: Option<DateTime<Utc>>,

    /// Drawn signature, usually a PNG data URI
    #[serde(default)]
    pub signature_image: Option<ImageSource>,
}

impl SignatureEntry {
    /// Create an entry for a named signer.
    pub fn new(signer_name: impl Into<String>) -> Result<Self> {
        let entry = Self {
            signer_name: signer_name.into(),
            signer_role: None,
            signed_at: None,
            signature_image: None,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Set the signer role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.signer_role = Some(role.into());
        self
    }

    /// Set the signing time.
    pub fn signed_at(mut self, at: DateTime<Utc>) -> Self {
        self.signed_at = Some(at);
        self
    }

    /// Attach a signature image.
    pub fn with_image(mut self, image: impl Into<ImageSource>) -> Self {
        self.signature_image = Some(image.into());
        self
    }

    /// Check the required-name invariant.
    pub fn validate(&self) -> Result<()> {
        if self.signer_name.trim().is_empty() {
            return Err(Error::InvalidInput(
                "signature entry requires a signer name".to_string(),
            ));
        }
        Ok(())
    }

    /// Role, if present and not blank.
    pub fn role(&self) -> Option<&str> {
        self.signer_role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// Long-form US English date, e.g. "January 1, 2024".
    pub fn signed_date_label(&self) -> Option<String> {
        self.signed_at.map(|at| format_long_date(&at))
    }
}

/// Format a timestamp as "January 1, 2024".
pub fn format_long_date(at: &DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}
