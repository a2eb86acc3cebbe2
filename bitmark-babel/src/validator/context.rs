//! Soft warnings collected while validating user markup

use super::content::ParserLocation;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WarningKind {
    Invalid,
    TooMany { max: u32 },
    ExtraProperty,
    ExcessResource,
    UnexpectedCardSet,
    UnexpectedCardSideVariant,
    BodyNotAllowed,
    FooterNotAllowed,
    CardBodyNotAllowed,
    CommonMistake,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    #[serde(flatten)]
    pub kind: WarningKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ParserLocation>,
    /// Earlier occurrence of the same tag, for `TooMany`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<ParserLocation>,
}

/// Side channel for warnings. Validation never fails on user input.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    warnings: Vec<ValidationWarning>,
}

impl ValidationContext {
    pub fn new() -> Self {
        ValidationContext::default()
    }

    pub fn add_warning(
        &mut self,
        kind: WarningKind,
        message: impl Into<String>,
        location: Option<ParserLocation>,
        previous: Option<ParserLocation>,
    ) {
        let message = message.into();
        debug!(?kind, ?location, "{message}");
        self.warnings.push(ValidationWarning {
            kind,
            message,
            location,
            previous,
        });
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ValidationWarning> {
        self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}
