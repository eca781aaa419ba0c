use std::{fs, path::Path};

use crate::error::AuditError;

const BUILTIN: &str = include_str!("../candidates.json");

/// Ordered, immutable list of addresses to audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates(Vec<String>);

impl Candidates {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(addresses.into_iter().map(Into::into).collect())
    }

    /// The list shipped with the binary.
    pub fn builtin() -> Result<Self, AuditError> {
        Self::parse("<builtin>", BUILTIN)
    }

    /// Reads a JSON array of address strings from `path`, falling back to
    /// the built-in list when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, AuditError> {
        let Some(path) = path else {
            return Self::builtin();
        };
        let raw = fs::read_to_string(path).map_err(|e| AuditError::Candidates {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&path.display().to_string(), &raw)
    }

    fn parse(origin: &str, raw: &str) -> Result<Self, AuditError> {
        let addresses: Vec<String> =
            serde_json::from_str(raw).map_err(|e| AuditError::Candidates {
                path: origin.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(addresses))
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
