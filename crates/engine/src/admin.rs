//! Shared administrator override code.

use std::fmt;

use crate::{EngineError, ResultEngine};

/// The operator-configured secret guarding force unlock.
///
/// When no code is configured every attempt is rejected.
#[derive(Clone, Default)]
pub struct AdminCode(Option<String>);

impl AdminCode {
    pub fn new(code: Option<String>) -> Self {
        Self(code.filter(|c| !c.is_empty()))
    }

    pub fn is_configured(&self) -> bool {
        self.0.is_some()
    }

    /// Checks `candidate` against the configured code.
    pub fn verify(&self, candidate: &str) -> ResultEngine<()> {
        match &self.0 {
            Some(expected) if constant_time_eq(expected.as_bytes(), candidate.as_bytes()) => {
                Ok(())
            }
            _ => Err(EngineError::Unauthorized),
        }
    }
}

impl fmt::Debug for AdminCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = if self.0.is_some() { "<redacted>" } else { "<unset>" };
        f.debug_tuple("AdminCode").field(&shown).finish()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_code_is_accepted() {
        let code = AdminCode::new(Some("s3cret".to_string()));
        assert_eq!(code.verify("s3cret"), Ok(()));
    }

    #[test]
    fn wrong_or_partial_code_is_rejected() {
        let code = AdminCode::new(Some("s3cret".to_string()));
        assert_eq!(code.verify("s3cre"), Err(EngineError::Unauthorized));
        assert_eq!(code.verify("S3CRET"), Err(EngineError::Unauthorized));
        assert_eq!(code.verify(""), Err(EngineError::Unauthorized));
    }

    #[test]
    fn unset_code_rejects_everything() {
        let code = AdminCode::new(Some(String::new()));
        assert!(!code.is_configured());
        assert_eq!(code.verify(""), Err(EngineError::Unauthorized));
        assert_eq!(AdminCode::default().verify("x"), Err(EngineError::Unauthorized));
    }

    #[test]
    fn debug_never_prints_the_secret() {
        let code = AdminCode::new(Some("s3cret".to_string()));
        assert!(!format!("{code:?}").contains("s3cret"));
    }
}
