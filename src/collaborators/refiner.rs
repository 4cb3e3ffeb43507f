//! Text-refinement collaborator.

use async_trait::async_trait;

use super::error::CollaboratorError;

/// Rewrites user-provided text following an instruction
/// (e.g. "tighten this mission statement").
#[async_trait]
pub trait Refiner: Send + Sync {
    async fn refine(&self, raw: &str, instruction: &str) -> Result<String, CollaboratorError>;
}

/// Refine `raw`, returning `None` when no refinement is available.
///
/// Failures are logged and swallowed; blank output counts as no refinement.
pub async fn refine_or_none(refiner: &dyn Refiner, raw: &str, instruction: &str) -> Option<String> {
    match refiner.refine(raw, instruction).await {
        Ok(refined) if !refined.trim().is_empty() => Some(refined.trim().to_string()),
        Ok(_) => {
            log::debug!("Refiner returned empty text");
            None
        }
        Err(e) => {
            log::warn!("Text refinement failed: {}", e);
            None
        }
    }
}
