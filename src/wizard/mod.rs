//! Wizard: the three-step collect/review flow.
//!
//! DESIGN
//! ======
//! `CollectingManualSteps → CollectingAutomationSteps → ReviewingDiagrams`.
//! Each forward transition is gated on non-blank input for the step being
//! left. Diagrams are built on entering review and dropped on leaving it.
//! `reset` returns to the first step from anywhere and clears all input.
//!
//! The wizard holds no I/O. Rendering and sending are driven by the caller
//! against the generated diagram sources.

use std::fmt;

use crate::diagram::{self, DiagramKind};
use crate::error::ErrorCode;
use crate::webhook::WebhookPayload;

// =============================================================================
// STEPS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    CollectingManualSteps,
    CollectingAutomationSteps,
    ReviewingDiagrams,
}

impl WizardStep {
    pub const ALL: [Self; 3] = [Self::CollectingManualSteps, Self::CollectingAutomationSteps, Self::ReviewingDiagrams];

    /// 1-based position shown in the progress indicator.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::CollectingManualSteps => 1,
            Self::CollectingAutomationSteps => 2,
            Self::ReviewingDiagrams => 3,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::CollectingManualSteps => "Manual Process",
            Self::CollectingAutomationSteps => "Automation Ideas",
            Self::ReviewingDiagrams => "Generate",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}: {}", self.number(), self.label())
    }
}

/// Progress of one step relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Complete,
    Current,
    Upcoming,
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Please enter manual process steps")]
    EmptyManualSteps,

    #[error("Please enter automation steps")]
    EmptyAutomationSteps,

    #[error("cannot {action} during {step}")]
    InvalidTransition { action: &'static str, step: WizardStep },
}

impl ErrorCode for WizardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyManualSteps | Self::EmptyAutomationSteps => "E_VALIDATION",
            Self::InvalidTransition { .. } => "E_INVALID_TRANSITION",
        }
    }
}

// =============================================================================
// WIZARD
// =============================================================================

/// Mermaid sources generated on entering review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDiagrams {
    pub manual: String,
    pub automation: String,
}

impl GeneratedDiagrams {
    #[must_use]
    pub fn get(&self, kind: DiagramKind) -> &str {
        match kind {
            DiagramKind::Manual => &self.manual,
            DiagramKind::Automation => &self.automation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Wizard {
    step: WizardStep,
    manual_steps: String,
    automation_steps: String,
    diagrams: Option<GeneratedDiagrams>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: WizardStep::CollectingManualSteps,
            manual_steps: String::new(),
            automation_steps: String::new(),
            diagrams: None,
        }
    }

    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    #[must_use]
    pub fn manual_steps(&self) -> &str {
        &self.manual_steps
    }

    #[must_use]
    pub fn automation_steps(&self) -> &str {
        &self.automation_steps
    }

    #[must_use]
    pub fn diagrams(&self) -> Option<&GeneratedDiagrams> {
        self.diagrams.as_ref()
    }

    /// Replace the manual step text. Only allowed while collecting it.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` outside `CollectingManualSteps`.
    pub fn set_manual_steps(&mut self, text: impl Into<String>) -> Result<(), WizardError> {
        self.require(WizardStep::CollectingManualSteps, "edit manual steps")?;
        self.manual_steps = text.into();
        Ok(())
    }

    /// Replace the automation step text. Only allowed while collecting it.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` outside `CollectingAutomationSteps`.
    pub fn set_automation_steps(&mut self, text: impl Into<String>) -> Result<(), WizardError> {
        self.require(WizardStep::CollectingAutomationSteps, "edit automation steps")?;
        self.automation_steps = text.into();
        Ok(())
    }

    /// Advance one step, validating the input being left behind.
    ///
    /// # Errors
    ///
    /// `EmptyManualSteps` / `EmptyAutomationSteps` when the current input is
    /// blank; `InvalidTransition` from the review step.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        match self.step {
            WizardStep::CollectingManualSteps => {
                if is_blank(&self.manual_steps) {
                    return Err(WizardError::EmptyManualSteps);
                }
                self.step = WizardStep::CollectingAutomationSteps;
            }
            WizardStep::CollectingAutomationSteps => {
                if is_blank(&self.automation_steps) {
                    return Err(WizardError::EmptyAutomationSteps);
                }
                self.diagrams = Some(GeneratedDiagrams {
                    manual: diagram::mermaid(&self.manual_steps),
                    automation: diagram::mermaid(&self.automation_steps),
                });
                self.step = WizardStep::ReviewingDiagrams;
            }
            WizardStep::ReviewingDiagrams => {
                return Err(WizardError::InvalidTransition { action: "advance", step: self.step });
            }
        }
        tracing::debug!(step = %self.step, "wizard advanced");
        Ok(self.step)
    }

    /// Go back one step, keeping entered text.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from the first step.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        self.step = match self.step {
            WizardStep::CollectingManualSteps => {
                return Err(WizardError::InvalidTransition { action: "go back", step: self.step });
            }
            WizardStep::CollectingAutomationSteps => WizardStep::CollectingManualSteps,
            WizardStep::ReviewingDiagrams => {
                self.diagrams = None;
                WizardStep::CollectingAutomationSteps
            }
        };
        Ok(self.step)
    }

    /// Return to the first step, clearing all input and diagrams.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Status of every step, in order, for a progress indicator.
    #[must_use]
    pub fn progress(&self) -> [(WizardStep, StepStatus); 3] {
        let current = self.step.number();
        WizardStep::ALL.map(|step| {
            let status = match step.number() {
                n if n < current => StepStatus::Complete,
                n if n == current => StepStatus::Current,
                _ => StepStatus::Upcoming,
            };
            (step, status)
        })
    }

    /// Webhook body for the generated diagrams.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless reviewing generated diagrams.
    pub fn webhook_payload(&self) -> Result<WebhookPayload, WizardError> {
        match (&self.step, &self.diagrams) {
            (WizardStep::ReviewingDiagrams, Some(diagrams)) => {
                Ok(WebhookPayload::new(&diagrams.manual, &diagrams.automation))
            }
            _ => Err(WizardError::InvalidTransition { action: "send diagrams", step: self.step }),
        }
    }

    fn require(&self, step: WizardStep, action: &'static str) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition { action, step: self.step })
        }
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
