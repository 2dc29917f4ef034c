use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, ServerError};

/// Lifecycle of a form's backing workflow.
///
/// A form is created as `WorkflowPending`, moves to `Active` once the
/// automation engine has accepted and activated its workflow, and to
/// `WorkflowFailed` when provisioning errored (the workflow identifier
/// columns stay unset). The pending transition is retryable. `Draft` marks
/// a form persisted without contacting the engine at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Draft,
    WorkflowPending,
    Active,
    WorkflowFailed,
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::WorkflowPending => "workflow_pending",
            Self::Active => "active",
            Self::WorkflowFailed => "workflow_failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "draft" => Self::Draft,
            "active" => Self::Active,
            "workflow_failed" => Self::WorkflowFailed,
            _ => Self::WorkflowPending,
        }
    }
}

/// An interview form owned by exactly one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub interview_topic: String,
    pub system_prompt: String,
    pub initial_question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_url: Option<String>,
    pub status: FormStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Form {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        project_id: String,
        name: String,
        interview_topic: String,
        system_prompt: String,
        initial_question: String,
        form_title: Option<String>,
        form_description: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            project_id,
            name,
            interview_topic,
            system_prompt,
            initial_question,
            form_title,
            form_description,
            workflow_id: None,
            webhook_url: None,
            sheet_id: None,
            sheet_url: None,
            status: FormStatus::WorkflowPending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == FormStatus::Active
    }

    /// Display title shown to respondents (falls back to the form name).
    pub fn title(&self) -> &str {
        self.form_title.as_deref().unwrap_or(&self.name)
    }
}

/// Input for creating a new form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormInput {
    pub name: String,
    pub interview_topic: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default = "default_initial_question")]
    pub initial_question: String,
    #[serde(default)]
    pub form_title: Option<String>,
    #[serde(default)]
    pub form_description: Option<String>,
}

fn default_initial_question() -> String {
    "What is your name?".to_string()
}

impl CreateFormInput {
    /// Field-level validation. Collects every violation before failing so
    /// the caller sees all offending fields at once.
    pub fn validate(&self) -> Result<(), ServerError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Form name is required"));
        }
        if self.interview_topic.trim().is_empty() {
            errors.push(FieldError::new("interviewTopic", "Interview topic is required"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ServerError::Validation(errors))
        }
    }
}
