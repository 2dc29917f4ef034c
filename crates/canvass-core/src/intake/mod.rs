//! Form intake — validation, defaulting, and persistence of new forms.
//!
//! Intake never rolls back: once a form row exists, a downstream
//! provisioning failure is reported as a note next to the persisted form
//! rather than undoing the write.

use uuid::Uuid;

use crate::engine::EngineClient;
use crate::error::ServerError;
use crate::models::form::{CreateFormInput, Form, FormStatus};
use crate::prompt;
use crate::provision;
use crate::store::{FormStore, ProjectStore};

/// Outcome of a form-creation request: the persisted form plus an optional
/// note when workflow provisioning failed (the row is kept either way).
#[derive(Debug)]
pub struct FormCreation {
    pub form: Form,
    pub workflow_error: Option<String>,
}

/// Create a form under a caller-owned project and provision its interview
/// workflow.
pub async fn create_form(
    projects: &ProjectStore,
    forms: &FormStore,
    engine: &EngineClient,
    user_id: &str,
    project_id: &str,
    input: CreateFormInput,
) -> Result<FormCreation, ServerError> {
    let form = persist_form(projects, forms, user_id, project_id, input).await?;
    let (form, workflow_error) = provision::sync_form_workflow(forms, engine, form).await?;
    Ok(FormCreation {
        form,
        workflow_error,
    })
}

/// Validate and persist a form without contacting the automation engine.
pub async fn create_draft(
    projects: &ProjectStore,
    forms: &FormStore,
    user_id: &str,
    project_id: &str,
    input: CreateFormInput,
) -> Result<Form, ServerError> {
    ensure_owned(projects, user_id, project_id).await?;

    let mut form = build_form(project_id, input)?;
    form.status = FormStatus::Draft;
    forms.create(&form).await?;
    Ok(form)
}

async fn persist_form(
    projects: &ProjectStore,
    forms: &FormStore,
    user_id: &str,
    project_id: &str,
    input: CreateFormInput,
) -> Result<Form, ServerError> {
    ensure_owned(projects, user_id, project_id).await?;

    let form = build_form(project_id, input)?;
    forms.create(&form).await?;
    Ok(form)
}

async fn ensure_owned(
    projects: &ProjectStore,
    user_id: &str,
    project_id: &str,
) -> Result<(), ServerError> {
    projects
        .get_owned(project_id, user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Project not found".to_string()))?;
    Ok(())
}

/// Apply the intake defaults and build an unpersisted `WorkflowPending`
/// form. The system prompt is never left empty and the display title falls
/// back to the form name.
fn build_form(project_id: &str, input: CreateFormInput) -> Result<Form, ServerError> {
    input.validate()?;

    let system_prompt = match &input.system_prompt {
        Some(p) if !p.trim().is_empty() => p.clone(),
        _ => prompt::default_system_prompt(&input.interview_topic),
    };
    let form_title = input
        .form_title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| input.name.clone());

    Ok(Form::new(
        Uuid::new_v4().to_string(),
        project_id.to_string(),
        input.name,
        input.interview_topic,
        system_prompt,
        input.initial_question,
        Some(form_title),
        input.form_description,
    ))
}
