//! Provisioning — drives a form's workflow lifecycle against the engine.
//!
//! The create-form write and the workflow-info update are two separate
//! statements with no transaction spanning the external call; the form
//! status makes the gap observable (`WorkflowPending` / `WorkflowFailed`)
//! instead of silently inconsistent, and the pending transition can be
//! retried.

use crate::engine::{EngineClient, EngineError};
use crate::error::ServerError;
use crate::models::form::{Form, FormStatus};
use crate::store::FormStore;
use crate::workflow::WorkflowGraph;

/// Caller-facing note attached to a created form whose workflow could not
/// be provisioned.
pub const WORKFLOW_FAILED_NOTE: &str =
    "Form created but workflow generation failed. Please try activating it manually.";

/// Identifiers produced by a successful provisioning round trip.
#[derive(Debug, Clone)]
pub struct ProvisionedWorkflow {
    pub workflow_id: String,
    pub webhook_url: String,
    pub sheet_id: Option<String>,
    pub sheet_url: Option<String>,
}

/// Build, submit, and activate the interview workflow for a form.
///
/// The public URL is derived from the trigger node's path, never guessed:
/// a graph without a trigger node fails hard.
pub async fn provision_interview(
    engine: &EngineClient,
    form: &Form,
) -> Result<ProvisionedWorkflow, EngineError> {
    let graph = WorkflowGraph::interview(form);
    let webhook_path = graph
        .webhook_path()
        .ok_or(EngineError::MissingTrigger)?
        .to_string();

    let workflow_id = engine.create_workflow(&graph).await?;
    engine.activate_workflow(&workflow_id).await?;

    let (sheet_id, sheet_url) = engine.sheet_linkage();
    Ok(ProvisionedWorkflow {
        webhook_url: engine.form_url(&webhook_path),
        workflow_id,
        sheet_id,
        sheet_url,
    })
}

/// Remove a form's workflow from the engine. Local state is not touched;
/// callers decide what happens to the row.
pub async fn decommission(engine: &EngineClient, workflow_id: &str) -> Result<(), EngineError> {
    engine.delete_workflow(workflow_id).await
}

/// Run the pending workflow transition for a form and persist the outcome.
///
/// On success the form becomes `Active` with workflow identifiers attached.
/// On failure the row stays (workflow fields unset) as `WorkflowFailed` and
/// the error is reduced to a caller-facing note.
pub async fn sync_form_workflow(
    forms: &FormStore,
    engine: &EngineClient,
    form: Form,
) -> Result<(Form, Option<String>), ServerError> {
    match provision_interview(engine, &form).await {
        Ok(provisioned) => {
            forms
                .update_workflow_info(
                    &form.id,
                    &provisioned.workflow_id,
                    &provisioned.webhook_url,
                    provisioned.sheet_id,
                    provisioned.sheet_url,
                    FormStatus::Active,
                )
                .await?;
            let form = forms
                .get(&form.id)
                .await?
                .ok_or_else(|| ServerError::NotFound(format!("Form {} not found", form.id)))?;
            Ok((form, None))
        }
        Err(e) => {
            tracing::error!("Workflow provisioning failed for form {}: {}", form.id, e);
            forms.update_status(&form.id, FormStatus::WorkflowFailed).await?;
            let mut form = form;
            form.status = FormStatus::WorkflowFailed;
            Ok((form, Some(WORKFLOW_FAILED_NOTE.to_string())))
        }
    }
}
