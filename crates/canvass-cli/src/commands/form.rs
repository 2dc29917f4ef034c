//! `canvass form` — manage forms and their interview workflows.

use canvass_core::intake;
use canvass_core::models::form::CreateFormInput;
use canvass_core::provision;
use canvass_core::state::AppState;

use super::print_json;

pub struct CreateArgs {
    pub name: String,
    pub topic: String,
    pub initial_question: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub no_provision: bool,
}

pub async fn list(state: &AppState, project_id: &str) -> Result<(), String> {
    let forms = state
        .form_store
        .list_by_project(project_id)
        .await
        .map_err(|e| e.to_string())?;
    print_json(&serde_json::json!({ "forms": forms }));
    Ok(())
}

pub async fn create(
    state: &AppState,
    user_id: &str,
    project_id: &str,
    args: CreateArgs,
) -> Result<(), String> {
    let input = CreateFormInput {
        name: args.name,
        interview_topic: args.topic,
        system_prompt: None,
        initial_question: args
            .initial_question
            .unwrap_or_else(|| "What is your name?".to_string()),
        form_title: args.title,
        form_description: args.description,
    };

    if args.no_provision {
        let form = intake::create_draft(
            &state.project_store,
            &state.form_store,
            user_id,
            project_id,
            input,
        )
        .await
        .map_err(|e| e.to_string())?;

        println!("{} {}", console::style("Created draft form").green(), form.id);
        print_json(&serde_json::json!({ "form": form }));
        return Ok(());
    }

    let created = intake::create_form(
        &state.project_store,
        &state.form_store,
        &state.engine,
        user_id,
        project_id,
        input,
    )
    .await
    .map_err(|e| e.to_string())?;

    if let Some(note) = &created.workflow_error {
        println!("{} {}", console::style("Warning:").yellow(), note);
    } else if let Some(url) = &created.form.webhook_url {
        println!("{} {}", console::style("Interview form live at").green(), url);
    }
    print_json(&serde_json::json!({ "form": created.form }));
    Ok(())
}

pub async fn activate(state: &AppState, form_id: &str) -> Result<(), String> {
    let form = state
        .form_store
        .get(form_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Form {} not found", form_id))?;

    if form.is_active() {
        println!("Form {} is already active", form_id);
        return Ok(());
    }

    let (form, note) = provision::sync_form_workflow(&state.form_store, &state.engine, form)
        .await
        .map_err(|e| e.to_string())?;

    match note {
        Some(note) => Err(note),
        None => {
            if let Some(url) = &form.webhook_url {
                println!("{} {}", console::style("Interview form live at").green(), url);
            }
            print_json(&serde_json::json!({ "form": form }));
            Ok(())
        }
    }
}

pub async fn delete(state: &AppState, form_id: &str) -> Result<(), String> {
    let form = state
        .form_store
        .get(form_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Form {} not found", form_id))?;

    if let Some(workflow_id) = &form.workflow_id {
        provision::decommission(&state.engine, workflow_id)
            .await
            .map_err(|e| format!("Failed to delete workflow: {}", e))?;
    }

    state
        .form_store
        .delete(form_id)
        .await
        .map_err(|e| e.to_string())?;

    println!("Deleted form {}", form_id);
    Ok(())
}
