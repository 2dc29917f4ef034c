//! `canvass project` — manage projects.

use canvass_core::models::project::Project;
use canvass_core::state::AppState;

use super::print_json;

pub async fn list(state: &AppState, user_id: &str) -> Result<(), String> {
    let projects = state
        .project_store
        .list_by_user(user_id)
        .await
        .map_err(|e| e.to_string())?;
    print_json(&serde_json::json!({ "projects": projects }));
    Ok(())
}

pub async fn create(
    state: &AppState,
    user_id: &str,
    name: &str,
    description: Option<&str>,
) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Project name is required".to_string());
    }

    let project = Project::new(
        uuid::Uuid::new_v4().to_string(),
        name.to_string(),
        description.map(str::to_string),
        user_id.to_string(),
    );
    state
        .project_store
        .create(&project)
        .await
        .map_err(|e| e.to_string())?;

    println!("{} {}", console::style("Created project").green(), project.id);
    print_json(&serde_json::json!({ "project": project }));
    Ok(())
}
