//! Project command handlers
//!
//! Handles listing, viewing, creating and deleting projects as well as
//! listing their roles and users.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use gooddata_client::GoodData;
use gooddata_core::domain::Environment;
use gooddata_core::domain::project::{Project, ProjectState};

use super::format_time;

/// Project subcommands
#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects of the logged-in user
    List,
    /// Get project details
    Get {
        /// Project ID
        id: String,
    },
    /// Create a project and wait until it is ready
    Create {
        /// Project title
        #[arg(short, long)]
        title: String,

        /// Project authorization token
        #[arg(short, long, env = "GOODDATA_AUTH_TOKEN", hide_env_values = true)]
        auth_token: String,

        /// Project summary
        #[arg(short, long)]
        summary: Option<String>,

        /// Environment (PRODUCTION, DEVELOPMENT, TESTING)
        #[arg(short, long)]
        environment: Option<String>,
    },
    /// Delete a project
    Delete {
        /// Project ID
        id: String,
    },
    /// List roles of a project
    Roles {
        /// Project ID
        id: String,
    },
    /// List users of a project
    Users {
        /// Project ID
        id: String,
    },
}

/// Handle project commands
///
/// # Arguments
/// * `command` - The project command to execute
/// * `gd` - Connected API client
pub async fn handle_project_command(command: ProjectCommands, gd: &GoodData) -> Result<()> {
    match command {
        ProjectCommands::List => list_projects(gd).await,
        ProjectCommands::Get { id } => get_project(gd, &id).await,
        ProjectCommands::Create {
            title,
            auth_token,
            summary,
            environment,
        } => create_project(gd, title, auth_token, summary, environment).await,
        ProjectCommands::Delete { id } => delete_project(gd, &id).await,
        ProjectCommands::Roles { id } => list_roles(gd, &id).await,
        ProjectCommands::Users { id } => list_users(gd, &id).await,
    }
}

async fn list_projects(gd: &GoodData) -> Result<()> {
    let projects = gd.project_service().get_projects().await?;

    if projects.is_empty() {
        println!("{}", "No projects found.".yellow());
    } else {
        println!("{}", format!("Found {} project(s):", projects.len()).bold());
        println!();
        for project in projects {
            print_project_summary(&project);
        }
    }

    Ok(())
}

async fn get_project(gd: &GoodData, id: &str) -> Result<()> {
    let project = gd.project_service().get_project_by_id(id).await?;
    print_project_details(&project);
    Ok(())
}

/// Create a project and poll until it is enabled
async fn create_project(
    gd: &GoodData,
    title: String,
    auth_token: String,
    summary: Option<String>,
    environment: Option<String>,
) -> Result<()> {
    let project = new_project(title, auth_token, summary, environment.as_deref());

    println!("{}", "Creating project...".dimmed());

    let project = gd
        .project_service()
        .create_project(&project)
        .await?
        .get()
        .await
        .context("Project creation failed")?;

    println!("{}", "✓ Project created successfully!".green().bold());
    println!("  ID:    {}", project.id().unwrap_or("-").cyan());
    println!("  Title: {}", project.title().bold());

    Ok(())
}

/// Build the project to create; the environment stays `PRODUCTION` unless given
fn new_project(
    title: String,
    auth_token: String,
    summary: Option<String>,
    environment: Option<&str>,
) -> Project {
    let mut project = Project::new(title, auth_token);
    project.meta.summary = summary;
    if let Some(environment) = environment {
        project.content.environment = Some(Environment::from(environment.to_uppercase().as_str()));
    }
    project
}

async fn delete_project(gd: &GoodData, id: &str) -> Result<()> {
    let service = gd.project_service();
    let project = service.get_project_by_id(id).await?;
    service.remove_project(&project).await?;

    println!(
        "{}",
        format!("✓ Project {} deleted successfully!", id).green().bold()
    );

    Ok(())
}

async fn list_roles(gd: &GoodData, id: &str) -> Result<()> {
    let service = gd.project_service();
    let project = service.get_project_by_id(id).await?;
    let roles = service.get_roles(&project).await?;

    if roles.is_empty() {
        println!("{}", "No roles found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Roles of {}:", project.title()).bold());
    for role in roles {
        println!(
            "  {} {} {}",
            "▸".cyan(),
            role.title().bold(),
            role.identifier().unwrap_or_default().dimmed()
        );
        if let Some(uri) = role.uri() {
            println!("    URI: {}", uri.dimmed());
        }
    }

    Ok(())
}

async fn list_users(gd: &GoodData, id: &str) -> Result<()> {
    let service = gd.project_service();
    let project = service.get_project_by_id(id).await?;
    let users = service.get_users(&project).await?;

    if users.is_empty() {
        println!("{}", "No users found.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} user(s) in {}:", users.len(), project.title()).bold()
    );
    for user in users {
        let status = if user.is_enabled() {
            "ENABLED".green()
        } else {
            "DISABLED".red()
        };
        println!(
            "  {} {} [{}]",
            "▸".cyan(),
            user.content.login.as_deref().unwrap_or("-").bold(),
            status
        );
        if !user.roles().is_empty() {
            println!("    Roles: {}", user.roles().join(", ").dimmed());
        }
    }

    Ok(())
}

fn colored_state(state: Option<&ProjectState>) -> ColoredString {
    match state {
        Some(ProjectState::Enabled) => "ENABLED".green(),
        Some(state @ (ProjectState::Deleted | ProjectState::Disabled | ProjectState::Archived)) => {
            state.as_str().red()
        }
        Some(state) => state.as_str().yellow(),
        None => "-".normal(),
    }
}

fn print_project_summary(project: &Project) {
    println!("  {} {}", "▸".cyan(), project.title().bold());
    println!("    ID:      {}", project.id().unwrap_or("-").dimmed());
    println!("    State:   {}", colored_state(project.state()));
    println!(
        "    Created: {}",
        format_time(project.meta.created.as_ref()).dimmed()
    );
    println!();
}

fn print_project_details(project: &Project) {
    println!("{}", "Project Details:".bold());
    println!("  ID:          {}", project.id().unwrap_or("-").cyan());
    println!("  Title:       {}", project.title().bold());
    if let Some(summary) = &project.meta.summary {
        println!("  Summary:     {}", summary);
    }
    println!("  State:       {}", colored_state(project.state()));
    if let Some(environment) = &project.content.environment {
        println!("  Environment: {}", environment);
    }
    if let Some(driver) = &project.content.driver {
        println!("  Driver:      {}", driver);
    }
    println!("  Created:     {}", format_time(project.meta.created.as_ref()));
    println!("  Updated:     {}", format_time(project.meta.updated.as_ref()));
}
