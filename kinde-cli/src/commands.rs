//! Subcommand handlers.

use anyhow::{Context, Result};
use clap::Subcommand;
use kinde_client::Kinde;
use kinde_client::applications::{self, ApplicationSort, ApplicationType};
use kinde_client::permissions::{self, PermissionSort, SearchParams};
use kinde_client::users::{self, UserSort};
use kinde_core::ApiClient;
use serde_json::json;
use tracing::info;

use crate::output::{OutputFormat, render_list, render_one};

#[derive(Debug, Subcommand)]
pub enum ApisCommand {
    /// List every API
    List,
    /// Show one API
    Get { id: String },
}

#[derive(Debug, Subcommand)]
pub enum ApplicationsCommand {
    /// List applications
    List {
        /// Sort order (name_asc, name_desc)
        #[arg(long)]
        sort: Option<ApplicationSort>,

        /// Number of results per page
        #[arg(long)]
        page_size: Option<u32>,

        /// Follow next tokens until every page is fetched
        #[arg(long)]
        all: bool,
    },
    /// Show one application
    Get { id: String },
    /// Create an application
    Create {
        /// Application name
        #[arg(long)]
        name: String,

        /// Application type (reg, spa, m2m)
        #[arg(long = "type")]
        kind: ApplicationType,
    },
    /// Delete an application
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum OrganizationsCommand {
    /// List organizations
    List,
    /// Show one organization
    Get { code: String },
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users
    List {
        /// Sort order (name_asc, email_desc, id_asc, ...)
        #[arg(long)]
        sort: Option<UserSort>,

        /// Number of results per page
        #[arg(long)]
        page_size: Option<u32>,

        /// Start from this page token
        #[arg(long)]
        next_token: Option<String>,
    },
    /// Show one user
    Get { id: String },
}

#[derive(Debug, Subcommand)]
pub enum RolesCommand {
    /// List roles
    List,
    /// Show one role with its permission ids
    Get { id: String },
}

#[derive(Debug, Subcommand)]
pub enum PermissionsCommand {
    /// List permissions
    List {
        /// Sort order (name_asc, name_desc, id_asc, id_desc)
        #[arg(long)]
        sort: Option<PermissionSort>,

        /// Number of results per page
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Find a permission by exact name and key
    Search {
        #[arg(long)]
        name: String,

        #[arg(long)]
        key: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConnectionsCommand {
    /// List connections
    List,
    /// Show one connection
    Get { id: String },
}

#[derive(Debug, Subcommand)]
pub enum IdentitiesCommand {
    /// Show one identity
    Get { id: String },
}

/// Fetch an access token and report its expiry, or the token itself.
pub async fn token(kinde: &Kinde, format: OutputFormat, show: bool) -> Result<()> {
    let transport = kinde.client().transport();
    let token = transport
        .get_token()
        .await
        .context("Failed to obtain access token")?;
    let expiry = transport.cached_expiry().await;

    match format {
        OutputFormat::Json => {
            let mut body = json!({ "expires_at": expiry.map(|e| e.to_rfc3339()) });
            if show {
                body["access_token"] = json!(token.expose());
            }
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text if show => println!("{}", token.expose()),
        OutputFormat::Text => match expiry {
            Some(expiry) => println!("Token valid until {}", expiry.to_rfc3339()),
            None => println!("Token obtained"),
        },
    }
    Ok(())
}

pub async fn apis<C: ApiClient>(kinde: &Kinde<C>, format: OutputFormat, cmd: ApisCommand) -> Result<()> {
    let client = kinde.apis();
    let rendered = match cmd {
        ApisCommand::List => render_list(format, &client.list().await?)?,
        ApisCommand::Get { id } => render_one(format, &client.get(&id).await?)?,
    };
    println!("{}", rendered);
    Ok(())
}

pub async fn applications<C: ApiClient>(
    kinde: &Kinde<C>,
    format: OutputFormat,
    cmd: ApplicationsCommand,
) -> Result<()> {
    let client = kinde.applications();
    let rendered = match cmd {
        ApplicationsCommand::List { sort, page_size, all } => {
            let apps = if all {
                let mut options = kinde_core::PaginatorOptions::default();
                if let Some(sort) = sort {
                    options = options.with_sort(sort.to_string());
                }
                if let Some(page_size) = page_size {
                    options = options.with_page_size(page_size);
                }
                client.paginate(options).collect_all().await?
            } else {
                let params = applications::ListParams {
                    sort,
                    page_size,
                    next_token: None,
                };
                client.list(&params).await?
            };
            render_list(format, &apps)?
        }
        ApplicationsCommand::Get { id } => render_one(format, &client.get(&id).await?)?,
        ApplicationsCommand::Create { name, kind } => {
            let params = applications::CreateParams { name, kind };
            let app = client.create(&params).await?;
            info!("Created application {}", app.id);
            render_one(format, &app)?
        }
        ApplicationsCommand::Delete { id } => {
            client
                .delete(&id)
                .await
                .with_context(|| format!("Failed to delete application {}", id))?;
            format!("Deleted application {}", id)
        }
    };
    println!("{}", rendered);
    Ok(())
}

pub async fn organizations<C: ApiClient>(
    kinde: &Kinde<C>,
    format: OutputFormat,
    cmd: OrganizationsCommand,
) -> Result<()> {
    let client = kinde.organizations();
    let rendered = match cmd {
        OrganizationsCommand::List => render_list(format, &client.list().await?)?,
        OrganizationsCommand::Get { code } => render_one(format, &client.get(&code).await?)?,
    };
    println!("{}", rendered);
    Ok(())
}

pub async fn users<C: ApiClient>(kinde: &Kinde<C>, format: OutputFormat, cmd: UsersCommand) -> Result<()> {
    let client = kinde.users();
    let rendered = match cmd {
        UsersCommand::List {
            sort,
            page_size,
            next_token,
        } => {
            let params = users::ListParams {
                sort,
                page_size,
                next_token,
            };
            render_list(format, &client.list(&params).await?)?
        }
        UsersCommand::Get { id } => render_one(format, &client.get(&id).await?)?,
    };
    println!("{}", rendered);
    Ok(())
}

pub async fn roles<C: ApiClient>(kinde: &Kinde<C>, format: OutputFormat, cmd: RolesCommand) -> Result<()> {
    let client = kinde.roles();
    let rendered = match cmd {
        RolesCommand::List => render_list(format, &client.list().await?)?,
        RolesCommand::Get { id } => render_one(format, &client.get(&id).await?)?,
    };
    println!("{}", rendered);
    Ok(())
}

pub async fn permissions<C: ApiClient>(
    kinde: &Kinde<C>,
    format: OutputFormat,
    cmd: PermissionsCommand,
) -> Result<()> {
    let client = kinde.permissions();
    let rendered = match cmd {
        PermissionsCommand::List { sort, page_size } => {
            let params = permissions::ListParams {
                sort,
                page_size,
                next_token: None,
            };
            render_list(format, &client.list(&params).await?)?
        }
        PermissionsCommand::Search { name, key } => {
            let found = client.search(&SearchParams { name, key }).await?;
            render_one(format, &found)?
        }
    };
    println!("{}", rendered);
    Ok(())
}

pub async fn connections<C: ApiClient>(
    kinde: &Kinde<C>,
    format: OutputFormat,
    cmd: ConnectionsCommand,
) -> Result<()> {
    let client = kinde.connections();
    let rendered = match cmd {
        ConnectionsCommand::List => render_list(format, &client.list().await?)?,
        ConnectionsCommand::Get { id } => render_one(format, &client.get(&id).await?)?,
    };
    println!("{}", rendered);
    Ok(())
}

pub async fn identities<C: ApiClient>(
    kinde: &Kinde<C>,
    format: OutputFormat,
    cmd: IdentitiesCommand,
) -> Result<()> {
    let client = kinde.identities();
    let rendered = match cmd {
        IdentitiesCommand::Get { id } => render_one(format, &client.get(&id).await?)?,
    };
    println!("{}", rendered);
    Ok(())
}
