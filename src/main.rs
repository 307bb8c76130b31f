use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use admin_console::authz::{Permission, PermissionPicker, Resource};
use admin_console::config::Config;
use admin_console::errors::AppError;
use admin_console::guard::{GuardOutcome, Navigator, Route};
use admin_console::models::user::{
    CreateUserRequest, LoginRequest, RegisterRequest, User, VerifyOtpRequest,
};
use admin_console::views::auth::RegisterStep;
use admin_console::views::{self, Notice, NoticeKind};
use admin_console::{create_app, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about = "RBAC admin console", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with mobile number and password
    Login {
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account; an OTP is sent for verification
    Register {
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Verify a registration OTP and sign in
    Verify {
        #[arg(long)]
        user_id: Uuid,
        #[arg(long)]
        otp: String,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show the dashboard tabs available to the signed-in user
    Dashboard,
    /// Manage roles (access profiles)
    Roles {
        #[command(subcommand)]
        command: RolesCommand,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        command: TasksCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RolesCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        /// Permission identifiers, e.g. `task.view,task.create`
        #[arg(long = "permission", value_delimiter = ',')]
        permissions: Vec<Permission>,
        /// Grant every permission of a resource group
        #[arg(long = "all", value_enum)]
        groups: Vec<GroupArg>,
    },
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    List,
    Create {
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role_id: String,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        mobile: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role_id: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum TasksCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GroupArg {
    User,
    Task,
    Role,
}

impl From<GroupArg> for Resource {
    fn from(value: GroupArg) -> Self {
        match value {
            GroupArg::User => Resource::User,
            GroupArg::Task => Resource::Task,
            GroupArg::Role => Resource::Role,
        }
    }
}

/// Terminal stand-in for page navigation.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(path = route.path(), "navigate");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    let state = create_app(config, Arc::new(TerminalNavigator))
        .await
        .context("failed to open session store")?;

    match run(&state, cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            report(&err);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(state: &AppState, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Login { mobile, password } => {
            if views::auth::mount(state).await.is_some() {
                println!("Already signed in");
                return Ok(());
            }
            let user = views::auth::login(state, LoginRequest { mobile, password }).await?;
            println!("Signed in as {}", display_name(user.name.as_deref(), &user.mobile));
        }
        Commands::Register { mobile, password, name } => {
            if views::auth::mount(state).await.is_some() {
                println!("Already signed in");
                return Ok(());
            }
            let request = RegisterRequest { mobile, password, name };
            match views::auth::register(state, request).await? {
                RegisterStep::AwaitingOtp { user_id } => {
                    println!("OTP sent. Run `verify --user-id {user_id} --otp <code>`");
                }
                RegisterStep::OtpNotSent { user_id } => {
                    println!("Registered {user_id}, but no OTP was sent");
                }
            }
        }
        Commands::Verify { user_id, otp } => {
            match views::auth::verify_otp(state, VerifyOtpRequest { user_id, otp }).await? {
                Some(user) => println!("Verified and signed in as {}", user.mobile),
                None => println!("OTP accepted but the account is not verified yet"),
            }
        }
        Commands::Logout => {
            if views::auth::logout(state).await? {
                println!("Signed out");
            } else {
                println!("Not signed in");
            }
        }
        Commands::Whoami => match current_session_user(state).await {
            Some(user) => {
                println!("{:<10} {}", "id", user.id);
                println!("{:<10} {}", "name", user.name.as_deref().unwrap_or("-"));
                println!("{:<10} {}", "mobile", user.mobile);
                println!("{:<10} {:?}", "role", user.role);
                println!("{:<10} {}", "profile", user.profile_name());
                println!("{:<10} {}", "grant", user.grant().unwrap_or("-"));
            }
            None => println!("Not signed in"),
        },
        Commands::Dashboard => {
            enter_dashboard(state).await?;
            let view = views::dashboard::mount(state)?;
            for tab in &view.tabs {
                let marker = if Some(*tab) == view.active { "*" } else { " " };
                println!("{marker} {}", tab.label());
            }
        }
        Commands::Roles { command } => {
            enter_dashboard(state).await?;
            roles(state, command).await?;
        }
        Commands::Users { command } => {
            enter_dashboard(state).await?;
            users(state, command).await?;
        }
        Commands::Tasks { command } => {
            enter_dashboard(state).await?;
            tasks(state, command).await?;
        }
    }

    Ok(())
}

/// Runs the route guard; waits out a forced logout before failing.
async fn enter_dashboard(state: &AppState) -> Result<(), AppError> {
    let guard = state.route_guard();
    match guard.evaluate().await {
        GuardOutcome::Render(_) => Ok(()),
        GuardOutcome::Redirect(route) => Err(AppError::unauthorized(format!(
            "not signed in; go to {}",
            route.path()
        ))),
        GuardOutcome::Blocked(notice) => {
            println!("{}", notice.title);
            println!("{}", notice.detail);
            if let Some(pending) = guard.take_pending_logout() {
                let outcome = pending.wait().await;
                tracing::info!(?outcome, "forced logout finished");
            }
            Err(AppError::forbidden("no dashboard permission"))
        }
    }
}

async fn roles(state: &AppState, command: RolesCommand) -> Result<(), AppError> {
    match command {
        RolesCommand::List => {
            let view = views::roles::mount(state).await?;
            if !view.can_view {
                return Err(AppError::forbidden("requires roles.view"));
            }
            println!("{:<24} {}", "Name", "Permissions");
            for row in &view.rows {
                println!("{:<24} {}", row.name, row.permissions);
            }
        }
        RolesCommand::Create { name, permissions, groups } => {
            let mut picker = PermissionPicker::new();
            for group in groups {
                picker.toggle_all(group.into());
            }
            for permission in permissions {
                picker.select(permission);
            }
            let submitted = views::roles::create(state, name, &picker).await?;
            print_notice(&submitted.notice);
        }
    }
    Ok(())
}

async fn users(state: &AppState, command: UsersCommand) -> Result<(), AppError> {
    match command {
        UsersCommand::List => {
            let view = views::users::mount(state).await?;
            if !view.can_view {
                return Err(AppError::forbidden("requires user.view"));
            }
            println!("{:<10} {:<20} {:<14} {}", "Id", "Name", "Mobile", "Role");
            for row in &view.rows {
                println!(
                    "{:<10} {:<20} {:<14} {}",
                    row.short_id, row.name, row.mobile, row.profile
                );
            }
        }
        UsersCommand::Create { mobile, password, name, role_id } => {
            let request = CreateUserRequest {
                mobile,
                password,
                name,
                role_id,
            };
            let submitted = views::users::create(state, request).await?;
            print_notice(&submitted.notice);
        }
        UsersCommand::Update { id, mobile, password, name, role_id } => {
            views::users::mount(state).await?;
            let mut request = views::users::edit_form(state, id).await?;
            if let Some(mobile) = mobile {
                request.mobile = mobile;
            }
            if let Some(name) = name {
                request.name = Some(name);
            }
            if let Some(role_id) = role_id {
                request.role_id = role_id;
            }
            request.password = password;
            let submitted = views::users::update(state, id, request).await?;
            print_notice(&submitted.notice);
        }
    }
    Ok(())
}

async fn tasks(state: &AppState, command: TasksCommand) -> Result<(), AppError> {
    match command {
        TasksCommand::List => {
            let view = views::tasks::mount(state).await?;
            if !view.can_view {
                return Err(AppError::forbidden("requires task.view"));
            }
            println!("{:<10} {}", "Id", "Name");
            for task in &view.tasks {
                println!("{:<10} {}", admin_console::utils::short_id(&task.id), task.name);
            }
        }
        TasksCommand::Create { name } => {
            let submitted = views::tasks::create(state, name).await?;
            print_notice(&submitted.notice);
        }
    }
    Ok(())
}

async fn current_session_user(state: &AppState) -> Option<User> {
    if state.session.is_authenticated().await {
        state.session.current_user()
    } else {
        None
    }
}

fn display_name<'a>(name: Option<&'a str>, mobile: &'a str) -> &'a str {
    name.filter(|n| !n.is_empty()).unwrap_or(mobile)
}

fn print_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Success => println!("{}", notice.message),
        NoticeKind::Error => eprintln!("{}", notice.message),
    }
}

fn report(err: &AppError) {
    if let AppError::Validation(errors) = err {
        for field in &errors.0 {
            eprintln!("{:<14} {}", field.field, field.message);
        }
    } else {
        print_notice(&Notice::from_error(err));
    }
    tracing::debug!(kind = err.kind(), "command failed");
}

fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
