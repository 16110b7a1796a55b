// src/cli.rs
//! Command-line front end: argument parsing and rendering only

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use mylist::auth::{AuthService, HttpAuthRepository};
use mylist::common::{AppState, ClientError};
use mylist::todos::{HttpTodoRepository, ImageUpload, Todo, TodoInput, TodoManager, TodoStatus};

#[derive(Debug, Parser)]
#[command(name = "mylist", version, about = "Manage your MyList todos from the terminal")]
pub struct Cli {
    /// API base URL (overrides MYLIST_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Session(SessionCommand),
    #[command(flatten)]
    Todo(TodoCommand),
}

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Print the provider authorization URL to open in a browser
    Oauth { provider: String },
    /// Store the token the OAuth callback redirected back with
    Callback { token: String },
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
}

#[derive(Debug, Subcommand)]
pub enum TodoCommand {
    /// List all todos
    List,
    /// Show one todo
    Show { id: i64 },
    /// Create a todo
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "pending")]
        status: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Replace a todo; omitted fields keep their current value
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a todo
    Rm { id: i64 },
    /// Download a todo's image
    Image {
        id: i64,
        #[arg(long)]
        out: PathBuf,
    },
}

pub async fn run(command: Command, state: &AppState) -> Result<(), ClientError> {
    let mut auth = state.auth_service();
    auth.restore();

    let command = match command {
        Command::Session(command) => return run_session_command(command, &mut auth).await,
        Command::Todo(command) => command,
    };

    require_session(&auth)?;
    let mut todos = state.todo_manager();
    run_todo_command(command, &mut todos).await
}

async fn run_session_command(
    command: SessionCommand,
    auth: &mut AuthService<HttpAuthRepository>,
) -> Result<(), ClientError> {
    match command {
        SessionCommand::Login { email, password } => {
            let user = auth.login(&email, &password).await?;
            println!("Logged in as {} <{}>", user.username, user.email);
        }
        SessionCommand::Signup {
            username,
            email,
            password,
        } => {
            let user = auth.signup(&username, &email, &password).await?;
            println!("Welcome, {}! Your account is ready.", user.username);
        }
        SessionCommand::Oauth { provider } => {
            let url = auth.oauth_login(&provider)?;
            println!("Open this URL in your browser to continue:\n{}", url);
            println!("Then run `mylist callback <token>` with the token from the redirect.");
        }
        SessionCommand::Callback { token } => {
            let user = auth.complete_oauth(&token)?;
            println!("Authentication successful (user id {}).", user.id);
        }
        SessionCommand::Logout => {
            auth.logout();
            println!("Logged out.");
        }
        SessionCommand::Whoami => match auth.get_current_user() {
            Some(user) if auth.is_authenticated() => println!("Logged in as user {}", user.id),
            _ => println!("Not logged in."),
        },
    }

    Ok(())
}

/// Route guard: todo commands need a live session
fn require_session(auth: &AuthService<HttpAuthRepository>) -> Result<(), ClientError> {
    if auth.is_authenticated() {
        Ok(())
    } else {
        info!("No valid session, redirecting to login");
        Err(ClientError::Unauthorized(
            "no active session, run `mylist login` first".to_string(),
        ))
    }
}

async fn run_todo_command(
    command: TodoCommand,
    todos: &mut TodoManager<HttpTodoRepository>,
) -> Result<(), ClientError> {
    match command {
        TodoCommand::List => {
            todos.fetch_all().await?;
            if todos.is_empty() {
                println!("No todos yet. Add one with `mylist add --title ...`.");
            }
            for todo in todos.todos() {
                print_summary(todo);
            }
        }
        TodoCommand::Show { id } => {
            let todo = todos.get_by_id(id).await?;
            print_detail(&todo, todos.image_url(&todo));
        }
        TodoCommand::Add {
            title,
            description,
            status,
            image,
        } => {
            let mut input = TodoInput::new(title, description, status.parse::<TodoStatus>()?);
            if let Some(path) = image {
                input = input.with_image(ImageUpload::from_path(&path).await?);
            }
            let todo = todos.create(input).await?;
            println!("Created todo #{}", todo.id);
            print_summary(&todo);
        }
        TodoCommand::Edit {
            id,
            title,
            description,
            status,
            image,
        } => {
            let current = todos.get_by_id(id).await?;
            let mut input = TodoInput::from_todo(&current);
            if let Some(title) = title {
                input.title = title;
            }
            if let Some(description) = description {
                input.description = description;
            }
            if let Some(status) = status {
                input.status = status.parse()?;
            }
            if let Some(path) = image {
                input.image = Some(ImageUpload::from_path(&path).await?);
            }
            let todo = todos.update(id, input).await?;
            println!("Updated todo #{}", todo.id);
            print_summary(&todo);
        }
        TodoCommand::Rm { id } => {
            todos.delete(id).await?;
            println!("Deleted todo #{}", id);
        }
        TodoCommand::Image { id, out } => {
            let todo = todos.get_by_id(id).await?;
            match todos.fetch_image(&todo).await? {
                Some(bytes) => {
                    tokio::fs::write(&out, &bytes).await?;
                    println!("Saved {} bytes to {}", bytes.len(), out.display());
                }
                None => println!("Todo #{} has no image.", id),
            }
        }
    }

    Ok(())
}

fn print_summary(todo: &Todo) {
    let marker = if todo.attached_image().is_some() { " [img]" } else { "" };
    println!(
        "#{:<5} {:<12} {}{}",
        todo.id,
        todo.status.label(),
        todo.title,
        marker
    );
}

fn print_detail(todo: &Todo, image_url: Option<String>) {
    println!("#{} {}", todo.id, todo.title);
    println!("  status:      {}", todo.status.label());
    if !todo.description.is_empty() {
        println!("  description: {}", todo.description);
    }
    if let Some(url) = image_url {
        println!("  image:       {}", url);
    }
    println!("  created:     {}", todo.created_at.format("%Y-%m-%d %H:%M"));
    println!("  updated:     {}", todo.updated_at.format("%Y-%m-%d %H:%M"));
}
