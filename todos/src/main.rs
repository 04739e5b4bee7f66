//! `todos` command-line front end.
//!
//! A thin consumer of the todo core: it gates commands behind the login,
//! validates titles, and prints the filtered view.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;
use todos::{Config, Filter, Todo, TodoApp, TodoId, validate_title};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Manage your todo list
#[derive(Debug, Parser)]
#[command(name = "todos", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in
    Login {
        /// Username
        username: String,
        /// Password
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List todos
    List {
        /// Only show todos whose title contains this text
        #[arg(long)]
        search: Option<String>,
        /// Which todos to show
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },
    /// Add a todo
    Add {
        /// Title
        title: String,
        /// Mark it done right away
        #[arg(long)]
        completed: bool,
    },
    /// Change a todo's title or completion
    Edit {
        /// Todo id
        id: TodoId,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New completion flag
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Flip a todo between done and open
    Toggle {
        /// Todo id
        id: TodoId,
    },
    /// Delete a todo
    Remove {
        /// Todo id
        id: TodoId,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Completed,
    Incomplete,
}

impl From<FilterArg> for Filter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => Self::All,
            FilterArg::Completed => Self::Completed,
            FilterArg::Incomplete => Self::Incomplete,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| "todos=info,todo_sync_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let app = TodoApp::from_config(&config)?;
    app.initialize_auth()
        .await
        .context("failed to restore session")?;

    let outcome = run(&app, cli.command).await;

    if let Err(error) = app.shutdown(Duration::from_secs(5)).await {
        tracing::warn!(error = %error, "shutdown did not complete cleanly");
    }
    outcome
}

async fn run(app: &TodoApp, command: Command) -> anyhow::Result<()> {
    if let Command::Login { username, password } = &command {
        let user = app.login(username, password).await?;
        println!("Signed in as {} <{}>", user.username, user.email);
        return Ok(());
    }

    let session = app.auth().await;
    let Some(user) = session.user.filter(|_| session.is_authenticated) else {
        bail!("not signed in; run `todos login <username> <password>` first");
    };

    match command {
        Command::Login { .. } => Ok(()),
        Command::Logout => {
            app.logout().await?;
            println!("Signed out");
            Ok(())
        },
        Command::Whoami => {
            println!("{} <{}>", user.username, user.email);
            Ok(())
        },
        Command::List { search, filter } => {
            app.load().await.context("failed to load todos")?;
            if let Some(search) = search {
                app.set_search_query(search).await?;
            }
            app.set_filter(filter.into()).await?;

            let visible = app.visible().await;
            if visible.is_empty() {
                println!("No todos");
            }
            for todo in &visible {
                print_todo(todo);
            }
            Ok(())
        },
        Command::Add { title, completed } => {
            let title = validate_title(&title)?;
            app.load().await.context("failed to load todos")?;
            let todo = app.create(title, completed).await?;
            print_todo(&todo);
            Ok(())
        },
        Command::Edit { id, title, completed } => {
            let title = title.as_deref().map(validate_title).transpose()?;
            let mut todo = find(app, id).await?;
            if let Some(title) = title {
                todo.title = title;
            }
            if let Some(completed) = completed {
                todo.completed = completed;
            }
            print_todo(&app.update(todo).await?);
            Ok(())
        },
        Command::Toggle { id } => {
            let todo = find(app, id).await?;
            print_todo(&app.update(todo.toggled()).await?);
            Ok(())
        },
        Command::Remove { id } => {
            app.load().await.context("failed to load todos")?;
            app.remove(id).await?;
            println!("Removed {id}");
            Ok(())
        },
    }
}

/// Load the collection and look up one todo
async fn find(app: &TodoApp, id: TodoId) -> anyhow::Result<Todo> {
    let items = app.load().await.context("failed to load todos")?;
    items
        .into_iter()
        .find(|t| t.id == id)
        .with_context(|| format!("no todo with id {id}"))
}

fn print_todo(todo: &Todo) {
    let mark = if todo.completed { "x" } else { " " };
    println!("[{mark}] {:>14}  {}", todo.id, todo.title);
}
