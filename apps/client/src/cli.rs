//! `referhub` command-line shell over the auth and dashboard pages.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use referhub_models::{CandidateQuery, CandidateStatus};
use uuid::Uuid;

use crate::auth_page::{AuthMode, AuthPage};
use crate::dashboard::{Confirm, Dashboard, FixedAnswer};
use crate::http::ApiClient;
use crate::notify::{ConsoleNotifier, Notifier};
use crate::render::{render_candidates, render_stats};
use crate::session::{default_session_path, SessionStore};
use crate::shell::AuthFlag;

/// ReferHub - candidate referral tracking
#[derive(Parser)]
#[command(name = "referhub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend origin; requests go to <origin>/api
    #[arg(
        long,
        global = true,
        env = "REACT_APP_BACKEND_URL",
        default_value = "http://localhost:8000"
    )]
    pub backend_url: String,

    /// Session file (defaults to the user config directory)
    #[arg(long, global = true, env = "REFERHUB_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Disable colored status badges
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "REFERHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and store the session
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long, env = "REFERHUB_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        full_name: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List referred candidates
    #[command(alias = "ls")]
    List {
        /// Free-text search over name and job title
        #[arg(long, short)]
        search: Option<String>,
        /// Only candidates with this status (Pending, Reviewed, Hired)
        #[arg(long, short = 'f')]
        status: Option<CandidateStatus>,
    },

    /// Show candidate counts per status
    Stats,

    /// Refer a new candidate
    Refer {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        job_title: String,
        /// Resume file (PDF expected)
        #[arg(long)]
        resume: Option<PathBuf>,
    },

    /// Change a candidate's status
    Status {
        id: Uuid,
        status: CandidateStatus,
    },

    /// Delete a candidate
    #[command(alias = "rm")]
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

/// Reads a y/N answer from stdin.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        print!("{message} [y/N] ");
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// For commands that never ask anything.
fn no_prompt() -> Arc<dyn Confirm> {
    Arc::new(FixedAnswer(false))
}

/// Runs one command. `Ok(false)` means the command ran but failed; the
/// failure has already been reported to the user.
pub async fn run(cli: Cli) -> Result<bool> {
    let session = SessionStore::file(cli.session_file.clone().unwrap_or_else(default_session_path));
    let api = ApiClient::new(&cli.backend_url, session.clone());
    let authenticated = AuthFlag::from_session(&session);
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let color = !cli.no_color;

    let dashboard = |confirm: Arc<dyn Confirm>| {
        Dashboard::new(
            api.clone(),
            session.clone(),
            authenticated.clone(),
            notifier.clone(),
            confirm,
        )
    };

    let requires_session = !matches!(
        cli.command,
        Commands::Login { .. } | Commands::Signup { .. } | Commands::Logout
    );
    if requires_session && !authenticated.get() {
        notifier.error("Not signed in; run `referhub login` first");
        return Ok(false);
    }

    match cli.command {
        Commands::Login { email, password } => {
            let mut page = AuthPage::new(
                api.clone(),
                session.clone(),
                authenticated.clone(),
                notifier.clone(),
            );
            page.form_mut().email = email;
            page.form_mut().password = password;
            Ok(page.submit().await)
        }
        Commands::Signup {
            email,
            password,
            full_name,
        } => {
            let mut page = AuthPage::new(
                api.clone(),
                session.clone(),
                authenticated.clone(),
                notifier.clone(),
            );
            page.set_mode(AuthMode::Signup);
            let form = page.form_mut();
            form.email = email;
            form.password = password;
            form.full_name = full_name;
            Ok(page.submit().await)
        }
        Commands::Logout => {
            dashboard(no_prompt()).logout();
            Ok(true)
        }
        Commands::Whoami => {
            match session.load()? {
                Some(current) => println!("{} <{}>", current.user.full_name, current.user.email),
                None => notifier.error("Not signed in"),
            }
            Ok(true)
        }
        Commands::List { search, status } => {
            let page = dashboard(no_prompt());
            let ok = page
                .apply_query(CandidateQuery::new(search.unwrap_or_default(), status))
                .await;
            if ok {
                print!("{}", render_candidates(&page.candidates(), color));
            }
            Ok(ok)
        }
        Commands::Stats => {
            let page = dashboard(no_prompt());
            page.fetch_stats().await;
            println!("{}", render_stats(&page.stats()));
            Ok(true)
        }
        Commands::Refer {
            name,
            email,
            phone,
            job_title,
            resume,
        } => {
            let page = dashboard(no_prompt());
            page.open_dialog();
            page.edit_form(|form| {
                form.name = name;
                form.email = email;
                form.phone = phone;
                form.job_title = job_title;
                form.resume = resume;
            });
            Ok(page.create_candidate().await)
        }
        Commands::Status { id, status } => {
            let page = dashboard(no_prompt());
            Ok(page.update_status(id, status).await)
        }
        Commands::Delete { id, yes } => {
            let confirm: Arc<dyn Confirm> = if yes {
                Arc::new(FixedAnswer(true))
            } else {
                Arc::new(StdinConfirm)
            };
            Ok(dashboard(confirm).delete_candidate(id).await)
        }
    }
}
