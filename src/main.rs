//! SkillSpot CLI.
//!
//! Each subcommand is one screen of the client: it collects the form input,
//! runs a single flow against the SDK, and renders the result. Every failure
//! becomes exactly one printed message; nothing is retried. A successful write
//! simply returns to the shell, the way the screens returned to their caller.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use skillspot::auth::AuthClient;
use skillspot::config::Config;
use skillspot::error::Error;
use skillspot::filter::{filter_applications, StatusFilter};
use skillspot::models::{ApplicationStatus, NewInternship, NewProject};
use skillspot::profile::{resolve_startup, resolve_student};
use skillspot::records;
use skillspot::session;
use skillspot::store::StoreClient;

#[derive(Parser)]
#[command(name = "skillspot")]
#[command(about = "SkillSpot: internships and projects for students and startups", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend URL override (otherwise SKILLSPOT_BACKEND_URL or the local default)
    #[arg(short, long)]
    url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Student screens
    #[command(subcommand)]
    Student(StudentCommand),
    /// Startup screens
    #[command(subcommand)]
    Startup(StartupCommand),
    /// Sign out and drop the saved session
    Logout,
}

#[derive(Subcommand)]
enum StudentCommand {
    /// Create a student account and its profile row
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
        /// Comma-separated skills
        #[arg(long, default_value = "")]
        skills: String,
    },
    /// Log in as a student
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the logged-in student's profile
    Profile,
    /// Post a project
    PostProject {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Comma-separated skills, stored as typed
        #[arg(long)]
        skills: String,
    },
    /// Browse every open internship
    Internships,
    /// Apply to an internship
    Apply {
        /// Id of the internship to apply to
        #[arg(long)]
        internship: i64,
        #[arg(long)]
        cover_letter: String,
    },
    /// List the logged-in student's applications, most recent first
    Applications,
}

#[derive(Subcommand)]
enum StartupCommand {
    /// Create a startup account and its profile row
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        cin: String,
    },
    /// Log in as a startup
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the logged-in startup's profile
    Profile,
    /// Post an internship
    PostInternship {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        requirements: String,
        /// Numeric stipend
        #[arg(long)]
        stipend: String,
    },
    /// Review applications to the startup's internships
    Applications {
        /// All, Pending, Approved or Rejected
        #[arg(long, default_value = "All")]
        status: String,
        /// Keep only applicants with a matching skill
        #[arg(long, default_value = "")]
        search: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        // The screen boundary: log for the developer, one message for the
        // user, no retry.
        error!("{err}");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(url) = cli.url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    let auth = AuthClient::new(&config);
    let store = StoreClient::new(&config);
    let session_file = PathBuf::from(session::SESSION_FILE);

    match cli.command {
        Commands::Student(command) => student(command, &auth, &store, &session_file).await,
        Commands::Startup(command) => startup(command, &auth, &store, &session_file).await,
        Commands::Logout => {
            if let Ok(active) = session::load(&session_file) {
                let _ = auth.sign_out(&active).await;
            }
            session::clear(&session_file);
            println!("Logged out.");
            Ok(())
        }
    }
}

async fn student(
    command: StudentCommand,
    auth: &AuthClient,
    store: &StoreClient,
    session_file: &Path,
) -> Result<(), Error> {
    match command {
        StudentCommand::Signup {
            email,
            password,
            full_name,
            skills,
        } => {
            auth.sign_up(&email, &password).await?;
            records::create_student_profile(store, &email, &full_name, &skills).await?;
            println!("Signup successful! Please check your email to confirm.");
            Ok(())
        }
        StudentCommand::Login { email, password } => {
            let active = auth.sign_in_with_password(&email, &password).await?;
            session::save(&active, session_file)?;
            println!("Login successful!");
            Ok(())
        }
        StudentCommand::Profile => {
            let active = session::load(session_file)?;
            let profile = resolve_student(auth, store, &active).await?;
            println!("{} <{}>", profile.full_name, profile.email);
            if profile.skills.is_empty() {
                println!("Skills: none listed");
            } else {
                println!("Skills: {}", profile.skills.join(", "));
            }
            Ok(())
        }
        StudentCommand::PostProject {
            title,
            description,
            skills,
        } => {
            let active = session::load(session_file)?;
            let project = NewProject::new(title, description, skills)?;
            records::post_project(auth, store, &active, &project).await?;
            println!("Project posted successfully!");
            Ok(())
        }
        StudentCommand::Internships => {
            let open = records::list_internships(store).await?;
            if open.is_empty() {
                println!("No internships available yet.");
                return Ok(());
            }
            for internship in open {
                let stipend = internship
                    .stipend
                    .map(|amount| amount.to_string())
                    .unwrap_or_else(|| "Not specified".to_string());
                println!("#{}  {}", internship.id, internship.title);
                println!("    Stipend: {stipend}");
                println!("    {}", internship.description);
                println!("    Requirements: {}", internship.requirements);
            }
            Ok(())
        }
        StudentCommand::Apply {
            internship,
            cover_letter,
        } => {
            let active = session::load(session_file)?;
            records::submit_application(auth, store, &active, internship, &cover_letter).await?;
            println!("Application submitted successfully!");
            Ok(())
        }
        StudentCommand::Applications => {
            let active = session::load(session_file)?;
            let mine = records::my_applications(auth, store, &active).await?;
            if mine.is_empty() {
                println!("No applications yet.");
                return Ok(());
            }
            for application in mine {
                let title = application
                    .internship
                    .as_ref()
                    .map(|internship| internship.title.as_str())
                    .unwrap_or("N/A");
                println!("{}  {}", status_label(application.status), title);
                println!(
                    "    {}",
                    application.cover_letter.as_deref().unwrap_or("Not provided")
                );
                println!("    Applied on: {}", application.created_at.format("%Y-%m-%d"));
            }
            Ok(())
        }
    }
}

async fn startup(
    command: StartupCommand,
    auth: &AuthClient,
    store: &StoreClient,
    session_file: &Path,
) -> Result<(), Error> {
    match command {
        StartupCommand::Signup {
            email,
            password,
            name,
            cin,
        } => {
            auth.sign_up(&email, &password).await?;
            records::create_startup_profile(store, &email, &name, &cin).await?;
            println!("Signup successful! Please check your email to confirm.");
            Ok(())
        }
        StartupCommand::Login { email, password } => {
            let active = auth.sign_in_with_password(&email, &password).await?;
            match resolve_startup(auth, store, &active).await {
                Ok(profile) => {
                    session::save(&active, session_file)?;
                    println!("Welcome back, {}!", profile.name);
                    Ok(())
                }
                Err(Error::ProfileNotFound { .. }) => {
                    println!("No profile found. Please sign up.");
                    Ok(())
                }
                Err(other) => Err(other),
            }
        }
        StartupCommand::Profile => {
            let active = session::load(session_file)?;
            let profile = resolve_startup(auth, store, &active).await?;
            println!("{} <{}>", profile.name, profile.email);
            println!("CIN: {}", profile.cin);
            Ok(())
        }
        StartupCommand::PostInternship {
            title,
            description,
            requirements,
            stipend,
        } => {
            let active = session::load(session_file)?;
            let internship = NewInternship::new(title, description, requirements, &stipend)?;
            records::post_internship(auth, store, &active, &internship).await?;
            println!("Internship posted successfully!");
            Ok(())
        }
        StartupCommand::Applications { status, search } => {
            let active = session::load(session_file)?;
            let wanted: StatusFilter = status.parse().map_err(Error::Validation)?;
            let fetched = records::received_applications(auth, store, &active).await?;
            let visible = filter_applications(&fetched, wanted, &search);
            if visible.is_empty() {
                println!("No applications found.");
                return Ok(());
            }
            for application in visible {
                let applicant = application.student.as_ref();
                let name = applicant
                    .map(|applicant| applicant.full_name.as_str())
                    .unwrap_or("N/A");
                let email = applicant
                    .map(|applicant| applicant.email.as_str())
                    .unwrap_or("N/A");
                let skills = applicant
                    .and_then(|applicant| applicant.skills.as_ref())
                    .map(|skills| skills.join(", "))
                    .unwrap_or_else(|| "N/A".to_string());
                let title = application
                    .internship
                    .as_ref()
                    .map(|internship| internship.title.as_str())
                    .unwrap_or("N/A");
                println!("{}  {} - {} <{}>", status_label(application.status), title, name, email);
                println!("    Skills: {skills}");
                println!(
                    "    {}",
                    application.cover_letter.as_deref().unwrap_or("Not provided")
                );
            }
            Ok(())
        }
    }
}

fn status_label(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Pending => "⏳ Pending",
        ApplicationStatus::Approved => "✅ Approved",
        ApplicationStatus::Rejected => "❌ Rejected",
    }
}
