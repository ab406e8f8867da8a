//! Seed script for a running SkillSpot backend.
//!
//! Populates demo data through the public SDK only:
//! - a startup account, its profile, and two internships
//! - a student account, its profile, a project, and one application
//! Run: cargo run --bin seed_demo

use skillspot::auth::AuthClient;
use skillspot::config::Config;
use skillspot::error::Error;
use skillspot::models::{NewInternship, NewProject};
use skillspot::records;
use skillspot::store::StoreClient;

const STARTUP_EMAIL: &str = "founders@nimbuslabs.test";
const STUDENT_EMAIL: &str = "dana@students.test";
const DEMO_PASSWORD: &str = "demo-password";

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let config = Config::load()?;
    let auth = AuthClient::new(&config);
    let store = StoreClient::new(&config);

    // Demo startup: account, profile row, two internships.
    let _ = auth.sign_up(STARTUP_EMAIL, DEMO_PASSWORD).await; // Ignore if it exists
    let _ = records::create_startup_profile(&store, STARTUP_EMAIL, "Nimbus Labs", "C-204411").await;
    let startup_session = auth
        .sign_in_with_password(STARTUP_EMAIL, DEMO_PASSWORD)
        .await?;

    let postings = [
        (
            "React Native Developer Intern",
            "Build and polish the mobile client.",
            "React, TypeScript",
            "5000",
        ),
        (
            "Backend Intern",
            "Own the data-store integration and keep the queries honest.",
            "Rust, SQL",
            "8000",
        ),
    ];
    for (title, description, requirements, stipend) in postings {
        let internship = NewInternship::new(title, description, requirements, stipend)?;
        records::post_internship(&auth, &store, &startup_session, &internship).await?;
    }
    println!("Seeded startup profile and {} internships", postings.len());

    // Demo student: account, profile row, a project, one application.
    let _ = auth.sign_up(STUDENT_EMAIL, DEMO_PASSWORD).await;
    let _ =
        records::create_student_profile(&store, STUDENT_EMAIL, "Dana Waters", "React, Node, ML")
            .await;
    let student_session = auth
        .sign_in_with_password(STUDENT_EMAIL, DEMO_PASSWORD)
        .await?;

    let project = NewProject::new(
        "Campus Marketplace",
        "Peer-to-peer marketplace for students.",
        "React, Supabase",
    )?;
    records::post_project(&auth, &store, &student_session, &project).await?;

    let open = records::list_internships(&store).await?;
    if let Some(first) = open.first() {
        records::submit_application(
            &auth,
            &store,
            &student_session,
            first.id,
            "I am excited to apply - the stack matches my recent projects.",
        )
        .await?;
        println!("Applied to `{}` as the demo student", first.title);
    }

    let mine = records::my_applications(&auth, &store, &student_session).await?;
    println!("Demo student now has {} application(s)", mine.len());

    Ok(())
}
