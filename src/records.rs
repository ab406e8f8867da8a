//! Ownership-scoped writers and readers.
//!
//! Every write is the same two-step pipeline: resolve the caller's profile,
//! then insert one row referencing its id. Every scoped read resolves first
//! and filters on the resolved id, directly or through a joined table. Reads
//! have no side effects, writes persist exactly one row, and nothing here
//! retries or rolls anything back.

use serde::Serialize;
use tracing::debug;

use crate::auth::AuthClient;
use crate::error::Error;
use crate::models::{
    split_skills, ApplicationReview, ApplicationStatus, ApplicationWithInternship, Internship,
    NewInternship, NewProject,
};
use crate::profile::{resolve_startup, resolve_student};
use crate::session::Session;
use crate::store::StoreClient;

/// Column list for the student-side application list.
const MY_APPLICATIONS_COLUMNS: &str = "id,cover_letter,status,created_at,internships(title)";

/// Column list for the startup-side review list. The embed is declared inner
/// so the startup-id filter scopes the applications themselves, in one
/// filtered join rather than two sequential queries.
const RECEIVED_APPLICATIONS_COLUMNS: &str =
    "id,created_at,cover_letter,status,students:student_id(full_name,email,skills),internships!inner(title,startup_id)";

#[derive(Debug, Serialize)]
struct StudentRow<'a> {
    email: &'a str,
    full_name: &'a str,
    skills: Vec<String>,
}

#[derive(Debug, Serialize)]
struct StartupRow<'a> {
    email: &'a str,
    name: &'a str,
    cin: &'a str,
}

#[derive(Debug, Serialize)]
struct ProjectRow<'a> {
    user_id: i64,
    title: &'a str,
    description: &'a str,
    skills: &'a str,
}

#[derive(Debug, Serialize)]
struct InternshipRow<'a> {
    startup_id: i64,
    title: &'a str,
    description: &'a str,
    requirements: &'a str,
    stipend: f64,
}

#[derive(Debug, Serialize)]
struct ApplicationRow<'a> {
    internship_id: i64,
    student_id: i64,
    cover_letter: &'a str,
    status: ApplicationStatus,
}

/// Companion profile row created right after auth signup. Keyed by the same
/// email the account was registered with; the skills field is split into a
/// list the way the signup form always has.
pub async fn create_student_profile(
    store: &StoreClient,
    email: &str,
    full_name: &str,
    skills_text: &str,
) -> Result<(), Error> {
    store
        .insert_into("users")
        .row(&StudentRow {
            email,
            full_name,
            skills: split_skills(skills_text),
        })
        .await
}

/// Companion profile row for a startup account.
pub async fn create_startup_profile(
    store: &StoreClient,
    email: &str,
    name: &str,
    cin: &str,
) -> Result<(), Error> {
    store
        .insert_into("startups")
        .row(&StartupRow { email, name, cin })
        .await
}

/// Posts a project owned by the calling student.
pub async fn post_project(
    auth: &AuthClient,
    store: &StoreClient,
    session: &Session,
    project: &NewProject,
) -> Result<(), Error> {
    let student = resolve_student(auth, store, session).await?;
    debug!(student_id = student.id, "posting project");
    store
        .insert_into("projects")
        .with_session(session)
        .row(&ProjectRow {
            user_id: student.id,
            title: &project.title,
            description: &project.description,
            skills: &project.skills,
        })
        .await
}

/// Posts an internship owned by the calling startup.
pub async fn post_internship(
    auth: &AuthClient,
    store: &StoreClient,
    session: &Session,
    internship: &NewInternship,
) -> Result<(), Error> {
    let startup = resolve_startup(auth, store, session).await?;
    debug!(startup_id = startup.id, "posting internship");
    store
        .insert_into("internships")
        .with_session(session)
        .row(&InternshipRow {
            startup_id: startup.id,
            title: &internship.title,
            description: &internship.description,
            requirements: &internship.requirements,
            stipend: internship.stipend,
        })
        .await
}

/// Submits an application as the calling student. The status is written once
/// as `Pending`; this client never changes it afterwards.
pub async fn submit_application(
    auth: &AuthClient,
    store: &StoreClient,
    session: &Session,
    internship_id: i64,
    cover_letter: &str,
) -> Result<(), Error> {
    if cover_letter.trim().is_empty() {
        return Err(Error::Validation("Please add a cover letter.".to_string()));
    }
    let student = resolve_student(auth, store, session).await?;
    debug!(student_id = student.id, internship_id, "submitting application");
    store
        .insert_into("applications")
        .with_session(session)
        .row(&ApplicationRow {
            internship_id,
            student_id: student.id,
            cover_letter,
            status: ApplicationStatus::Pending,
        })
        .await
}

/// Every open internship. Browsing is not ownership-scoped.
pub async fn list_internships(store: &StoreClient) -> Result<Vec<Internship>, Error> {
    store.from("internships").fetch_all().await
}

/// The calling student's applications, joined with the internship titles they
/// target, most recent first.
pub async fn my_applications(
    auth: &AuthClient,
    store: &StoreClient,
    session: &Session,
) -> Result<Vec<ApplicationWithInternship>, Error> {
    let student = resolve_student(auth, store, session).await?;
    store
        .from("applications")
        .with_session(session)
        .columns(MY_APPLICATIONS_COLUMNS)
        .eq("student_id", student.id)
        .order_desc("created_at")
        .fetch_all()
        .await
}

/// Applications to any of the calling startup's internships, joined with the
/// applicant and the targeted internship. The scope filter lives on the
/// joined internship's owner column.
pub async fn received_applications(
    auth: &AuthClient,
    store: &StoreClient,
    session: &Session,
) -> Result<Vec<ApplicationReview>, Error> {
    let startup = resolve_startup(auth, store, session).await?;
    store
        .from("applications")
        .with_session(session)
        .columns(RECEIVED_APPLICATIONS_COLUMNS)
        .eq("internships.startup_id", startup.id)
        .fetch_all()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::config::Config;
    use crate::models::Role;
    use crate::session::AuthUser;

    const STUDENT_EMAIL: &str = "dana@students.test";
    const STARTUP_EMAIL: &str = "founders@nimbuslabs.test";

    /// In-process stand-in for the hosted backend: one auth user, one student
    /// row, one startup row, canned application lists, and capture of every
    /// select/insert for assertions.
    #[derive(Clone)]
    struct TestBackend {
        email: &'static str,
        inserted: Arc<Mutex<Vec<(String, Value)>>>,
        selects: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
    }

    impl TestBackend {
        fn new(email: &'static str) -> Self {
            Self {
                email,
                inserted: Arc::new(Mutex::new(Vec::new())),
                selects: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    async fn spawn_backend(backend: TestBackend) -> String {
        let app = Router::new()
            .route("/auth/v1/user", get(user_handler))
            .route(
                "/rest/v1/:table",
                get(select_handler).post(insert_handler),
            )
            .with_state(backend);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind backend stub");
        let addr = listener.local_addr().expect("backend stub addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve backend stub");
        });
        format!("http://{addr}")
    }

    async fn user_handler(State(backend): State<TestBackend>) -> Json<Value> {
        Json(json!({
            "id": "4f1c18a2-5e3a-4a1d-9d3b-2f6f0c9a7e51",
            "email": backend.email
        }))
    }

    fn no_rows() -> axum::response::Response {
        (
            StatusCode::NOT_ACCEPTABLE,
            Json(json!({
                "code": "PGRST116",
                "message": "JSON object requested, multiple (or no) rows returned"
            })),
        )
            .into_response()
    }

    async fn select_handler(
        State(backend): State<TestBackend>,
        Path(table): Path<String>,
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> axum::response::Response {
        backend
            .selects
            .lock()
            .expect("selects lock")
            .push((table.clone(), params.clone()));
        let single = headers
            .get("accept")
            .and_then(|value| value.to_str().ok())
            == Some("application/vnd.pgrst.object+json");
        let email_filter = params.get("email").cloned();

        match table.as_str() {
            "users" => {
                if single && email_filter == Some(format!("eq.{STUDENT_EMAIL}")) {
                    Json(json!({
                        "id": 7,
                        "email": STUDENT_EMAIL,
                        "full_name": "Dana Waters",
                        "skills": ["React", "Node"]
                    }))
                    .into_response()
                } else {
                    no_rows()
                }
            }
            "startups" => {
                if single && email_filter == Some(format!("eq.{STARTUP_EMAIL}")) {
                    Json(json!({
                        "id": 3,
                        "email": STARTUP_EMAIL,
                        "name": "Nimbus Labs",
                        "cin": "C-204411"
                    }))
                    .into_response()
                } else {
                    no_rows()
                }
            }
            "applications" => Json(json!([
                {
                    "id": 21,
                    "created_at": "2026-08-02T09:30:00+00:00",
                    "cover_letter": "I am excited...",
                    "status": "Pending",
                    "students": {
                        "full_name": "Dana Waters",
                        "email": STUDENT_EMAIL,
                        "skills": ["React", "Node"]
                    },
                    "internships": { "title": "React Native Developer Intern", "startup_id": 3 }
                },
                {
                    "id": 20,
                    "created_at": "2026-08-01T10:00:00+00:00",
                    "cover_letter": null,
                    "status": "Approved",
                    "students": null,
                    "internships": null
                }
            ]))
            .into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn insert_handler(
        State(backend): State<TestBackend>,
        Path(table): Path<String>,
        Json(rows): Json<Value>,
    ) -> StatusCode {
        backend
            .inserted
            .lock()
            .expect("inserted lock")
            .push((table, rows));
        StatusCode::CREATED
    }

    fn clients(base_url: String) -> (AuthClient, StoreClient) {
        let config = Config {
            base_url,
            anon_key: "anon-key".to_string(),
        };
        (AuthClient::new(&config), StoreClient::new(&config))
    }

    fn session_for(email: &str) -> Session {
        Session {
            access_token: "test-token".to_string(),
            refresh_token: None,
            user: AuthUser {
                id: Uuid::parse_str("4f1c18a2-5e3a-4a1d-9d3b-2f6f0c9a7e51").expect("uuid"),
                email: Some(email.to_string()),
            },
        }
    }

    #[tokio::test]
    async fn submit_application_writes_exactly_one_pending_row() {
        let backend = TestBackend::new(STUDENT_EMAIL);
        let (auth, store) = clients(spawn_backend(backend.clone()).await);
        let session = session_for(STUDENT_EMAIL);

        submit_application(&auth, &store, &session, 42, "I am excited...")
            .await
            .expect("submit");

        let inserted = backend.inserted.lock().expect("inserted lock");
        assert_eq!(inserted.len(), 1);
        let (table, rows) = &inserted[0];
        assert_eq!(table, "applications");
        assert_eq!(
            *rows,
            json!([{
                "internship_id": 42,
                "student_id": 7,
                "cover_letter": "I am excited...",
                "status": "Pending"
            }])
        );
    }

    #[tokio::test]
    async fn blank_cover_letter_never_reaches_the_network() {
        let backend = TestBackend::new(STUDENT_EMAIL);
        let (auth, store) = clients(spawn_backend(backend.clone()).await);
        let session = session_for(STUDENT_EMAIL);

        let err = submit_application(&auth, &store, &session, 42, "   ")
            .await
            .expect_err("blank cover letter should be rejected");
        assert!(matches!(err, Error::Validation(_)));
        assert!(backend.inserted.lock().expect("lock").is_empty());
        assert!(backend.selects.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn post_internship_stores_a_numeric_stipend() {
        let backend = TestBackend::new(STARTUP_EMAIL);
        let (auth, store) = clients(spawn_backend(backend.clone()).await);
        let session = session_for(STARTUP_EMAIL);

        let input = NewInternship::new(
            "React Native Developer Intern",
            "Build the mobile client",
            "React, TypeScript",
            "5000",
        )
        .expect("valid input");
        post_internship(&auth, &store, &session, &input)
            .await
            .expect("post internship");

        let inserted = backend.inserted.lock().expect("inserted lock");
        let (table, rows) = &inserted[0];
        assert_eq!(table, "internships");
        let stipend = &rows[0]["stipend"];
        assert!(stipend.is_number(), "stipend must not be a string: {stipend:?}");
        assert_eq!(*stipend, json!(5000.0));
        assert_eq!(rows[0]["startup_id"], json!(3));
    }

    #[tokio::test]
    async fn post_project_references_the_resolved_student() {
        let backend = TestBackend::new(STUDENT_EMAIL);
        let (auth, store) = clients(spawn_backend(backend.clone()).await);
        let session = session_for(STUDENT_EMAIL);

        let project = NewProject::new(
            "Campus Marketplace",
            "Peer-to-peer marketplace for students",
            "React, Supabase",
        )
        .expect("valid input");
        post_project(&auth, &store, &session, &project)
            .await
            .expect("post project");

        let inserted = backend.inserted.lock().expect("inserted lock");
        let (table, rows) = &inserted[0];
        assert_eq!(table, "projects");
        assert_eq!(rows[0]["user_id"], json!(7));
        // Project skills stay as the raw text the poster typed.
        assert_eq!(rows[0]["skills"], json!("React, Supabase"));
    }

    #[tokio::test]
    async fn resolver_reports_a_missing_profile_distinctly() {
        // The auth user is a startup account, so the student table has no row.
        let backend = TestBackend::new(STARTUP_EMAIL);
        let (auth, store) = clients(spawn_backend(backend).await);
        let session = session_for(STARTUP_EMAIL);

        let err = crate::profile::resolve_student(&auth, &store, &session)
            .await
            .expect_err("no student row for a startup email");
        match err {
            Error::ProfileNotFound { role, email } => {
                assert_eq!(role, Role::Student);
                assert_eq!(email, STARTUP_EMAIL);
            }
            other => panic!("expected ProfileNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn my_applications_scopes_by_student_and_orders_descending() {
        let backend = TestBackend::new(STUDENT_EMAIL);
        let (auth, store) = clients(spawn_backend(backend.clone()).await);
        let session = session_for(STUDENT_EMAIL);

        let mine = my_applications(&auth, &store, &session)
            .await
            .expect("list my applications");
        assert_eq!(mine.len(), 2);
        // The second canned row has its internship join missing.
        assert!(mine[1].internship.is_none());

        let selects = backend.selects.lock().expect("selects lock");
        let (table, params) = selects.last().expect("application select recorded");
        assert_eq!(table, "applications");
        assert_eq!(
            params.get("select").map(String::as_str),
            Some(MY_APPLICATIONS_COLUMNS)
        );
        assert_eq!(params.get("student_id").map(String::as_str), Some("eq.7"));
        assert_eq!(
            params.get("order").map(String::as_str),
            Some("created_at.desc")
        );
    }

    #[tokio::test]
    async fn received_applications_filter_through_the_joined_internship() {
        let backend = TestBackend::new(STARTUP_EMAIL);
        let (auth, store) = clients(spawn_backend(backend.clone()).await);
        let session = session_for(STARTUP_EMAIL);

        let received = received_applications(&auth, &store, &session)
            .await
            .expect("list received applications");
        assert_eq!(received.len(), 2);
        assert!(received[1].student.is_none());

        let selects = backend.selects.lock().expect("selects lock");
        let (table, params) = selects.last().expect("application select recorded");
        assert_eq!(table, "applications");
        let columns = params.get("select").expect("select param");
        assert!(columns.contains("internships!inner"));
        assert_eq!(
            params.get("internships.startup_id").map(String::as_str),
            Some("eq.3")
        );
    }
}
