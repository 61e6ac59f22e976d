use codebites_client::{
    api::{ApiError, HttpUsersApi, UsersApi},
    form::{FieldValues, FormKind, FormSession, FormState},
    notify::{Notifier, Severity, TokioScheduler},
    App, WELCOME_MESSAGE,
};
use codebites_core::{init_tracing, MemoryTokenStore, TokenStore};
use serde_json::{json, Value};
use std::{net::TcpListener, sync::Arc};
use warp::{http::StatusCode, reply::Response, Filter, Reply};

const TOKEN: &str = "T1";

struct TestApp {
    address: String,
}

fn reply(body: Value, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

fn authorized(header: Option<String>) -> bool {
    header.map_or(false, |h| h == format!("Bearer {}", TOKEN))
}

fn unauthorized() -> Response {
    reply(
        json!({"status": "fail", "message": "Unauthorized"}),
        StatusCode::UNAUTHORIZED,
    )
}

fn user() -> Value {
    json!({"id": 1, "username": "abcdef", "email": "a@b.com", "active": true, "admin": false})
}

/// A stand-in for the users service, answering the way the real one does.
fn spawn_app() -> TestApp {
    let register = warp::path!("login" / "register")
        .and(warp::post())
        .and(warp::body::json())
        .map(|body: Value| {
            if body["username"] == "takenuser" {
                reply(
                    json!({"status": "fail", "message": "User already exists"}),
                    StatusCode::BAD_REQUEST,
                )
            } else {
                reply(
                    json!({"status": "success", "message": "Registered", "token": TOKEN}),
                    StatusCode::CREATED,
                )
            }
        });

    let login = warp::path!("login" / "login")
        .and(warp::post())
        .and(warp::body::json())
        .map(|body: Value| {
            if body.get("username").is_some() {
                reply(json!({"status": "fail"}), StatusCode::BAD_REQUEST)
            } else if body["email"] == "garbage@b.com" {
                "this is not json".into_response()
            } else if body["email"] == "a@b.com" && body["password"] == "longenoughpassword" {
                reply(
                    json!({"status": "success", "message": "Logged In", "token": TOKEN}),
                    StatusCode::OK,
                )
            } else {
                reply(
                    json!({"status": "fail", "message": "Username or password incorrect"}),
                    StatusCode::NOT_FOUND,
                )
            }
        });

    let users = warp::path!("users")
        .and(warp::get())
        .map(|| reply(json!({"status": "success", "data": {"users": [user()]}}), StatusCode::OK));

    let me = warp::path!("login" / "me")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .map(|auth: Option<String>| {
            if authorized(auth) {
                reply(json!({"status": "success", "data": user()}), StatusCode::OK)
            } else {
                unauthorized()
            }
        });

    let questions = warp::path!("questions")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .map(|auth: Option<String>| {
            if authorized(auth) {
                reply(
                    json!({"status": "success", "data": {"num_question": 1, "questions": [{
                        "id": 1,
                        "author_id": 1,
                        "body": "Add two numbers.",
                        "test_code": "assert add(1, 2) == 3",
                        "test_solution": "def add(a, b): return a + b",
                        "difficulty": "easy"
                    }]}}),
                    StatusCode::OK,
                )
            } else {
                unauthorized()
            }
        });

    let signout = warp::path!("login" / "signout")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .map(|auth: Option<String>| {
            if authorized(auth) {
                reply(json!({"status": "success", "message": "Logged Out"}), StatusCode::OK)
            } else {
                unauthorized()
            }
        });

    let routes = register
        .or(login)
        .or(users)
        .or(me)
        .or(questions)
        .or(signout);
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    TestApp {
        address: format!("http://{}", addr),
    }
}

fn client(address: &str) -> App<HttpUsersApi, MemoryTokenStore> {
    init_tracing("users_service");
    let api = HttpUsersApi::new(address).expect("failed to build client");
    App::new(
        api,
        MemoryTokenStore::new(),
        Notifier::new(Arc::new(TokioScheduler)),
    )
}

fn fill(form: FormSession, fields: &[(&str, &str)]) -> FormSession {
    fields.iter().fold(form, |form, (name, value)| {
        form.on_field_change(name, value).expect("field change rejected")
    })
}

#[tokio::test]
async fn register_signs_the_user_in() {
    let server = spawn_app();
    let mut app = client(&server.address);

    let form = fill(
        FormSession::new(FormKind::Register),
        &[("username", "ab"), ("email", "a@b.com"), ("password", "shortpw")],
    );
    assert!(!form.can_submit());

    let form = fill(form, &[("username", "abcdef"), ("password", "longenoughpassword")]);
    assert!(form.can_submit());

    let form = app.submit(&form).await.expect("submit rejected");
    assert_eq!(form.state(), FormState::Authenticated);
    assert_eq!(form.values(), &FieldValues::new("", "", ""));
    assert!(app.is_authenticated());

    let message = app.message().expect("no notification");
    assert_eq!(message.text(), WELCOME_MESSAGE);
    assert_eq!(message.severity(), Severity::Success);

    // signing in kicked off a user list refresh
    app.users_refreshed().await;
    assert_eq!(app.users().len(), 1);
    assert_eq!(app.users()[0].username, "abcdef");

    let me = app.current_user().await.unwrap().expect("not signed in");
    assert_eq!(me.email, "a@b.com");
    let questions = app.questions().await.unwrap().expect("not signed in");
    assert_eq!(questions[0].difficulty, "easy");
}

#[tokio::test]
async fn duplicate_register_is_reported() {
    let server = spawn_app();
    let mut app = client(&server.address);

    let form = fill(
        FormSession::new(FormKind::Register),
        &[
            ("username", "takenuser"),
            ("email", "taken@b.com"),
            ("password", "longenoughpassword"),
        ],
    );
    let after = app.submit(&form).await.expect("submit rejected");

    assert_eq!(after.state(), FormState::Editing);
    assert_eq!(after.values(), form.values());
    assert!(!app.is_authenticated());

    let message = app.message().expect("no notification");
    assert_eq!(message.text(), "User already exists.");
    assert_eq!(message.severity(), Severity::Danger);

    let api = HttpUsersApi::new(&server.address).unwrap();
    match api.exchange(FormKind::Register, &form.payload()).await {
        Err(ApiError::Rejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "User already exists");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn bad_login_keeps_the_form() {
    let server = spawn_app();
    let mut app = client(&server.address);

    let form = fill(
        FormSession::new(FormKind::Login),
        &[("email", "a@b.com"), ("password", "wrong")],
    );
    let after = app.submit(&form).await.expect("submit rejected");

    assert_eq!(after.state(), FormState::Editing);
    assert_eq!(after.values(), form.values());
    assert!(!app.is_authenticated());

    let message = app.message().expect("no notification");
    assert_eq!(message.text(), "Login failed.");
    assert_eq!(message.severity(), Severity::Danger);

    // the user can correct the password and try again
    let form = after.on_field_change("password", "longenoughpassword").unwrap();
    let form = app.submit(&form).await.unwrap();
    assert!(form.is_authenticated());
    assert_eq!(app.message().unwrap().text(), WELCOME_MESSAGE);
}

#[tokio::test]
async fn signout_forgets_the_token() {
    let server = spawn_app();
    let mut app = client(&server.address);
    app.login_user(TOKEN);
    assert!(app.is_authenticated());

    app.signout_user().await;
    assert!(!app.is_authenticated());
    assert!(app.current_user().await.unwrap().is_none());
}

#[tokio::test]
async fn unreachable_service_is_not_fatal() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind to random port");
        listener.local_addr().unwrap().port()
    };
    let address = format!("http://127.0.0.1:{}", port);
    let mut app = client(&address);

    let form = fill(
        FormSession::new(FormKind::Login),
        &[("email", "a@b.com"), ("password", "longenoughpassword")],
    );
    let after = app.submit(&form).await.expect("submit rejected");
    assert_eq!(after.state(), FormState::Editing);
    assert_eq!(app.message().unwrap().text(), "Login failed.");

    let api = HttpUsersApi::new(&address).unwrap();
    assert!(matches!(
        api.exchange(FormKind::Login, &form.payload()).await,
        Err(ApiError::Transport(_))
    ));
}

#[tokio::test]
async fn malformed_response_is_a_decode_error() {
    let server = spawn_app();
    let api = HttpUsersApi::new(&server.address).unwrap();
    let form = fill(
        FormSession::new(FormKind::Login),
        &[("email", "garbage@b.com"), ("password", "pw")],
    );

    assert!(matches!(
        api.exchange(FormKind::Login, &form.payload()).await,
        Err(ApiError::Decode(_))
    ));
}

#[tokio::test]
async fn stored_token_survives_into_a_new_client() {
    let server = spawn_app();
    let store = MemoryTokenStore::with_token(TOKEN);
    assert_eq!(store.get().unwrap().as_deref(), Some(TOKEN));

    let app = App::new(
        HttpUsersApi::new(&server.address).unwrap(),
        store,
        Notifier::new(Arc::new(TokioScheduler)),
    );
    assert!(app.is_authenticated());
    assert_eq!(app.current_user().await.unwrap().unwrap().username, "abcdef");
}
