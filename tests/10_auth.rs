mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};

use common::{TestApp, SECRET};
use timetracker_api::auth::{issue_token, Claims};

#[tokio::test]
async fn first_login_creates_then_reports_existing() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_with_email("uid-login", Some("login@example.com"));

    let (status, body) = app.send(Method::POST, "/auth/login", Some(&token), None).await?;
    assert_eq!(status, StatusCode::CREATED, "first login should create: {body}");
    assert_eq!(body["data"]["id"], "uid-login");
    assert_eq!(body["data"]["email"], "login@example.com");
    assert_eq!(body["message"], "user created");

    let (status, body) = app.send(Method::POST, "/auth/login", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK, "second login should find the user: {body}");
    assert_eq!(body["message"], "user exists");
    Ok(())
}

#[tokio::test]
async fn me_reports_identity_and_registration() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_with_email("uid-me", Some("me@example.com"));

    let (status, body) = app.get("/auth/me", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["subject_id"], "uid-me");
    assert!(body["data"]["user"].is_null(), "not registered yet: {body}");

    app.send(Method::POST, "/auth/login", Some(&token), None).await?;
    let (_, body) = app.get("/auth/me", &token).await?;
    assert_eq!(body["data"]["user"]["id"], "uid-me");
    Ok(())
}

#[tokio::test]
async fn rejects_missing_malformed_and_forged_credentials() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/folders", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.get("/folders", "not-a-jwt").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = issue_token("someone-elses-secret", &Claims::new("uid", None, 1))?;
    let (status, _) = app.get("/folders", &forged).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut expired = Claims::new("uid", None, 1);
    expired.exp = expired.iat - 7200;
    let (status, _) = app.get("/folders", &issue_token(SECRET, &expired)?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
