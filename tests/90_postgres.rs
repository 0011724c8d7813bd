//! Runs against a real database only when `TEST_DATABASE_URL` is set.

mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use futures::future::join_all;
use serde_json::json;

use common::{ids, unique_owner, TestApp};

#[tokio::test]
async fn folder_tree_rules_hold_in_postgres() -> Result<()> {
    let Some(app) = TestApp::postgres().await? else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return Ok(());
    };
    let u1 = app.token(&unique_owner("tree-a"));
    let u2 = app.token(&unique_owner("tree-b"));

    let (status, work) = app.post("/folders", &u1, json!({"name": "Work"})).await?;
    assert_eq!(status, StatusCode::CREATED, "{work}");
    let work = work["data"]["id"].as_i64().unwrap();
    let (_, sub) = app.post("/folders", &u1, json!({"name": "Sub", "parent_id": work})).await?;
    let sub = sub["data"]["id"].as_i64().unwrap();

    let (status, body) = app.post("/folders", &u2, json!({"name": "Bad", "parent_id": work})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "parent folder not found");

    let (status, body) = app.put(&format!("/folders/{work}"), &u1, json!({"name": "Work", "parent_id": sub})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "would create a cycle");

    let (_, roots) = app.get("/folders/by-parent", &u1).await?;
    assert_eq!(ids(&roots["data"]), vec![work]);

    app.post("/notes", &u1, json!({"title": "Inside", "folder_id": sub})).await?;
    let (status, _) = app.delete(&format!("/folders/{work}"), &u1).await?;
    assert_eq!(status, StatusCode::OK);

    let (_, folders) = app.get("/folders", &u1).await?;
    assert_eq!(folders["data"], json!([]));
    let (_, notes) = app.get("/notes", &u1).await?;
    assert_eq!(notes["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn concurrent_first_logins_create_once() -> Result<()> {
    let Some(app) = TestApp::postgres().await? else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return Ok(());
    };
    let token = app.token(&unique_owner("race"));

    let attempts = (0..8).map(|_| app.send(Method::POST, "/auth/login", Some(&token), None));
    let statuses: Vec<StatusCode> = join_all(attempts)
        .await
        .into_iter()
        .map(|result| result.map(|(status, _)| status))
        .collect::<Result<_>>()?;

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 7);
    Ok(())
}

#[tokio::test]
async fn project_delete_clears_time_records() -> Result<()> {
    let Some(app) = TestApp::postgres().await? else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return Ok(());
    };
    let token = app.token(&unique_owner("projects"));

    let (_, body) = app.post("/projects", &token, json!({"name": "Temp"})).await?;
    let project = body["data"][0]["id"].as_i64().unwrap();
    let entry = json!({
        "project_id": project,
        "start_date": "2024-05-01T09:00:00Z",
        "end_date": "2024-05-01T10:00:00Z"
    });
    for path in ["/time-entries", "/time-box-entries"] {
        let (status, body) = app.post(path, &token, entry.clone()).await?;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    app.delete(&format!("/projects/{project}"), &token).await?;

    for path in ["/time-entries", "/time-box-entries"] {
        let (_, body) = app.get(path, &token).await?;
        assert!(body["data"][0]["project_id"].is_null(), "{path}: {body}");
    }
    Ok(())
}
