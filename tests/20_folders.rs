mod common;

use anyhow::Result;
use common::{id_of, TestApp};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn folder_crud() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.signup("alice").await?;

    let res = app.post("/folders", &token, json!({ "name": "Work" })).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let folder: Value = res.json().await?;
    let id = id_of(&folder);
    assert_eq!(folder["name"], "Work");
    assert!(folder["userId"].is_string());

    app.create("/folders", &token, json!({ "name": "Archive" })).await?;

    let list: Vec<Value> = app.get("/folders", &token).send().await?.json().await?;
    let names: Vec<&str> = list.iter().filter_map(|f| f["name"].as_str()).collect();
    assert_eq!(names, vec!["Archive", "Work"]);

    let res = app.put(&format!("/folders/{}", id), &token, json!({ "name": "Office" })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["name"], "Office");
    assert_eq!(id_of(&updated), id);

    let res = app.delete(&format!("/folders/{}", id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.text().await?.is_empty());

    let res = app.get(&format!("/folders/{}", id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn names_are_unique_per_owner() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.signup("alice").await?;
    let bob = app.signup("bob").await?;

    app.create("/folders", &alice, json!({ "name": "Work" })).await?;

    let res = app.post("/folders", &alice, json!({ "name": "Work" })).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "DUPLICATE_NAME");

    let res = app.post("/folders", &bob, json!({ "name": "Work" })).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let other = app.create("/folders", &alice, json!({ "name": "Home" })).await?;
    let res = app
        .put(&format!("/folders/{}", id_of(&other)), &alice, json!({ "name": "Work" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn folders_of_other_users_are_invisible() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.signup("alice").await?;
    let bob = app.signup("bob").await?;

    let folder = app.create("/folders", &alice, json!({ "name": "Private" })).await?;
    let path = format!("/folders/{}", id_of(&folder));

    assert_eq!(app.get(&path, &bob).send().await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        app.put(&path, &bob, json!({ "name": "Mine" })).send().await?.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.delete(&path, &bob).send().await?.status(), StatusCode::NOT_FOUND);

    let list: Vec<Value> = app.get("/folders", &bob).send().await?.json().await?;
    assert!(list.is_empty());

    assert_eq!(app.get(&path, &alice).send().await?.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn malformed_ids_and_missing_names() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.signup("alice").await?;

    let res = app.get("/folders/not-an-id", &token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "MALFORMED_ID");

    let res = app.post("/folders", &token, json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let res = app.post("/folders", &token, json!({ "name": "   " })).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
