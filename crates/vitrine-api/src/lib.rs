//! JSON REST API for Vitrine.
//!
//! Exposes an axum [`Router`] backed by a [`ContentManager`] over any
//! [`vitrine_core::store::SectionStore`]. Authentication is the caller's
//! responsibility: the identity layer in front of this router is expected to
//! put the authenticated id in the `x-caller-id` header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", vitrine_api::api_router(manager.clone()))
//! ```

pub mod caller;
pub mod error;
pub mod etag;
pub mod history;
pub mod sections;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use vitrine_core::{manager::ContentManager, store::SectionStore};

pub use caller::{CALLER_HEADER, Caller};
pub use error::ApiError;

/// Build a fully-materialised API router for `manager`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(manager: Arc<ContentManager<S>>) -> Router<()>
where
  S: SectionStore + 'static,
{
  Router::new()
    // Sections
    .route("/sections", get(sections::list::<S>))
    .route(
      "/sections/{type}",
      get(sections::get_one::<S>)
        .put(sections::update::<S>)
        .patch(sections::publish::<S>)
        .delete(sections::delete::<S>),
    )
    .route("/sections/{type}/published", get(sections::published::<S>))
    .route("/sections/{type}/default", get(sections::default_content))
    .route("/sections/{type}/lock", post(sections::lock::<S>))
    .route("/sections/{type}/unlock", post(sections::unlock::<S>))
    // History
    .route("/history/{section_id}", get(history::list::<S>))
    .route("/history/{section_id}/revert", post(history::revert::<S>))
    .with_state(manager)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use vitrine_core::manager::ManagerConfig;
  use vitrine_store_sqlite::SqliteStore;

  use super::*;

  async fn make_router() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(ContentManager::new(store, ManagerConfig::default())))
  }

  async fn send(
    router:  &Router,
    method:  &str,
    uri:     &str,
    caller:  Option<&str>,
    body:    Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
      builder = builder.header(CALLER_HEADER, caller);
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn hero(headline: &str) -> Value {
    json!({ "content": { "headline": headline, "subheadline": "Sub" } })
  }

  // ── Sections ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_unwritten_section_returns_defaults() {
    let router = make_router().await;
    let resp = send(&router, "GET", "/sections/hero", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["sectionType"], "hero");
    assert_eq!(body["section"], Value::Null);
    assert_eq!(body["canEdit"], true);
    assert_eq!(body["content"]["ctaButton"]["href"], "/contact");
  }

  #[tokio::test]
  async fn unknown_section_type_is_404() {
    let router = make_router().await;
    let resp = send(&router, "GET", "/sections/sidebar", None, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(json_body(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn underscore_alias_is_accepted() {
    let router = make_router().await;
    let resp = send(&router, "GET", "/sections/marquee_clients/default", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["speedSeconds"], 30);
  }

  #[tokio::test]
  async fn writes_require_a_caller() {
    let router = make_router().await;
    let resp = send(&router, "PUT", "/sections/hero", None, Some(hero("Hi"))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn put_saves_draft_and_applies_defaults() {
    let router = make_router().await;
    let resp = send(&router, "PUT", "/sections/hero", Some("alice"), Some(hero("Hi"))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["status"], "draft");
    assert_eq!(body["content"]["headline"], "Hi");
    assert_eq!(body["content"]["ctaButton"], json!({
      "text": "Get Started",
      "href": "/contact",
      "isExternal": false,
    }));
  }

  #[tokio::test]
  async fn invalid_content_is_422_with_field_paths() {
    let router = make_router().await;
    let resp = send(
      &router,
      "PUT",
      "/sections/hero",
      Some("alice"),
      Some(json!({ "content": { "headline": "Hi", "subheadline": "Sub", "ctaButton": { "href": "" } } })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(resp).await;
    let paths: Vec<_> = body["fields"]
      .as_array()
      .unwrap()
      .iter()
      .map(|f| f["path"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(paths, vec!["ctaButton.href"]);
  }

  #[tokio::test]
  async fn list_filters_by_status() {
    let router = make_router().await;
    send(&router, "PUT", "/sections/hero", Some("a"), Some(hero("Hi"))).await;
    send(
      &router,
      "PUT",
      "/sections/about",
      Some("a"),
      Some(json!({ "content": { "title": "About", "description": "Us" } })),
    )
    .await;
    send(&router, "PATCH", "/sections/about", Some("a"), Some(json!({ "status": "published" }))).await;

    let all = json_body(send(&router, "GET", "/sections", None, None).await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let published =
      json_body(send(&router, "GET", "/sections?status=published", None, None).await).await;
    let published = published.as_array().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0]["sectionType"], "about");
  }

  #[tokio::test]
  async fn patch_only_accepts_published() {
    let router = make_router().await;
    send(&router, "PUT", "/sections/hero", Some("a"), Some(hero("Hi"))).await;
    let resp = send(&router, "PATCH", "/sections/hero", Some("a"), Some(json!({ "status": "draft" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn publish_unsaved_section_is_404() {
    let router = make_router().await;
    let resp = send(&router, "PATCH", "/sections/cta", Some("a"), Some(json!({ "status": "published" }))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_returns_204_then_404() {
    let router = make_router().await;
    send(&router, "PUT", "/sections/hero", Some("a"), Some(hero("Hi"))).await;

    let resp = send(&router, "DELETE", "/sections/hero", Some("a"), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&router, "DELETE", "/sections/hero", Some("a"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Published ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn published_read_supports_conditional_get() {
    let router = make_router().await;
    send(&router, "PUT", "/sections/hero", Some("a"), Some(hero("Live"))).await;
    send(&router, "PATCH", "/sections/hero", Some("a"), Some(json!({ "status": "published" }))).await;

    let resp = send(&router, "GET", "/sections/hero/published", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let etag = resp.headers()[header::ETAG].to_str().unwrap().to_owned();
    let body = json_body(resp).await;
    assert_eq!(body["content"]["headline"], "Live");
    assert_eq!(body["version"], 1);
    assert_eq!(body["isDefault"], false);

    let req = Request::builder()
      .uri("/sections/hero/published")
      .header(header::IF_NONE_MATCH, &etag)
      .body(Body::empty())
      .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
  }

  #[tokio::test]
  async fn published_read_of_unpublished_section_is_default() {
    let router = make_router().await;
    send(&router, "PUT", "/sections/hero", Some("a"), Some(hero("Draft"))).await;

    let resp = send(&router, "GET", "/sections/hero/published", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["isDefault"], true);
    assert_ne!(body["content"]["headline"], "Draft");
  }

  // ── Locks ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn lock_conflict_reports_holder() {
    let router = make_router().await;
    let resp = send(&router, "POST", "/sections/hero/lock", Some("userA"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["lockedBy"], "userA");

    let resp = send(
      &router,
      "POST",
      "/sections/hero/lock",
      Some("userB"),
      Some(json!({ "durationMinutes": 5 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = json_body(resp).await;
    assert_eq!(body["lockedBy"], "userA");
    assert!(body["lockedUntil"].is_string());

    let resp = send(&router, "PUT", "/sections/hero", Some("userB"), Some(hero("B"))).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let view = json_body(send(&router, "GET", "/sections/hero", Some("userB"), None).await).await;
    assert_eq!(view["canEdit"], false);
    assert_eq!(view["lock"]["lockedBy"], "userA");
  }

  #[tokio::test]
  async fn unlock_is_204_for_holder_and_non_holder() {
    let router = make_router().await;
    send(&router, "POST", "/sections/hero/lock", Some("userA"), None).await;

    let resp = send(&router, "POST", "/sections/hero/unlock", Some("userB"), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let view = json_body(send(&router, "GET", "/sections/hero", Some("userB"), None).await).await;
    assert_eq!(view["canEdit"], false);

    let resp = send(&router, "POST", "/sections/hero/unlock", Some("userA"), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let view = json_body(send(&router, "GET", "/sections/hero", Some("userB"), None).await).await;
    assert_eq!(view["canEdit"], true);
  }

  // ── History ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn history_and_revert() {
    let router = make_router().await;
    let publish = Some(json!({ "status": "published" }));
    send(&router, "PUT", "/sections/hero", Some("a"), Some(hero("One"))).await;
    send(&router, "PATCH", "/sections/hero", Some("a"), publish.clone()).await;
    send(&router, "PUT", "/sections/hero", Some("a"), Some(hero("Two"))).await;
    let section =
      json_body(send(&router, "PATCH", "/sections/hero", Some("a"), publish).await).await;
    let id = section["id"].as_str().unwrap().to_owned();

    let history =
      json_body(send(&router, "GET", &format!("/history/{id}"), None, None).await).await;
    let numbers: Vec<_> = history
      .as_array()
      .unwrap()
      .iter()
      .map(|v| v["versionNumber"].as_u64().unwrap())
      .collect();
    assert_eq!(numbers, vec![2, 1]);

    let resp = send(
      &router,
      "POST",
      &format!("/history/{id}/revert"),
      Some("a"),
      Some(json!({ "versionNumber": 1 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let reverted = json_body(resp).await;
    assert_eq!(reverted["content"]["headline"], "One");
    assert_eq!(reverted["status"], "draft");

    let public =
      json_body(send(&router, "GET", "/sections/hero/published", None, None).await).await;
    assert_eq!(public["content"]["headline"], "Two");
    assert_eq!(public["version"], 2);

    let resp = send(
      &router,
      "POST",
      &format!("/history/{id}/revert"),
      Some("a"),
      Some(json!({ "versionNumber": 42 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn history_of_unknown_section_is_404() {
    let router = make_router().await;
    let uri = format!("/history/{}", uuid::Uuid::new_v4());
    let resp = send(&router, "GET", &uri, None, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
