use std::sync::{Arc, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::services::ServeDir;

use crate::cms::CmsConfig;
use crate::config::Site;
use crate::content::{ContentStore, Entry};
use crate::page::Page;
use crate::routes;
use crate::theme::{FileStore, Theme};

#[derive(Clone)]
pub struct AppState {
    pub site: Arc<Site>,
    pub content: Arc<ContentStore>,
    pub cms: Arc<CmsConfig>,
    pub page: Arc<Mutex<Page<FileStore>>>,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    data: T,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse { data })).into_response()
}

fn not_found(msg: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
struct Summary<'a, T> {
    slug: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(flatten)]
    data: &'a T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteTable {
    home: &'static str,
    blog: &'static str,
    side_projects: &'static str,
    about: &'static str,
}

const ROUTE_TABLE: RouteTable = RouteTable {
    home: routes::HOME,
    blog: routes::BLOG,
    side_projects: routes::SIDE_PROJECTS,
    about: routes::ABOUT,
};

pub fn router(state: AppState) -> Router {
    let public = ServeDir::new(&state.site.public_folder);

    Router::new()
        .route(routes::HOME, get(index))
        .route(routes::BLOG, get(list_posts))
        .route(&routes::blog_post(":slug"), get(get_post))
        .route(routes::SIDE_PROJECTS, get(list_side_projects))
        .route(routes::ABOUT, get(about))
        .route("/theme", get(get_theme))
        .route("/theme/toggle", post(toggle_theme))
        .route("/scene", get(get_scene))
        .route("/admin/config.json", get(cms_config))
        .fallback_service(public)
        .with_state(state)
}

pub async fn index(State(state): State<AppState>) -> Response {
    tracing::info!("got index request");
    success(serde_json::json!({
        "title": state.site.title,
        "description": state.site.description,
        "routes": ROUTE_TABLE,
        "posts": state.content.blog.len(),
        "sideProjects": state.content.side_projects.len(),
    }))
}

pub async fn about(State(state): State<AppState>) -> Response {
    success(serde_json::json!({
        "title": state.site.title,
        "description": state.site.description,
        "path": routes::ABOUT,
    }))
}

pub async fn list_posts(State(state): State<AppState>) -> Response {
    let posts: Vec<_> = state
        .content
        .blog
        .entries()
        .iter()
        .map(|entry| Summary {
            slug: &entry.slug,
            path: Some(routes::blog_post(&entry.slug)),
            data: &entry.data,
        })
        .collect();

    success(posts)
}

#[derive(Debug, Serialize)]
struct FullEntry<'a, T> {
    path: String,
    #[serde(flatten)]
    entry: &'a Entry<T>,
}

pub async fn get_post(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match state.content.blog.get(&slug) {
        Some(entry) => success(FullEntry {
            path: routes::blog_post(&entry.slug),
            entry,
        }),
        None => {
            tracing::info!(slug = %slug, "post not found");
            not_found("post not found")
        }
    }
}

pub async fn list_side_projects(State(state): State<AppState>) -> Response {
    let projects: Vec<_> = state
        .content
        .side_projects
        .entries()
        .iter()
        .map(|entry| Summary {
            slug: &entry.slug,
            path: None,
            data: &entry.data,
        })
        .collect();

    success(projects)
}

#[derive(Debug, Serialize)]
struct ThemeView {
    theme: Theme,
    #[serde(skip_serializing_if = "Option::is_none")]
    persisted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

pub async fn get_theme(State(state): State<AppState>) -> Response {
    let page = state.page.lock().await;
    success(ThemeView {
        theme: page.theme.current(),
        persisted: None,
        warning: None,
    })
}

pub async fn toggle_theme(State(state): State<AppState>) -> Response {
    let mut page = state.page.lock().await;
    let toggled = page.theme.toggle();
    tracing::info!(theme = %toggled.theme, "theme toggled");

    success(ThemeView {
        theme: toggled.theme,
        persisted: Some(toggled.persisted.is_ok()),
        warning: toggled.persisted.err().map(|e| crate::unpack_error(&e)),
    })
}

#[derive(Debug, Deserialize)]
pub struct SceneQuery {
    pub width: Option<f64>,
}

pub async fn get_scene(State(state): State<AppState>, Query(query): Query<SceneQuery>) -> Response {
    let scene = state.page.lock().await.scene().clone();
    let mut view = scene.lock().unwrap_or_else(PoisonError::into_inner).clone();

    if let Some(width) = query.width {
        view.fit_viewport(width);
    }

    success(view.snapshot())
}

pub async fn cms_config(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(state.cms.as_ref().clone())).into_response()
}
