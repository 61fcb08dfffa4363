#![warn(clippy::nursery, clippy::pedantic)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use axum::body::Body;
use axum::extract::{Extension, Form, Path};
use axum::http::header::{self, HeaderValue};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, get_service, post};
use axum::Router;
use chrono::Utc;
use clap::Parser;
use futures::stream::StreamExt;
use rand::{thread_rng, Rng};
use serde::Deserialize;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use snipbin_common::Lifetime;
use tokio::task;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeFile;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::paste::{Paste, PasteView};
use crate::paste_id::PasteId;
use crate::store::PasteStore;
use crate::templates::Templates;
use crate::time::ONE_HOUR;

mod config;
mod paste;
mod paste_id;
mod store;
mod templates;
mod time;

const PUBLISH_FAILED: &str = "Failed to publish, please try again later...";
const FETCH_FAILED: &str = "Failed to fetch, please try again later...";
const NOT_FOUND: &str = "Could not find the requested code, please check your address.";

#[derive(Parser)]
struct Args {
    /// Path to the configuration file.
    #[clap(short, long, default_value = "config.toml")]
    config: PathBuf,
}

/// Everything a request handler needs, constructed once before serving.
struct Context {
    store: PasteStore,
    templates: Templates,
    size_limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    let templates = Templates::load(&config.assets, config.size_limit)
        .context("failed to load page templates")?;
    let store = PasteStore::open(&config.db.path)?;

    task::spawn(sweep_loop(store.clone()));

    let ctx = Arc::new(Context {
        store,
        templates,
        size_limit: config.size_limit,
    });
    let app = router(ctx, &config);

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http.port));
    info!("Listening on {addr}");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async move {
            signals.next().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

fn router(ctx: Arc<Context>, config: &Config) -> Router {
    let assets = Router::new()
        .route(
            "/favicon.ico",
            get_service(ServeFile::new(config.assets.join("favicon.ico")))
                .handle_error(asset_error),
        )
        .route(
            "/style.css",
            get_service(ServeFile::new(config.assets.join("style.css"))).handle_error(asset_error),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=2592000"),
        ));

    let router = Router::new()
        .route("/", get(index))
        .route("/index.html", get(index))
        .route("/policy", get(policy))
        .route("/publish", post(publish))
        .route("/show/:id", get(show))
        .merge(assets)
        .layer(CompressionLayer::new())
        .layer(Extension(ctx));

    match &config.force_domain {
        Some(domain) => {
            let base = Arc::new(domain.clone());
            router.layer(middleware::from_fn(move |req, next| {
                force_domain(req, next, Arc::clone(&base))
            }))
        }
        None => router,
    }
}

async fn asset_error(_: std::io::Error) -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Requests arriving for any host other than the canonical domain are
/// permanently redirected to the same path under that domain.
async fn force_domain(req: Request<Body>, next: Next<Body>, base: Arc<String>) -> Response {
    let canonical = base
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/');
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());

    match host {
        Some(host) if host != canonical => {
            let path = req.uri().path_and_query().map_or("/", |pq| pq.as_str());
            let location = format!("{}{path}", base.trim_end_matches('/'));

            let mut headers = HeaderMap::new();
            if let Ok(value) = HeaderValue::from_str(&location) {
                headers.insert(header::LOCATION, value);
            }
            (StatusCode::MOVED_PERMANENTLY, headers, ()).into_response()
        }
        _ => next.run(req).await,
    }
}

async fn index(Extension(ctx): Extension<Arc<Context>>) -> Html<String> {
    Html(ctx.templates.index())
}

async fn policy(Extension(ctx): Extension<Arc<Context>>) -> Html<String> {
    Html(ctx.templates.policy())
}

/// Untrusted form body for `POST /publish`. Absent fields fall back to their
/// defaults instead of failing extraction.
#[derive(Deserialize)]
struct PublishForm {
    #[serde(default)]
    code: String,
    highlight: Option<String>,
    #[serde(default)]
    lifetime: String,
}

#[instrument(skip(ctx, form))]
async fn publish(
    Extension(ctx): Extension<Arc<Context>>,
    Form(mut form): Form<PublishForm>,
) -> Result<Redirect, (StatusCode, Html<String>)> {
    paste::truncate(&mut form.code, ctx.size_limit);

    let lifetime = Lifetime::from(form.lifetime.as_str());
    let doc = Paste::new(form.code, form.highlight, lifetime, Utc::now());
    let id: PasteId = thread_rng().sample(paste_id::Generator);

    if let Err(e) = ctx.store.insert(&id, &doc).await {
        error!("Failed to publish paste: {e:?}");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(ctx.templates.error(PUBLISH_FAILED)),
        ));
    }

    info!("New code published at {}", doc.created);
    Ok(Redirect::to(&format!("/show/{id}")))
}

#[instrument(skip(ctx))]
async fn show(
    Extension(ctx): Extension<Arc<Context>>,
    Path(id): Path<String>,
) -> (StatusCode, Html<String>) {
    let doc = match ctx.store.find(&id).await {
        Ok(Some(doc)) => doc,
        Ok(None) => return (StatusCode::NOT_FOUND, Html(ctx.templates.error(NOT_FOUND))),
        Err(e) => {
            error!("Failed to fetch paste: {e:?}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(ctx.templates.error(FETCH_FAILED)),
            );
        }
    };

    // Expiry is not checked on the read path; a document stays fetchable
    // until the next sweep removes it.
    let view = PasteView::new(&id, &doc);
    match view.to_json() {
        Ok(json) => (StatusCode::OK, Html(ctx.templates.show(&json))),
        Err(e) => {
            error!("Failed to render paste projection: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(ctx.templates.error(FETCH_FAILED)),
            )
        }
    }
}

/// Periodic clean-up task that deletes expired documents.
///
/// Runs once at startup and then hourly. A failed pass is logged and the
/// next tick proceeds regardless.
async fn sweep_loop(store: PasteStore) {
    loop {
        info!("Running cleanup at {}", Utc::now());
        match store.sweep_expired(Utc::now()).await {
            Ok(removed) => info!("Removed {removed} expired documents"),
            Err(e) => error!("Cleanup pass failed: {e:?}"),
        }
        tokio::time::sleep(*ONE_HOUR).await;
    }
}
