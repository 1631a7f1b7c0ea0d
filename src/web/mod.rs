//! オペレーター用Webインターフェース
//!
//! 動画IDの設定、名前リストの取得・削除、ゲーム画面の配信を行う。

pub mod pages;

use crate::api::youtube::VideoId;
use crate::store::{run_blocking, NameListStore, VideoIdStore};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::{StatusCode, Uri};
use warp::hyper::body::Bytes;
use warp::reply::{self, Reply, Response};
use warp::Filter;

/// フォーム・JSONボディの上限
const MAX_BODY_BYTES: u64 = 16 * 1024;

/// ハンドラに注入されるストア
#[derive(Clone)]
pub struct WebState {
    pub video_ids: Arc<dyn VideoIdStore>,
    pub names: Arc<dyn NameListStore>,
}

impl WebState {
    pub fn new(video_ids: Arc<dyn VideoIdStore>, names: Arc<dyn NameListStore>) -> Self {
        Self { video_ids, names }
    }
}

#[derive(Debug, Deserialize)]
struct RemoveNameRequest {
    #[serde(default)]
    name: Option<String>,
}

fn with_state(state: WebState) -> impl Filter<Extract = (WebState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// 全ルート
pub fn routes(
    state: WebState,
) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .map(|| reply::html(pages::INPUT_PAGE).into_response());

    let set_video_id = warp::path("set_video_id")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::form::<HashMap<String, String>>())
        .and(with_state(state.clone()))
        .and_then(set_video_id_handler);

    let game = warp::path("game")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| reply::html(pages::GAME_PAGE).into_response());

    let names = warp::path("names")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(names_handler);

    let remove_name = warp::path("remove_name")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_state(state.clone()))
        .and_then(remove_name_handler);

    let video_id = warp::path("video_id")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state))
        .and_then(video_id_handler);

    index
        .or(set_video_id)
        .unify()
        .or(game)
        .unify()
        .or(names)
        .unify()
        .or(remove_name)
        .unify()
        .or(video_id)
        .unify()
        .with(warp::trace::request())
}

async fn set_video_id_handler(
    form: HashMap<String, String>,
    state: WebState,
) -> Result<Response, Infallible> {
    let video_id = match form.get("video_id").map(|id| id.trim()) {
        Some(id) if !id.is_empty() => VideoId::new(id),
        _ => {
            return Ok(
                reply::with_status("No video ID provided", StatusCode::BAD_REQUEST)
                    .into_response(),
            )
        }
    };

    if let Err(e) = run_blocking(move || state.video_ids.set_video_id(&video_id)).await {
        tracing::error!("❌ Failed to store video ID: {}", e);
        return Ok(
            reply::with_status("Failed to store video ID", StatusCode::INTERNAL_SERVER_ERROR)
                .into_response(),
        );
    }

    Ok(warp::redirect::see_other(Uri::from_static("/game")).into_response())
}

async fn names_handler(state: WebState) -> Result<Response, Infallible> {
    match run_blocking(move || Ok(state.names.get_names())).await {
        Ok(names) => Ok(reply::json(&names).into_response()),
        Err(e) => {
            tracing::error!("❌ Failed to read names: {}", e);
            Ok(status_json("read failed", StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn video_id_handler(state: WebState) -> Result<Response, Infallible> {
    match run_blocking(move || Ok(state.video_ids.get_video_id())).await {
        Ok(video_id) => Ok(reply::json(&json!({ "video_id": video_id })).into_response()),
        Err(e) => {
            tracing::error!("❌ Failed to read video ID: {}", e);
            Ok(status_json("read failed", StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn remove_name_handler(body: Bytes, state: WebState) -> Result<Response, Infallible> {
    let name = serde_json::from_slice::<RemoveNameRequest>(&body)
        .ok()
        .and_then(|req| req.name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    let Some(name) = name else {
        return Ok(status_json("no name provided", StatusCode::BAD_REQUEST));
    };

    let target = name.clone();
    match run_blocking(move || state.names.remove_name(&target)).await {
        Ok(()) => {
            tracing::info!("🗑️ Removed name: {}", name);
            Ok(status_json("removed", StatusCode::OK))
        }
        Err(e) => {
            tracing::error!("❌ Failed to remove name {}: {}", name, e);
            Ok(status_json("remove failed", StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

fn status_json(status: &str, code: StatusCode) -> Response {
    reply::with_status(reply::json(&json!({ "status": status })), code).into_response()
}

/// サーバーをバインドして、実行用のFutureを返す
pub fn bind(
    state: WebState,
    addr: SocketAddr,
) -> Result<(SocketAddr, impl std::future::Future<Output = ()>), warp::Error> {
    warp::serve(routes(state)).try_bind_ephemeral(addr)
}
