pub mod ab_cookie;
pub mod api;
pub mod args;
pub mod bucket;
pub mod config;
pub mod cookie;
pub mod errors;
pub mod identity;
pub mod metrics_defs;
pub mod response;
pub mod router;
pub mod service;

#[cfg(test)]
mod testutils;

use crate::ab_cookie::AbCookieController;
use crate::api::ApiContext;
use crate::errors::IspError;
use crate::router::Router;
use crate::service::IspService;
use mastermind::Mastermind;
use mastermind::loader::{Command, Loader};
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub async fn run(config: config::Config) -> Result<(), IspError> {
    let mastermind = Mastermind::new();

    let (loader_tx, loader_rx) = mpsc::channel::<Command>(8);
    let loader = Loader::new(
        mastermind.clone(),
        config.mastermind.path.clone(),
        Duration::from_secs(config.mastermind.refresh_interval_secs),
    );
    let loader_task = tokio::spawn(loader.run(loader_rx));

    let shared_mastermind = Arc::new(mastermind.clone());
    let ctx = ApiContext::new(
        shared_mastermind.clone(),
        shared_mastermind,
        AbCookieController::new(config.cookie_domain.clone()),
    );
    let isp_service = IspService::new(Router::new(ctx));
    let isp_task = run_http_service(&config.listener.host, config.listener.port, isp_service);

    let admin_service = AdminService::<_, IspError>::new(move || mastermind.is_ready());
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin_service,
    );

    let result = tokio::try_join!(isp_task, admin_task);

    let _ = loader_tx.send(Command::Shutdown).await;
    let _ = loader_task.await;

    result.map(|_| ())
}
