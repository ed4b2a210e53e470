mod app;
mod backend;
mod controller;
mod event;
mod session;
mod status;
mod theme;
mod transcript;

use app::ParleyApp;
use backend::BackendClient;
use controller::ChatController;
use eframe::egui;
use session::SessionStore;
use std::sync::mpsc;
use theme::Theme;

fn backend_base_url() -> String {
    std::env::var("PARLEY_BACKEND_URL")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| backend::DEFAULT_BASE_URL.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let base_url = backend_base_url();
    log::info!("using chat backend at {base_url}");

    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("parley-runtime")
        .build()?;

    let client = runtime.block_on(async { BackendClient::new(base_url, tx.clone()) })?;
    client.probe_status();

    let controller = ChatController::new(SessionStore::open_default());
    let app = ParleyApp::new(rx, client, controller);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([460.0, 720.0])
            .with_min_inner_size([360.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Parley",
        native_options,
        Box::new(move |creation_context| {
            Theme::default().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
