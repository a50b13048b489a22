//! Servir demo binary
//!
//! Boots the store behind the splash screen, loads a module through the
//! request pipeline and prints what the user would see.
//!
//! By default requests are answered by a scripted transport. Pass `--live`
//! to call the API selected by `SERVIR_ENV` / `SERVIR_API_URL`.

use anyhow::Context;
use serde_json::json;
use servir_api::{ApiClient, ApiConfig, ApiResponse, MockTransport, RequestOptions};
use servir_app::splash::SplashScreen;
use servir_app::{localized_dispatcher, new_store, AppAction, AppEnvironment};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn scripted_transport() -> MockTransport {
    MockTransport::new()
        .with_response(
            "GET /users",
            Ok(ApiResponse::ok(json!({ "users": [{ "id": 1, "name": "Ana" }] }))),
        )
        .with_response(
            "POST /orders",
            Err(servir_api::ApiError::status(
                422,
                json!({ "message": "Table 12 is closed" }),
            )),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "servir_app=info,servir_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let live = std::env::args().any(|arg| arg == "--live");
    let config = ApiConfig::from_env().context("reading API configuration")?;
    tracing::info!(base_url = config.base_url(), live, "Starting");

    let client = if live {
        ApiClient::new(config).context("building HTTP client")?
    } else {
        ApiClient::with_transport(config, scripted_transport())
    };

    let env = AppEnvironment::default().with_notification_ttl(Duration::from_millis(200));
    let store = new_store(env);
    let splash = SplashScreen::new();

    println!("{}", splash.render_from(&store, "Dashboard").await);

    let _ = store.send(AppAction::SetLanguage("pt-BR".to_string())).await;

    let users = client
        .get(
            "/users",
            RequestOptions::new()
                .with_before("USERS_REQUESTED")
                .with_module("users")
                .with_success("USERS_LOADED")
                .with_error("USERS_FAILED")
                .with_dispatcher(localized_dispatcher(&store)),
        )
        .await;
    println!("GET /users -> success: {}", users.is_success());

    let order = client
        .post(
            "/orders",
            &json!({ "table": 12, "items": ["feijoada"] }),
            RequestOptions::new()
                .with_module("orders")
                .with_error("ORDER_REJECTED")
                .with_dispatcher(localized_dispatcher(&store)),
        )
        .await;
    println!("POST /orders -> success: {}", order.is_success());

    let _ = store.send(AppAction::SetLoading(false)).await;
    println!("{}", splash.render_from(&store, "Dashboard").await);

    let (modules, events, notifications) = store
        .state(|s| {
            (
                s.api.modules.clone(),
                s.api.events.clone(),
                s.notifications.items.clone(),
            )
        })
        .await;

    println!("\nModules:");
    for (name, status) in &modules {
        println!(
            "  {name}: pending={} error={} response={}",
            status.pending,
            status.error,
            status.response.clone().unwrap_or_default()
        );
    }

    println!("\nEvents:");
    for event in &events {
        println!("  {} {}", event.kind, serde_json::Value::Object(event.fields.clone()));
    }

    println!("\nNotifications:");
    for notification in &notifications {
        println!(
            "  #{} [{}] {}",
            notification.id,
            if notification.error { "error" } else { "info" },
            notification.message
        );
    }

    tokio::time::sleep(Duration::from_millis(300)).await;
    let remaining = store.state(|s| s.notifications.items.len()).await;
    println!("\nNotifications after dismissal: {remaining}");

    store
        .shutdown(Duration::from_secs(1))
        .await
        .context("waiting for pending effects")?;

    Ok(())
}
