//src/main.rs

use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::{auth::session_guard, csrf::csrf_guard};

// Comprovante de 5 MB + overhead do multipart
const BODY_LIMIT_BYTES: usize = 6 * 1024 * 1024;
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(15 * 60);

fn api_routes(app_state: AppState) -> Router<AppState> {
    // Tudo o resto exige sessão e, nos métodos que alteram estado, token CSRF
    let protected = Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        // Usuários
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        // Edifícios e unidades
        .route(
            "/buildings",
            get(handlers::units::list_buildings).post(handlers::units::create_building),
        )
        .route(
            "/buildings/{id}",
            put(handlers::units::update_building).delete(handlers::units::delete_building),
        )
        .route(
            "/units",
            get(handlers::units::list_units).post(handlers::units::create_unit),
        )
        .route(
            "/units/{id}",
            get(handlers::units::get_unit)
                .put(handlers::units::update_unit)
                .delete(handlers::units::delete_unit),
        )
        // Inquilinos
        .route(
            "/tenants",
            get(handlers::tenants::list_tenants).post(handlers::tenants::create_tenant),
        )
        .route(
            "/tenants/{id}",
            get(handlers::tenants::get_tenant)
                .put(handlers::tenants::update_tenant)
                .delete(handlers::tenants::delete_tenant),
        )
        // Contratos
        .route(
            "/leases",
            get(handlers::leases::list_leases).post(handlers::leases::create_lease),
        )
        .route("/leases/expiring", get(handlers::leases::expiring_leases))
        .route(
            "/leases/{id}",
            get(handlers::leases::get_lease)
                .put(handlers::leases::update_lease)
                .delete(handlers::leases::delete_lease),
        )
        .route("/leases/{id}/renew", post(handlers::leases::renew_lease))
        // Expensas
        .route(
            "/fees",
            get(handlers::fees::list_fees).post(handlers::fees::create_fee),
        )
        .route("/fees/refresh-overdue", post(handlers::fees::refresh_overdue))
        .route(
            "/fees/{id}",
            get(handlers::fees::get_fee)
                .put(handlers::fees::update_fee)
                .delete(handlers::fees::delete_fee),
        )
        .route("/fees/{id}/items", get(handlers::fees::list_fee_items))
        .route("/fees/{id}/pay", post(handlers::fees::mark_fee_paid))
        .route(
            "/expense-categories",
            get(handlers::fees::list_categories).post(handlers::fees::create_category),
        )
        // Pagamentos
        .route(
            "/payments",
            get(handlers::payments::list_payments).post(handlers::payments::create_payment),
        )
        .route(
            "/payments/{id}",
            get(handlers::payments::get_payment)
                .put(handlers::payments::update_payment)
                .delete(handlers::payments::delete_payment),
        )
        .route(
            "/payments/{id}/receipt",
            get(handlers::payments::download_receipt).post(handlers::payments::upload_receipt),
        )
        // Reparações
        .route(
            "/repairs",
            get(handlers::repairs::list_repairs).post(handlers::repairs::create_repair),
        )
        .route(
            "/repairs/{id}",
            get(handlers::repairs::get_repair)
                .put(handlers::repairs::update_repair)
                .delete(handlers::repairs::delete_repair),
        )
        .route("/repairs/{id}/use-reserve", post(handlers::repairs::use_reserve))
        // Reservas
        .route(
            "/reserves",
            get(handlers::reserves::list_reserves).post(handlers::reserves::create_reserve),
        )
        .route("/reserves/balance", get(handlers::reserves::reserve_balance))
        .route("/reserves/summary", get(handlers::reserves::reserve_summary))
        .route("/reserves/available", get(handlers::reserves::available_reserves))
        .route(
            "/reserves/{id}",
            get(handlers::reserves::get_reserve)
                .put(handlers::reserves::update_reserve)
                .delete(handlers::reserves::delete_reserve),
        )
        // Relatórios
        .route("/reconciliation", get(handlers::reports::reconciliation))
        .route("/dashboard", get(handlers::reports::dashboard))
        .route("/dashboard/alerts", get(handlers::reports::expiring_alerts))
        .route("/dashboard/income-expense", get(handlers::reports::income_expense))
        .route("/charts/monthly-income", get(handlers::reports::monthly_income))
        .route("/charts/monthly-fees", get(handlers::reports::monthly_fees))
        // Administração
        .route("/export", get(handlers::export::export_data))
        .route(
            "/backups",
            get(handlers::backups::list_backups).post(handlers::backups::create_backup),
        )
        .route(
            "/backups/{name}",
            get(handlers::backups::download_backup).delete(handlers::backups::delete_backup),
        )
        .route("/audit/security", get(handlers::audit::security_logs))
        .route("/audit/system", get(handlers::audit::system_logs))
        // A última camada adicionada roda primeiro: sessão, depois CSRF
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), csrf_guard))
        .layer(axum_middleware::from_fn_with_state(app_state, session_guard));

    // Rotas públicas
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/auth/login", post(handlers::auth::login))
        .merge(protected)
}

// Limpeza periódica: sessões ociosas e expensas vencidas
fn spawn_maintenance(app_state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(MAINTENANCE_INTERVAL);
        loop {
            interval.tick().await;
            match app_state.auth_service.purge_idle_sessions().await {
                Ok(0) => {}
                Ok(removed) => tracing::info!("🧹 {} sessões ociosas removidas", removed),
                Err(e) => tracing::error!("Falha ao limpar sessões: {}", e),
            }
            if let Err(e) = app_state.fee_service.refresh_overdue().await {
                tracing::error!("Falha ao atualizar expensas vencidas: {}", e);
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar
    let app_state = AppState::new()
        .await
        .context("Falha ao inicializar o estado da aplicação")?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let (Some(email), Some(password)) = (&app_state.settings.admin_email, &app_state.settings.admin_password) {
        match app_state.user_service.ensure_admin(email, password).await {
            Ok(Some(admin)) => tracing::info!("👤 Administrador inicial criado: {}", admin.email),
            Ok(None) => {}
            Err(e) => tracing::error!("Falha ao criar o administrador inicial: {}", e),
        }
    }

    spawn_maintenance(app_state.clone());

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes(app_state.clone()))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state.clone());

    let listener = TcpListener::bind(&app_state.settings.bind_addr)
        .await
        .context("Falha ao iniciar o listener TCP")?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}
