// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::{
        lease::ExpiringLease,
        report::{
            ChartQuery, DashboardSummary, IncomeExpense, MonthlyFeeEntry, MonthlyIncomeEntry, PeriodQuery,
            ReconciliationQuery, ReconciliationReport,
        },
    },
};

// GET /api/reconciliation
#[utoipa::path(
    get,
    path = "/api/reconciliation",
    tag = "Reports",
    params(ReconciliationQuery),
    responses(
        (status = 200, description = "Devido x pago por unidade ativa no mês", body = ReconciliationReport),
        (status = 400, description = "Mês inválido")
    ),
    security(("session_cookie" = []))
)]
pub async fn reconciliation(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ReconciliationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .report_service
        .reconciliation(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Reports",
    responses((status = 200, description = "Indicadores do mês corrente", body = DashboardSummary)),
    security(("session_cookie" = []))
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .report_service
        .dashboard()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/dashboard/alerts
#[utoipa::path(
    get,
    path = "/api/dashboard/alerts",
    tag = "Reports",
    responses((status = 200, description = "Contratos que vencem nos próximos 30 dias", body = Vec<ExpiringLease>)),
    security(("session_cookie" = []))
)]
pub async fn expiring_alerts(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let alerts = app_state
        .report_service
        .expiring_alerts()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(alerts)))
}

// GET /api/dashboard/income-expense
#[utoipa::path(
    get,
    path = "/api/dashboard/income-expense",
    tag = "Reports",
    params(PeriodQuery),
    responses((status = 200, body = IncomeExpense), (status = 400, description = "Mês inválido")),
    security(("session_cookie" = []))
)]
pub async fn income_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let result = app_state
        .report_service
        .income_expense(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/charts/monthly-income
#[utoipa::path(
    get,
    path = "/api/charts/monthly-income",
    tag = "Reports",
    params(ChartQuery),
    responses((status = 200, description = "Receita por mês e tipo de pagamento", body = Vec<MonthlyIncomeEntry>)),
    security(("session_cookie" = []))
)]
pub async fn monthly_income(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ChartQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .report_service
        .monthly_income(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entries)))
}

// GET /api/charts/monthly-fees
#[utoipa::path(
    get,
    path = "/api/charts/monthly-fees",
    tag = "Reports",
    params(ChartQuery),
    responses((status = 200, body = Vec<MonthlyFeeEntry>)),
    security(("session_cookie" = []))
)]
pub async fn monthly_fees(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ChartQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .report_service
        .monthly_fees(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entries)))
}
