// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemLog {
    pub id: i64,
    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,
    pub action: String,
    pub table_name: Option<String>,
    pub record_id: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecurityLog {
    pub id: i64,
    pub user_id: Option<Uuid>,
    pub event: String,
    pub event_type: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Tipos de eventos de segurança
pub const EVENT_LOGIN_FAILED: &str = "login_fallido";
pub const EVENT_LOGIN_OK: &str = "login_exitoso";
pub const EVENT_LOGOUT: &str = "logout";
pub const EVENT_SESSION_HIJACK: &str = "sesion_invalida";

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LogQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

// Origem da requisição, gravada nos logs
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}
