// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Units ---
        handlers::units::list_buildings,
        handlers::units::create_building,
        handlers::units::update_building,
        handlers::units::delete_building,
        handlers::units::list_units,
        handlers::units::get_unit,
        handlers::units::create_unit,
        handlers::units::update_unit,
        handlers::units::delete_unit,

        // --- Tenants ---
        handlers::tenants::list_tenants,
        handlers::tenants::get_tenant,
        handlers::tenants::create_tenant,
        handlers::tenants::update_tenant,
        handlers::tenants::delete_tenant,

        // --- Leases ---
        handlers::leases::list_leases,
        handlers::leases::expiring_leases,
        handlers::leases::get_lease,
        handlers::leases::create_lease,
        handlers::leases::update_lease,
        handlers::leases::delete_lease,
        handlers::leases::renew_lease,

        // --- Fees ---
        handlers::fees::list_fees,
        handlers::fees::get_fee,
        handlers::fees::list_fee_items,
        handlers::fees::create_fee,
        handlers::fees::update_fee,
        handlers::fees::delete_fee,
        handlers::fees::mark_fee_paid,
        handlers::fees::refresh_overdue,
        handlers::fees::list_categories,
        handlers::fees::create_category,

        // --- Payments ---
        handlers::payments::list_payments,
        handlers::payments::get_payment,
        handlers::payments::create_payment,
        handlers::payments::update_payment,
        handlers::payments::delete_payment,
        handlers::payments::upload_receipt,
        handlers::payments::download_receipt,

        // --- Repairs ---
        handlers::repairs::list_repairs,
        handlers::repairs::get_repair,
        handlers::repairs::create_repair,
        handlers::repairs::update_repair,
        handlers::repairs::delete_repair,
        handlers::repairs::use_reserve,

        // --- Reserves ---
        handlers::reserves::list_reserves,
        handlers::reserves::reserve_balance,
        handlers::reserves::reserve_summary,
        handlers::reserves::available_reserves,
        handlers::reserves::get_reserve,
        handlers::reserves::create_reserve,
        handlers::reserves::update_reserve,
        handlers::reserves::delete_reserve,

        // --- Reports ---
        handlers::reports::reconciliation,
        handlers::reports::dashboard,
        handlers::reports::expiring_alerts,
        handlers::reports::income_expense,
        handlers::reports::monthly_income,
        handlers::reports::monthly_fees,

        // --- Admin ---
        handlers::export::export_data,
        handlers::backups::create_backup,
        handlers::backups::list_backups,
        handlers::backups::download_backup,
        handlers::backups::delete_backup,
        handlers::audit::security_logs,
        handlers::audit::system_logs,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::SessionResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,

            // --- Units & Tenants ---
            models::common::Currency,
            models::unit::UnitType,
            models::unit::Building,
            models::unit::Unit,
            models::unit::UnitDetail,
            models::unit::BuildingPayload,
            models::unit::UnitPayload,
            models::tenant::Tenant,
            models::tenant::TenantPayload,

            // --- Leases ---
            models::lease::LeaseStatus,
            models::lease::Lease,
            models::lease::LeaseDetail,
            models::lease::ExpiringLease,
            models::lease::LeasePayload,
            models::lease::RenewLeasePayload,

            // --- Fees ---
            models::fee::FeeStatus,
            models::fee::Fee,
            models::fee::FeeDetail,
            models::fee::FeeItem,
            models::fee::FeeItemDetail,
            models::fee::FeeWithItems,
            models::fee::ExpenseCategory,
            models::fee::CategoryPayload,
            models::fee::FeeItemPayload,
            models::fee::FeePayload,
            handlers::fees::RefreshOverdueResponse,

            // --- Payments ---
            models::payment::PaymentType,
            models::payment::PaymentMethod,
            models::payment::Payment,
            models::payment::PaymentDetail,
            models::payment::PaymentPayload,

            // --- Repairs & Reserves ---
            models::repair::RepairStatus,
            models::repair::FundingSource,
            models::repair::Repair,
            models::repair::RepairDetail,
            models::repair::RepairPayload,
            models::repair::UseReservePayload,
            models::repair::ReserveUsage,
            models::reserve::ReserveOrigin,
            models::reserve::ReserveStatus,
            models::reserve::Reserve,
            models::reserve::ReservePayload,
            models::reserve::ReserveBalance,
            models::reserve::ReserveOriginSummary,

            // --- Reports ---
            models::report::ReconciliationStatus,
            models::report::ReconciliationRow,
            models::report::ReconciliationTotals,
            models::report::ReconciliationReport,
            models::report::DashboardSummary,
            models::report::CurrencyTotal,
            models::report::IncomeExpense,
            models::report::MonthlyIncomeEntry,
            models::report::MonthlyFeeEntry,

            // --- Admin ---
            models::export::ExportType,
            models::export::ExportFormat,
            models::backup::BackupFile,
            models::backup::CreateBackupPayload,
            models::audit::SystemLog,
            models::audit::SecurityLog,
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout e sessão"),
        (name = "Users", description = "Usuários do sistema (admin)"),
        (name = "Units", description = "Edifícios e unidades"),
        (name = "Tenants", description = "Inquilinos"),
        (name = "Leases", description = "Contratos de aluguel"),
        (name = "Fees", description = "Expensas e categorias de gasto"),
        (name = "Payments", description = "Pagamentos e comprovantes"),
        (name = "Repairs", description = "Reparações e uso de reservas"),
        (name = "Reserves", description = "Fundo de reserva"),
        (name = "Reports", description = "Conciliação, dashboard e gráficos"),
        (name = "Export", description = "Exportação CSV/JSON"),
        (name = "Backups", description = "Backups SQL do banco"),
        (name = "Audit", description = "Logs de sistema e de segurança")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                crate::middleware::auth::SESSION_COOKIE,
            ))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_session_scheme_and_routes() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("componentes");
        assert!(components.security_schemes.contains_key("session_cookie"));
        assert!(doc.paths.paths.contains_key("/api/repairs/{id}/use-reserve"));
        assert!(doc.paths.paths.contains_key("/api/reconciliation"));
    }
}
