// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::users::list_sellers,
        handlers::users::update_commission_config,

        // --- Catalog ---
        handlers::catalog::list_products,
        handlers::catalog::get_product,
        handlers::catalog::create_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,
        handlers::catalog::list_product_types,
        handlers::catalog::get_product_type,
        handlers::catalog::create_product_type,
        handlers::catalog::update_product_type,
        handlers::catalog::delete_product_type,
        handlers::catalog::list_teams,
        handlers::catalog::get_team,
        handlers::catalog::create_team,
        handlers::catalog::update_team,
        handlers::catalog::delete_team,

        // --- Stock ---
        handlers::catalog::list_stock,
        handlers::catalog::stock_for_product,
        handlers::catalog::add_stock,
        handlers::catalog::set_stock,

        // --- Customers ---
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::create_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,

        // --- Sales ---
        handlers::sales::list_payment_methods,
        handlers::sales::list_my_sales,
        handlers::sales::list_all_sales,
        handlers::sales::list_sales_by_user,
        handlers::sales::get_sale,
        handlers::sales::create_sale,
        handlers::sales::update_sale,
        handlers::sales::update_payment,
        handlers::sales::delete_sale,
        handlers::sales::download_receipt,
        handlers::sales::delete_receipt,

        // --- Orders ---
        handlers::orders::list_my_orders,
        handlers::orders::list_all_orders,
        handlers::orders::list_orders_by_status,
        handlers::orders::update_order_status,

        // --- Commissions ---
        handlers::commissions::list_my_commissions,
        handlers::commissions::my_commission_summary,
        handlers::commissions::list_all_commissions,
        handlers::commissions::list_user_commissions,
        handlers::commissions::recompute_commissions,
        handlers::commissions::update_commission_notes,

        // --- Tasks ---
        handlers::tasks::list_tasks,
        handlers::tasks::get_task,
        handlers::tasks::create_task,
        handlers::tasks::update_task,
        handlers::tasks::delete_task,
        handlers::tasks::list_employees,

        // --- Expenses ---
        handlers::expenses::create_expense,
        handlers::expenses::list_expenses,
        handlers::expenses::get_expense,
        handlers::expenses::update_expense,
        handlers::expenses::delete_expense,
        handlers::expenses::expense_summary,
        handlers::expenses::expenses_by_month,
        handlers::expenses::list_providers,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::UserSummary,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::RegisterResponse,
            handlers::users::CommissionConfigPayload,

            // --- Catalog ---
            models::catalog::Lifecycle,
            models::catalog::ProductSize,
            models::catalog::ProductColor,
            models::catalog::Product,
            models::catalog::Classification,
            models::catalog::StockEntry,
            models::catalog::StockView,
            handlers::catalog::ProductPayload,
            handlers::catalog::CreateClassificationPayload,
            handlers::catalog::UpdateClassificationPayload,
            handlers::catalog::AddStockPayload,
            handlers::catalog::SetStockPayload,

            // --- Customers ---
            models::customer::Customer,
            models::customer::CustomerPayload,

            // --- Sales ---
            models::sale::PaymentMethodKind,
            models::sale::PaymentMethod,
            models::sale::Sale,
            models::sale::SaleLineItem,
            models::sale::SaleLineView,
            models::sale::CustomerSummary,
            models::sale::SaleDetail,
            models::sale::SaleLinePayload,
            models::sale::CreateSalePayload,
            models::sale::UpdateSalePayload,
            models::sale::PaymentUpdateResponse,
            handlers::sales::PaymentPayload,

            // --- Orders ---
            models::order::OrderStatus,
            models::order::Order,
            models::order::OrderView,
            handlers::orders::UpdateOrderStatusPayload,

            // --- Commissions ---
            models::commission::Commission,
            models::commission::CommissionView,
            models::commission::CommissionConfiguration,
            models::commission::CurrentMonthSummary,
            models::commission::CommissionSummary,
            handlers::commissions::CommissionNotesPayload,

            // --- Tasks ---
            models::task::Task,
            models::task::TaskView,
            models::task::EmployeeTaskCounts,
            handlers::tasks::CreateTaskPayload,
            handlers::tasks::UpdateTaskPayload,

            // --- Expenses ---
            models::expense::ExpenseCategory,
            models::expense::ExpensePaymentMethod,
            models::expense::Expense,
            models::expense::ExpensePage,
            models::expense::CategoryTotal,
            models::expense::ExpenseSummary,
            models::expense::MonthTotal,
            handlers::expenses::ExpensePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Usuários e configuração de comissão"),
        (name = "Catalog", description = "Produtos, tipos de produto e equipes"),
        (name = "Stock", description = "Estoque por talle e cor"),
        (name = "Customers", description = "Cadastro de clientes"),
        (name = "Sales", description = "Vendas, pagamentos e comprovantes"),
        (name = "Orders", description = "Pedidos (um por venda)"),
        (name = "Commissions", description = "Comissões mensais"),
        (name = "Tasks", description = "Tarefas dos empregados"),
        (name = "Expenses", description = "Gastos por cliente")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
