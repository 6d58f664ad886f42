pub mod auth;
pub mod catalog_service;
pub mod commission_service;
pub mod customer_service;
pub mod expense_service;
pub mod order_service;
pub mod pricing;
pub mod receipt_store;
pub mod sale_service;
pub mod task_service;
pub mod user_service;
