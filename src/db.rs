pub mod user_repo;
pub use user_repo::UserRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod sale_repo;
pub use sale_repo::SaleRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod commission_repo;
pub use commission_repo::CommissionRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
pub mod expense_repo;
pub use expense_repo::ExpenseRepository;
pub mod seed;
