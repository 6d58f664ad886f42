pub mod auth;
pub mod catalog;
pub mod commissions;
pub mod customers;
pub mod expenses;
pub mod orders;
pub mod sales;
pub mod tasks;
pub mod users;
