pub mod auth;
pub mod catalog;
pub mod commission;
pub mod customer;
pub mod expense;
pub mod order;
pub mod sale;
pub mod task;
