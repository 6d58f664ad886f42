pub mod db_utils;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod validation;
