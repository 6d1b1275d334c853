pub mod account_service;
pub mod chat_service;
pub mod health_service;
pub mod item_service;
