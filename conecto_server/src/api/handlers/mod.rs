pub mod creators;
pub mod pages;
pub mod subscriptions;
