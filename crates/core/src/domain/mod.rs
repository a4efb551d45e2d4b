pub mod category;
pub mod expenditure;
pub mod member;
pub mod profile;
pub mod store;
