pub mod companies;
pub mod profiles;
pub mod users;
