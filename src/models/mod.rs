mod company;
mod profile;
mod user;

pub use company::Company;
pub use profile::Profile;
pub use user::{User, UserListing};
