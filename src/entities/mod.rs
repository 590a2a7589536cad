//! Domain objects stored by the service

pub mod macros;
pub mod submission;
pub mod token;
pub mod user;

pub use submission::Submission;
pub use token::Token;
pub use user::User;
