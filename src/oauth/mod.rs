//! OAuth2 login for administrators

pub mod allow_list;
pub mod handshake;
pub mod provider;

pub use allow_list::{AdminUserAllowList, EmailAllowList, StaticAllowList};
pub use handshake::AuthorizationHandshake;
pub use provider::{GoogleOAuthProvider, OAuthProvider, callback_url};
