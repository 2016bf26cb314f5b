pub mod claims;
pub mod extractor;
pub mod jwt;
pub mod password;

pub use claims::SessionClaims;
pub use extractor::SignedIn;
pub use jwt::SessionTokens;
pub use password::{hash_password, hash_token, new_salt, verify_password};
