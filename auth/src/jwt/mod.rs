pub mod claims;
pub mod errors;
pub mod token;

pub use claims::Claims;
pub use errors::JwtError;
pub use token::TokenService;
pub use token::DEFAULT_TOKEN_LIFETIME_HOURS;
