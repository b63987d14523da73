// Authentication: token service, identity/ownership extractors, auth routes.

pub mod jwt;
pub mod middleware;
pub mod routes;

pub use jwt::{Claims, InvalidToken, TokenService};
pub use middleware::{AuthUser, OwnedArticle};
pub use routes::routes;
