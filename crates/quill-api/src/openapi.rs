// OpenAPI documentation

use utoipa::OpenApi;

use crate::{api, auth};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::routes::register,
        auth::routes::login,
        api::users::get_user,
        api::articles::latest_articles,
        api::articles::get_article,
        api::articles::articles_by_author,
        api::articles::create_article,
        api::articles::update_article,
        api::articles::delete_article,
        api::articles::article_comments,
        api::articles::create_comment,
        api::articles::like_article,
    ),
    components(
        schemas(
            api::ErrorResponse,
            auth::routes::RegisterRequest,
            auth::routes::LoginRequest,
            api::users::User,
            api::articles::Author,
            api::articles::Article,
            api::articles::ArticleWithAuthor,
            api::articles::LatestArticle,
            api::articles::Comment,
            api::articles::CreateArticleRequest,
            api::articles::UpdateArticleRequest,
            api::articles::CreateCommentRequest,
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Public user profiles"),
        (name = "articles", description = "Articles, comments, and likes")
    ),
    info(
        title = "Quill API",
        description = "API server for the quill blogging backend",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_includes_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/auth/reg",
            "/auth/log",
            "/users/{id}",
            "/articles",
            "/articles/{id}",
            "/articles/author/{id}",
            "/articles/{id}/comments",
            "/articles/{id}/like",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {expected}"
            );
        }
    }
}
