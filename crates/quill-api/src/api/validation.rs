// Request payload validation
//
// One explicitly constructed validator lives in the app state and is shared
// by every handler; there is no process-wide singleton. Limits mirror the
// column sizes in the schema.

use regex::Regex;

use quill_storage::Page;

use super::error::ApiError;

pub const MAX_USERNAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 7;
pub const MAX_PASSWORD_LEN: usize = 72;
pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_CONTENT_LEN: usize = 1000;
pub const MAX_COMMENT_LEN: usize = 1000;

pub const MIN_PAGE_LIMIT: i64 = 1;
pub const MAX_PAGE_LIMIT: i64 = 10;

/// Field-level validation for request payloads.
pub struct RequestValidator {
    email: Regex,
}

impl RequestValidator {
    pub fn new() -> Self {
        Self {
            // Deliberately loose: one @, no whitespace, a dot in the domain.
            email: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern"),
        }
    }

    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        if username.is_empty() || username.len() > MAX_USERNAME_LEN {
            return Err(ApiError::bad_request(format!(
                "username is required and must be at most {MAX_USERNAME_LEN} characters"
            )));
        }
        self.login(email, password)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        if email.is_empty() || email.len() > MAX_EMAIL_LEN || !self.email.is_match(email) {
            return Err(ApiError::bad_request("a valid email address is required"));
        }
        if password.len() < MIN_PASSWORD_LEN || password.len() > MAX_PASSWORD_LEN {
            return Err(ApiError::bad_request(format!(
                "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }

    pub fn new_article(&self, title: &str, content: &str) -> Result<(), ApiError> {
        if title.is_empty() || title.len() > MAX_TITLE_LEN {
            return Err(ApiError::bad_request(format!(
                "title is required and must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        if content.is_empty() || content.len() > MAX_CONTENT_LEN {
            return Err(ApiError::bad_request(format!(
                "content is required and must be at most {MAX_CONTENT_LEN} characters"
            )));
        }
        Ok(())
    }

    pub fn article_update(
        &self,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<(), ApiError> {
        if let Some(title) = title {
            if title.is_empty() || title.len() > MAX_TITLE_LEN {
                return Err(ApiError::bad_request(format!(
                    "title must be at most {MAX_TITLE_LEN} characters"
                )));
            }
        }
        if let Some(content) = content {
            if content.is_empty() || content.len() > MAX_CONTENT_LEN {
                return Err(ApiError::bad_request(format!(
                    "content must be at most {MAX_CONTENT_LEN} characters"
                )));
            }
        }
        Ok(())
    }

    pub fn comment(&self, text: &str) -> Result<(), ApiError> {
        if text.is_empty() || text.len() > MAX_COMMENT_LEN {
            return Err(ApiError::bad_request(format!(
                "comment text is required and must be at most {MAX_COMMENT_LEN} characters"
            )));
        }
        Ok(())
    }

    /// Check pagination bounds. Runs before any data access.
    pub fn page(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Page, ApiError> {
        let limit = limit.unwrap_or(0);
        let offset = offset.unwrap_or(0);

        if !(MIN_PAGE_LIMIT..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(ApiError::bad_request(format!(
                "limit must be between {MIN_PAGE_LIMIT} and {MAX_PAGE_LIMIT}"
            )));
        }
        if offset < 0 {
            return Err(ApiError::bad_request("offset must not be negative"));
        }

        Ok(Page { limit, offset })
    }
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v() -> RequestValidator {
        RequestValidator::new()
    }

    #[test]
    fn register_bounds() {
        assert!(v().register("a", "a@x.com", "password1").is_ok());
        assert!(v().register("", "a@x.com", "password1").is_err());
        assert!(v()
            .register(&"x".repeat(MAX_USERNAME_LEN + 1), "a@x.com", "password1")
            .is_err());
    }

    #[test]
    fn email_format() {
        assert!(v().login("user@example.com", "password1").is_ok());
        assert!(v().login("not-an-email", "password1").is_err());
        assert!(v().login("two@@example.com", "password1").is_err());
        assert!(v().login("nodot@example", "password1").is_err());
        assert!(v().login("", "password1").is_err());
    }

    #[test]
    fn password_bounds() {
        assert!(v().login("a@x.com", "1234567").is_ok());
        assert!(v().login("a@x.com", "123456").is_err());
        assert!(v().login("a@x.com", &"x".repeat(MAX_PASSWORD_LEN)).is_ok());
        assert!(v()
            .login("a@x.com", &"x".repeat(MAX_PASSWORD_LEN + 1))
            .is_err());
    }

    #[test]
    fn article_bounds() {
        assert!(v().new_article("Title", "Content").is_ok());
        assert!(v().new_article("", "Content").is_err());
        assert!(v()
            .new_article(&"t".repeat(MAX_TITLE_LEN + 1), "Content")
            .is_err());
        assert!(v()
            .new_article("Title", &"c".repeat(MAX_CONTENT_LEN + 1))
            .is_err());

        assert!(v().article_update(None, None).is_ok());
        assert!(v().article_update(Some("New title"), None).is_ok());
        assert!(v()
            .article_update(Some(&"t".repeat(MAX_TITLE_LEN + 1)), None)
            .is_err());
    }

    #[test]
    fn page_bounds() {
        let page = v().page(Some(10), Some(0)).unwrap();
        assert_eq!(page.limit, 10);
        assert_eq!(page.offset, 0);

        assert!(v().page(Some(1), None).is_ok());
        assert!(v().page(None, Some(0)).is_err()); // limit is required
        assert!(v().page(Some(0), Some(0)).is_err());
        assert!(v().page(Some(11), Some(0)).is_err());
        assert!(v().page(Some(5), Some(-1)).is_err());
    }
}
