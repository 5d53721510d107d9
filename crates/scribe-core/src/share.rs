//! Composing the "recommend this post" email.

use crate::domain::Post;
use crate::forms::ShareRequest;
use crate::ports::EmailMessage;

/// Build the recommendation email for `post`, linking to `post_url`.
pub fn compose_share_email(
    post: &Post,
    request: &ShareRequest,
    post_url: &str,
    from: &str,
) -> EmailMessage {
    let subject = format!(
        "{} ({}) recommends you read {}",
        request.name, request.email, post.title
    );
    let body = format!(
        "Read {} at {}\n\n{}'s comments: {}",
        post.title, post_url, request.name, request.comments
    );

    EmailMessage {
        from: from.to_string(),
        to: vec![request.to.clone()],
        subject,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_compose_share_email() {
        let post = Post::new(Uuid::nil(), "Rust Ownership".into(), String::new());
        let request = ShareRequest {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            to: "bob@example.com".into(),
            comments: "Worth it".into(),
        };

        let message = compose_share_email(
            &post,
            &request,
            "https://blog.example.com/2024/1/2/rust-ownership/",
            "noreply@example.com",
        );

        assert_eq!(
            message.subject,
            "Ana (ana@example.com) recommends you read Rust Ownership"
        );
        assert_eq!(
            message.body,
            "Read Rust Ownership at https://blog.example.com/2024/1/2/rust-ownership/\n\nAna's comments: Worth it"
        );
        assert_eq!(message.to, vec!["bob@example.com".to_string()]);
        assert_eq!(message.from, "noreply@example.com");
    }
}
