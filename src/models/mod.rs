use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub cover_image: String,
    pub published: bool,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    /// Server may omit or null the tag list for posts without tags.
    #[serde(default, deserialize_with = "null_to_default")]
    pub tags: Vec<Tag>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub user_type: String,
    #[serde(default)]
    pub created_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.user_type == "admin"
    }
}

/// Paged list response from `GET /posts`.
///
/// The backend serializes an empty page as `"posts": null`, so the vec
/// deserializer must accept null.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct PostsResponse {
    #[serde(default, deserialize_with = "null_to_default")]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub limit: i64,
}

/// Outgoing payload for create and update. `tag_names` carries free-text tag
/// names; the backend creates or resolves Tag rows on submit.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct CreatePostData {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub cover_image: String,
    pub published: bool,
    pub tag_names: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub size: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LikeResponse {
    pub message: String,
    pub likes: i64,
    pub liked: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LikeStatus {
    pub liked: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct MessageResponse {
    pub message: String,
}

fn null_to_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let opt = Option::<T>::deserialize(de)?;
    Ok(opt.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_contract_deserialize() {
        let json = r##"{
            "id": 5,
            "title": "A",
            "content": "B",
            "summary": "",
            "cover_image": "/files/c.png",
            "published": true,
            "view_count": 12,
            "likes": 3,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-02T00:00:00Z",
            "tags": [{"id": 1, "name": "go", "color": "#3B82F6", "created_at": ""}]
        }"##;
        let post: Post = serde_json::from_str(json).expect("post should parse");
        assert_eq!(post.id, 5);
        assert_eq!(post.tags.len(), 1);
        assert_eq!(post.tags[0].name, "go");
    }

    #[test]
    fn test_post_null_tags_deserialize_to_empty() {
        let json = r#"{"id": 1, "title": "t", "content": "c", "published": false, "tags": null}"#;
        let post: Post = serde_json::from_str(json).expect("post should parse");
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_posts_response_null_posts() {
        let json = r#"{"posts": null, "total": 0, "page": 1, "limit": 10}"#;
        let res: PostsResponse = serde_json::from_str(json).expect("should parse");
        assert!(res.posts.is_empty());
        assert_eq!(res.total, 0);
    }

    #[test]
    fn test_login_response_contract_deserialize() {
        let json = r#"{
            "token": "jwt-token",
            "user": {"id": 1, "username": "u", "email": "u@example.com", "user_type": "admin"}
        }"#;
        let parsed: LoginResponse =
            serde_json::from_str(json).expect("login response should parse");
        assert_eq!(parsed.token, "jwt-token");
        assert!(parsed.user.is_admin());
    }

    #[test]
    fn test_create_post_data_serializes_tag_names() {
        let data = CreatePostData {
            title: "t".to_string(),
            content: "c".to_string(),
            summary: String::new(),
            cover_image: String::new(),
            published: true,
            tag_names: vec!["go".to_string(), "rust".to_string()],
        };
        let v = serde_json::to_value(data).expect("should serialize");
        assert_eq!(v["published"], true);
        assert_eq!(v["tag_names"][1], "rust");
    }

    #[test]
    fn test_user_is_admin() {
        let json = r#"{"id": 2, "username": "reader", "user_type": "user"}"#;
        let user: User = serde_json::from_str(json).expect("user should parse");
        assert!(!user.is_admin());
    }
}
