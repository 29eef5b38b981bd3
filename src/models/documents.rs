use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::odm::NoSqlDocument;

/// A scraped web article.
///
/// `content` carries the normalized page under the `Title` / `Subtitle` /
/// `Content` / `language` keys; metadata keys the page didn't provide are
/// omitted. `link` is the natural deduplication key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDocument {
    pub id: Uuid,
    pub content: HashMap<String, String>,
    pub link: String,
    pub platform: String,
    pub author_id: Uuid,
    pub author_full_name: String,
}

impl ArticleDocument {
    pub fn new(
        content: HashMap<String, String>,
        link: String,
        platform: String,
        author_id: Uuid,
        author_full_name: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            link,
            platform,
            author_id,
            author_full_name,
        }
    }
}

impl NoSqlDocument for ArticleDocument {
    fn collection_name() -> &'static str {
        "articles"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl PartialEq for ArticleDocument {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ArticleDocument {}

impl Hash for ArticleDocument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A scraped source-code repository.
///
/// `content` maps each kept relative file path to the file's text with
/// spaces stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryDocument {
    pub id: Uuid,
    pub name: String,
    pub content: BTreeMap<String, String>,
    pub link: String,
    pub platform: String,
    pub author_id: Uuid,
    pub author_full_name: String,
}

impl RepositoryDocument {
    pub fn new(
        name: String,
        content: BTreeMap<String, String>,
        link: String,
        platform: String,
        author_id: Uuid,
        author_full_name: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            content,
            link,
            platform,
            author_id,
            author_full_name,
        }
    }
}

impl NoSqlDocument for RepositoryDocument {
    fn collection_name() -> &'static str {
        "repositories"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl PartialEq for RepositoryDocument {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RepositoryDocument {}

impl Hash for RepositoryDocument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A social-media style post. Both `image` and `link` are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDocument {
    pub id: Uuid,
    pub content: HashMap<String, String>,
    pub platform: String,
    pub author_id: Uuid,
    pub author_full_name: String,
    pub image: Option<String>,
    pub link: Option<String>,
}

impl NoSqlDocument for PostDocument {
    fn collection_name() -> &'static str {
        "posts"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl PartialEq for PostDocument {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PostDocument {}

impl Hash for PostDocument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// The identity crawled content is attributed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl UserDocument {
    pub fn new(first_name: String, last_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl NoSqlDocument for UserDocument {
    fn collection_name() -> &'static str {
        "users"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl PartialEq for UserDocument {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UserDocument {}

impl Hash for UserDocument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Minimal variant used by store smoke tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleDocument {
    pub id: Uuid,
    pub name: String,
}

impl ExampleDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

impl NoSqlDocument for ExampleDocument {
    fn collection_name() -> &'static str {
        "examples"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl PartialEq for ExampleDocument {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ExampleDocument {}

impl Hash for ExampleDocument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::odm::{from_mongo, to_mongo, ToMongoOptions, MONGO_ID_FIELD};

    fn article() -> ArticleDocument {
        let mut content = HashMap::new();
        content.insert("Title".to_string(), "A title".to_string());
        content.insert("Content".to_string(), "Body text".to_string());
        ArticleDocument::new(
            content,
            "https://medium.com/some-article".to_string(),
            "medium.com".to_string(),
            Uuid::new_v4(),
            "Ada Lovelace".to_string(),
        )
    }

    #[test]
    fn test_equality_follows_id() {
        let a = article();
        let mut b = a.clone();
        b.author_full_name = "Someone Else".to_string();
        assert_eq!(a, b);

        let c = article();
        assert_ne!(a, c);
    }

    #[test]
    fn test_hash_follows_id() {
        let a = article();
        let b = a.clone();
        let set: std::collections::HashSet<ArticleDocument> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_article_roundtrip() {
        let doc = article();
        let mongo = to_mongo(&doc, &ToMongoOptions::default()).unwrap();

        // Both identifier fields land as strings.
        assert!(mongo.get_str(MONGO_ID_FIELD).is_ok());
        assert!(mongo.get_str("author_id").is_ok());

        let restored: ArticleDocument = from_mongo(mongo).unwrap();
        assert_eq!(restored.id, doc.id);
        assert_eq!(restored.content, doc.content);
        assert_eq!(restored.link, doc.link);
        assert_eq!(restored.author_id, doc.author_id);
    }

    #[test]
    fn test_repository_roundtrip() {
        let mut tree = BTreeMap::new();
        tree.insert("src/main.rs".to_string(), "fnmain(){}".to_string());
        let doc = RepositoryDocument::new(
            "demo".to_string(),
            tree,
            "https://github.com/octocat/demo".to_string(),
            "github".to_string(),
            Uuid::new_v4(),
            "Ada Lovelace".to_string(),
        );

        let mongo = to_mongo(&doc, &ToMongoOptions::default()).unwrap();
        let restored: RepositoryDocument = from_mongo(mongo).unwrap();
        assert_eq!(restored, doc);
        assert_eq!(restored.content.get("src/main.rs").unwrap(), "fnmain(){}");
    }

    #[test]
    fn test_post_optionals_roundtrip() {
        let post = PostDocument {
            id: Uuid::new_v4(),
            content: HashMap::new(),
            platform: "linkedin".to_string(),
            author_id: Uuid::new_v4(),
            author_full_name: "Ada Lovelace".to_string(),
            image: None,
            link: Some("https://linkedin.com/posts/1".to_string()),
        };

        let sparse = to_mongo(
            &post,
            &ToMongoOptions {
                exclude_unset: true,
                ..ToMongoOptions::default()
            },
        )
        .unwrap();
        assert!(!sparse.contains_key("image"));

        let restored: PostDocument = from_mongo(sparse).unwrap();
        assert_eq!(restored, post);
        assert_eq!(restored.link, post.link);
        assert_eq!(restored.image, None);
    }

    #[test]
    fn test_full_name() {
        let user = UserDocument::new("Ada".to_string(), "Lovelace".to_string());
        assert_eq!(user.full_name(), "Ada Lovelace");
    }
}
