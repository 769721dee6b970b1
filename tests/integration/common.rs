//! Shared fixtures for the integration tests.

use serde::Serialize;
use templator::impl_shaped;

/// The page type most tests render.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Content")]
    pub content: String,
}

impl_shaped!(Page {
    title as "Title": String,
    content as "Content": String,
});

impl Page {
    pub fn welcome() -> Self {
        Self {
            title: "Welcome".into(),
            content: "Hello, World!".into(),
        }
    }
}

/// A page with an optional subtitle and a nested author.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "SubTitle")]
    pub sub_title: Option<String>,
    #[serde(rename = "Author")]
    pub author: Option<Author>,
    #[serde(rename = "Tags")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Author {
    #[serde(rename = "Name")]
    pub name: String,
}

impl_shaped!(Author { name as "Name": String });
impl_shaped!(Article {
    title as "Title": String,
    sub_title as "SubTitle": Option<String>,
    author as "Author": Option<Author>,
    tags as "Tags": Vec<String>,
});

/// Write `files` below `root`, creating parent directories.
pub fn write_tree(root: &std::path::Path, files: &[(&str, &str)]) -> anyhow::Result<()> {
    for (path, contents) in files {
        let path = root.join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
    }
    Ok(())
}
