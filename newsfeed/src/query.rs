use common::Article;
use std::fmt;
use std::str::FromStr;

use crate::manager::FeedManager;

/// The operations exposed to the CLI and to library callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    UpdateNews,
    ListTitles,
    GetArticleDetails,
    GetFileContents,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::UpdateNews,
        Operation::ListTitles,
        Operation::GetArticleDetails,
        Operation::GetFileContents,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::UpdateNews => "update_news",
            Operation::ListTitles => "list_titles",
            Operation::GetArticleDetails => "get_article_details",
            Operation::GetFileContents => "get_file_contents",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// Result of one operation, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Update { success: bool },
    Titles(Vec<String>),
    Article { title: String, article: Option<Article> },
    Articles(Vec<Article>),
    Error { operation: Option<Operation>, error: String },
}

/// Run `operation` against `manager`.
///
/// Bad input (unknown operation name, lookup without a title) comes back as
/// [`QueryResult::Error`] rather than an `Err`, so callers always have
/// something to render.
pub async fn execute(manager: &FeedManager, operation: &str, title: Option<&str>) -> QueryResult {
    let operation = match operation.parse::<Operation>() {
        Ok(op) => op,
        Err(e) => {
            return QueryResult::Error {
                operation: None,
                error: e.to_string(),
            }
        }
    };

    match operation {
        Operation::UpdateNews => QueryResult::Update {
            success: manager.refresh().await,
        },
        Operation::ListTitles => QueryResult::Titles(manager.list_titles().await),
        Operation::GetArticleDetails => match title.filter(|t| !t.is_empty()) {
            Some(title) => QueryResult::Article {
                title: title.to_string(),
                article: manager.find_by_title(title).await,
            },
            None => QueryResult::Error {
                operation: Some(operation),
                error: format!("Title parameter required for {}", operation),
            },
        },
        Operation::GetFileContents => QueryResult::Articles(manager.dump_all().await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>(), Ok(op));
        }
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let err = "delete_everything".parse::<Operation>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid operation: delete_everything");
        assert!("List_Titles".parse::<Operation>().is_err());
    }
}
