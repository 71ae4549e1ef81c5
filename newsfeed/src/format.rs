//! Rendering of query results for the two kinds of consumer: pretty JSON
//! envelopes for scripts and the CLI, plain `field: value` text for prompt
//! injection.

use common::Article;
use serde::Serialize;

use crate::query::{Operation, QueryResult};

/// How a [`QueryResult`] is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// JSON envelope with operation name, payload, count and status message.
    #[default]
    Structured,
    /// Bare data, no envelope.
    Text,
}

/// Structured form of a result. Field order is the serialized key order.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Envelope<'a> {
    Update {
        operation: &'static str,
        success: bool,
        message: &'static str,
    },
    Titles {
        operation: &'static str,
        titles: &'a [String],
        total_count: usize,
        message: String,
    },
    Article {
        operation: &'static str,
        title: &'a str,
        article: Option<&'a Article>,
        message: &'static str,
    },
    Articles {
        operation: &'static str,
        articles: &'a [Article],
        total_count: usize,
        message: String,
    },
    Error {
        operation: Option<&'static str>,
        error: &'a str,
        message: &'static str,
    },
}

impl<'a> From<&'a QueryResult> for Envelope<'a> {
    fn from(result: &'a QueryResult) -> Self {
        match result {
            QueryResult::Update { success } => Envelope::Update {
                operation: Operation::UpdateNews.as_str(),
                success: *success,
                message: if *success {
                    "News data updated successfully"
                } else {
                    "Failed to update news data"
                },
            },
            QueryResult::Titles(titles) => Envelope::Titles {
                operation: Operation::ListTitles.as_str(),
                titles,
                total_count: titles.len(),
                message: format!("Found {} articles", titles.len()),
            },
            QueryResult::Article { title, article } => Envelope::Article {
                operation: Operation::GetArticleDetails.as_str(),
                title,
                article: article.as_ref(),
                message: if article.is_some() {
                    "Article found"
                } else {
                    "Article not found"
                },
            },
            QueryResult::Articles(articles) => Envelope::Articles {
                operation: Operation::GetFileContents.as_str(),
                articles,
                total_count: articles.len(),
                message: format!("File contains {} articles", articles.len()),
            },
            QueryResult::Error { operation, error } => Envelope::Error {
                operation: operation.map(Operation::as_str),
                error,
                message: "Request could not be completed",
            },
        }
    }
}

/// Render `result` for output.
///
/// Update outcomes and errors are status reports and always render as JSON,
/// whatever `mode` asks for.
pub fn render(result: &QueryResult, mode: OutputMode) -> String {
    match (mode, result) {
        (OutputMode::Text, QueryResult::Titles(titles)) => titles_text(titles),
        (OutputMode::Text, QueryResult::Article { article, .. }) => {
            article.as_ref().map(article_text).unwrap_or_default()
        }
        (OutputMode::Text, QueryResult::Articles(articles)) => articles_text(articles),
        _ => structured(result),
    }
}

/// Pretty JSON (2-space indent) of the envelope for `result`.
pub fn structured(result: &QueryResult) -> String {
    // Only strings, bools, integers and string-keyed structs: serialization cannot fail.
    serde_json::to_string_pretty(&Envelope::from(result)).expect("envelope serializes")
}

pub fn titles_text(titles: &[String]) -> String {
    titles.join("\n")
}

/// `Published: ...`, `Title: ...`, `Description: ...`, `Link: ...`, one per line.
pub fn article_text(article: &Article) -> String {
    article
        .fields()
        .iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Article blocks separated by a single blank line.
pub fn articles_text(articles: &[Article]) -> String {
    articles
        .iter()
        .map(article_text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn article(title: &str) -> Article {
        Article {
            published: "Mon, 01 Jan 2024".to_string(),
            title: title.to_string(),
            description: "No description".to_string(),
            link: "http://x".to_string(),
        }
    }

    fn parsed(result: &QueryResult) -> Value {
        serde_json::from_str(&render(result, OutputMode::Structured)).unwrap()
    }

    #[test]
    fn empty_titles_render_as_empty_text() {
        assert_eq!(render(&QueryResult::Titles(vec![]), OutputMode::Text), "");
    }

    #[test]
    fn titles_render_one_per_line() {
        let result = QueryResult::Titles(vec!["A".into(), "B".into()]);
        assert_eq!(render(&result, OutputMode::Text), "A\nB");
    }

    #[test]
    fn missing_article_renders_as_empty_text() {
        let result = QueryResult::Article {
            title: "nope".into(),
            article: None,
        };
        assert_eq!(render(&result, OutputMode::Text), "");
    }

    #[test]
    fn single_article_text_lists_fields_in_order() {
        let result = QueryResult::Article {
            title: "A".into(),
            article: Some(article("A")),
        };
        assert_eq!(
            render(&result, OutputMode::Text),
            "Published: Mon, 01 Jan 2024\nTitle: A\nDescription: No description\nLink: http://x"
        );
    }

    #[test]
    fn empty_dump_renders_as_empty_text() {
        assert_eq!(render(&QueryResult::Articles(vec![]), OutputMode::Text), "");
    }

    #[test]
    fn titles_envelope_carries_count_and_message() {
        let json = parsed(&QueryResult::Titles(vec!["A".into(), "A".into()]));
        assert_eq!(json["operation"], "list_titles");
        assert_eq!(json["total_count"], 2);
        assert_eq!(json["message"], "Found 2 articles");
        assert_eq!(json["titles"][1], "A");
    }

    #[test]
    fn article_envelope_uses_null_when_missing() {
        let json = parsed(&QueryResult::Article {
            title: "Z".into(),
            article: None,
        });
        assert_eq!(json["operation"], "get_article_details");
        assert_eq!(json["title"], "Z");
        assert!(json["article"].is_null());
        assert_eq!(json["message"], "Article not found");
    }

    #[test]
    fn article_envelope_uses_persisted_key_names() {
        let json = parsed(&QueryResult::Article {
            title: "A".into(),
            article: Some(article("A")),
        });
        assert_eq!(json["article"]["Title"], "A");
        assert_eq!(json["article"]["Description"], "No description");
        assert_eq!(json["message"], "Article found");
    }

    #[test]
    fn update_renders_structured_even_in_text_mode() {
        let out = render(&QueryResult::Update { success: false }, OutputMode::Text);
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["operation"], "update_news");
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Failed to update news data");
    }

    #[test]
    fn envelope_keys_keep_declared_order() {
        let out = structured(&QueryResult::Articles(vec![]));
        let op = out.find("\"operation\"").unwrap();
        let articles = out.find("\"articles\"").unwrap();
        let count = out.find("\"total_count\"").unwrap();
        let message = out.find("\"message\"").unwrap();
        assert!(op < articles && articles < count && count < message);
        assert!(out.contains("\n  \"operation\": \"get_file_contents\""));
    }

    #[test]
    fn unknown_operation_error_has_null_operation() {
        let json = parsed(&QueryResult::Error {
            operation: None,
            error: "Invalid operation: x".into(),
        });
        assert!(json["operation"].is_null());
        assert_eq!(json["error"], "Invalid operation: x");
    }
}
