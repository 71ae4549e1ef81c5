use chrono::NaiveDateTime;

use crate::format::{render, OutputMode};
use crate::manager::FeedManager;
use crate::query::QueryResult;

/// `Current Date: Wednesday, Oct 01, 2025  Current Time: 2:10 PM`
pub fn date_time_header(now: NaiveDateTime) -> String {
    format!(
        "Current Date: {}  Current Time: {}",
        now.format("%A, %b %d, %Y"),
        now.format("%-I:%M %p")
    )
}

/// News block handed to the assistant: the date/time header followed by the
/// text dump of every cached article. Reads the store only.
pub async fn news_context(manager: &FeedManager, now: NaiveDateTime) -> String {
    let articles = manager.dump_all().await;
    let news = render(&QueryResult::Articles(articles), OutputMode::Text);
    format!("{}\n{}", date_time_header(now), news)
}
