use common::{Article, SourceConfig, NO_DESCRIPTION};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::{FeedError, Result};

/// Anything that can turn a list of sensor names into articles.
///
/// The manager only talks to this trait, so tests can swap the HTTP client
/// for an in-memory source.
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch every sensor in order and concatenate their items.
    /// The first failing sensor aborts the whole fetch.
    async fn fetch(&self, sensors: &[String], credential: &str) -> Result<Vec<Article>>;
}

/// Reads sensor states from the Home Assistant REST API.
pub struct FeedSourceClient {
    base_url: Url,
    client: Client,
}

impl FeedSourceClient {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FeedError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FeedError::InvalidBaseUrl(config.base_url.clone()));
        }

        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.connect_timeout_seconds {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(FeedError::ClientBuild)?;

        Ok(Self { base_url, client })
    }

    /// `{base_url}/api/states/{sensor}`
    pub fn sensor_url(&self, sensor: &str) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in `new`, so segments are always available
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "states", sensor]);
        }
        url
    }

    async fn fetch_sensor(&self, sensor: &str, credential: &str) -> Result<Vec<Article>> {
        let url = self.sensor_url(sensor);
        debug!(sensor, %url, "requesting sensor state");

        let response = self
            .client
            .get(url)
            .bearer_auth(credential)
            .send()
            .await
            .map_err(|e| FeedError::unavailable(sensor, e))?
            .error_for_status()
            .map_err(|e| FeedError::unavailable(sensor, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::unavailable(sensor, e))?;

        parse_sensor_state(sensor, &body)
    }
}

#[async_trait::async_trait]
impl ArticleSource for FeedSourceClient {
    async fn fetch(&self, sensors: &[String], credential: &str) -> Result<Vec<Article>> {
        let mut articles = Vec::new();
        for sensor in sensors {
            let items = self.fetch_sensor(sensor, credential).await?;
            info!(sensor = %sensor, items = items.len(), "fetched sensor feed");
            articles.extend(items);
        }
        Ok(articles)
    }
}

// Only the path down to the item list is modelled; everything else in the
// sensor state is ignored.
#[derive(Deserialize)]
struct SensorState {
    attributes: Attributes,
}

#[derive(Deserialize)]
struct Attributes {
    rss: RssAttribute,
}

#[derive(Deserialize)]
struct RssAttribute {
    channel: Channel,
}

#[derive(Deserialize)]
struct Channel {
    item: Vec<RawItem>,
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(rename = "pubDate")]
    pub_date: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    link: String,
}

/// Extract the articles from a raw sensor state body.
///
/// Pure function: no I/O, so the mapping can be tested without a server.
pub fn parse_sensor_state(sensor: &str, body: &[u8]) -> Result<Vec<Article>> {
    let state: SensorState = serde_json::from_slice(body)
        .map_err(|e| FeedError::malformed(sensor, format!("attributes.rss.channel.item: {}", e)))?;

    state
        .attributes
        .rss
        .channel
        .item
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            if item.title.trim().is_empty() {
                return Err(FeedError::malformed(sensor, format!("item {} has an empty title", idx)));
            }
            Ok(Article {
                published: item.pub_date,
                title: item.title,
                description: item.description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                link: item.link,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base_url: &str) -> FeedSourceClient {
        let config = SourceConfig {
            base_url: base_url.to_string(),
            ..SourceConfig::default()
        };
        FeedSourceClient::new(&config).expect("client")
    }

    #[test]
    fn parse_maps_items_in_order() {
        let body = br#"{
            "entity_id": "sensor.news",
            "state": "ok",
            "attributes": {
                "rss": {
                    "channel": {
                        "title": "Global News",
                        "item": [
                            {"pubDate": "Mon, 01 Jan 2024", "title": "A", "link": "http://x"},
                            {"pubDate": "Tue, 02 Jan 2024", "title": "B", "description": "d", "link": "http://y", "guid": "g"}
                        ]
                    }
                }
            }
        }"#;

        let articles = parse_sensor_state("sensor.news", body).unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "A");
        assert_eq!(articles[0].published, "Mon, 01 Jan 2024");
        assert_eq!(articles[0].description, NO_DESCRIPTION);
        assert_eq!(articles[1].description, "d");
        assert_eq!(articles[1].link, "http://y");
    }

    #[test]
    fn null_description_gets_sentinel() {
        let body = br#"{"attributes":{"rss":{"channel":{"item":[
            {"pubDate":"p","title":"t","description":null,"link":"l"}
        ]}}}}"#;
        let articles = parse_sensor_state("s", body).unwrap();
        assert_eq!(articles[0].description, NO_DESCRIPTION);
    }

    #[test]
    fn missing_item_list_is_malformed() {
        let body = br#"{"attributes":{"rss":{"channel":{"title":"x"}}}}"#;
        let err = parse_sensor_state("sensor.empty", body).unwrap_err();
        match err {
            FeedError::MalformedPayload { sensor, .. } => assert_eq!(sensor, "sensor.empty"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn item_that_is_not_a_sequence_is_malformed() {
        let body = br#"{"attributes":{"rss":{"channel":{"item":{"pubDate":"p","title":"t","link":"l"}}}}}"#;
        assert!(matches!(
            parse_sensor_state("s", body),
            Err(FeedError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn item_missing_link_is_malformed() {
        let body = br#"{"attributes":{"rss":{"channel":{"item":[{"pubDate":"p","title":"t"}]}}}}"#;
        let err = parse_sensor_state("s", body).unwrap_err();
        assert!(err.to_string().contains("link"));
    }

    #[test]
    fn empty_title_is_malformed() {
        let body = br#"{"attributes":{"rss":{"channel":{"item":[{"pubDate":"p","title":"  ","link":"l"}]}}}}"#;
        assert!(matches!(
            parse_sensor_state("s", body),
            Err(FeedError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(
            parse_sensor_state("s", b"<html>502</html>"),
            Err(FeedError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn sensor_url_joins_base_and_entity() {
        let client = client_for("http://192.168.1.10:8123");
        assert_eq!(
            client.sensor_url("sensor.global_news_main_rest").as_str(),
            "http://192.168.1.10:8123/api/states/sensor.global_news_main_rest"
        );

        let client = client_for("http://ha.lan:8123/");
        assert_eq!(client.sensor_url("sensor.a").as_str(), "http://ha.lan:8123/api/states/sensor.a");
    }

    #[test]
    fn rejects_unusable_base_url() {
        let config = SourceConfig {
            base_url: "mailto:someone@example.com".to_string(),
            ..SourceConfig::default()
        };
        assert!(matches!(
            FeedSourceClient::new(&config),
            Err(FeedError::InvalidBaseUrl(_))
        ));
    }
}
