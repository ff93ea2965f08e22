//! NationStates API adapter: the live `resolution voters` shard and the
//! world `happenings` log, both served as XML over HTTPS.

use crate::config::ApiConfig;
use crate::error::{Result, VoteError};
use crate::event::{ActionLogPage, RawEvent};
use crate::live::{LiveSnapshot, LiveSource};
use crate::paginate::{LogSource, PageRequest};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Clone)]
pub struct NsClient {
    http: Client,
    base_url: String,
}

impl NsClient {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(api.user_agent.clone())
            .timeout(api.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get(&self, query: &str) -> Result<String> {
        let url = format!("{}/cgi-bin/api.cgi?{query}", self.base_url);
        debug!(url = %url, "GET");
        let resp = self.http.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(VoteError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }
        Ok(resp.text()?)
    }
}

impl LiveSource for NsClient {
    fn fetch_live(&mut self, chamber: &str) -> Result<Option<LiveSnapshot>> {
        let body = self.get(&format!("wa={chamber}&q=resolution+voters"))?;
        parse_live(&body)
    }
}

impl LogSource for NsClient {
    fn fetch_page(&mut self, request: &PageRequest) -> Result<ActionLogPage> {
        let mut query = format!(
            "q=happenings;filter=vote;limit={};sincetime={};beforetime={}",
            request.limit, request.since, request.before
        );
        if let Some(before_id) = request.before_id {
            query.push_str(&format!(";beforeid={before_id}"));
        }
        let body = self.get(&query)?;
        parse_happenings(&body)
    }
}

// ---------------------------------------------------------------------------
// XML shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WaXml {
    #[serde(rename = "RESOLUTION", default)]
    resolution: Option<ResolutionXml>,
}

#[derive(Debug, Default, Deserialize)]
struct ResolutionXml {
    #[serde(rename = "ID", default)]
    id: Option<String>,
    #[serde(rename = "NAME", default)]
    name: Option<String>,
    #[serde(rename = "PROMOTED", default)]
    promoted: Option<String>,
    #[serde(rename = "PROPOSED_BY", default)]
    proposed_by: Option<String>,
    #[serde(rename = "COAUTHOR", default)]
    coauthor: Option<NameList>,
    #[serde(rename = "VOTES_FOR", default)]
    votes_for: Option<NameList>,
    #[serde(rename = "VOTES_AGAINST", default)]
    votes_against: Option<NameList>,
}

#[derive(Debug, Default, Deserialize)]
struct NameList {
    #[serde(rename = "N", default)]
    names: Vec<String>,
}

impl NameList {
    fn into_names(list: Option<NameList>) -> Vec<String> {
        list.map(|l| l.names).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct WorldXml {
    #[serde(rename = "HAPPENINGS", default)]
    happenings: Option<HappeningsXml>,
}

#[derive(Debug, Default, Deserialize)]
struct HappeningsXml {
    #[serde(rename = "EVENT", default)]
    events: Vec<EventXml>,
}

#[derive(Debug, Deserialize)]
struct EventXml {
    #[serde(rename = "@id", default)]
    id: Option<String>,
    #[serde(rename = "TIMESTAMP", default)]
    timestamp: Option<String>,
    #[serde(rename = "TEXT", default)]
    text: String,
}

/// Parse a `resolution voters` response. An empty `RESOLUTION` element means
/// nothing is at vote.
pub fn parse_live(xml: &str) -> Result<Option<LiveSnapshot>> {
    let wa: WaXml = quick_xml::de::from_str(xml)?;
    let Some(resolution) = wa.resolution else {
        return Ok(None);
    };
    let Some(id) = resolution.id.filter(|id| !id.trim().is_empty()) else {
        return Ok(None);
    };
    let name = resolution
        .name
        .ok_or_else(|| VoteError::MalformedSnapshot(format!("resolution {id} has no NAME")))?;
    let promoted = resolution
        .promoted
        .as_deref()
        .and_then(|p| p.trim().parse::<i64>().ok())
        .ok_or_else(|| {
            VoteError::MalformedSnapshot(format!("resolution {id} has no usable PROMOTED"))
        })?;

    Ok(Some(LiveSnapshot {
        resolution_id: id.trim().to_string(),
        name,
        promoted,
        proposed_by: resolution.proposed_by,
        coauthors: NameList::into_names(resolution.coauthor),
        votes_for: NameList::into_names(resolution.votes_for),
        votes_against: NameList::into_names(resolution.votes_against),
    }))
}

/// Parse a `happenings` response. Unparseable ids or timestamps are kept as
/// absent so the event parser can skip the entry.
pub fn parse_happenings(xml: &str) -> Result<ActionLogPage> {
    let world: WorldXml = quick_xml::de::from_str(xml)?;
    let events = world.happenings.map(|h| h.events).unwrap_or_default();
    Ok(events
        .into_iter()
        .map(|e| RawEvent {
            text: e.text,
            timestamp: e.timestamp.and_then(|t| t.trim().parse().ok()),
            id: e.id.and_then(|i| i.trim().parse().ok()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const LIVE_XML: &str = r#"<WA council="1">
<RESOLUTION>
<CATEGORY>Environmental</CATEGORY>
<COAUTHOR><N>helper_one</N><N>helper_two</N></COAUTHOR>
<ID>ga_612</ID>
<NAME>Clean Air</NAME>
<PROMOTED>1700000000</PROMOTED>
<PROPOSED_BY>author_nation</PROPOSED_BY>
<VOTES_AGAINST><N>c</N></VOTES_AGAINST>
<VOTES_FOR><N>a</N><N>b</N></VOTES_FOR>
</RESOLUTION>
</WA>"#;

    const HAPPENINGS_XML: &str = r#"<WORLD>
<HAPPENINGS>
<EVENT id="902"><TIMESTAMP>1700000300</TIMESTAMP><TEXT><![CDATA[@@d@@ voted for the World Assembly Resolution "Clean Air".]]></TEXT></EVENT>
<EVENT id="901"><TIMESTAMP>1700000200</TIMESTAMP><TEXT><![CDATA[@@b@@ voted against the World Assembly Resolution "Clean Air".]]></TEXT></EVENT>
<EVENT id="oops"><TIMESTAMP>1700000100</TIMESTAMP><TEXT><![CDATA[@@e@@ voted for the World Assembly Resolution "Clean Air".]]></TEXT></EVENT>
</HAPPENINGS>
</WORLD>"#;

    fn api(base_url: String) -> ApiConfig {
        ApiConfig {
            base_url,
            ..ApiConfig::default()
        }
    }

    #[test]
    fn parses_live_resolution() {
        let live = parse_live(LIVE_XML).unwrap().unwrap();
        assert_eq!(live.resolution_id, "ga_612");
        assert_eq!(live.name, "Clean Air");
        assert_eq!(live.promoted, 1_700_000_000);
        assert_eq!(live.proposed_by.as_deref(), Some("author_nation"));
        assert_eq!(live.coauthors, vec!["helper_one", "helper_two"]);
        assert_eq!(live.votes_for, vec!["a", "b"]);
        assert_eq!(live.votes_against, vec!["c"]);
    }

    #[test]
    fn empty_resolution_means_nothing_at_vote() {
        assert!(parse_live(r#"<WA council="2"><RESOLUTION></RESOLUTION></WA>"#)
            .unwrap()
            .is_none());
        assert!(parse_live(r#"<WA council="2"></WA>"#).unwrap().is_none());
    }

    #[test]
    fn live_without_promoted_is_malformed() {
        let xml = r#"<WA council="1"><RESOLUTION><ID>9</ID><NAME>X</NAME></RESOLUTION></WA>"#;
        assert!(matches!(
            parse_live(xml),
            Err(VoteError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn parses_happenings_page() {
        let page = parse_happenings(HAPPENINGS_XML).unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].id, Some(902));
        assert_eq!(page[0].timestamp, Some(1_700_000_300));
        assert!(page[0].text.starts_with("@@d@@ voted for"));
        assert_eq!(page[2].id, None);
    }

    #[test]
    fn empty_happenings() {
        assert!(parse_happenings("<WORLD><HAPPENINGS></HAPPENINGS></WORLD>")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn fetches_live_over_http() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/cgi-bin/api.cgi")
            .match_query(Matcher::Regex("wa=1&q=resolution\\+voters".to_string()))
            .match_header("user-agent", "WA voting recorder (votewatch)")
            .with_body(LIVE_XML)
            .create();

        let mut client = NsClient::new(&api(server.url())).unwrap();
        let live = client.fetch_live("1").unwrap().unwrap();
        assert_eq!(live.resolution_id, "ga_612");
        mock.assert();
    }

    #[test]
    fn fetches_happenings_with_cursor() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/cgi-bin/api.cgi")
            .match_query(Matcher::Regex(
                "q=happenings;filter=vote;limit=50;sincetime=10;beforetime=20;beforeid=903"
                    .to_string(),
            ))
            .with_body(HAPPENINGS_XML)
            .create();

        let mut client = NsClient::new(&api(server.url())).unwrap();
        let page = client
            .fetch_page(&PageRequest {
                since: 10,
                before: 20,
                limit: 50,
                before_id: Some(903),
            })
            .unwrap();
        assert_eq!(page.len(), 3);
        mock.assert();
    }

    #[test]
    fn http_errors_surface_status() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/cgi-bin/api.cgi")
            .match_query(Matcher::Any)
            .with_status(429)
            .create();

        let mut client = NsClient::new(&api(server.url())).unwrap();
        let err = client.fetch_live("2").unwrap_err();
        assert!(matches!(err, VoteError::HttpStatus { status: 429, .. }));
    }
}
