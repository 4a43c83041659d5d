use std::time::Duration;

use parallels_engine::{
    ClientSettings, DocumentRecord, FailureKind, IngestBody, IngestMetadataBody,
    RemoteSearchClient, ReqwestSearchClient, ResultsQuery, SearchMethod, SearchRequest,
    StageRecord, WireStatus,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestSearchClient {
    let base = Url::parse(&format!("{}/api/", server.uri())).unwrap();
    ReqwestSearchClient::new(ClientSettings::new(base)).unwrap()
}

fn search_request() -> SearchRequest {
    SearchRequest {
        source: "aeneid".to_string(),
        target: "thebaid".to_string(),
        language: "latin".to_string(),
        unit_type: "phrase".to_string(),
        method: SearchMethod {
            name: "original".to_string(),
            feature: "lemma".to_string(),
            stopwords: 10,
            stoplist_basis: "corpus".to_string(),
            score_basis: "word".to_string(),
            freq_basis: "corpus".to_string(),
            max_distance: 10,
            distance_basis: "frequency".to_string(),
        },
        min_score: 6.0,
    }
}

#[tokio::test]
async fn submit_posts_request_and_returns_search_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search/"))
        .and(body_json(search_request()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"search_id": "abc123"})))
        .expect(1)
        .mount(&server)
        .await;

    let id = client_for(&server).submit(&search_request()).await.unwrap();
    assert_eq!(id, "abc123");
}

#[tokio::test]
async fn status_accepts_value_alias_for_fraction() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search/abc123/status/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "running",
            "stages": [
                {"stage": "matching", "value": 0.5},
                {"stage": "scoring", "fraction": 0.0}
            ]
        })))
        .mount(&server)
        .await;

    let status = client_for(&server).poll_status("abc123").await.unwrap();
    assert_eq!(status.status, WireStatus::Running);
    assert_eq!(
        status.stages,
        vec![
            StageRecord {
                stage: "matching".to_string(),
                fraction: 0.5
            },
            StageRecord {
                stage: "scoring".to_string(),
                fraction: 0.0
            },
        ]
    );
    assert_eq!(status.message, None);
}

#[tokio::test]
async fn results_send_paging_query_and_accept_object_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search/abc123/results/"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "50"))
        .and(query_param("sort_by", "score"))
        .and(query_param("sort_order", "descending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "object_id": "r1",
                "source_tag": "Aeneid 1.1",
                "target_tag": "Thebaid 1.1",
                "source_snippet": "arma virumque cano",
                "target_snippet": "fraternas acies",
                "highlight": [[0, 1]],
                "matched_features": ["arma"],
                "score": 7.5
            }],
            "total_count": 120
        })))
        .mount(&server)
        .await;

    let query = ResultsQuery {
        page: 2,
        per_page: 50,
        sort_by: "score".to_string(),
        sort_order: "descending".to_string(),
    };
    let page = client_for(&server)
        .fetch_results("abc123", &query)
        .await
        .unwrap();
    assert_eq!(page.total_count, 120);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].id, "r1");
    assert_eq!(page.results[0].highlight, vec![(0, 1)]);
}

#[tokio::test]
async fn corpus_is_filtered_by_language() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/texts/"))
        .and(query_param("language", "latin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "object_id": "t1",
            "author": "Vergil",
            "title": "Aeneid",
            "year": -19,
            "is_prose": false,
            "language": "latin"
        }])))
        .mount(&server)
        .await;

    let docs = client_for(&server).fetch_corpus("latin").await.unwrap();
    assert_eq!(
        docs,
        vec![DocumentRecord {
            id: "t1".to_string(),
            author: "Vergil".to_string(),
            title: "Aeneid".to_string(),
            year: -19,
            is_prose: false,
            language: "latin".to_string(),
        }]
    );
}

#[tokio::test]
async fn ingest_posts_metadata_and_content() {
    let server = MockServer::start().await;
    let body = IngestBody {
        metadata: IngestMetadataBody {
            author: "Statius".to_string(),
            title: "Thebaid".to_string(),
            year: 92,
            is_prose: false,
            language: "latin".to_string(),
        },
        content: "<thebaid 1.1> fraternas acies".to_string(),
    };
    Mock::given(method("POST"))
        .and(path("/api/texts/"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"document_id": "t9"})))
        .mount(&server)
        .await;

    let id = client_for(&server).ingest(&body).await.unwrap();
    assert_eq!(id, "t9");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search/gone/status/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server).poll_status("gone").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn unexpected_payload_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search/abc123/status/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "exploded"})))
        .mount(&server)
        .await;

    let err = client_for(&server).poll_status("abc123").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/texts/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
        .mount(&server)
        .await;

    let mut settings =
        ClientSettings::new(Url::parse(&format!("{}/api/", server.uri())).unwrap());
    settings.max_response_bytes = 16;
    let client = ReqwestSearchClient::new(settings).unwrap();

    let err = client.fetch_corpus("latin").await.unwrap_err();
    assert!(matches!(
        err.kind,
        FailureKind::TooLarge { max_bytes: 16, .. }
    ));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search/slow/status/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"status": "queued"})),
        )
        .mount(&server)
        .await;

    let mut settings =
        ClientSettings::new(Url::parse(&format!("{}/api/", server.uri())).unwrap());
    settings.request_timeout = Duration::from_millis(50);
    let client = ReqwestSearchClient::new(settings).unwrap();

    let err = client.poll_status("slow").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}
