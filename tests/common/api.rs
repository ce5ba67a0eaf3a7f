//! Mock regulations.gov endpoints

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A comment served by the mock API
pub struct MockComment {
    /// Comment id
    pub id: String,
    /// Inline text on the detail endpoint
    pub text: String,
    /// Attachment file URLs, one attachment each
    pub attachments: Vec<String>,
}

impl MockComment {
    /// Comment with inline text and no attachments
    pub fn inline(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            attachments: Vec::new(),
        }
    }
}

/// Serve one page of documents for `docket`, one per object id
pub async fn mount_documents(server: &MockServer, docket: &str, object_ids: &[&str]) {
    let data: Vec<Value> = object_ids
        .iter()
        .enumerate()
        .map(|(i, object_id)| {
            json!({
                "id": format!("{docket}-{:04}", i + 1),
                "type": "documents",
                "attributes": {"objectId": object_id, "documentType": "Proposed Rule"}
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/documents"))
        .and(query_param("filter[docketId]", docket))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": data,
            "meta": {"hasNextPage": false, "totalElements": object_ids.len()}
        })))
        .mount(server)
        .await;
}

/// Serve the comment listing of `object_id` (one page) and each comment's detail
pub async fn mount_comments(server: &MockServer, object_id: &str, comments: &[MockComment]) {
    let data: Vec<Value> = comments
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "type": "comments",
                "attributes": {"title": format!("Comment {}", c.id), "documentType": "Public Submission"}
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/comments"))
        .and(query_param("filter[commentOnId]", object_id))
        .and(query_param("sort", "postedDate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": data,
            "meta": {"hasNextPage": false, "totalElements": comments.len()}
        })))
        .mount(server)
        .await;

    for comment in comments {
        mount_detail(server, comment).await;
    }
}

/// Serve `GET /comments/{id}?include=attachments`
pub async fn mount_detail(server: &MockServer, comment: &MockComment) {
    let included: Vec<Value> = comment
        .attachments
        .iter()
        .map(|url| {
            json!({
                "type": "attachments",
                "attributes": {"fileFormats": [{"fileUrl": url, "format": "pdf"}]}
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/comments/{}", comment.id)))
        .and(query_param("include", "attachments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": comment.id,
                "type": "comments",
                "attributes": {
                    "title": format!("Comment {}", comment.id),
                    "comment": comment.text,
                    "postedDate": "2020-06-01T04:00:00Z",
                    "documentType": "Public Submission"
                }
            },
            "included": included
        })))
        .mount(server)
        .await;
}

/// Serve raw file bytes at `route`
pub async fn mount_file(server: &MockServer, route: &str, bytes: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .mount(server)
        .await;
}
