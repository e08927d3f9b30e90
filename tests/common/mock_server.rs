//! Stateful fakes of the external storage services
//!
//! Both fakes are `wiremock` responders mounted on a catch-all mock, so
//! they can keep state between requests the way the real services do.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const DISK_TOKEN: &str = "disk-token";
pub const GITHUB_TOKEN: &str = "gh-token";
pub const GITHUB_OWNER: &str = "acme";

fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}

fn authorized(request: &Request, token: &str) -> bool {
    header(request, "authorization") == Some(format!("Bearer {}", token).as_str())
}

/// In-memory disk service: one text file per `(storeId, filename)`
#[derive(Clone, Default)]
pub struct FakeDiskService {
    files: Arc<Mutex<BTreeMap<(String, String), String>>>,
}

impl FakeDiskService {
    pub async fn start() -> (MockServer, Self) {
        let server = MockServer::start().await;
        let fake = Self::default();
        Mock::given(any())
            .respond_with(fake.clone())
            .mount(&server)
            .await;
        (server, fake)
    }

    pub fn insert(&self, store_id: &str, filename: &str, document: &Value) {
        self.files.lock().unwrap().insert(
            (store_id.to_string(), filename.to_string()),
            document.to_string(),
        );
    }

    pub fn get(&self, store_id: &str, filename: &str) -> Option<Value> {
        self.files
            .lock()
            .unwrap()
            .get(&(store_id.to_string(), filename.to_string()))
            .map(|text| serde_json::from_str(text).unwrap())
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

impl Respond for FakeDiskService {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if !authorized(request, DISK_TOKEN) {
            return ResponseTemplate::new(401).set_body_string("bad token");
        }
        let Some(store_id) = header(request, "storeId").map(str::to_string) else {
            return ResponseTemplate::new(400).set_body_string("missing storeId");
        };
        let filename = header(request, "filename").unwrap_or_default().to_string();
        let key = (store_id.clone(), filename);
        let mut files = self.files.lock().unwrap();

        match (request.method.as_str(), request.url.path()) {
            ("GET", "/json") => match files.get(&key) {
                Some(text) => ResponseTemplate::new(200).set_body_string(text.clone()),
                None => ResponseTemplate::new(404).set_body_string("file not found"),
            },
            ("POST", "/json") => {
                let text = String::from_utf8(request.body.clone()).unwrap();
                files.insert(key, text);
                ResponseTemplate::new(200).set_body_json(json!({ "ok": true }))
            }
            ("DELETE", "/create-json") => match files.remove(&key) {
                Some(_) => ResponseTemplate::new(200).set_body_json(json!({ "ok": true })),
                None => ResponseTemplate::new(404).set_body_string("file not found"),
            },
            ("GET", "/list-json") => {
                let json_files: Vec<String> = files
                    .keys()
                    .filter(|(store, _)| *store == store_id)
                    .map(|(_, name)| format!("{}.json", name))
                    .collect();
                ResponseTemplate::new(200).set_body_json(json!({ "json_files": json_files }))
            }
            _ => ResponseTemplate::new(405),
        }
    }
}

#[derive(Clone)]
struct RepoFile {
    sha: String,
    text: String,
}

/// In-memory GitHub contents API for repositories owned by [`GITHUB_OWNER`]
#[derive(Clone, Default)]
pub struct FakeGitHub {
    files: Arc<Mutex<HashMap<(String, String), RepoFile>>>,
    next_sha: Arc<AtomicU64>,
    concurrent_writer: Arc<AtomicBool>,
}

impl FakeGitHub {
    pub async fn start() -> (MockServer, Self) {
        let server = MockServer::start().await;
        let fake = Self::default();
        Mock::given(any())
            .respond_with(fake.clone())
            .mount(&server)
            .await;
        (server, fake)
    }

    fn sha(&self) -> String {
        format!("sha-{}", self.next_sha.fetch_add(1, Ordering::SeqCst))
    }

    pub fn insert(&self, repo: &str, path: &str, document: &Value) {
        let file = RepoFile {
            sha: self.sha(),
            text: serde_json::to_string_pretty(document).unwrap(),
        };
        self.files
            .lock()
            .unwrap()
            .insert((repo.to_string(), path.to_string()), file);
    }

    pub fn get(&self, repo: &str, path: &str) -> Option<Value> {
        self.files
            .lock()
            .unwrap()
            .get(&(repo.to_string(), path.to_string()))
            .map(|file| serde_json::from_str(&file.text).unwrap())
    }

    pub fn sha_of(&self, repo: &str, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(&(repo.to_string(), path.to_string()))
            .map(|file| file.sha.clone())
    }

    /// Make the next write lose a race: the file's sha changes between the
    /// adapter's read and its write
    pub fn simulate_concurrent_writer(&self) {
        self.concurrent_writer.store(true, Ordering::SeqCst);
    }

    fn read(&self, files: &HashMap<(String, String), RepoFile>, repo: &str, path: &str) -> ResponseTemplate {
        if let Some(file) = files.get(&(repo.to_string(), path.to_string())) {
            // GitHub wraps base64 content at 60 columns
            let encoded = STANDARD.encode(&file.text);
            let wrapped = encoded
                .as_bytes()
                .chunks(60)
                .map(|chunk| std::str::from_utf8(chunk).unwrap())
                .collect::<Vec<_>>()
                .join("\n");
            return ResponseTemplate::new(200).set_body_json(json!({
                "type": "file",
                "path": path,
                "sha": file.sha,
                "encoding": "base64",
                "content": wrapped,
            }));
        }

        let prefix = format!("{}/", path);
        let mut entries: Vec<Value> = files
            .keys()
            .filter(|(r, p)| r == repo && p.starts_with(&prefix))
            .map(|(_, p)| {
                json!({
                    "type": "file",
                    "name": p.trim_start_matches(&prefix),
                    "path": p,
                })
            })
            .collect();
        if entries.is_empty() {
            return ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" }));
        }
        entries.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
        ResponseTemplate::new(200).set_body_json(Value::Array(entries))
    }
}

impl Respond for FakeGitHub {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if !authorized(request, GITHUB_TOKEN) {
            return ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" }));
        }

        // /repos/{owner}/{repo}/contents/{path}
        let path = request.url.path().trim_start_matches('/');
        let parts: Vec<&str> = path.splitn(5, '/').collect();
        let [_, owner, repo, "contents", file_path] = parts.as_slice() else {
            return ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" }));
        };
        if *owner != GITHUB_OWNER {
            return ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" }));
        }
        let key = (repo.to_string(), file_path.to_string());
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let mut files = self.files.lock().unwrap();

        if request.method.as_str() != "GET" && self.concurrent_writer.swap(false, Ordering::SeqCst) {
            if let Some(file) = files.get_mut(&key) {
                file.sha = self.sha();
            }
        }

        let current_sha = files.get(&key).map(|file| file.sha.clone());
        let sent_sha = body["sha"].as_str().map(str::to_string);

        match request.method.as_str() {
            "GET" => self.read(&files, repo, file_path),
            "PUT" => {
                match (&current_sha, &sent_sha) {
                    (Some(_), None) => {
                        return ResponseTemplate::new(422)
                            .set_body_json(json!({ "message": "\"sha\" wasn't supplied." }))
                    }
                    (Some(current), Some(sent)) if current != sent => {
                        return ResponseTemplate::new(409)
                            .set_body_json(json!({ "message": "does not match" }))
                    }
                    _ => {}
                }
                let encoded = body["content"].as_str().unwrap_or_default();
                let text = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
                let sha = self.sha();
                files.insert(key, RepoFile { sha: sha.clone(), text });
                let status = if current_sha.is_some() { 200 } else { 201 };
                ResponseTemplate::new(status).set_body_json(json!({ "content": { "sha": sha } }))
            }
            "DELETE" => match (&current_sha, &sent_sha) {
                (None, _) => ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })),
                (Some(current), Some(sent)) if current == sent => {
                    files.remove(&key);
                    ResponseTemplate::new(200).set_body_json(json!({ "commit": {} }))
                }
                _ => ResponseTemplate::new(409).set_body_json(json!({ "message": "does not match" })),
            },
            _ => ResponseTemplate::new(405),
        }
    }
}
