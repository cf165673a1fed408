// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
#![allow(dead_code)]

//! Shared fixtures: a fully composed router with stub collaborators

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use secure_gateway::{
    api::{create_app, GatewayComponents, GatewayError},
    clients::{InMemorySessionStore, ProfileClient, ProfileError, UserProfile},
    crypto::{encrypt, generate_key_pair, EncryptedEnvelope},
    gateway::{JwtClaims, JwtValidator, MaintenanceGate, RoutePolicy, Upstream},
    keys::{InMemoryKeyStore, KeyManager, KeyStore},
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

pub const JWT_SECRET: &[u8] = b"integration-secret";
pub const USER_ID: &str = "user-42";
pub const SECURED_PATH: &str = "/user/v1/accounts";

/// Profile service that knows a fixed set of users
pub struct StubProfiles {
    known: HashSet<String>,
    failing: bool,
}

impl StubProfiles {
    pub fn knowing(users: &[&str]) -> Self {
        Self {
            known: users.iter().map(|s| s.to_string()).collect(),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            known: HashSet::new(),
            failing: true,
        }
    }
}

#[async_trait]
impl ProfileClient for StubProfiles {
    async fn query_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileError> {
        if self.failing {
            return Err(ProfileError::Transport("connection refused".to_string()));
        }
        Ok(self.known.contains(user_id).then(|| UserProfile {
            user_id: Some(user_id.to_string()),
            attributes: Default::default(),
        }))
    }
}

type Reply = dyn Fn(&[u8]) -> Vec<u8> + Send + Sync;

/// Backend stand-in that records every body it receives
pub struct RecordingUpstream {
    seen: Mutex<Vec<(String, Vec<u8>)>>,
    seen_headers: Mutex<Vec<HeaderMap>>,
    reply: Box<Reply>,
    reply_headers: Vec<(&'static str, &'static str)>,
}

impl RecordingUpstream {
    /// Answers `{"op":"ping"}` with `{"op":"pong"}` and echoes anything else
    pub fn ping_pong() -> Self {
        Self::replying(|body| {
            if body == br#"{"op":"ping"}"# {
                br#"{"op":"pong"}"#.to_vec()
            } else {
                body.to_vec()
            }
        })
    }

    pub fn replying(reply: impl Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            seen_headers: Mutex::new(Vec::new()),
            reply: Box::new(reply),
            reply_headers: Vec::new(),
        }
    }

    /// Adds a header to every reply
    pub fn with_reply_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.reply_headers.push((name, value));
        self
    }

    pub fn seen(&self) -> Vec<(String, Vec<u8>)> {
        self.seen.lock().unwrap().clone()
    }

    /// Request headers in arrival order
    pub fn seen_headers(&self) -> Vec<HeaderMap> {
        self.seen_headers.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for RecordingUpstream {
    async fn forward(&self, request: Request<Body>) -> Result<Response, GatewayError> {
        let path = request.uri().path().to_string();
        self.seen_headers.lock().unwrap().push(request.headers().clone());
        let body = to_bytes(request.into_body(), usize::MAX)
            .await
            .map_err(|e| GatewayError::UpstreamUnavailable(e.to_string()))?;
        let reply = (self.reply)(&body);
        self.seen.lock().unwrap().push((path, body.to_vec()));
        let mut response = (StatusCode::OK, reply).into_response();
        for (name, value) in &self.reply_headers {
            response
                .headers_mut()
                .insert(*name, HeaderValue::from_static(value));
        }
        Ok(response)
    }
}

pub struct TestGateway {
    pub app: Router,
    pub keys: Arc<KeyManager>,
    pub key_store: InMemoryKeyStore,
    pub sessions: InMemorySessionStore,
    pub upstream: Arc<RecordingUpstream>,
    pub maintenance: Arc<MaintenanceGate>,
}

pub struct GatewayBuilder {
    policy: RoutePolicy,
    profiles: Arc<dyn ProfileClient>,
    upstream: Arc<RecordingUpstream>,
    key_store: Option<Arc<dyn KeyStore>>,
    max_body_bytes: usize,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self {
            policy: RoutePolicy::default(),
            profiles: Arc::new(StubProfiles::knowing(&[USER_ID])),
            upstream: Arc::new(RecordingUpstream::ping_pong()),
            key_store: None,
            max_body_bytes: 64 * 1024,
        }
    }

    pub fn policy(mut self, policy: RoutePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn profiles(mut self, profiles: impl ProfileClient + 'static) -> Self {
        self.profiles = Arc::new(profiles);
        self
    }

    pub fn upstream(mut self, upstream: RecordingUpstream) -> Self {
        self.upstream = Arc::new(upstream);
        self
    }

    /// Lazily initialised manager over `store` instead of an eager one
    pub fn key_store(mut self, store: impl KeyStore + 'static) -> Self {
        self.key_store = Some(Arc::new(store));
        self
    }

    pub async fn build(self) -> TestGateway {
        let key_store = InMemoryKeyStore::new();
        let keys = match self.key_store {
            Some(store) => KeyManager::new(store),
            None => KeyManager::initialize(Arc::new(key_store.clone())).await.unwrap(),
        };
        let keys = Arc::new(keys);
        let policy = Arc::new(self.policy);
        let sessions = InMemorySessionStore::new();
        let maintenance = Arc::new(MaintenanceGate::new(policy.clone(), false));

        let app = create_app(GatewayComponents {
            keys: keys.clone(),
            policy,
            validator: Arc::new(JwtValidator::new(JWT_SECRET)),
            profiles: self.profiles,
            sessions: Arc::new(sessions.clone()),
            upstream: self.upstream.clone(),
            maintenance: maintenance.clone(),
            max_body_bytes: self.max_body_bytes,
        });

        TestGateway {
            app,
            keys,
            key_store,
            sessions,
            upstream: self.upstream,
            maintenance,
        }
    }
}

impl TestGateway {
    pub async fn send(&self, request: Request<Body>) -> Response {
        use tower::util::ServiceExt;
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Token for `USER_ID` with a current web session
    pub async fn web_login(&self, roles: &[&str]) -> String {
        let token = issue_token(USER_ID, true, roles, 600);
        self.sessions.put_web_session(USER_ID, &token).await;
        token
    }

    pub async fn gateway_public_key(&self) -> [u8; 32] {
        *self.keys.active_key_pair().await.unwrap().public_key()
    }
}

fn now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64
}

/// Expiry timestamp `ttl_secs` from now
pub fn issue_exp(ttl_secs: i64) -> u64 {
    (now() + ttl_secs) as u64
}

/// HS256 token signed with `JWT_SECRET`, expiring `ttl_secs` from now
/// (negative values give an expired token)
pub fn issue_token(user_id: &str, is_web: bool, roles: &[&str], ttl_secs: i64) -> String {
    let claims = JwtClaims {
        user_id: user_id.to_string(),
        is_web,
        roles: roles.iter().map(|s| s.to_string()).collect(),
        exp: issue_exp(ttl_secs),
        iat: Some(now() as u64),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET)).unwrap()
}

/// Client side of an exchange
pub struct Client {
    pub public_key: [u8; 32],
    pub secret_key: [u8; 32],
}

impl Client {
    pub fn new() -> Self {
        let (public_key, secret_key) = generate_key_pair();
        Self {
            public_key,
            secret_key,
        }
    }

    pub fn seal(&self, plaintext: &[u8], gateway_public: &[u8; 32]) -> Vec<u8> {
        let envelope = encrypt(plaintext, gateway_public, &self.secret_key).unwrap();
        serde_json::to_vec(&envelope).unwrap()
    }

    pub fn open(&self, body: &[u8]) -> Vec<u8> {
        let envelope: EncryptedEnvelope = serde_json::from_slice(body).unwrap();
        let decoded = envelope.decode().unwrap();
        secure_gateway::crypto::decrypt(
            &decoded.cipher_text,
            &decoded.nonce,
            &decoded.public_key,
            &self.secret_key,
        )
        .unwrap()
    }
}

pub fn request(method: Method, path: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
