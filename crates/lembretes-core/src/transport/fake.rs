//! In-memory stand-in for the remote API, used by unit tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::api::{paths, Reminder, ReminderId};
use crate::error::ClientError;
use crate::session::Token;

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        _ => "",
    }
}

fn respond(status: u16, body: Value) -> ApiResponse {
    ApiResponse::new(status, reason(status), body.to_string())
}

fn empty(status: u16) -> ApiResponse {
    ApiResponse::new(status, reason(status), "")
}

#[derive(Default)]
struct FakeState {
    users: HashMap<String, String>,
    tokens: HashSet<String>,
    issued: u64,
    reminders: Vec<(u64, String)>,
    next_id: u64,
    calls: Vec<(Method, String)>,
    injected: Option<Result<ApiResponse, String>>,
    renew_fails: bool,
    renew_delay: Option<Duration>,
}

impl FakeState {
    fn issue_token(&mut self) -> String {
        self.issued += 1;
        let token = format!("token-{}", self.issued);
        self.tokens.insert(token.clone());
        token
    }

    fn authorized(&self, request: &ApiRequest) -> bool {
        request
            .bearer
            .as_ref()
            .is_some_and(|t| self.tokens.contains(t.as_str()))
    }

    fn field<'a>(request: &'a ApiRequest, name: &str) -> Option<&'a str> {
        request.body.as_ref()?.get(name)?.as_str()
    }

    fn handle(&mut self, request: &ApiRequest) -> ApiResponse {
        let segments: Vec<&str> = request.path.split('/').collect();

        match (request.method, segments.as_slice()) {
            (Method::Post, ["usuario", "signup"]) => self.signup(request),
            (Method::Post, ["usuario", "login"]) => self.login(request),
            (Method::Get, ["usuario", "renew"]) => self.renew(request),
            (method, ["lembrete", rest @ ..]) => {
                if !self.authorized(request) {
                    return respond(401, json!({"msg": "Token inválido"}));
                }
                match (method, rest) {
                    (Method::Get, []) => self.list(),
                    (Method::Post, []) => self.create(request),
                    (Method::Put, [id]) => self.update(id, request),
                    (Method::Delete, [id]) => self.delete(id),
                    _ => empty(405),
                }
            }
            _ => empty(404),
        }
    }

    fn signup(&mut self, request: &ApiRequest) -> ApiResponse {
        let (Some(login), Some(password)) =
            (Self::field(request, "login"), Self::field(request, "senha"))
        else {
            return respond(400, json!({"msg": "Login e senha são obrigatórios"}));
        };
        if self.users.contains_key(login) {
            return respond(409, json!({"msg": "Usuário já existe"}));
        }
        self.users.insert(login.to_string(), password.to_string());
        respond(201, json!({"login": login}))
    }

    fn login(&mut self, request: &ApiRequest) -> ApiResponse {
        let login = Self::field(request, "login").unwrap_or_default();
        let password = Self::field(request, "senha").unwrap_or_default();
        match self.users.get(login) {
            Some(stored) if stored == password => {
                let token = self.issue_token();
                respond(200, json!({ "token": token }))
            }
            _ => respond(401, json!({"msg": "Login ou senha inválidos"})),
        }
    }

    fn renew(&mut self, request: &ApiRequest) -> ApiResponse {
        if self.renew_fails || !self.authorized(request) {
            return empty(401);
        }
        if let Some(old) = &request.bearer {
            self.tokens.remove(old.as_str());
        }
        let token = self.issue_token();
        respond(200, json!({ "token": token }))
    }

    fn record(id: u64, text: &str) -> Value {
        json!({"id": id, "texto": text})
    }

    fn list(&self) -> ApiResponse {
        let records: Vec<Value> = self
            .reminders
            .iter()
            .map(|(id, text)| Self::record(*id, text))
            .collect();
        respond(200, Value::Array(records))
    }

    fn create(&mut self, request: &ApiRequest) -> ApiResponse {
        let text = Self::field(request, "texto").unwrap_or_default().to_string();
        self.next_id += 1;
        let id = self.next_id;
        let record = Self::record(id, &text);
        self.reminders.push((id, text));
        respond(201, record)
    }

    fn position(&self, id: &str) -> Option<usize> {
        let id: u64 = id.parse().ok()?;
        self.reminders.iter().position(|(existing, _)| *existing == id)
    }

    fn update(&mut self, id: &str, request: &ApiRequest) -> ApiResponse {
        let Some(index) = self.position(id) else {
            return respond(404, json!({"msg": "Lembrete não encontrado"}));
        };
        let text = Self::field(request, "texto").unwrap_or_default().to_string();
        self.reminders[index].1 = text;
        let (id, text) = &self.reminders[index];
        respond(200, Self::record(*id, text))
    }

    fn delete(&mut self, id: &str) -> ApiResponse {
        match self.position(id) {
            Some(index) => {
                self.reminders.remove(index);
                respond(200, json!({"msg": "Lembrete excluído"}))
            }
            None => respond(404, json!({"msg": "Lembrete não encontrado"})),
        }
    }
}

/// Behaves like the remote API for the routes the client uses.
///
/// Records every call so tests can assert on network traffic, and can be
/// told to fail renewals, delay them, or answer the next request with a
/// canned response.
#[derive(Default)]
pub(crate) struct FakeService {
    state: Mutex<FakeState>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(login: &str, password: &str) -> Self {
        let service = Self::new();
        service
            .state
            .lock()
            .unwrap()
            .users
            .insert(login.to_string(), password.to_string());
        service
    }

    /// A valid token, as if the user had logged in out of band.
    pub fn issue_token(&self) -> Token {
        Token::new(self.state.lock().unwrap().issue_token())
    }

    pub fn fail_next_with(&self, response: ApiResponse) {
        self.state.lock().unwrap().injected = Some(Ok(response));
    }

    pub fn fail_next_with_network_error(&self, message: &str) {
        self.state.lock().unwrap().injected = Some(Err(message.to_string()));
    }

    pub fn set_renew_fails(&self, fails: bool) {
        self.state.lock().unwrap().renew_fails = fails;
    }

    pub fn set_renew_delay(&self, delay: Duration) {
        self.state.lock().unwrap().renew_delay = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(m, p)| *m == method && p == path)
            .count()
    }

    pub fn stored_reminders(&self) -> Vec<Reminder> {
        self.state
            .lock()
            .unwrap()
            .reminders
            .iter()
            .map(|(id, text)| Reminder {
                id: ReminderId::from(*id),
                text: text.clone(),
            })
            .collect()
    }

    pub fn is_valid_token(&self, token: &Token) -> bool {
        self.state.lock().unwrap().tokens.contains(token.as_str())
    }
}

#[async_trait]
impl Transport for FakeService {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.calls.push((request.method, request.path.clone()));
            if request.path == paths::RENEW {
                state.renew_delay
            } else {
                None
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if let Some(injected) = state.injected.take() {
            return injected.map_err(ClientError::Network);
        }
        Ok(state.handle(&request))
    }
}
