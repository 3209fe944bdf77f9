#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use award_results::errors::{CustomResult, Error};
use award_results::modules::race_api::{SyncClient, Transport};

pub const BASE_URL: &str = "http://race.local/derby";
pub const ROLE: &str = "RaceCoordinator";
pub const PASSWORD: &str = "doyourbest";

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    /// the action of a POST or the query of a GET
    pub name: String,
    pub params: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// In memory stand-in for the race server.
///
/// Writes need a logged in session. `expire_session_times` makes that many
/// writes fail with `notauthorized` even after a login, `reject_all_writes`
/// makes every write fail that way.
#[derive(Debug, Default)]
pub struct FakeRaceServer {
    pub calls: Vec<RecordedCall>,
    pub logged_in: bool,
    pub expire_session_times: usize,
    pub reject_all_writes: bool,
    /// logins beyond this many are refused
    pub login_limit: Option<usize>,
    pub transport_down: bool,
    /// awards created through `award.edit` are left out of its response
    pub hide_created_awards: bool,
    /// actions that fail with the given code
    pub failing_actions: Vec<(String, String)>,
    /// queries that fail with the given code
    pub failing_queries: Vec<(String, String)>,
    /// fail `award.winner` for these award ids
    pub failing_award_ids: HashSet<i32>,
    /// fail `award.edit` for awards with these names
    pub failing_award_names: HashSet<String>,
    pub awards: Vec<(i32, String, i32)>,
    pub award_types: Vec<(i32, String)>,
    pub racers: Vec<serde_json::Value>,
    pub winners: Vec<(i32, i32)>,
    next_award_id: i32,
}

impl FakeRaceServer {
    pub fn new() -> FakeRaceServer {
        FakeRaceServer {
            next_award_id: 100,
            award_types: vec![(1, "Design General".to_string()), (2, "Speed Trophy".to_string())],
            ..FakeRaceServer::default()
        }
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.iter().filter(|call| call.name == name).count()
    }

    pub fn names(&self) -> Vec<String> {
        self.calls.iter().map(|call| call.name.clone()).collect()
    }

    pub fn add_racer(&mut self, racer_id: i32, car_number: i32, first_name: &str, last_name: &str) {
        self.racers.push(json!({
            "racerid": racer_id,
            "carnumber": car_number,
            "firstname": first_name,
            "lastname": last_name,
            "carname": format!("Car {}", car_number),
            "rank": "Bears",
        }));
    }

    fn handle(&mut self, call: RecordedCall) -> CustomResult<String> {
        self.calls.push(call.clone());
        if self.transport_down {
            return Err(Error::TransportError {
                message: "connection refused".to_string(),
            });
        }

        match call.method {
            "GET" => Ok(self.query(&call.name)),
            _ => Ok(self.action(&call)),
        }
    }

    fn query(&self, name: &str) -> String {
        if let Some((_, code)) = self.failing_queries.iter().find(|(query, _)| query == name) {
            return failure(code, "rejected by fake server");
        }

        match name {
            "racer.list" => json!({ "racers": self.racers }).to_string(),
            "award.list" => self.awards_body(None),
            "award-type.list" => json!({
                "award-types": self
                    .award_types
                    .iter()
                    .map(|(id, name)| json!({"awardtypeid": id, "awardtype": name}))
                    .collect::<Vec<_>>()
            })
            .to_string(),
            _ => failure("unknownquery", "unknown query"),
        }
    }

    fn action(&mut self, call: &RecordedCall) -> String {
        if call.name == "role.login" {
            let within_limit = self.login_limit.map_or(true, |limit| self.count("role.login") <= limit);
            if within_limit && call.param("name") == Some(ROLE) && call.param("password") == Some(PASSWORD) {
                self.logged_in = true;
                return success();
            }
            return failure("badpassword", "Role or password incorrect");
        }

        if self.reject_all_writes || !self.logged_in {
            return failure("notauthorized", "Not authorized");
        }
        if self.expire_session_times > 0 {
            self.expire_session_times -= 1;
            self.logged_in = false;
            return failure("notauthorized", "Session expired");
        }
        if let Some((_, code)) = self.failing_actions.iter().find(|(action, _)| *action == call.name) {
            return failure(code, "rejected by fake server");
        }

        match call.name.as_str() {
            "award.edit" => {
                let name = call.param("name").unwrap_or_default().to_string();
                if self.failing_award_names.contains(&name) {
                    return failure("awardexists", &format!("Could not create award {}", name));
                }
                let type_id = call.param("awardtypeid").and_then(|id| id.parse().ok()).unwrap_or(0);
                let award_id = self.next_award_id;
                self.next_award_id += 1;
                self.awards.push((award_id, name, type_id));

                let hidden = if self.hide_created_awards { Some(award_id) } else { None };
                self.awards_body(hidden)
            }
            "award.winner" => {
                let award_id: i32 = call.param("awardid").and_then(|id| id.parse().ok()).unwrap_or(0);
                let racer_id: i32 = call.param("racerid").and_then(|id| id.parse().ok()).unwrap_or(0);
                if self.failing_award_ids.contains(&award_id) {
                    return failure("nosuchaward", &format!("No award with id {}", award_id));
                }
                self.winners.push((award_id, racer_id));
                success()
            }
            _ => failure("unknownaction", "unknown action"),
        }
    }

    fn awards_body(&self, hidden: Option<i32>) -> String {
        let awards: Vec<serde_json::Value> = self
            .awards
            .iter()
            .filter(|(id, _, _)| Some(*id) != hidden)
            .map(|(id, name, type_id)| json!({"awardid": id.to_string(), "awardname": name, "awardtypeid": type_id}))
            .collect();

        json!({
            "outcome": {"summary": "success", "code": "success", "description": ""},
            "awards": awards,
        })
        .to_string()
    }
}

pub fn success() -> String {
    json!({"outcome": {"summary": "success", "code": "success", "description": ""}}).to_string()
}

pub fn failure(code: &str, description: &str) -> String {
    json!({"outcome": {"summary": "failure", "code": code, "description": description}}).to_string()
}

/// [`Transport`] answering from a shared [`FakeRaceServer`]
#[derive(Clone)]
pub struct FakeTransport {
    pub server: Arc<Mutex<FakeRaceServer>>,
}

impl FakeTransport {
    pub fn new(server: FakeRaceServer) -> FakeTransport {
        FakeTransport {
            server: Arc::new(Mutex::new(server)),
        }
    }

    fn record(&self, method: &'static str, url: &str, params: &[(&str, String)], key: &str) -> CustomResult<String> {
        let name = params
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        let call = RecordedCall {
            method,
            url: url.to_string(),
            name,
            params: params
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        };

        self.server.lock().unwrap().handle(call)
    }
}

impl Transport for FakeTransport {
    fn post_form(&mut self, url: &str, form: &[(&str, String)], _timeout: Duration) -> CustomResult<String> {
        self.record("POST", url, form, "action")
    }

    fn get_query(&mut self, url: &str, query: &[(&str, String)], _timeout: Duration) -> CustomResult<String> {
        self.record("GET", url, query, "query")
    }
}

/// client with credentials talking to `server`, plus a handle on the server
pub fn client_for(server: FakeRaceServer) -> (SyncClient<FakeTransport>, Arc<Mutex<FakeRaceServer>>) {
    let transport = FakeTransport::new(server);
    let handle = transport.server.clone();
    let client = SyncClient::new(BASE_URL, transport).with_credentials(ROLE, PASSWORD);

    (client, handle)
}
