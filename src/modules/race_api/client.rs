use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};

use crate::errors::{CustomResult, Error};
use crate::modules::helpers::cancel::Cancellation;
use crate::modules::helpers::config::DEFAULT_TIMEOUT_SECS;
use crate::modules::race_api::protocol::{
    award_type_name, Outcome, OutcomeCode, RemoteAward, RemoteAwardType, RemoteRacer, RemoteResponse,
    ACTION_PATH, AWARD_EDIT_ACTION, AWARD_LIST_QUERY, AWARD_TYPE_LIST_QUERY, AWARD_WINNER_ACTION,
    LOGIN_ACTION, NEW_AWARD_ID, RACER_LIST_QUERY,
};
use crate::modules::race_api::transport::{action_name, Transport};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub role: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("role", &self.role)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// login state towards the race server
#[derive(Debug, Clone)]
pub struct Session {
    pub state: SessionState,
    pub credentials: Option<Credentials>,
}

impl Session {
    fn new(credentials: Option<Credentials>) -> Session {
        Session {
            state: SessionState::Unauthenticated,
            credentials,
        }
    }
}

/// an award on the race server together with the name of its type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardListing {
    pub award_id: i32,
    pub name: String,
    pub award_type: String,
}

/// Client for the race server.
///
/// Writes log in first when the session is unauthenticated and credentials
/// are known. A write rejected with `notauthorized` logs in once more and is
/// retried once, a second rejection is returned as an error.
pub struct SyncClient<T: Transport> {
    base_url: String,
    transport: T,
    session: Session,
    timeout: Duration,
    cancellation: Cancellation,
}

impl<T: Transport> SyncClient<T> {
    pub fn new(base_url: &str, transport: T) -> SyncClient<T> {
        SyncClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session: Session::new(None),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cancellation: Cancellation::new(),
        }
    }

    pub fn with_credentials(mut self, role: &str, password: &str) -> SyncClient<T> {
        self.session.credentials = Some(Credentials {
            role: role.to_string(),
            password: password.to_string(),
        });
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> SyncClient<T> {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// point the client at another server, the session starts over
    pub fn set_base_url(&mut self, base_url: &str) {
        let base_url = base_url.trim_end_matches('/');
        if base_url != self.base_url {
            self.base_url = base_url.to_string();
            self.session.state = SessionState::Unauthenticated;
        }
    }

    pub fn set_cancellation(&mut self, cancellation: Cancellation) {
        self.cancellation = cancellation;
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, ACTION_PATH)
    }

    /********** SESSION **********/
    /// # log in
    /// remembers the credentials for later re-logins
    pub fn login(&mut self, role: &str, password: &str) -> CustomResult<()> {
        self.session.credentials = Some(Credentials {
            role: role.to_string(),
            password: password.to_string(),
        });
        self.login_with_stored_credentials()
    }

    fn login_with_stored_credentials(&mut self) -> CustomResult<()> {
        self.session.state = SessionState::Unauthenticated;
        let credentials = match &self.session.credentials {
            Some(credentials) => credentials.clone(),
            None => {
                return Err(Error::AuthenticationError {
                    message: "no race server credentials configured".to_string(),
                })
            }
        };

        let form = vec![
            ("action", LOGIN_ACTION.to_string()),
            ("name", credentials.role.clone()),
            ("password", credentials.password),
        ];
        let response = self.post(&form)?;

        match response.outcome() {
            Outcome::Success => {
                info!(target:"race_api/client:login", "logged in to {} as {}", self.base_url, credentials.role);
                self.session.state = SessionState::Authenticated;
                Ok(())
            }
            Outcome::Failure { code, description } => {
                warn!(target:"race_api/client:login", "login as {} refused ({}): {}", credentials.role, code.as_str(), description);
                Err(Error::AuthenticationError {
                    message: format!("login as {} refused ({}): {}", credentials.role, code.as_str(), description),
                })
            }
        }
    }

    /********** READS **********/
    pub fn fetch_racers(&mut self) -> CustomResult<Vec<RemoteRacer>> {
        Ok(self.read(RACER_LIST_QUERY)?.racers)
    }

    pub fn fetch_awards(&mut self) -> CustomResult<Vec<RemoteAward>> {
        Ok(self.read(AWARD_LIST_QUERY)?.awards)
    }

    pub fn fetch_award_types(&mut self) -> CustomResult<Vec<RemoteAwardType>> {
        Ok(self.read(AWARD_TYPE_LIST_QUERY)?.award_types)
    }

    /// # list awards
    /// all awards on the race server with the name of their award type
    pub fn list_awards(&mut self) -> CustomResult<Vec<AwardListing>> {
        let types = self.fetch_award_types()?;
        let awards = self.fetch_awards()?;

        Ok(awards
            .into_iter()
            .map(|award| AwardListing {
                award_type: award_type_name(&types, award.award_type_id).to_string(),
                award_id: award.award_id,
                name: award.name,
            })
            .collect())
    }

    /********** WRITES **********/
    /// # create an award
    /// the response lists awards, the new one is found by its name
    ///
    /// ## Arguments
    /// * `name` - the name of the award
    /// * `award_type_id` - the award type on the race server
    ///
    /// ## Returns
    /// * `i32` - the id the race server gave the award
    pub fn create_award(&mut self, name: &str, award_type_id: i32) -> CustomResult<i32> {
        let form = vec![
            ("action", AWARD_EDIT_ACTION.to_string()),
            ("awardid", NEW_AWARD_ID.to_string()),
            ("name", name.to_string()),
            ("awardtypeid", award_type_id.to_string()),
        ];
        let response = self.write(&form)?;

        match response.awards.iter().find(|award| award.name == name) {
            Some(award) => {
                info!(target:"race_api/client:create_award", "created award {} ({})", award.award_id, name);
                Ok(award.award_id)
            }
            None => Err(Error::RemoteDomainError {
                code: "award-not-found".to_string(),
                description: format!("award not found in response: {}", name),
            }),
        }
    }

    pub fn set_award_winner(&mut self, award_id: i32, racer_id: i32) -> CustomResult<()> {
        let form = vec![
            ("action", AWARD_WINNER_ACTION.to_string()),
            ("awardid", award_id.to_string()),
            ("racerid", racer_id.to_string()),
        ];
        self.write(&form)?;

        info!(target:"race_api/client:set_award_winner", "award {} given to racer {}", award_id, racer_id);
        Ok(())
    }

    /********** REQUESTS **********/
    fn write(&mut self, form: &[(&str, String)]) -> CustomResult<RemoteResponse> {
        if self.session.state == SessionState::Unauthenticated && self.session.credentials.is_some() {
            self.login_with_stored_credentials()?;
        }

        let response = self.post(form)?;
        match response.outcome() {
            Outcome::Success => Ok(response),
            Outcome::Failure { code: OutcomeCode::NotAuthorized, .. } => {
                info!(target:"race_api/client:write", "{} not authorized, logging in again", action_name(form));
                self.session.state = SessionState::Unauthenticated;
                self.login_with_stored_credentials()?;

                let retried = self.post(form)?;
                retried.outcome().into_result()?;
                Ok(retried)
            }
            failure => failure.into_result().map(|_| response),
        }
    }

    fn read(&mut self, query: &str) -> CustomResult<RemoteResponse> {
        let timeout = self.cancellation.request_timeout(self.timeout)?;
        let endpoint = self.endpoint();
        let body = self
            .transport
            .get_query(&endpoint, &[("query", query.to_string())], timeout)?;

        let response = RemoteResponse::parse(&body)?;
        response.outcome().into_result()?;
        Ok(response)
    }

    fn post(&mut self, form: &[(&str, String)]) -> CustomResult<RemoteResponse> {
        let timeout = self.cancellation.request_timeout(self.timeout)?;
        let endpoint = self.endpoint();
        debug!(target:"race_api/client:post", "sending {}", action_name(form));

        let body = self.transport.post_form(&endpoint, form, timeout)?;
        RemoteResponse::parse(&body)
    }
}
