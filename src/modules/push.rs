use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{error, info, warn};
use serde::Serialize;

use crate::errors::{CustomResult, Error, PushError};
use crate::modules::conflicts::ConflictDetector;
use crate::modules::helpers::cancel::Cancellation;
use crate::modules::models::car::Car;
use crate::modules::models::category::Category;
use crate::modules::race_api::{SyncClient, Transport};
use crate::modules::results::ResultsEngine;
use crate::modules::store::{DataStore, Snapshot};

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushSummary {
    pub winners_pushed: usize,
    pub awards_created: usize,
    pub categories_skipped: usize,
}

/// one category in display order, with its winner when there is one
struct PlannedCategory {
    category: Category,
    winner: Option<PlannedWinner>,
}

struct PlannedWinner {
    car: Car,
    racer_id: i32,
}

/// Publishes the winners to the race server.
///
/// The client sits behind a mutex that is held for a whole push, so pushes
/// through one coordinator never interleave their logins.
pub struct PushCoordinator<T: Transport> {
    client: Mutex<SyncClient<T>>,
    award_type_id: i32,
}

impl<T: Transport> PushCoordinator<T> {
    pub fn new(client: SyncClient<T>, award_type_id: i32) -> PushCoordinator<T> {
        PushCoordinator {
            client: Mutex::new(client),
            award_type_id,
        }
    }

    /// exclusive access to the client, for work outside a push such as importing racers
    pub fn client(&self) -> MutexGuard<'_, SyncClient<T>> {
        self.client.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// # push results
    /// publish the effective winner of every active category.
    ///
    /// nothing is sent while a multiple win conflict or a tie without an
    /// override exists, or while a winner cannot be mapped to a racer on the
    /// race server. once sending
    /// started the first failure stops the push, winners already sent stay
    /// published and are counted in the returned error.
    ///
    /// ## Arguments
    /// * `store` - the data store
    /// * `base_url` - base url of the race server
    /// * `cancellation` - stops the push between and before remote calls
    pub fn push_results<S: DataStore>(
        &self,
        store: &mut S,
        base_url: &str,
        cancellation: &Cancellation,
    ) -> Result<PushSummary, PushError> {
        let mut summary = PushSummary::default();
        let mut client = self.client();

        let plan = match PushCoordinator::<T>::plan(store) {
            Ok(plan) => plan,
            Err(error) => {
                warn!(target:"modules/push:push_results", "push refused: {}", error);
                return Err(PushError::new(summary, error));
            }
        };

        client.set_base_url(base_url);
        client.set_cancellation(cancellation.clone());
        let result = self.send(store, &mut client, &plan, cancellation, &mut summary);
        client.set_cancellation(Cancellation::new());

        match result {
            Ok(()) => {
                info!(target:"modules/push:push_results", "pushed {} winner(s) to {}, created {} award(s), skipped {} categories", summary.winners_pushed, client.base_url(), summary.awards_created, summary.categories_skipped);
                Ok(summary)
            }
            Err(error) => {
                error!(target:"modules/push:push_results", "push aborted after {} winner(s): {}", summary.winners_pushed, error);
                Err(PushError::new(summary, error))
            }
        }
    }

    /// read everything, refuse on conflicts and check every winner can be
    /// sent before anything is sent
    fn plan<S: DataStore>(store: &mut S) -> CustomResult<Vec<PlannedCategory>> {
        let snapshot = store.snapshot()?;

        let conflicts = ConflictDetector::blocking(&snapshot);
        if !conflicts.is_empty() {
            return Err(Error::UnresolvedConflictsError {
                ties: conflicts.ties,
                multiple_wins: conflicts.multiple_wins,
            });
        }

        ResultsEngine::effective_winners(&snapshot)
            .into_iter()
            .map(|(category, winner)| -> CustomResult<PlannedCategory> {
                Ok(PlannedCategory {
                    category: category.clone(),
                    winner: match winner {
                        Some(car_id) => Some(PushCoordinator::<T>::planned_winner(&snapshot, car_id)?),
                        None => None,
                    },
                })
            })
            .collect()
    }

    fn planned_winner(snapshot: &Snapshot, car_id: i32) -> CustomResult<PlannedWinner> {
        let car = match snapshot.car(car_id) {
            Some(car) => car.clone(),
            None => return Err(Error::NotFoundError { entity: "car", id: car_id }),
        };

        match car.racer_id {
            Some(racer_id) => Ok(PlannedWinner { car, racer_id }),
            None => Err(Error::ValidationError {
                message: format!("car #{} is not linked to a racer on the race server", car.car_number),
            }),
        }
    }

    fn send<S: DataStore>(
        &self,
        store: &mut S,
        client: &mut SyncClient<T>,
        plan: &[PlannedCategory],
        cancellation: &Cancellation,
        summary: &mut PushSummary,
    ) -> CustomResult<()> {
        for planned in plan {
            let winner = match &planned.winner {
                Some(winner) => winner,
                None => {
                    info!(target:"modules/push:send", "no winner for {}, skipping", planned.category.name);
                    summary.categories_skipped += 1;
                    continue;
                }
            };

            cancellation.check()?;

            let award_id = match planned.category.award_id {
                Some(award_id) => award_id,
                None => {
                    let award_id = client.create_award(&planned.category.name, self.award_type_id)?;
                    summary.awards_created += 1;
                    if let Err(error) = store.set_award_id(planned.category.id, award_id) {
                        error!(target:"modules/push:send", "award {} created for {} but its id was not saved: {}", award_id, planned.category.name, error);
                        return Err(error);
                    }
                    award_id
                }
            };

            client.set_award_winner(award_id, winner.racer_id)?;
            summary.winners_pushed += 1;
            info!(target:"modules/push:send", "{}: car #{} ({})", planned.category.name, winner.car.car_number, winner.car.racer_name());
        }

        Ok(())
    }
}
