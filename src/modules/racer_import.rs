use log::info;
use serde::Serialize;

use crate::errors::CustomResult;
use crate::modules::models::car::{Car, NewCar};
use crate::modules::race_api::protocol::RemoteRacer;
use crate::modules::race_api::{SyncClient, Transport};
use crate::modules::store::DataStore;

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub linked: usize,
    pub updated: usize,
}

/// # import racers
/// bring the local cars in line with the racers on the race server.
///
/// a car already linked to a racer is updated, an unlinked car with the same
/// car number gets linked, any other racer becomes a new eligible car.
/// eligibility of existing cars is left alone.
pub fn import_racers<S: DataStore, T: Transport>(store: &mut S, client: &mut SyncClient<T>) -> CustomResult<ImportSummary> {
    let racers = client.fetch_racers()?;
    let mut cars = store.cars()?;
    let mut summary = ImportSummary::default();

    for racer in &racers {
        if let Some(car) = cars.iter_mut().find(|car| car.racer_id == Some(racer.racer_id)) {
            let refreshed = apply_racer(car, racer);
            if refreshed != *car {
                *car = store.update_car(&refreshed)?;
                summary.updated += 1;
            }
            continue;
        }

        if let Some(car) = cars
            .iter_mut()
            .find(|car| car.racer_id.is_none() && car.car_number == racer.car_number)
        {
            let linked = apply_racer(car, racer);
            *car = store.update_car(&linked)?;
            summary.linked += 1;
            continue;
        }

        let created = store.insert_car(&NewCar {
            racer_id: Some(racer.racer_id),
            car_number: racer.car_number,
            first_name: racer.first_name.clone(),
            last_name: racer.last_name.clone(),
            car_name: racer.car_name.clone(),
            rank: racer.rank.clone(),
            eligible: true,
        })?;
        cars.push(created);
        summary.created += 1;
    }

    info!(target:"modules/racer_import:import_racers", "imported {} racer(s): {} created, {} linked, {} updated", racers.len(), summary.created, summary.linked, summary.updated);
    Ok(summary)
}

fn apply_racer(car: &Car, racer: &RemoteRacer) -> Car {
    Car {
        id: car.id,
        racer_id: Some(racer.racer_id),
        car_number: racer.car_number,
        first_name: racer.first_name.clone(),
        last_name: racer.last_name.clone(),
        car_name: racer.car_name.clone(),
        rank: racer.rank.clone(),
        eligible: car.eligible,
    }
}
