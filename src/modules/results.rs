use std::collections::BTreeMap;

use log::warn;
use serde::Serialize;

use crate::errors::CustomResult;
use crate::modules::models::car::Car;
use crate::modules::models::category::Category;
use crate::modules::models::vote::Vote;
use crate::modules::store::{DataStore, Snapshot};

/// the parts of a car shown next to a result
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CarSummary {
    pub car_id: i32,
    pub car_number: i32,
    pub car_name: String,
    pub racer_name: String,
    pub racer_id: Option<i32>,
}

impl CarSummary {
    pub fn from_car(car: &Car) -> CarSummary {
        CarSummary {
            car_id: car.id,
            car_number: car.car_number,
            car_name: car.car_name.clone(),
            racer_name: car.racer_name(),
            racer_id: car.racer_id,
        }
    }

    /// summary for a car id that is not in the car listing
    pub fn unknown(car_id: i32) -> CarSummary {
        CarSummary {
            car_id,
            car_number: 0,
            car_name: String::new(),
            racer_name: String::new(),
            racer_id: None,
        }
    }

    pub fn lookup(snapshot: &Snapshot, car_id: i32) -> CarSummary {
        snapshot
            .car(car_id)
            .map(CarSummary::from_car)
            .unwrap_or_else(|| CarSummary::unknown(car_id))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CarVotes {
    #[serde(flatten)]
    pub car: CarSummary,
    pub votes: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoryResult {
    pub category_id: i32,
    pub category_name: String,
    pub group_id: Option<i32>,
    pub display_order: i32,
    /// most votes first, equal counts ordered by car number
    pub votes: Vec<CarVotes>,
    pub total_votes: usize,
    pub winner: Option<CarSummary>,
    pub has_override: bool,
    pub override_reason: Option<String>,
}

/// who leads the raw vote count of a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leader {
    NoVotes,
    Unique { car_id: i32, votes: usize },
    /// two or more cars share the highest count, ids in ascending order
    Tied { car_ids: Vec<i32>, votes: usize },
}

/// vote counts per car id for a single category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: BTreeMap<i32, usize>,
}

impl Tally {
    /// # count votes
    /// count the given votes per car, the caller filters on category
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Tally {
        let mut counts = BTreeMap::new();
        for vote in votes {
            *counts.entry(vote.car_id).or_insert(0) += 1;
        }

        Tally { counts }
    }

    /// # tally a category
    /// votes for cars missing from the car listing are dropped
    pub fn for_category(snapshot: &Snapshot, category_id: i32) -> Tally {
        let mut dangling = 0;
        let tally = Tally::from_votes(snapshot.votes.iter().filter(|vote| {
            if vote.category_id != category_id {
                return false;
            }
            if snapshot.car(vote.car_id).is_none() {
                dangling += 1;
                return false;
            }
            true
        }));

        if dangling > 0 {
            warn!(target:"modules/results:for_category", "ignored {} vote(s) for unknown cars in category {}", dangling, category_id);
        }

        tally
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, usize)> + '_ {
        self.counts.iter().map(|(car_id, count)| (*car_id, *count))
    }

    pub fn leader(&self) -> Leader {
        let max = match self.counts.values().max() {
            Some(max) if *max > 0 => *max,
            _ => return Leader::NoVotes,
        };

        let car_ids: Vec<i32> = self
            .counts
            .iter()
            .filter(|(_, count)| **count == max)
            .map(|(car_id, _)| *car_id)
            .collect();

        if car_ids.len() == 1 {
            Leader::Unique { car_id: car_ids[0], votes: max }
        } else {
            Leader::Tied { car_ids, votes: max }
        }
    }
}

/// # effective winner
/// the override car when an override is set, otherwise the car with the
/// strictly highest positive vote count. `None` on a tie or without votes.
pub fn effective_winner(category: &Category, tally: &Tally) -> Option<i32> {
    if let Some(manual) = category.manual_override() {
        return Some(manual.car_id);
    }

    match tally.leader() {
        Leader::Unique { car_id, .. } => Some(car_id),
        Leader::NoVotes | Leader::Tied { .. } => None,
    }
}

pub struct ResultsEngine {}

impl ResultsEngine {
    /// # get results
    /// results of every active category in display order
    pub fn get_results<S: DataStore>(store: &mut S) -> CustomResult<Vec<CategoryResult>> {
        let snapshot = store.snapshot()?;
        Ok(ResultsEngine::from_snapshot(&snapshot))
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Vec<CategoryResult> {
        snapshot
            .active_categories()
            .map(|category| ResultsEngine::category_result(snapshot, category))
            .collect()
    }

    /// # effective winners
    /// pairs every active category with its effective winner, in display order
    pub fn effective_winners(snapshot: &Snapshot) -> Vec<(&Category, Option<i32>)> {
        snapshot
            .active_categories()
            .map(|category| {
                let tally = Tally::for_category(snapshot, category.id);
                (category, effective_winner(category, &tally))
            })
            .collect()
    }

    fn category_result(snapshot: &Snapshot, category: &Category) -> CategoryResult {
        let tally = Tally::for_category(snapshot, category.id);
        let manual = category.manual_override();

        let mut votes: Vec<CarVotes> = tally
            .iter()
            .map(|(car_id, count)| CarVotes {
                car: CarSummary::lookup(snapshot, car_id),
                votes: count,
            })
            .collect();
        votes.sort_by(|a, b| {
            b.votes
                .cmp(&a.votes)
                .then(a.car.car_number.cmp(&b.car.car_number))
        });

        CategoryResult {
            category_id: category.id,
            category_name: category.name.clone(),
            group_id: category.group_id,
            display_order: category.display_order,
            total_votes: tally.total(),
            votes,
            winner: effective_winner(category, &tally).map(|car_id| CarSummary::lookup(snapshot, car_id)),
            has_override: manual.is_some(),
            override_reason: manual.map(|manual| manual.reason),
        }
    }
}
