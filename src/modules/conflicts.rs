//! Detection of results that need an administrator before they can be published.
//!
//! Ties are found on the raw vote count, so a tie stays visible after an
//! override picked a winner for it. Multiple wins are counted on effective
//! winners, the cars that will actually be published.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::errors::CustomResult;
use crate::modules::models::category::Category;
use crate::modules::models::category_group::CategoryGroup;
use crate::modules::results::{effective_winner, CarSummary, Leader, Tally};
use crate::modules::store::{DataStore, Snapshot};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TiedCar {
    #[serde(flatten)]
    pub car: CarSummary,
    pub votes: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Tie {
    pub category_id: i32,
    pub category_name: String,
    /// ascending car number
    pub cars: Vec<TiedCar>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MultipleWinConflict {
    pub car: CarSummary,
    pub group_id: i32,
    pub group_name: String,
    pub max_wins_per_car: i32,
    pub category_ids: Vec<i32>,
    pub category_names: Vec<String>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Conflicts {
    pub ties: Vec<Tie>,
    pub multiple_wins: Vec<MultipleWinConflict>,
}

impl Conflicts {
    pub fn is_empty(&self) -> bool {
        self.ties.is_empty() && self.multiple_wins.is_empty()
    }
}

pub struct ConflictDetector {}

impl ConflictDetector {
    pub fn detect_ties<S: DataStore>(store: &mut S) -> CustomResult<Vec<Tie>> {
        let snapshot = store.snapshot()?;
        Ok(ConflictDetector::ties(&snapshot))
    }

    pub fn detect_multiple_wins<S: DataStore>(store: &mut S) -> CustomResult<Vec<MultipleWinConflict>> {
        let snapshot = store.snapshot()?;
        Ok(ConflictDetector::multiple_wins(&snapshot))
    }

    /// # detect all conflicts
    /// ties and multiple wins computed on the same snapshot
    pub fn detect<S: DataStore>(store: &mut S) -> CustomResult<Conflicts> {
        let snapshot = store.snapshot()?;
        Ok(ConflictDetector::from_snapshot(&snapshot))
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Conflicts {
        Conflicts {
            ties: ConflictDetector::ties(snapshot),
            multiple_wins: ConflictDetector::multiple_wins(snapshot),
        }
    }

    /// # blocking conflicts
    /// the conflicts that stop a push. a tie in a category with an override
    /// is settled for publishing, it is still reported by [`ConflictDetector::ties`].
    pub fn blocking(snapshot: &Snapshot) -> Conflicts {
        let mut conflicts = ConflictDetector::from_snapshot(snapshot);
        conflicts.ties.retain(|tie| {
            snapshot
                .category(tie.category_id)
                .map_or(true, |category| category.manual_override().is_none())
        });

        conflicts
    }

    /// # ties
    /// one entry per active category where two or more cars share the
    /// highest positive vote count. overrides are not taken into account.
    pub fn ties(snapshot: &Snapshot) -> Vec<Tie> {
        snapshot
            .active_categories()
            .filter_map(|category| {
                let tally = Tally::for_category(snapshot, category.id);
                match tally.leader() {
                    Leader::Tied { car_ids, votes } => {
                        let mut cars: Vec<TiedCar> = car_ids
                            .into_iter()
                            .map(|car_id| TiedCar {
                                car: CarSummary::lookup(snapshot, car_id),
                                votes,
                            })
                            .collect();
                        cars.sort_by_key(|tied| (tied.car.car_number, tied.car.car_id));

                        Some(Tie {
                            category_id: category.id,
                            category_name: category.name.clone(),
                            cars,
                        })
                    }
                    Leader::NoVotes | Leader::Unique { .. } => None,
                }
            })
            .collect()
    }

    /// # multiple wins
    /// for every group with a win limit, the cars whose effective wins in
    /// that group exceed the limit. groups are evaluated independently.
    pub fn multiple_wins(snapshot: &Snapshot) -> Vec<MultipleWinConflict> {
        snapshot
            .groups
            .iter()
            .flat_map(|group| ConflictDetector::group_conflicts(snapshot, group))
            .collect()
    }

    fn group_conflicts(snapshot: &Snapshot, group: &CategoryGroup) -> Vec<MultipleWinConflict> {
        let max_wins = match group.max_wins_per_car {
            Some(max_wins) => max_wins,
            None => return Vec::new(),
        };

        let mut wins: BTreeMap<i32, Vec<&Category>> = BTreeMap::new();
        for category in snapshot
            .active_categories()
            .filter(|category| category.group_id == Some(group.id))
        {
            let tally = Tally::for_category(snapshot, category.id);
            if let Some(car_id) = effective_winner(category, &tally) {
                wins.entry(car_id).or_default().push(category);
            }
        }

        let mut conflicts: Vec<MultipleWinConflict> = wins
            .into_iter()
            .filter(|(_, won)| won.len() as i64 > max_wins as i64)
            .map(|(car_id, won)| MultipleWinConflict {
                car: CarSummary::lookup(snapshot, car_id),
                group_id: group.id,
                group_name: group.name.clone(),
                max_wins_per_car: max_wins,
                category_ids: won.iter().map(|category| category.id).collect(),
                category_names: won.iter().map(|category| category.name.clone()).collect(),
            })
            .collect();
        conflicts.sort_by_key(|conflict| (conflict.car.car_number, conflict.car.car_id));

        conflicts
    }
}
