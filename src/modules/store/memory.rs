use chrono::Utc;

use crate::errors::{CustomResult, Error};
use crate::modules::models::car::{Car, NewCar};
use crate::modules::models::category::{Category, ManualOverride};
use crate::modules::models::category_group::CategoryGroup;
use crate::modules::models::vote::{NewVote, Vote};
use crate::modules::store::{DataStore, Snapshot};

/// [`DataStore`] keeping all rows in memory.
///
/// Used by the test suites and for dry runs. `fail_reads` and `fail_writes`
/// make every read or write return a database error so callers can check
/// error propagation.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub categories: Vec<Category>,
    pub groups: Vec<CategoryGroup>,
    pub cars: Vec<Car>,
    pub votes: Vec<Vote>,
    pub voting_open: bool,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn add_group(&mut self, name: &str, max_wins_per_car: Option<i32>) -> CategoryGroup {
        let group = CategoryGroup {
            id: self.groups.len() as i32 + 1,
            name: name.to_string(),
            exclusivity_pool_id: None,
            max_wins_per_car,
            display_order: self.groups.len() as i32,
        };
        self.groups.push(group.clone());
        group
    }

    pub fn add_category(&mut self, name: &str, group_id: Option<i32>) -> Category {
        let category = Category {
            id: self.categories.len() as i32 + 1,
            name: name.to_string(),
            display_order: self.categories.len() as i32,
            group_id,
            active: true,
            award_id: None,
            override_winner_car_id: None,
            override_reason: None,
            overridden_at: None,
        };
        self.categories.push(category.clone());
        category
    }

    /// add an eligible car that is already known on the race server as racer `racer_id`
    pub fn add_car(&mut self, car_number: i32, first_name: &str, racer_id: Option<i32>) -> Car {
        let car = Car {
            id: self.cars.len() as i32 + 1,
            racer_id,
            car_number,
            first_name: first_name.to_string(),
            last_name: String::new(),
            car_name: format!("Car {}", car_number),
            rank: String::new(),
            eligible: true,
        };
        self.cars.push(car.clone());
        car
    }

    /// record `count` votes for a car, each from a fresh voter
    pub fn add_votes(&mut self, category_id: i32, car_id: i32, count: usize) {
        for _ in 0..count {
            let vote = Vote {
                id: self.votes.len() as i32 + 1,
                voter_id: 1000 + self.votes.len() as i32,
                category_id,
                car_id,
                created_at: Utc::now().naive_utc(),
            };
            self.votes.push(vote);
        }
    }

    fn check_reads(&self) -> CustomResult<()> {
        if self.fail_reads {
            return Err(Error::DatabaseError {
                source: diesel::result::Error::QueryBuilderError("memory store reads disabled".into()),
            });
        }
        Ok(())
    }

    fn check_writes(&self) -> CustomResult<()> {
        if self.fail_writes {
            return Err(Error::DatabaseError {
                source: diesel::result::Error::QueryBuilderError("memory store writes disabled".into()),
            });
        }
        Ok(())
    }

    fn category_mut(&mut self, category_id: i32) -> CustomResult<&mut Category> {
        self.categories
            .iter_mut()
            .find(|category| category.id == category_id)
            .ok_or(Error::NotFoundError { entity: "category", id: category_id })
    }
}

impl DataStore for MemoryStore {
    fn snapshot(&mut self) -> CustomResult<Snapshot> {
        self.check_reads()?;
        Ok(Snapshot {
            categories: self.categories()?,
            groups: self.groups()?,
            cars: self.cars()?,
            votes: self.votes()?,
        })
    }

    fn categories(&mut self) -> CustomResult<Vec<Category>> {
        self.check_reads()?;
        let mut categories = self.categories.clone();
        categories.sort_by_key(|category| (category.display_order, category.id));
        Ok(categories)
    }

    fn category(&mut self, category_id: i32) -> CustomResult<Category> {
        self.check_reads()?;
        self.categories
            .iter()
            .find(|category| category.id == category_id)
            .cloned()
            .ok_or(Error::NotFoundError { entity: "category", id: category_id })
    }

    fn groups(&mut self) -> CustomResult<Vec<CategoryGroup>> {
        self.check_reads()?;
        let mut groups = self.groups.clone();
        groups.sort_by_key(|group| (group.display_order, group.id));
        Ok(groups)
    }

    fn cars(&mut self) -> CustomResult<Vec<Car>> {
        self.check_reads()?;
        let mut cars = self.cars.clone();
        cars.sort_by_key(|car| (car.car_number, car.id));
        Ok(cars)
    }

    fn car(&mut self, car_id: i32) -> CustomResult<Car> {
        self.check_reads()?;
        self.cars
            .iter()
            .find(|car| car.id == car_id)
            .cloned()
            .ok_or(Error::NotFoundError { entity: "car", id: car_id })
    }

    fn votes(&mut self) -> CustomResult<Vec<Vote>> {
        self.check_reads()?;
        Ok(self.votes.clone())
    }

    fn is_voting_open(&mut self) -> CustomResult<bool> {
        self.check_reads()?;
        Ok(self.voting_open)
    }

    fn set_voting_open(&mut self, open: bool) -> CustomResult<()> {
        self.check_writes()?;
        self.voting_open = open;
        Ok(())
    }

    fn set_override(&mut self, category_id: i32, manual: &ManualOverride) -> CustomResult<()> {
        self.check_writes()?;
        let category = self.category_mut(category_id)?;
        category.override_winner_car_id = Some(manual.car_id);
        category.override_reason = Some(manual.reason.clone());
        category.overridden_at = Some(manual.overridden_at);
        Ok(())
    }

    fn clear_override(&mut self, category_id: i32) -> CustomResult<()> {
        self.check_writes()?;
        let category = self.category_mut(category_id)?;
        category.override_winner_car_id = None;
        category.override_reason = None;
        category.overridden_at = None;
        Ok(())
    }

    fn set_award_id(&mut self, category_id: i32, award_id: i32) -> CustomResult<()> {
        self.check_writes()?;
        self.category_mut(category_id)?.award_id = Some(award_id);
        Ok(())
    }

    fn insert_car(&mut self, new_car: &NewCar) -> CustomResult<Car> {
        self.check_writes()?;
        let car = Car {
            id: self.cars.iter().map(|car| car.id).max().unwrap_or(0) + 1,
            racer_id: new_car.racer_id,
            car_number: new_car.car_number,
            first_name: new_car.first_name.clone(),
            last_name: new_car.last_name.clone(),
            car_name: new_car.car_name.clone(),
            rank: new_car.rank.clone(),
            eligible: new_car.eligible,
        };
        self.cars.push(car.clone());
        Ok(car)
    }

    fn update_car(&mut self, car: &Car) -> CustomResult<Car> {
        self.check_writes()?;
        let stored = self
            .cars
            .iter_mut()
            .find(|stored| stored.id == car.id)
            .ok_or(Error::NotFoundError { entity: "car", id: car.id })?;
        *stored = car.clone();
        Ok(car.clone())
    }

    fn find_vote(&mut self, voter_id: i32, category_id: i32) -> CustomResult<Option<Vote>> {
        self.check_reads()?;
        Ok(self
            .votes
            .iter()
            .find(|vote| vote.voter_id == voter_id && vote.category_id == category_id)
            .cloned())
    }

    fn insert_vote(&mut self, new_vote: &NewVote) -> CustomResult<Vote> {
        self.check_writes()?;
        if self
            .votes
            .iter()
            .any(|vote| vote.voter_id == new_vote.voter_id && vote.category_id == new_vote.category_id)
        {
            return Err(Error::AlreadyVotedError {
                voter_id: new_vote.voter_id,
                category_id: new_vote.category_id,
            });
        }
        let vote = Vote {
            id: self.votes.iter().map(|vote| vote.id).max().unwrap_or(0) + 1,
            voter_id: new_vote.voter_id,
            category_id: new_vote.category_id,
            car_id: new_vote.car_id,
            created_at: Utc::now().naive_utc(),
        };
        self.votes.push(vote.clone());
        Ok(vote)
    }

    fn delete_votes(&mut self) -> CustomResult<usize> {
        self.check_writes()?;
        let deleted = self.votes.len();
        self.votes.clear();
        Ok(deleted)
    }
}
