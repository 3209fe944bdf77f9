//! Access to the persisted contest state.
//!
//! The results, conflict and push components never talk to the database
//! directly, they go through [`DataStore`]. `PgStore` is the production
//! implementation, `MemoryStore` keeps everything in process.

pub mod memory;
pub mod postgres;

use crate::errors::CustomResult;
use crate::modules::models::car::{Car, NewCar};
use crate::modules::models::category::{Category, ManualOverride};
use crate::modules::models::category_group::CategoryGroup;
use crate::modules::models::vote::{NewVote, Vote};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// everything needed to compute results and conflicts, read as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// ordered by display order, then id
    pub categories: Vec<Category>,
    pub groups: Vec<CategoryGroup>,
    pub cars: Vec<Car>,
    pub votes: Vec<Vote>,
}

impl Snapshot {
    pub fn car(&self, car_id: i32) -> Option<&Car> {
        self.cars.iter().find(|car| car.id == car_id)
    }

    pub fn category(&self, category_id: i32) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == category_id)
    }

    /// active categories in display order
    pub fn active_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|category| category.active)
    }
}

pub trait DataStore {
    /// read categories, groups, cars and votes in one consistent view
    fn snapshot(&mut self) -> CustomResult<Snapshot>;

    fn categories(&mut self) -> CustomResult<Vec<Category>>;
    fn category(&mut self, category_id: i32) -> CustomResult<Category>;
    fn groups(&mut self) -> CustomResult<Vec<CategoryGroup>>;
    fn cars(&mut self) -> CustomResult<Vec<Car>>;
    fn car(&mut self, car_id: i32) -> CustomResult<Car>;
    fn votes(&mut self) -> CustomResult<Vec<Vote>>;

    fn is_voting_open(&mut self) -> CustomResult<bool>;
    fn set_voting_open(&mut self, open: bool) -> CustomResult<()>;

    /// write all three override fields of a category at once
    fn set_override(&mut self, category_id: i32, manual: &ManualOverride) -> CustomResult<()>;
    /// clear all three override fields of a category at once
    fn clear_override(&mut self, category_id: i32) -> CustomResult<()>;
    fn set_award_id(&mut self, category_id: i32, award_id: i32) -> CustomResult<()>;

    fn insert_car(&mut self, new_car: &NewCar) -> CustomResult<Car>;
    fn update_car(&mut self, car: &Car) -> CustomResult<Car>;

    fn find_vote(&mut self, voter_id: i32, category_id: i32) -> CustomResult<Option<Vote>>;
    fn insert_vote(&mut self, new_vote: &NewVote) -> CustomResult<Vote>;
    /// returns the number of deleted votes
    fn delete_votes(&mut self) -> CustomResult<usize>;
}
