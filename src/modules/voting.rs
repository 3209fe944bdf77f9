use log::info;

use crate::errors::{CustomResult, Error};
use crate::modules::models::vote::{NewVote, Vote};
use crate::modules::store::DataStore;

pub struct Voting {}

impl Voting {
    pub fn set_voting_open<S: DataStore>(store: &mut S, open: bool) -> CustomResult<()> {
        store.set_voting_open(open)?;
        info!(target:"modules/voting:set_voting_open", "voting {}", if open { "opened" } else { "closed" });
        Ok(())
    }

    /// # cast a vote
    /// a voter votes once per category, votes are never changed afterwards
    ///
    /// ## Arguments
    /// * `store` - the data store
    /// * `voter_id` - the voter casting the vote
    /// * `category_id` - the category voted in
    /// * `car_id` - the car voted for
    pub fn cast_vote<S: DataStore>(store: &mut S, voter_id: i32, category_id: i32, car_id: i32) -> CustomResult<Vote> {
        if !store.is_voting_open()? {
            return Err(Error::VotingClosedError {});
        }

        let category = store.category(category_id)?;
        if !category.active {
            return Err(Error::ValidationError {
                message: format!("category {} is not open for votes", category.name),
            });
        }

        let car = store.car(car_id)?;
        if !car.eligible {
            return Err(Error::ValidationError {
                message: format!("car #{} is not eligible", car.car_number),
            });
        }

        if store.find_vote(voter_id, category_id)?.is_some() {
            return Err(Error::AlreadyVotedError { voter_id, category_id });
        }

        store.insert_vote(&NewVote { voter_id, category_id, car_id })
    }

    /// # reset all votes
    /// only allowed while voting is closed
    ///
    /// ## Returns
    /// * `usize` - the number of deleted votes
    pub fn reset_votes<S: DataStore>(store: &mut S) -> CustomResult<usize> {
        if store.is_voting_open()? {
            return Err(Error::VotingOpenError {});
        }

        let deleted = store.delete_votes()?;
        info!(target:"modules/voting:reset_votes", "deleted {} vote(s)", deleted);
        Ok(deleted)
    }
}
