use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use log::error;

use crate::errors::{CustomResult, Error};
use crate::macros::database_error_handler::{db_handle_error, db_handle_get_error};
use crate::modules::models::car::{Car, NewCar};
use crate::modules::models::category::{Category, ManualOverride};
use crate::modules::models::category_group::CategoryGroup;
use crate::modules::models::setting::{Setting, VOTING_OPEN_KEY};
use crate::modules::models::vote::{NewVote, Vote};
use crate::modules::store::{DataStore, Snapshot};

/// [`DataStore`] backed by a single postgres connection
pub struct PgStore {
    conn: PgConnection,
}

impl PgStore {
    pub fn new(conn: PgConnection) -> PgStore {
        PgStore { conn }
    }

    /// # connect to the database
    ///
    /// ## Arguments
    /// * `database_url` - postgres connection url
    pub fn connect(database_url: &str) -> CustomResult<PgStore> {
        match PgConnection::establish(database_url) {
            Ok(conn) => Ok(PgStore::new(conn)),
            Err(source) => {
                error!(target:"store/postgres:connect", "Error connecting to database. (error: {})", source);
                Err(Error::ConnectionError { source })
            }
        }
    }

    fn ensure_updated(updated: usize, entity: &'static str, id: i32) -> CustomResult<()> {
        if updated == 0 {
            return Err(Error::NotFoundError { entity, id });
        }
        Ok(())
    }
}

/// a vote colliding with the unique (voter, category) index was cast
/// concurrently with an earlier one by the same voter
fn vote_insert_error(error: diesel::result::Error, new_vote: &NewVote) -> Error {
    match error {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => Error::AlreadyVotedError {
            voter_id: new_vote.voter_id,
            category_id: new_vote.category_id,
        },
        source => Error::DatabaseError { source },
    }
}

impl DataStore for PgStore {
    fn snapshot(&mut self) -> CustomResult<Snapshot> {
        let snapshot = self
            .conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, diesel::result::Error, _>(|conn| {
                Ok(Snapshot {
                    categories: Category::get_all(conn)?,
                    groups: CategoryGroup::get_all(conn)?,
                    cars: Car::get_all(conn)?,
                    votes: Vote::get_all(conn)?,
                })
            });

        Ok(db_handle_error!(snapshot, "store/postgres:snapshot", "reading results snapshot"))
    }

    fn categories(&mut self) -> CustomResult<Vec<Category>> {
        Ok(db_handle_error!(Category::get_all(&mut self.conn), "store/postgres:categories", "getting categories"))
    }

    fn category(&mut self, category_id: i32) -> CustomResult<Category> {
        Ok(db_handle_get_error!(Category::get_by_id(&mut self.conn, category_id), "store/postgres:category", "category", category_id))
    }

    fn groups(&mut self) -> CustomResult<Vec<CategoryGroup>> {
        Ok(db_handle_error!(CategoryGroup::get_all(&mut self.conn), "store/postgres:groups", "getting category groups"))
    }

    fn cars(&mut self) -> CustomResult<Vec<Car>> {
        Ok(db_handle_error!(Car::get_all(&mut self.conn), "store/postgres:cars", "getting cars"))
    }

    fn car(&mut self, car_id: i32) -> CustomResult<Car> {
        Ok(db_handle_get_error!(Car::get_by_id(&mut self.conn, car_id), "store/postgres:car", "car", car_id))
    }

    fn votes(&mut self) -> CustomResult<Vec<Vote>> {
        Ok(db_handle_error!(Vote::get_all(&mut self.conn), "store/postgres:votes", "getting votes"))
    }

    fn is_voting_open(&mut self) -> CustomResult<bool> {
        Ok(db_handle_error!(Setting::get_bool(&mut self.conn, VOTING_OPEN_KEY), "store/postgres:is_voting_open", "reading voting state"))
    }

    fn set_voting_open(&mut self, open: bool) -> CustomResult<()> {
        db_handle_error!(Setting::set_bool(&mut self.conn, VOTING_OPEN_KEY, open), "store/postgres:set_voting_open", "writing voting state");
        Ok(())
    }

    fn set_override(&mut self, category_id: i32, manual: &ManualOverride) -> CustomResult<()> {
        let updated = db_handle_error!(
            Category::set_override(&mut self.conn, category_id, manual),
            "store/postgres:set_override",
            format!("setting override of category {}", category_id)
        );
        PgStore::ensure_updated(updated, "category", category_id)
    }

    fn clear_override(&mut self, category_id: i32) -> CustomResult<()> {
        let updated = db_handle_error!(
            Category::clear_override(&mut self.conn, category_id),
            "store/postgres:clear_override",
            format!("clearing override of category {}", category_id)
        );
        PgStore::ensure_updated(updated, "category", category_id)
    }

    fn set_award_id(&mut self, category_id: i32, award_id: i32) -> CustomResult<()> {
        let updated = db_handle_error!(
            Category::set_award_id(&mut self.conn, category_id, award_id),
            "store/postgres:set_award_id",
            format!("saving award id of category {}", category_id)
        );
        PgStore::ensure_updated(updated, "category", category_id)
    }

    fn insert_car(&mut self, new_car: &NewCar) -> CustomResult<Car> {
        Ok(db_handle_error!(
            Car::new(&mut self.conn, new_car),
            "store/postgres:insert_car",
            format!("inserting car #{}", new_car.car_number)
        ))
    }

    fn update_car(&mut self, car: &Car) -> CustomResult<Car> {
        Ok(db_handle_get_error!(car.update(&mut self.conn), "store/postgres:update_car", "car", car.id))
    }

    fn find_vote(&mut self, voter_id: i32, category_id: i32) -> CustomResult<Option<Vote>> {
        Ok(db_handle_error!(
            Vote::find(&mut self.conn, voter_id, category_id),
            "store/postgres:find_vote",
            format!("getting vote of voter {} in category {}", voter_id, category_id)
        ))
    }

    fn insert_vote(&mut self, new_vote: &NewVote) -> CustomResult<Vote> {
        let inserted = Vote::new(&mut self.conn, new_vote).map_err(|error| vote_insert_error(error, new_vote));
        if let Err(Error::DatabaseError { source }) = &inserted {
            error!(target:"store/postgres:insert_vote", "Error inserting vote. (error: {})", source);
        }

        inserted
    }

    fn delete_votes(&mut self) -> CustomResult<usize> {
        Ok(db_handle_error!(Vote::delete_all(&mut self.conn), "store/postgres:delete_votes", "deleting votes"))
    }
}
