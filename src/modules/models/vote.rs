use chrono::NaiveDateTime;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::votes;

#[derive(Insertable, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = votes)]
pub struct NewVote {
    pub voter_id: i32,
    pub category_id: i32,
    pub car_id: i32,
}

#[derive(Queryable, Identifiable, Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[diesel(table_name = votes)]
pub struct Vote {
    pub id: i32,
    pub voter_id: i32,
    pub category_id: i32,
    pub car_id: i32,
    pub created_at: NaiveDateTime,
}

impl Vote {
    pub fn new(conn: &mut PgConnection, new_vote: &NewVote) -> QueryResult<Vote> {
        diesel::insert_into(votes::table)
            .values(new_vote)
            .get_result(conn)
    }

    pub fn get_all(conn: &mut PgConnection) -> QueryResult<Vec<Vote>> {
        use crate::schema::votes::dsl::{id, votes};

        votes.order(id).load::<Vote>(conn)
    }

    /// # get the vote of a voter
    /// a voter has at most one vote per category
    pub fn find(conn: &mut PgConnection, voter_id_in: i32, category_id_in: i32) -> QueryResult<Option<Vote>> {
        use crate::schema::votes::dsl::*;

        votes
            .filter(voter_id.eq(voter_id_in))
            .filter(category_id.eq(category_id_in))
            .first::<Vote>(conn)
            .optional()
    }

    /// # delete all votes
    ///
    /// ## Returns
    /// * `usize` - the number of deleted votes
    pub fn delete_all(conn: &mut PgConnection) -> QueryResult<usize> {
        diesel::delete(votes::table).execute(conn)
    }
}
