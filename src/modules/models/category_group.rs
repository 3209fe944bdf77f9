use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::category_groups;

#[derive(Queryable, Identifiable, Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[diesel(table_name = category_groups)]
pub struct CategoryGroup {
    pub id: i32,
    pub name: String,
    pub exclusivity_pool_id: Option<i32>,
    /// the number of categories in this group a single car may win, `None` is unlimited
    pub max_wins_per_car: Option<i32>,
    pub display_order: i32,
}

impl CategoryGroup {
    /// # get all groups
    /// ordered by display order
    pub fn get_all(conn: &mut PgConnection) -> QueryResult<Vec<CategoryGroup>> {
        use crate::schema::category_groups::dsl::{category_groups, display_order, id};

        category_groups
            .order((display_order, id))
            .load::<CategoryGroup>(conn)
    }
}
