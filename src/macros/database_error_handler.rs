/// unwrap a diesel lookup of a single row.
/// a missing row becomes a `NotFoundError` for the given entity and id,
/// any other failure is logged and returned as a `DatabaseError`.
macro_rules! db_handle_get_error {
    ( $data:expr, $target:expr, $entity:expr, $id:expr ) => {
        match $data {
            Ok(e) => e,
            Err(diesel::result::Error::NotFound) => {
                return Err($crate::errors::Error::NotFoundError { entity: $entity, id: $id });
            }
            Err(error) => {
                error!(target:$target, "Error getting {} {}. (error: {})", $entity, $id, error);
                return Err($crate::errors::Error::DatabaseError { source: error });
            }
        }
    }
}

/// unwrap any other diesel query, logging what was being done when it failed.
macro_rules! db_handle_error {
    ( $data:expr, $target:expr, $what:expr ) => {
        match $data {
            Ok(e) => e,
            Err(error) => {
                error!(target:$target, "Error {}. (error: {})", $what, error);
                return Err($crate::errors::Error::DatabaseError { source: error });
            }
        }
    }
}

pub(crate) use db_handle_get_error;
pub(crate) use db_handle_error;
