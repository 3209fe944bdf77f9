pub mod conflicts;
pub mod overrides;
pub mod push;
pub mod race_api;
pub mod racer_import;
pub mod results;
pub mod store;
pub mod voting;

pub mod models {
    pub mod car;
    pub mod category;
    pub mod category_group;
    pub mod setting;
    pub mod vote;
}

pub mod helpers {
    pub mod cancel;
    pub mod config;
    pub mod logging;
}
