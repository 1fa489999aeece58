pub mod callback;
pub mod identity;
pub mod query;
pub mod record;
pub mod schema;
pub mod scope;
pub mod sequence;
