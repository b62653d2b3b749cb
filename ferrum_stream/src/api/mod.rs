pub mod map;
pub mod record;
pub mod reduce;
