pub mod etl;
pub mod flatten;
pub mod join;
pub mod normalize;
pub mod table_io;

pub use crate::domain::model::{JoinMode, Photo, PlaceResult, Record, Table};
pub use crate::domain::ports::{ConfigProvider, Pipeline, PlaceLookup, Storage};
pub use crate::utils::error::Result;
