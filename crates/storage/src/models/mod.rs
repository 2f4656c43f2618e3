mod category;
mod player;
mod rating_snapshot;
mod source_file;

pub use category::{Gender, RatingCategory};
pub use player::{ExternalPlayer, PlayerProfile};
pub use rating_snapshot::{NewRatingSnapshot, PlayerSnapshot, RatingSnapshot};
pub use source_file::{NewSourceFile, SourceFile, SourceFileRefresh};
