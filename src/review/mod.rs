//! Headless review workflow: the session controller and the pieces it
//! coordinates.

pub mod filter;
pub mod notice;
pub mod session;
pub mod shortcuts;
pub mod surface;
pub mod sync;
pub mod trip;
pub mod view;

pub use filter::RecordFilter;
pub use notice::{Notice, NoticeLevel};
pub use session::{LoadState, RecordDetail, ReviewSession, Selection};
pub use shortcuts::{ReviewAction, ShortcutRegistry, Subscription};
pub use surface::{LoggedMap, LoggedVideo, MapSurface, VideoSurface};
pub use sync::MapView;
pub use trip::TripReview;
