pub mod advisory;
pub mod clock;
pub mod directory;
pub mod driver;
pub mod feed;
pub mod geo;
pub mod lifecycle;
pub mod locality;
pub mod location;
pub mod random;
pub mod session;

pub use advisory::{PendingSwitch, StoreSwitchAdvisor, SwitchReason, SwitchResolution};
pub use clock::{Clock, ManualClock, SystemClock};
pub use directory::{listings, DemoDirectory, StaticDirectory, StoreDirectory, StoreListing};
pub use driver::DriverTracker;
pub use feed::{order_feed, AuthoritativeUpdate, FeedError, FeedPublisher, FeedSubscription};
pub use geo::{distance_km, format_distance, nearest};
pub use lifecycle::LifecycleSimulator;
pub use locality::LocalityEngine;
pub use location::MovementFilter;
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use session::{shared, Session, SessionEvent, SharedEngine};
