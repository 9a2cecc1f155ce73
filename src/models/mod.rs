pub mod ai;
pub mod doctor;
pub mod enums;
pub mod message;
pub mod patient;
pub mod referral;
pub mod session;
pub mod snapshot;
pub mod todo;

pub use ai::*;
pub use doctor::*;
pub use enums::*;
pub use message::*;
pub use patient::*;
pub use referral::*;
pub use session::*;
pub use snapshot::*;
pub use todo::*;
