pub mod auth_state;
pub mod calendar;
pub mod currency;
pub mod error;

pub use auth_state::{
    AuthEvent, AuthStateStore, AuthSubscription, Principal, DEFAULT_SESSION_TTL,
};
pub use calendar::MonthCalendar;
pub use currency::Currency;
pub use error::{AppError, Result};
