//! Calendar provider integration: event fetching and OAuth token refresh.

mod client;
mod token;

pub use client::CalendarClient;
pub use token::OAuthTokenRefresher;
