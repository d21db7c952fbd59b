/// Typed wrappers over the backend REST surface, one file per resource.
/// Every service borrows the shared [`ApiClient`](crate::http::ApiClient),
/// so the bearer/401/403 contract applies uniformly.
pub mod accounts;
pub mod activities;
pub mod auth;
pub mod clubs;
pub mod leader_clubs;
pub mod leader_requests;
pub mod notifications;

pub use accounts::AccountsApi;
pub use activities::ActivitiesApi;
pub use auth::AuthApi;
pub use clubs::ClubsApi;
pub use leader_clubs::LeaderClubsApi;
pub use leader_requests::LeaderRequestsApi;
pub use notifications::NotificationApi;
