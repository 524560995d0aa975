// Client-side state for the account pages: the authenticated API client,
// the data-fetch hook, the doctor profile editor and the patient dashboard.

pub mod api;
pub mod dashboard;
pub mod editor;
pub mod error;
pub mod fetch;
pub mod upload;

pub use api::ApiClient;
pub use dashboard::{AccountDashboard, DashboardView, Tab};
pub use editor::{Collection, Notification, NotificationKind, ProfileEditor, RowId, SubRecord, SyncOutcome};
pub use error::{ClientError, EditorError};
pub use fetch::{FetchHandle, FetchState};
pub use upload::CloudinaryUploader;
