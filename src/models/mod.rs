// Request and response models shared by the routes and the frontend

pub mod issue;
pub mod mock_data;
pub mod story;

pub use issue::{FallbackIssue, IssueFields};
pub use mock_data::{normalize_schema, MockDataFormat, MockDataRequest, MockDataResponse};
pub use story::{GenerateResponse, StoryRequest, TestCase};
