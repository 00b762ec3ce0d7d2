//! HTTP boundary for items
//!
//! Handlers parse the path id and JSON body, build a [`RequestContext`](crate::context::RequestContext)
//! bounded by the configured timeout, call the [`ItemUsecase`](crate::usecase::ItemUsecase),
//! and turn every failure into an [`ApiError`].
//!
//! | failure | status | `error` |
//! |---|---|---|
//! | non-integer path id | 400 | `invalid item ID` |
//! | undecodable body | 400 | `invalid request format` |
//! | not found | 404 | `item not found` |
//! | invalid input | 400 | `validation failed` (with `details`) |
//! | timeout | 504 | `request timed out` |
//! | cancelled | 503 | `request cancelled` |
//! | storage | 500 | `internal server error` |

mod error;
pub mod items;

pub use error::{ApiError, ApiErrorKind, ErrorResponse};
pub use items::routes;
