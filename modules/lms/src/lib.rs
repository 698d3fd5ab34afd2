//! LMS adapters.
//!
//! [`locator::find_lms_backend`] picks the configured backend a course link
//! belongs to, [`factory::build`] turns that configuration into an
//! [`LmsApi`] client.

// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::api::{EnrollmentApi, LmsApi, UserApi};
pub use contract::model::{CourseDetails, Enrollment, User};

pub mod factory;
pub mod locator;
pub mod navigation;
pub mod options;

pub use factory::{build, build_for_resource_link, LmsDeps};
pub use locator::{extract_course_id, find_lms_backend, CoursePattern};
pub use navigation::{Navigator, RecordingNavigator};
pub use options::{ApiOptions, RouteOverrides, Routes};

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod backends;
