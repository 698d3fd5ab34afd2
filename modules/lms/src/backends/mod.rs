pub mod dummy;
pub mod openedx_fonzie;
pub mod openedx_hawthorn;

pub use dummy::DummyLmsApi;
pub use openedx_hawthorn::OpenEdxHawthornApi;
