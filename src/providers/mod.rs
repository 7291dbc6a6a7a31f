pub mod amfi_feed;
pub mod mfapi_provider;
pub mod util;

pub use amfi_feed::AmfiFeedProvider;
pub use mfapi_provider::MfApiProvider;
