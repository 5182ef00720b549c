pub mod debounce;
pub mod geocoder;
pub mod local_submitter;
pub mod lookup;

pub use debounce::Debouncer;
pub use geocoder::{GeocoderError, OpenCageClient};
pub use local_submitter::LocalSubmitter;
pub use lookup::{AddressLookup, LookupOutcome};
