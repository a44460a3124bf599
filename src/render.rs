pub(crate) mod driver;
pub(crate) mod frame;
pub(crate) mod opts;
pub(crate) mod params;
pub(crate) mod smoothing;
